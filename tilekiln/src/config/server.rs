/// Where a server listens and how it refers to itself in TileJSON.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
	pub ip: String,
	pub port: u16,
	/// Public URL of the server, `http://<ip>:<port>` if unset.
	pub base_url: Option<String>,
}

impl ServerConfig {
	pub fn new(ip: &str, port: u16) -> ServerConfig {
		ServerConfig {
			ip: ip.to_string(),
			port,
			base_url: None,
		}
	}

	pub fn with_base_url(mut self, base_url: Option<String>) -> ServerConfig {
		self.base_url = base_url;
		self
	}

	/// The public URL without a trailing slash.
	pub fn base_url(&self) -> String {
		match &self.base_url {
			Some(url) => url.trim_end_matches('/').to_string(),
			None => format!("http://{}:{}", self.ip, self.port),
		}
	}

	pub fn address(&self) -> String {
		format!("{}:{}", self.ip, self.port)
	}
}

impl Default for ServerConfig {
	fn default() -> Self {
		ServerConfig::new("127.0.0.1", 8000)
	}
}
