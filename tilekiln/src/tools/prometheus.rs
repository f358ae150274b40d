use super::args::StorageArgs;
use anyhow::Result;
use tilekiln::{config::ServerConfig, server::TileServer, server::metrics_router};

/// Port 10013 is allocated to tilekiln in the Prometheus default port list.
const PROMETHEUS_PORT: u16 = 10013;

#[derive(clap::Args, Debug)]
#[command(disable_version_flag = true)]
pub struct Subcommand {
	/// Bind socket to this host
	#[arg(long, default_value = "0.0.0.0", value_name = "HOST")]
	bind_host: String,

	/// Bind socket to this port
	#[arg(long, default_value_t = PROMETHEUS_PORT, value_name = "PORT")]
	bind_port: u16,

	#[command(flatten)]
	storage: StorageArgs,
}

/// Export tile counts of the storage for Prometheus.
#[tokio::main]
pub async fn run(args: &Subcommand) -> Result<()> {
	let storage = args.storage.storage(1).await?;
	let config = ServerConfig::new(&args.bind_host, args.bind_port);
	eprintln!("Running prometheus exporter on http://{}/", config.address());

	let mut server = TileServer::new(config, metrics_router(storage));
	server.run_until_ctrl_c().await
}
