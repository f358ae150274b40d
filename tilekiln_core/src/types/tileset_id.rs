use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

const MAX_ID_LENGTH: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid tileset id: use 1 to 48 ASCII letters, digits or underscores")]
pub struct InvalidTilesetId(pub String);

/// Identifier of a tileset.
///
/// Ids name URL path segments and PostgreSQL tables, so they are restricted to
/// `[A-Za-z0-9_]{1,48}`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TilesetId(String);

impl TilesetId {
	pub fn new(id: &str) -> Result<TilesetId, InvalidTilesetId> {
		let valid = !id.is_empty()
			&& id.len() <= MAX_ID_LENGTH
			&& id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
		if valid {
			Ok(TilesetId(id.to_string()))
		} else {
			Err(InvalidTilesetId(id.to_string()))
		}
	}

	/// Derive an id from a human readable name: lower case, with every run of other
	/// characters collapsed to a single `_`.
	pub fn from_name(name: &str) -> Result<TilesetId, InvalidTilesetId> {
		let mut id = String::with_capacity(name.len());
		for c in name.chars() {
			if c.is_ascii_alphanumeric() {
				id.push(c.to_ascii_lowercase());
			} else if !id.ends_with('_') {
				id.push('_');
			}
		}
		let id = id.trim_matches('_');
		TilesetId::new(&id[..id.len().min(MAX_ID_LENGTH)])
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl FromStr for TilesetId {
	type Err = InvalidTilesetId;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		TilesetId::new(s)
	}
}

impl TryFrom<String> for TilesetId {
	type Error = InvalidTilesetId;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		TilesetId::new(&value)
	}
}

impl From<TilesetId> for String {
	fn from(id: TilesetId) -> Self {
		id.0
	}
}

impl AsRef<str> for TilesetId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TilesetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for TilesetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TilesetId({})", self.0)
	}
}
