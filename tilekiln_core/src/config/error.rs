use crate::{InvalidTilesetId, ZoomRange, ZoomRangeError};
use std::path::PathBuf;
use thiserror::Error;

/// A tileset definition that cannot be loaded.
///
/// Loading is all-or-nothing: any of these aborts construction of the [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read '{}'", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid config document")]
	Yaml(#[from] serde_yaml_ng::Error),

	#[error("metadata.name is required")]
	MissingName,

	#[error(transparent)]
	InvalidId(#[from] InvalidTilesetId),

	#[error("layer id '{0}' must be a non-empty string of letters, digits, '_' or '-'")]
	InvalidLayerId(String),

	#[error("layer '{0}' has no sql definitions")]
	NoDefinitions(String),

	#[error("a definition of layer '{layer}' needs exactly one of 'sql' or 'file'")]
	SqlSource { layer: String },

	#[error("a definition of layer '{layer}' has an invalid zoom range")]
	ZoomRange {
		layer: String,
		#[source]
		source: ZoomRangeError,
	},

	#[error("definitions of layer '{layer}' overlap: {first} and {second}")]
	OverlappingDefinitions {
		layer: String,
		first: ZoomRange,
		second: ZoomRange,
	},

	#[error("a definition of layer '{layer}' has extent 0")]
	ZeroExtent { layer: String },

	#[error("malformed sql template in layer '{layer}': {message}")]
	Template { layer: String, message: String },

	#[error("metadata.{field} {message}")]
	Metadata { field: &'static str, message: String },
}
