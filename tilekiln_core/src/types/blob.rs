//! This module provides the [`Blob`] struct, a thin wrapper around [`Vec<u8>`] used for
//! everything that is "just bytes": rendered tiles, per-layer MVT buffers, cached tiles.
//!
//! # Examples
//!
//! ```rust
//! use tilekiln_core::Blob;
//!
//! let mut tile = Blob::new_empty();
//! tile.append(&Blob::from("water"));
//! tile.append(&Blob::from("roads"));
//! assert_eq!(tile.as_str(), "waterroads");
//! assert_eq!(tile.len(), 10);
//! ```

use std::fmt::Debug;

/// A simple wrapper around [`Vec<u8>`].
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Blob(Vec<u8>);

impl Blob {
	/// Creates an empty `Blob`.
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	/// Returns a reference to the underlying byte slice.
	pub fn as_slice(&self) -> &[u8] {
		self.0.as_ref()
	}

	/// Consumes this [`Blob`] and returns the underlying `Vec<u8>`.
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Interprets the bytes as UTF-8, or returns `<binary>` if they are not.
	pub fn as_str(&self) -> &str {
		std::str::from_utf8(&self.0).unwrap_or("<binary>")
	}

	/// Appends the bytes of `other`.
	///
	/// MVT layers are independent messages, so appending one layer buffer to another
	/// yields a valid tile containing both layers.
	pub fn append(&mut self, other: &Blob) {
		self.0.extend_from_slice(&other.0);
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<u8>> for Blob {
	fn from(vec: Vec<u8>) -> Self {
		Blob(vec)
	}
}

impl From<&[u8]> for Blob {
	fn from(slice: &[u8]) -> Self {
		Blob(slice.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(text: &str) -> Self {
		Blob(text.as_bytes().to_vec())
	}
}

impl From<String> for Blob {
	fn from(text: String) -> Self {
		Blob(text.into_bytes())
	}
}

impl From<Blob> for Vec<u8> {
	fn from(blob: Blob) -> Self {
		blob.0
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Blob({} bytes)", self.0.len())
	}
}
