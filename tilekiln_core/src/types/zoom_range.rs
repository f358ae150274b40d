//! Inclusive ranges of zoom levels.
//!
//! Definitions, layers and whole tilesets each cover a [`ZoomRange`]. Besides the
//! containment and overlap tests used to select a definition, a range can enumerate
//! every tile it covers, which is what the pyramid dumps iterate over.

use super::{MAX_ZOOM, Tile};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoomRangeError {
	#[error("minzoom {min} is larger than maxzoom {max}")]
	Inverted { min: u8, max: u8 },
	#[error("maxzoom {0} is larger than the maximum zoom {MAX_ZOOM}")]
	TooLarge(u8),
}

/// The zoom levels `min..=max`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoomRange {
	min: u8,
	max: u8,
}

impl ZoomRange {
	pub fn new(min: u8, max: u8) -> Result<ZoomRange, ZoomRangeError> {
		if min > max {
			return Err(ZoomRangeError::Inverted { min, max });
		}
		if max > MAX_ZOOM {
			return Err(ZoomRangeError::TooLarge(max));
		}
		Ok(ZoomRange { min, max })
	}

	pub fn min(&self) -> u8 {
		self.min
	}

	pub fn max(&self) -> u8 {
		self.max
	}

	pub fn contains(&self, zoom: u8) -> bool {
		self.min <= zoom && zoom <= self.max
	}

	pub fn overlaps(&self, other: &ZoomRange) -> bool {
		self.min <= other.max && other.min <= self.max
	}

	/// Smallest range covering both `self` and `other`.
	pub fn union(&self, other: &ZoomRange) -> ZoomRange {
		ZoomRange {
			min: self.min.min(other.min),
			max: self.max.max(other.max),
		}
	}

	pub fn levels(&self) -> impl Iterator<Item = u8> + use<> {
		self.min..=self.max
	}

	/// Total number of tiles in the pyramid spanned by this range.
	pub fn tile_count(&self) -> u64 {
		self.levels().map(|zoom| 1u64 << (2 * u32::from(zoom))).sum()
	}

	/// Every tile of every zoom in the range, zoom by zoom, column by column.
	pub fn tiles(&self) -> impl Iterator<Item = Tile> + use<> {
		self.levels().flat_map(|zoom| {
			let size = 1u32 << zoom;
			(0..size).flat_map(move |x| (0..size).map(move |y| Tile { zoom, x, y }))
		})
	}
}

impl fmt::Display for ZoomRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}]", self.min, self.max)
	}
}

impl fmt::Debug for ZoomRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ZoomRange{self}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn range(min: u8, max: u8) -> ZoomRange {
		ZoomRange::new(min, max).unwrap()
	}

	#[test]
	fn rejects_inverted_and_too_large() {
		assert_eq!(ZoomRange::new(5, 4), Err(ZoomRangeError::Inverted { min: 5, max: 4 }));
		assert_eq!(ZoomRange::new(0, 32), Err(ZoomRangeError::TooLarge(32)));
		assert!(ZoomRange::new(7, 7).is_ok());
	}

	#[rstest]
	#[case((0, 5), (6, 10), false)]
	#[case((0, 5), (5, 10), true)]
	#[case((3, 3), (0, 14), true)]
	#[case((10, 14), (0, 9), false)]
	fn overlaps(#[case] a: (u8, u8), #[case] b: (u8, u8), #[case] expected: bool) {
		assert_eq!(range(a.0, a.1).overlaps(&range(b.0, b.1)), expected);
		assert_eq!(range(b.0, b.1).overlaps(&range(a.0, a.1)), expected);
	}

	#[test]
	fn contains_and_union() {
		let r = range(4, 8);
		assert!(!r.contains(3));
		assert!(r.contains(4));
		assert!(r.contains(8));
		assert!(!r.contains(9));
		assert_eq!(r.union(&range(10, 12)), range(4, 12));
		assert_eq!(r.union(&range(0, 1)), range(0, 8));
	}

	#[test]
	fn tiles_enumerates_the_pyramid() {
		let r = range(0, 2);
		let tiles: Vec<Tile> = r.tiles().collect();
		assert_eq!(tiles.len() as u64, r.tile_count());
		assert_eq!(tiles.len(), 1 + 4 + 16);
		assert_eq!(tiles[0], Tile { zoom: 0, x: 0, y: 0 });
		assert_eq!(tiles[1], Tile { zoom: 1, x: 0, y: 0 });
		assert_eq!(tiles[2], Tile { zoom: 1, x: 0, y: 1 });
		assert_eq!(tiles[20], Tile { zoom: 2, x: 3, y: 3 });
	}

	#[test]
	fn display() {
		assert_eq!(range(0, 14).to_string(), "[0, 14]");
		assert_eq!(format!("{:?}", range(2, 3)), "ZoomRange[2, 3]");
	}
}
