//! SQL templates with `{{ name }}` placeholders.
//!
//! Templates are parsed once at load time into literal text and placeholders. Only a
//! fixed set of tile-derived numeric values can be substituted, so rendering can never
//! inject anything but numbers and `ST_MakeEnvelope(...)` expressions into the query.
//!
//! | placeholder          | value                                                     |
//! |----------------------|-----------------------------------------------------------|
//! | `zoom`, `x`, `y`     | tile coordinate                                           |
//! | `bbox`               | tile envelope in EPSG:3857, grown by the definition buffer |
//! | `unbuffered_bbox`    | exact tile envelope in EPSG:3857                          |
//! | `extent`, `buffer`   | definition settings, in tile units                        |
//! | `tile_length`        | tile width in metres                                      |
//! | `coordinate_length`  | width of one tile unit in metres                          |

use crate::Tile;
use regex::Regex;
use std::{fmt::Write, sync::LazyLock};

static PLACEHOLDER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\{\{\s*([^{}\s]*)\s*\}\}").expect("placeholder regex is valid"));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Variable {
	Zoom,
	X,
	Y,
	BBox,
	UnbufferedBBox,
	Extent,
	Buffer,
	TileLength,
	CoordinateLength,
}

impl Variable {
	fn from_name(name: &str) -> Option<Variable> {
		use Variable::*;
		Some(match name {
			"zoom" => Zoom,
			"x" => X,
			"y" => Y,
			"bbox" => BBox,
			"unbuffered_bbox" => UnbufferedBBox,
			"extent" => Extent,
			"buffer" => Buffer,
			"tile_length" => TileLength,
			"coordinate_length" => CoordinateLength,
			_ => return None,
		})
	}
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
	Text(String),
	Variable(Variable),
}

/// A parsed SQL template.
#[derive(Clone, Debug, PartialEq)]
pub struct SqlTemplate {
	segments: Vec<Segment>,
}

impl SqlTemplate {
	/// Parse `text`, rejecting unknown placeholders and unbalanced braces.
	pub fn parse(text: &str) -> Result<SqlTemplate, String> {
		let mut segments = Vec::new();
		let mut last = 0;

		for captures in PLACEHOLDER.captures_iter(text) {
			let whole = captures.get(0).expect("group 0 always matches");
			let name = &captures[1];
			let variable = Variable::from_name(name).ok_or_else(|| format!("unknown placeholder '{{{{{name}}}}}'"))?;

			push_text(&mut segments, &text[last..whole.start()])?;
			segments.push(Segment::Variable(variable));
			last = whole.end();
		}
		push_text(&mut segments, &text[last..])?;

		Ok(SqlTemplate { segments })
	}

	/// Substitute the values for `tile`.
	///
	/// `extent` is the tile size in MVT units, `buffer` the margin in the same units.
	pub fn render(&self, tile: &Tile, extent: u32, buffer: u32) -> String {
		let tile_length = tile.tile_length();
		let mut sql = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Text(text) => sql.push_str(text),
				Segment::Variable(variable) => {
					use Variable::*;
					// writing to a String cannot fail
					let _ = match variable {
						Zoom => write!(sql, "{}", tile.zoom),
						X => write!(sql, "{}", tile.x),
						Y => write!(sql, "{}", tile.y),
						BBox => write!(
							sql,
							"{}",
							tile.mercator_bbox(f64::from(buffer) / f64::from(extent)).to_sql()
						),
						UnbufferedBBox => write!(sql, "{}", tile.mercator_bbox(0.0).to_sql()),
						Extent => write!(sql, "{extent}"),
						Buffer => write!(sql, "{buffer}"),
						TileLength => write!(sql, "{tile_length}"),
						CoordinateLength => write!(sql, "{}", tile_length / f64::from(extent)),
					};
				}
			}
		}
		sql
	}
}

fn push_text(segments: &mut Vec<Segment>, text: &str) -> Result<(), String> {
	if text.contains("{{") || text.contains("}}") {
		return Err(format!("unbalanced '{{{{' or '}}}}' near '{}'", text.trim()));
	}
	if !text.is_empty() {
		segments.push(Segment::Text(text.to_string()));
	}
	Ok(())
}
