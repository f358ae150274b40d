//! TileJSON documents and the metadata they are built from.
//!
//! [`TilesetMetadata`] is the part of a tileset definition that is needed to serve it:
//! identity, descriptive fields and zoom bounds. Storage persists it next to the tiles so
//! a static server can describe tilesets without their definition files.

use crate::TilesetId;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json, ser::PrettyFormatter};
use std::collections::BTreeMap;

/// Serving metadata of a tileset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TilesetMetadata {
	pub id: TilesetId,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub attribution: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bounds: Option<[f64; 4]>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub center: Option<[f64; 3]>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub minzoom: Option<u8>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub maxzoom: Option<u8>,
}

impl TilesetMetadata {
	/// Metadata with only the required fields set.
	pub fn new(id: TilesetId, name: &str) -> TilesetMetadata {
		TilesetMetadata {
			id,
			name: name.to_string(),
			description: None,
			attribution: None,
			version: None,
			bounds: None,
			center: None,
			minzoom: None,
			maxzoom: None,
		}
	}

	/// TileJSON 3.0.0 document for tiles served below `url`.
	///
	/// Keys are sorted and indented by four spaces, and fields without a value are left
	/// out, so equal metadata always yields the same bytes.
	pub fn tilejson(&self, url: &str) -> String {
		let mut document: BTreeMap<&str, Value> = BTreeMap::new();
		document.insert("tilejson", json!("3.0.0"));
		document.insert("tiles", json!([format!("{url}/{{z}}/{{x}}/{{y}}.mvt")]));
		document.insert("name", json!(self.name));
		document.insert("scheme", json!("xyz"));

		let optional = [
			("attribution", self.attribution.as_ref().map(|v| json!(v))),
			("bounds", self.bounds.map(|v| json!(v))),
			("center", self.center.map(|v| json!(v))),
			("description", self.description.as_ref().map(|v| json!(v))),
			("maxzoom", self.maxzoom.map(|v| json!(v))),
			("minzoom", self.minzoom.map(|v| json!(v))),
		];
		for (key, value) in optional {
			if let Some(value) = value {
				document.insert(key, value);
			}
		}

		let mut buffer = Vec::new();
		let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
		document
			.serialize(&mut serializer)
			.expect("a map of JSON values always serializes");
		String::from_utf8(buffer).expect("serde_json writes UTF-8")
	}
}
