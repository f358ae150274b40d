//! Serde shape of the YAML definition file.

use super::GeometryType;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ConfigSource {
	pub metadata: Option<MetadataSource>,
	/// Kept as a mapping so layers come out in declaration order.
	#[serde(default)]
	pub vector_layers: serde_yaml_ng::Mapping,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct MetadataSource {
	pub id: Option<String>,
	pub name: Option<String>,
	pub description: Option<String>,
	pub attribution: Option<String>,
	pub version: Option<String>,
	pub bounds: Option<Vec<f64>>,
	pub center: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct LayerSource {
	pub description: Option<String>,
	#[serde(default)]
	pub fields: BTreeMap<String, String>,
	#[serde(default)]
	pub geometry_type: BTreeSet<GeometryType>,
	#[serde(default)]
	pub sql: Vec<DefinitionSource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct DefinitionSource {
	pub minzoom: u8,
	pub maxzoom: u8,
	#[serde(alias = "sql_template")]
	pub sql: Option<String>,
	pub file: Option<String>,
	pub extent: Option<u32>,
	pub buffer: Option<u32>,
}
