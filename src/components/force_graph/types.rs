//! Graph data structures for input to the force graph component.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node in the graph.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Any other fields from the dataset, readable by colour functions
	/// (e.g. `"group"` or `"party"`).
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			extra: Map::new(),
		}
	}

	/// Attach an extra field, builder style.
	pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}

	/// String form of an extra field. Numbers and booleans are stringified so
	/// they can key an ordinal colour scale.
	pub fn field_str(&self, key: &str) -> Option<String> {
		match self.extra.get(key)? {
			Value::String(s) => Some(s.clone()),
			Value::Number(n) => Some(n.to_string()),
			Value::Bool(b) => Some(b.to_string()),
			_ => None,
		}
	}
}

fn default_weight() -> f64 {
	1.0
}

/// An undirected, weighted edge between two nodes.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Visual weight; the rendered stroke is twice this wide.
	#[serde(default = "default_weight")]
	pub weight: f64,
}

impl GraphLink {
	pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			weight,
		}
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}
