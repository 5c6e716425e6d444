//! Errors raised while building or mounting a graph.

use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
	#[error("node not found: {id}")]
	MissingNode { id: String },
	#[error("invalid graph config: {message}")]
	InvalidConfig { message: String },
	#[error("no global window")]
	NoWindow,
	#[error("window has no document")]
	NoDocument,
	#[error("no element matches selector {selector:?}")]
	MountNotFound { selector: String },
	#[error("DOM operation failed: {message}")]
	Dom { message: String },
	#[error("colour function failed: {message}")]
	ColorFunction { message: String },
	#[error("graph data JSON error: {0}")]
	Data(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// Describes a thrown JS value, preferring `Error.message`.
pub(crate) fn describe_js(value: &JsValue) -> String {
	if let Some(s) = value.as_string() {
		return s;
	}
	js_sys::Reflect::get(value, &JsValue::from_str("message"))
		.ok()
		.and_then(|m| m.as_string())
		.unwrap_or_else(|| format!("{value:?}"))
}

impl From<JsValue> for GraphError {
	fn from(value: JsValue) -> Self {
		GraphError::Dom {
			message: describe_js(&value),
		}
	}
}

impl From<GraphError> for JsValue {
	fn from(err: GraphError) -> Self {
		js_sys::Error::new(&err.to_string()).into()
	}
}
