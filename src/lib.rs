//! blog-graph: Interactive force-directed graph widget for blog posts.
//!
//! This crate provides a WASM-based SVG graph component with a cooling force
//! simulation, draggable nodes and clamped pan/zoom. Host pages can call the
//! exported `graph(data, colorFn, selector)` directly, or let [`App`] render a
//! dataset embedded in the page.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	ForceGraphSvg, GraphConfig, GraphData, GraphError, GraphHandle, GraphLink, GraphNode, graph,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("blog-graph: logging initialized");
}

/// Parse JSON from a `<script type="application/json">` element by id.
fn load_json<T: DeserializeOwned>(element_id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(element_id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("blog-graph: failed to parse #{}: {}", element_id, e);
			None
		}
	}
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> Option<GraphData> {
	let data = load_json::<GraphData>("graph-data")?;
	info!(
		"blog-graph: loaded {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	Some(data)
}

/// Main application component.
/// Loads graph data (and optional `graph-config`) from the DOM and renders the
/// force-directed visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());
	let config = load_json::<GraphConfig>("graph-config");

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph">
			<ForceGraphSvg data=graph_signal config=config />
			<p class="caption">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
		</div>
	}
}
