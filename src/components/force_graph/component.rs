//! Mounting: DOM events, the animation loop, and the Leptos wrapper.
//!
//! [`mount`] builds a [`GraphScene`], appends its SVG to an element and wires
//! mouse, touch and wheel handlers. An animation loop runs via
//! `requestAnimationFrame` while the layout is warm, ticking the simulation
//! and copying geometry into the DOM each frame. The returned [`GraphHandle`]
//! tears all of that down with `stop`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	Element, Event, EventTarget, MouseEvent, Touch, TouchEvent, TouchList, WheelEvent, Window,
};

use super::config::GraphConfig;
use super::drag::MOUSE;
use super::error::{GraphError, Result, describe_js};
use super::render::SvgLayers;
use super::scene::GraphScene;
use super::theme::{OrdinalColors, Theme};
use super::types::{GraphData, GraphNode};
use super::zoom::{ClientRect, WheelUnit, viewport_point};

/// Seconds of simulated time per animation frame.
const FRAME_DT: f64 = 0.016;

/// Node colouring callback for the Leptos component.
pub type ColorFn = Rc<dyn Fn(&GraphNode) -> String>;

struct Listener {
	target: EventTarget,
	kind: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

/// Everything one mounted graph owns. Callbacks hold strong references to
/// it, so it lives until [`Mounted::stop`] drops them.
struct Mounted {
	scene: RefCell<GraphScene>,
	layers: SvgLayers,
	window: Window,
	view: (f64, f64),
	frame: Cell<Option<i32>>,
	animate: RefCell<Option<Closure<dyn FnMut()>>>,
	listeners: RefCell<Vec<Listener>>,
	stopped: Cell<bool>,
}

impl Mounted {
	/// Client coordinates in `viewBox` coordinates.
	fn viewport(&self, client_x: i32, client_y: i32) -> (f64, f64) {
		let rect = self.layers.svg.get_bounding_client_rect();
		viewport_point(
			(client_x as f64, client_y as f64),
			ClientRect {
				left: rect.left(),
				top: rect.top(),
				width: rect.width(),
				height: rect.height(),
			},
			self.view,
		)
	}

	fn pointer(&self, ev: &MouseEvent) -> (f64, f64) {
		self.viewport(ev.client_x(), ev.client_y())
	}

	fn slot_of(&self, target: Option<EventTarget>) -> Option<usize> {
		target
			.and_then(|t| t.dyn_into::<Element>().ok())
			.and_then(|el| self.layers.circle_slot(&el))
	}

	/// Schedules the next frame. At most one frame is pending at a time.
	fn request_frame(&self) {
		if self.stopped.get() || self.frame.get().is_some() {
			return;
		}
		if let Some(ref cb) = *self.animate.borrow() {
			if let Ok(id) = self
				.window
				.request_animation_frame(cb.as_ref().unchecked_ref())
			{
				self.frame.set(Some(id));
			}
		}
	}

	/// One animation frame. The loop ends once the layout has cooled and is
	/// resumed by the next drag.
	fn on_frame(&self) {
		self.frame.set(None);
		if self.stopped.get() {
			return;
		}
		let running = {
			let mut scene = self.scene.borrow_mut();
			if scene.tick(FRAME_DT) {
				self.layers.update_geometry(&scene);
			}
			scene.is_running()
		};
		if running {
			self.request_frame();
		} else {
			debug!("blog-graph: layout settled, animation idle");
		}
	}

	fn on_mousedown(&self, ev: &MouseEvent) {
		if ev.button() != 0 {
			return;
		}
		let at = self.pointer(ev);
		let slot = self.slot_of(ev.target());

		let mut scene = self.scene.borrow_mut();
		match slot {
			Some(slot) => {
				ev.prevent_default();
				scene.drag_start(MOUSE, slot, at);
				self.layers.update_geometry(&scene);
				drop(scene);
				self.request_frame();
			}
			None => scene.pan_start(at),
		}
	}

	fn on_mousemove(&self, ev: &MouseEvent) {
		let at = self.pointer(ev);
		let mut scene = self.scene.borrow_mut();
		if scene.drag_move(MOUSE, at) {
			self.layers.update_geometry(&scene);
		} else if scene.pan_move(at) {
			self.layers.update_transform(&scene);
		}
	}

	fn on_mouseup(&self) {
		let mut scene = self.scene.borrow_mut();
		scene.drag_end(MOUSE);
		scene.pan_end();
	}

	fn on_dblclick(&self, ev: &MouseEvent) {
		ev.prevent_default();
		let at = self.pointer(ev);
		let mut scene = self.scene.borrow_mut();
		scene.double_click(at, ev.shift_key());
		self.layers.update_transform(&scene);
	}

	fn on_wheel(&self, ev: &WheelEvent) {
		ev.prevent_default();
		let at = self.pointer(ev);
		let mut scene = self.scene.borrow_mut();
		scene.wheel(ev.delta_y(), WheelUnit::from_delta_mode(ev.delta_mode()), at);
		self.layers.update_transform(&scene);
	}

	/// A finger on a circle drags it; a lone finger on the background pans.
	fn on_touchstart(&self, ev: &TouchEvent) {
		let lone = ev.touches().length() == 1;
		let mut scene = self.scene.borrow_mut();
		let mut dragged = false;
		for touch in touches(ev.changed_touches()) {
			let at = self.viewport(touch.client_x(), touch.client_y());
			match self.slot_of(touch.target()) {
				Some(slot) => {
					scene.drag_start(touch.identifier(), slot, at);
					dragged = true;
				}
				None if lone => scene.pan_start(at),
				None => {}
			}
		}
		if dragged {
			ev.prevent_default();
			self.layers.update_geometry(&scene);
			drop(scene);
			self.request_frame();
		}
	}

	fn on_touchmove(&self, ev: &TouchEvent) {
		let mut scene = self.scene.borrow_mut();
		let (mut moved, mut panned) = (false, false);
		for touch in touches(ev.changed_touches()) {
			let at = self.viewport(touch.client_x(), touch.client_y());
			if scene.drag_move(touch.identifier(), at) {
				moved = true;
			} else if scene.pan_move(at) {
				panned = true;
			}
		}
		if moved {
			self.layers.update_geometry(&scene);
		}
		if panned {
			self.layers.update_transform(&scene);
		}
	}

	/// Shared by `touchend` and `touchcancel`.
	fn on_touchend(&self, ev: &TouchEvent) {
		let mut scene = self.scene.borrow_mut();
		for touch in touches(ev.changed_touches()) {
			scene.drag_end(touch.identifier());
		}
		if ev.touches().length() == 0 {
			scene.pan_end();
		}
	}

	/// The window lost focus; the matching up/end events will never arrive.
	fn on_blur(&self) {
		self.scene.borrow_mut().release_all();
	}

	fn listen(
		self: &Rc<Self>,
		target: &EventTarget,
		kind: &'static str,
		mut handler: impl FnMut(&Mounted, Event) + 'static,
	) -> Result<()> {
		let mounted = Rc::clone(self);
		let callback = Closure::<dyn FnMut(Event)>::new(move |ev: Event| handler(&mounted, ev));
		target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
		self.listeners.borrow_mut().push(Listener {
			target: target.clone(),
			kind,
			callback,
		});
		Ok(())
	}

	fn attach(self: &Rc<Self>) -> Result<()> {
		let svg: EventTarget = self.layers.svg.clone().into();
		let window: EventTarget = self.window.clone().into();

		self.listen(&svg, "mousedown", |m, ev| {
			if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
				m.on_mousedown(ev);
			}
		})?;
		self.listen(&svg, "wheel", |m, ev| {
			if let Some(ev) = ev.dyn_ref::<WheelEvent>() {
				m.on_wheel(ev);
			}
		})?;
		self.listen(&window, "mousemove", |m, ev| {
			if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
				m.on_mousemove(ev);
			}
		})?;
		self.listen(&window, "mouseup", |m, _| m.on_mouseup())?;
		self.listen(&svg, "dblclick", |m, ev| {
			if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
				m.on_dblclick(ev);
			}
		})?;
		self.listen(&svg, "touchstart", |m, ev| {
			if let Some(ev) = ev.dyn_ref::<TouchEvent>() {
				m.on_touchstart(ev);
			}
		})?;
		self.listen(&window, "touchmove", |m, ev| {
			if let Some(ev) = ev.dyn_ref::<TouchEvent>() {
				m.on_touchmove(ev);
			}
		})?;
		for kind in ["touchend", "touchcancel"] {
			self.listen(&window, kind, |m, ev| {
				if let Some(ev) = ev.dyn_ref::<TouchEvent>() {
					m.on_touchend(ev);
				}
			})?;
		}
		self.listen(&window, "blur", |m, _| m.on_blur())?;

		let mounted = Rc::clone(self);
		*self.animate.borrow_mut() = Some(Closure::new(move || mounted.on_frame()));
		self.request_frame();
		Ok(())
	}

	fn stop(&self) {
		if self.stopped.replace(true) {
			return;
		}
		self.scene.borrow_mut().stop();
		if let Some(id) = self.frame.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		for listener in self.listeners.borrow_mut().drain(..) {
			let _ = listener.target.remove_event_listener_with_callback(
				listener.kind,
				listener.callback.as_ref().unchecked_ref(),
			);
		}
		self.animate.borrow_mut().take();
		info!("blog-graph: graph stopped");
	}
}

fn touches(list: TouchList) -> impl Iterator<Item = Touch> {
	(0..list.length()).filter_map(move |i| list.get(i))
}

/// A mounted graph. Dropping the handle leaves the graph running; call
/// [`GraphHandle::stop`] to halt it and release its callbacks.
#[wasm_bindgen]
pub struct GraphHandle {
	mounted: Rc<Mounted>,
}

#[wasm_bindgen]
impl GraphHandle {
	/// Stops the simulation, cancels the animation loop and removes event
	/// listeners. The rendered SVG stays in the page.
	pub fn stop(&self) {
		self.mounted.stop();
	}

	/// Whether the simulation is still moving nodes.
	#[wasm_bindgen(js_name = isRunning)]
	pub fn is_running(&self) -> bool {
		!self.mounted.stopped.get() && self.mounted.scene.borrow().is_running()
	}

	/// Whether an animation frame is pending. False once the layout has
	/// cooled, until a drag reheats it.
	#[wasm_bindgen(js_name = isAnimating)]
	pub fn is_animating(&self) -> bool {
		self.mounted.frame.get().is_some()
	}

	/// Zooms about the canvas center, clamped to the configured bounds.
	#[wasm_bindgen(js_name = zoomTo)]
	pub fn zoom_to(&self, k: f64) {
		let mut scene = self.mounted.scene.borrow_mut();
		scene.zoom_to(k);
		self.mounted.layers.update_transform(&scene);
	}
}

impl GraphHandle {
	/// Read access to the live scene.
	pub fn with_scene<R>(&self, f: impl FnOnce(&GraphScene) -> R) -> R {
		f(&self.mounted.scene.borrow())
	}

	/// The `<svg>` element this graph rendered into.
	pub fn svg(&self) -> &Element {
		&self.mounted.layers.svg
	}
}

/// Mounts a graph under `mount` with a fallible colour function.
pub fn mount_with(
	mount: &Element,
	data: &GraphData,
	config: GraphConfig,
	theme: &Theme,
	color: impl FnMut(&GraphNode) -> Result<String>,
) -> Result<GraphHandle> {
	let window = web_sys::window().ok_or(GraphError::NoWindow)?;
	let document = window.document().ok_or(GraphError::NoDocument)?;

	let scene = GraphScene::try_new(data, config, color)?;
	let layers = SvgLayers::build(&document, mount, &scene, theme)?;
	let view = (scene.config().width, scene.config().height);

	let mounted = Rc::new(Mounted {
		scene: RefCell::new(scene),
		layers,
		window,
		view,
		frame: Cell::new(None),
		animate: RefCell::new(None),
		listeners: RefCell::new(Vec::new()),
		stopped: Cell::new(false),
	});
	if let Err(e) = mounted.attach() {
		mounted.stop();
		return Err(e);
	}

	info!(
		"blog-graph: mounted {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	Ok(GraphHandle { mounted })
}

/// Mounts a graph under `mount`. The SVG is appended; earlier content of
/// `mount` (including earlier graphs) is kept.
pub fn mount(
	mount: &Element,
	data: &GraphData,
	config: GraphConfig,
	mut color: impl FnMut(&GraphNode) -> String,
) -> Result<GraphHandle> {
	mount_with(mount, data, config, &Theme::default(), move |node| {
		Ok(color(node))
	})
}

fn find_mount(selector: &str) -> Result<Element> {
	let document = web_sys::window()
		.ok_or(GraphError::NoWindow)?
		.document()
		.ok_or(GraphError::NoDocument)?;
	document
		.query_selector(selector)?
		.ok_or_else(|| GraphError::MountNotFound {
			selector: selector.to_string(),
		})
}

/// Renders `data` into the first element matching `selector` using the
/// default 600x600 canvas.
pub fn graph(
	data: &GraphData,
	color: impl FnMut(&GraphNode) -> String,
	selector: &str,
) -> Result<GraphHandle> {
	mount(&find_mount(selector)?, data, GraphConfig::default(), color)
}

/// Host-page entry point: `graph({nodes, links}, node => color, ".selector")`.
///
/// `color_function` receives each node as a plain object and must return a
/// CSS colour string. Errors (bad data, a throwing colour function, a missing
/// mount element) are thrown as JS `Error`s.
#[wasm_bindgen(js_name = graph)]
pub fn graph_js(
	data: JsValue,
	color_function: js_sys::Function,
	target_div_class: &str,
) -> std::result::Result<GraphHandle, JsValue> {
	let json: String = js_sys::JSON::stringify(&data)?.into();
	let data: GraphData = serde_json::from_str(&json).map_err(GraphError::from)?;
	let target = find_mount(target_div_class)?;

	let color = |node: &GraphNode| -> Result<String> {
		let arg = js_sys::JSON::parse(&serde_json::to_string(node)?)?;
		let value = color_function
			.call1(&JsValue::NULL, &arg)
			.map_err(|e| GraphError::ColorFunction {
				message: describe_js(&e),
			})?;
		value.as_string().ok_or_else(|| GraphError::ColorFunction {
			message: format!("expected a colour string for node {:?}", node.id),
		})
	};

	Ok(mount_with(
		&target,
		&data,
		GraphConfig::default(),
		&Theme::default(),
		color,
	)?)
}

/// Renders an interactive force-directed graph as SVG.
///
/// Pass graph data via the reactive `data` signal; a new value re-mounts the
/// graph, replacing this component's previous drawing. Nodes are coloured by
/// their `"group"` field unless a `color` callback is given.
#[component]
pub fn ForceGraphSvg(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = None)] config: Option<GraphConfig>,
	#[prop(default = None)] color: Option<ColorFn>,
) -> impl IntoView {
	let mount_ref = NodeRef::<leptos::html::Div>::new();
	let handle = StoredValue::new_local(None::<GraphHandle>);

	Effect::new(move |_| {
		let Some(div) = mount_ref.get() else {
			return;
		};
		let data = data.get();
		let element: Element = div.into();

		handle.update_value(|h| {
			if let Some(old) = h.take() {
				old.stop();
			}
		});
		element.set_inner_html("");

		let config = config.clone().unwrap_or_default();
		let mounted = match color.clone() {
			Some(color) => mount(&element, &data, config, move |n| color(n)),
			None => {
				let mut ordinal = OrdinalColors::by_group();
				mount(&element, &data, config, move |n| ordinal.color_for(n))
			}
		};
		match mounted {
			Ok(h) => handle.set_value(Some(h)),
			Err(e) => error!("blog-graph: failed to mount graph: {e}"),
		}
	});

	on_cleanup(move || {
		handle.update_value(|h| {
			if let Some(h) = h.take() {
				h.stop();
			}
		});
	});

	view! { <div node_ref=mount_ref class="force-graph-mount" /> }
}
