//! Pan and zoom.
//!
//! A [`ZoomTransform`] maps scene coordinates (where the simulation lives) to
//! viewport coordinates (the SVG `viewBox`). [`ZoomBehavior`] produces new
//! transforms from wheel, pan and programmatic requests, always clamping the
//! scale to its extent.

use std::fmt;

use super::config::GraphConfig;

/// Translation followed by uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ZoomTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ZoomTransform {
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// Scene point to viewport point.
	pub fn apply(&self, (px, py): (f64, f64)) -> (f64, f64) {
		(px * self.k + self.x, py * self.k + self.y)
	}

	/// Viewport point to scene point.
	pub fn invert(&self, (vx, vy): (f64, f64)) -> (f64, f64) {
		((vx - self.x) / self.k, (vy - self.y) / self.k)
	}
}

/// SVG `transform` attribute form.
impl fmt::Display for ZoomTransform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "translate({},{}) scale({})", self.x, self.y, self.k)
	}
}

/// Which mouse-wheel unit a `deltaY` is measured in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelUnit {
	Pixel,
	Line,
	Page,
}

impl WheelUnit {
	/// From `WheelEvent.deltaMode`.
	pub fn from_delta_mode(mode: u32) -> Self {
		match mode {
			0 => WheelUnit::Pixel,
			1 => WheelUnit::Line,
			_ => WheelUnit::Page,
		}
	}
}

/// Zoom rules for one canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomBehavior {
	/// Viewport rectangle `[(x0, y0), (x1, y1)]`; programmatic zoom pivots on
	/// its center.
	pub extent: [(f64, f64); 2],
	/// Allowed `(min, max)` zoom factor.
	pub scale_extent: (f64, f64),
}

impl ZoomBehavior {
	pub fn new(config: &GraphConfig) -> Self {
		Self {
			extent: [(0.0, 0.0), (config.width, config.height)],
			scale_extent: (config.min_zoom, config.max_zoom),
		}
	}

	pub fn constrain_scale(&self, k: f64) -> f64 {
		k.clamp(self.scale_extent.0, self.scale_extent.1)
	}

	fn extent_center(&self) -> (f64, f64) {
		let [(x0, y0), (x1, y1)] = self.extent;
		((x0 + x1) / 2.0, (y0 + y1) / 2.0)
	}

	/// Rescales to `k` keeping the viewport point `pivot` fixed.
	pub fn scale_at(&self, transform: ZoomTransform, k: f64, pivot: (f64, f64)) -> ZoomTransform {
		let k = self.constrain_scale(k);
		let (sx, sy) = transform.invert(pivot);
		ZoomTransform {
			x: pivot.0 - sx * k,
			y: pivot.1 - sy * k,
			k,
		}
	}

	pub fn scale_by_at(
		&self,
		transform: ZoomTransform,
		factor: f64,
		pivot: (f64, f64),
	) -> ZoomTransform {
		self.scale_at(transform, transform.k * factor, pivot)
	}

	/// Programmatic zoom about the extent center.
	pub fn scale_to(&self, transform: ZoomTransform, k: f64) -> ZoomTransform {
		self.scale_at(transform, k, self.extent_center())
	}

	/// Moves by a viewport-space offset; scale is untouched.
	pub fn translate_by(&self, transform: ZoomTransform, dx: f64, dy: f64) -> ZoomTransform {
		ZoomTransform {
			x: transform.x + dx,
			y: transform.y + dy,
			k: self.constrain_scale(transform.k),
		}
	}

	/// Zoom factor for one wheel event. Scrolling down zooms out.
	pub fn wheel_factor(delta_y: f64, unit: WheelUnit) -> f64 {
		let per_unit = match unit {
			WheelUnit::Pixel => 0.002,
			WheelUnit::Line => 0.05,
			WheelUnit::Page => 1.0,
		};
		2f64.powf(-delta_y * per_unit)
	}
}

/// Tracks an in-progress background pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start: ZoomTransform,
}

impl PanState {
	pub fn begin(&mut self, pointer: (f64, f64), transform: ZoomTransform) {
		self.active = true;
		self.start_x = pointer.0;
		self.start_y = pointer.1;
		self.transform_start = transform;
	}

	/// Transform for the current pointer position, if panning.
	pub fn update(&self, behavior: &ZoomBehavior, pointer: (f64, f64)) -> Option<ZoomTransform> {
		self.active.then(|| {
			behavior.translate_by(
				self.transform_start,
				pointer.0 - self.start_x,
				pointer.1 - self.start_y,
			)
		})
	}

	pub fn end(&mut self) {
		self.active = false;
	}
}

/// On-screen placement of an SVG element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClientRect {
	pub left: f64,
	pub top: f64,
	pub width: f64,
	pub height: f64,
}

/// Maps client (page) coordinates into `viewBox` coordinates, accounting for
/// the default `xMidYMid meet` letterboxing.
pub fn viewport_point(client: (f64, f64), rect: ClientRect, view: (f64, f64)) -> (f64, f64) {
	let scale = (rect.width / view.0).min(rect.height / view.1);
	if !(scale > 0.0) {
		return (client.0 - rect.left, client.1 - rect.top);
	}
	let offset_x = (rect.width - view.0 * scale) / 2.0;
	let offset_y = (rect.height - view.1 * scale) / 2.0;
	(
		(client.0 - rect.left - offset_x) / scale,
		(client.1 - rect.top - offset_y) / scale,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn behavior() -> ZoomBehavior {
		ZoomBehavior::new(&GraphConfig::default())
	}

	fn close(a: (f64, f64), b: (f64, f64)) -> bool {
		(a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
	}

	#[test]
	fn invert_undoes_apply() {
		let t = ZoomTransform {
			x: 40.0,
			y: -15.0,
			k: 2.5,
		};
		assert!(close(t.invert(t.apply((12.0, 34.0))), (12.0, 34.0)));
	}

	#[test]
	fn formats_as_svg_transform() {
		let t = ZoomTransform {
			x: 10.0,
			y: 20.5,
			k: 2.0,
		};
		assert_eq!(t.to_string(), "translate(10,20.5) scale(2)");
		assert_eq!(ZoomTransform::IDENTITY.to_string(), "translate(0,0) scale(1)");
	}

	#[test]
	fn programmatic_zoom_is_clamped() {
		let zoom = behavior();
		assert_eq!(zoom.scale_to(ZoomTransform::IDENTITY, 10.0).k, 4.0);
		assert_eq!(zoom.scale_to(ZoomTransform::IDENTITY, 0.1).k, 0.5);
		assert_eq!(zoom.scale_to(ZoomTransform::IDENTITY, 2.0).k, 2.0);
	}

	#[test]
	fn programmatic_zoom_pivots_on_extent_center() {
		let zoom = behavior();
		let t = zoom.scale_to(ZoomTransform::IDENTITY, 2.0);
		assert!(close(t.apply((300.0, 300.0)), (300.0, 300.0)));
		assert_eq!((t.x, t.y), (-300.0, -300.0));
	}

	#[test]
	fn wheel_zoom_keeps_pointer_fixed() {
		let zoom = behavior();
		let pointer = (120.0, 450.0);
		let t0 = ZoomTransform {
			x: 5.0,
			y: 7.0,
			k: 1.2,
		};
		let under = t0.invert(pointer);
		let t1 = zoom.scale_by_at(t0, 1.5, pointer);
		assert!(close(t1.apply(under), pointer));
	}

	#[test]
	fn repeated_wheel_stops_at_bounds() {
		let zoom = behavior();
		let mut t = ZoomTransform::IDENTITY;
		for _ in 0..100 {
			let f = ZoomBehavior::wheel_factor(-100.0, WheelUnit::Pixel);
			t = zoom.scale_by_at(t, f, (300.0, 300.0));
		}
		assert_eq!(t.k, 4.0);
		for _ in 0..200 {
			let f = ZoomBehavior::wheel_factor(3.0, WheelUnit::Line);
			t = zoom.scale_by_at(t, f, (10.0, 10.0));
		}
		assert_eq!(t.k, 0.5);
	}

	#[test]
	fn wheel_direction() {
		assert!(ZoomBehavior::wheel_factor(100.0, WheelUnit::Pixel) < 1.0);
		assert!(ZoomBehavior::wheel_factor(-100.0, WheelUnit::Pixel) > 1.0);
		assert_eq!(ZoomBehavior::wheel_factor(1.0, WheelUnit::Page), 0.5);
		assert_eq!(WheelUnit::from_delta_mode(1), WheelUnit::Line);
	}

	#[test]
	fn pan_translates_by_pointer_delta() {
		let zoom = behavior();
		let mut pan = PanState::default();
		assert!(pan.update(&zoom, (0.0, 0.0)).is_none());

		let start = ZoomTransform {
			x: 10.0,
			y: 10.0,
			k: 2.0,
		};
		pan.begin((100.0, 100.0), start);
		let t = pan.update(&zoom, (130.0, 90.0)).unwrap();
		assert_eq!((t.x, t.y, t.k), (40.0, 0.0, 2.0));

		pan.end();
		assert!(pan.update(&zoom, (0.0, 0.0)).is_none());
	}

	#[test]
	fn viewport_mapping_handles_letterboxing() {
		let view = (600.0, 600.0);
		// 1200x600 element: content scaled by 1, centered with 300px bars.
		let rect = ClientRect {
			left: 10.0,
			top: 20.0,
			width: 1200.0,
			height: 600.0,
		};
		assert!(close(viewport_point((310.0, 20.0), rect, view), (0.0, 0.0)));
		assert!(close(viewport_point((610.0, 320.0), rect, view), (300.0, 300.0)));

		// 300x300 element: half scale.
		let rect = ClientRect {
			left: 0.0,
			top: 0.0,
			width: 300.0,
			height: 300.0,
		};
		assert!(close(viewport_point((150.0, 75.0), rect, view), (300.0, 150.0)));
	}
}
