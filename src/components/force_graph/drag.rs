//! Node dragging.
//!
//! A drag pins its node to the pointer and keeps the simulation warm. The
//! first gesture to start raises the alpha target; the last one to end drops
//! it back to zero so the layout can settle.

use super::simulation::Simulation;

/// Pointer id used for mouse gestures. Touch identifiers are non-negative,
/// so a mouse drag and finger drags never share an id.
pub const MOUSE: i32 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Gesture {
	pointer: i32,
	slot: usize,
}

/// In-progress drag gestures, one per pointer.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	gestures: Vec<Gesture>,
}

impl DragState {
	pub fn is_active(&self) -> bool {
		!self.gestures.is_empty()
	}

	/// Node currently held by `pointer`.
	pub fn subject(&self, pointer: i32) -> Option<usize> {
		self.gestures
			.iter()
			.find(|g| g.pointer == pointer)
			.map(|g| g.slot)
	}

	/// Starts dragging node `slot`; `at` is in scene coordinates.
	pub fn start(
		&mut self,
		simulation: &mut Simulation,
		pointer: i32,
		slot: usize,
		at: (f64, f64),
		alpha_target: f64,
	) {
		// A pointer that never saw its end event is released first.
		self.end(simulation, pointer);

		if self.gestures.is_empty() {
			simulation.set_alpha_target(alpha_target);
			simulation.restart();
		}
		self.gestures.push(Gesture { pointer, slot });
		simulation.pin(slot, at.0, at.1);
	}

	/// Moves the pinned node with the pointer. Returns whether a node moved.
	pub fn drag(&mut self, simulation: &mut Simulation, pointer: i32, at: (f64, f64)) -> bool {
		let Some(slot) = self.subject(pointer) else {
			return false;
		};
		simulation.pin(slot, at.0, at.1);
		true
	}

	/// Releases the node held by `pointer`.
	pub fn end(&mut self, simulation: &mut Simulation, pointer: i32) -> bool {
		let Some(pos) = self.gestures.iter().position(|g| g.pointer == pointer) else {
			return false;
		};
		let gesture = self.gestures.remove(pos);
		if self.gestures.is_empty() {
			simulation.set_alpha_target(0.0);
		}
		simulation.unpin(gesture.slot);
		true
	}

	/// Releases every gesture, e.g. when the window loses focus.
	pub fn cancel(&mut self, simulation: &mut Simulation) {
		while let Some(g) = self.gestures.first().copied() {
			self.end(simulation, g.pointer);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sim() -> Simulation {
		Simulation::new(
			vec!["a".into(), "b".into(), "c".into()],
			&[(0, 1), (1, 2)],
			(300.0, 300.0),
		)
	}

	#[test]
	fn start_reheats_stopped_simulation_and_pins() {
		let mut sim = sim();
		sim.stop();
		let mut drag = DragState::default();

		drag.start(&mut sim, MOUSE, 1, (50.0, 60.0), 0.3);

		assert!(sim.is_running());
		assert_eq!(sim.alpha_target(), 0.3);
		let b = sim.node(1).unwrap();
		assert_eq!((b.fx, b.fy), (Some(50.0), Some(60.0)));
		assert_eq!(drag.subject(MOUSE), Some(1));
	}

	#[test]
	fn drag_follows_pointer() {
		let mut sim = sim();
		let mut drag = DragState::default();
		drag.start(&mut sim, MOUSE, 0, (0.0, 0.0), 0.3);

		assert!(drag.drag(&mut sim, MOUSE, (10.0, -4.0)));
		sim.tick(0.016);
		let a = sim.node(0).unwrap();
		assert_eq!((a.x, a.y), (10.0, -4.0));

		assert!(!drag.drag(&mut sim, 7, (1.0, 1.0)));
	}

	#[test]
	fn end_releases_pin_and_target() {
		let mut sim = sim();
		let mut drag = DragState::default();
		drag.start(&mut sim, MOUSE, 2, (5.0, 5.0), 0.3);

		assert!(drag.end(&mut sim, MOUSE));
		assert_eq!(sim.alpha_target(), 0.0);
		assert!(!sim.node(2).unwrap().is_pinned());
		assert!(!drag.is_active());
		assert!(!drag.end(&mut sim, MOUSE));
	}

	#[test]
	fn target_held_until_last_gesture_ends() {
		let mut sim = sim();
		let mut drag = DragState::default();
		drag.start(&mut sim, 1, 0, (0.0, 0.0), 0.3);
		drag.start(&mut sim, 2, 1, (9.0, 9.0), 0.3);

		drag.end(&mut sim, 1);
		assert_eq!(sim.alpha_target(), 0.3);
		assert!(!sim.node(0).unwrap().is_pinned());
		assert!(sim.node(1).unwrap().is_pinned());

		drag.cancel(&mut sim);
		assert_eq!(sim.alpha_target(), 0.0);
		assert!(!sim.node(1).unwrap().is_pinned());
	}

	#[test]
	fn mouse_and_touch_drags_coexist() {
		let mut sim = sim();
		let mut drag = DragState::default();
		drag.start(&mut sim, MOUSE, 0, (1.0, 1.0), 0.3);
		drag.start(&mut sim, 0, 1, (2.0, 2.0), 0.3);
		assert_eq!(drag.subject(MOUSE), Some(0));
		assert_eq!(drag.subject(0), Some(1));

		assert!(drag.end(&mut sim, MOUSE));
		assert_eq!(sim.alpha_target(), 0.3);
		assert!(sim.node(1).unwrap().is_pinned());

		assert!(drag.end(&mut sim, 0));
		assert_eq!(sim.alpha_target(), 0.0);
	}
}
