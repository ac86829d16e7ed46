//! Gesture sessions, the abstract input events that drive them, and input bindings.

use bevy_input::{keyboard::KeyCode, mouse::MouseButton};
use bevy_math::DVec2;
use bevy_platform::collections::HashSet;
use bevy_reflect::Reflect;

/// The gesture currently being performed. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum InteractionSession {
    /// No gesture; auto-rotation may run.
    #[default]
    None,
    /// Orbiting with a pointer.
    Rotate,
    /// Dollying with a vertical pointer drag.
    Dolly,
    /// Panning with a pointer.
    Pan,
    /// One finger pans, two fingers pinch to dolly.
    TouchDollyPan,
}

impl InteractionSession {
    /// Is a gesture in progress?
    pub fn is_active(&self) -> bool {
        *self != InteractionSession::None
    }
}

/// Modifier keys held when a pointer button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Either control key.
    pub ctrl: bool,
    /// Either shift key.
    pub shift: bool,
    /// Either super/command key.
    pub meta: bool,
}

impl Modifiers {
    /// Is any modifier held?
    pub fn any(&self) -> bool {
        self.ctrl || self.shift || self.meta
    }
}

/// Input as seen by the controller, after the host has normalized native events.
///
/// Positions are logical pixels with the origin at the top left of the input surface.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A mouse button was pressed over the input surface.
    PointerDown {
        /// The button that was pressed.
        button: MouseButton,
        /// Cursor position.
        position: DVec2,
        /// Modifier keys held at the time.
        modifiers: Modifiers,
    },
    /// The cursor moved.
    PointerMove {
        /// Cursor position.
        position: DVec2,
    },
    /// A mouse button was released.
    PointerUp {
        /// The button that was released.
        button: MouseButton,
    },
    /// One wheel step. Negative values scroll away from the user.
    Wheel {
        /// Vertical scroll amount.
        delta_y: f64,
    },
    /// A finger touched the surface; `touches` holds every active touch point.
    TouchStart {
        /// Active touch points.
        touches: Vec<DVec2>,
    },
    /// A finger moved; `touches` holds every active touch point.
    TouchMove {
        /// Active touch points.
        touches: Vec<DVec2>,
    },
    /// A finger was lifted or the touch was cancelled.
    TouchEnd,
    /// The host is about to open a context menu over the surface.
    ContextMenu,
    /// A key was pressed (or auto-repeated).
    KeyDown {
        /// The key.
        key: KeyCode,
    },
}

impl InputEvent {
    /// The listener channel this event is delivered on.
    pub fn channel(&self) -> InputChannel {
        match self {
            InputEvent::PointerDown { .. } => InputChannel::PointerDown,
            InputEvent::PointerMove { .. } => InputChannel::PointerMove,
            InputEvent::PointerUp { .. } => InputChannel::PointerUp,
            InputEvent::Wheel { .. } => InputChannel::Wheel,
            InputEvent::TouchStart { .. } => InputChannel::TouchStart,
            InputEvent::TouchMove { .. } => InputChannel::TouchMove,
            InputEvent::TouchEnd => InputChannel::TouchEnd,
            InputEvent::ContextMenu => InputChannel::ContextMenu,
            InputEvent::KeyDown { .. } => InputChannel::KeyDown,
        }
    }
}

/// What the host should do with the native event after the controller has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// The controller did not use the event.
    Ignored,
    /// The controller used the event; the host should suppress its default action.
    Consumed,
}

impl Response {
    /// Did the controller use the event?
    pub fn is_consumed(&self) -> bool {
        *self == Response::Consumed
    }
}

/// A kind of input the controller listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputChannel {
    /// Context menu requests on the surface.
    ContextMenu,
    /// Button presses on the surface.
    PointerDown,
    /// Cursor motion anywhere, only while a mouse gesture is active.
    PointerMove,
    /// Button releases anywhere, only while a mouse gesture is active.
    PointerUp,
    /// Wheel steps on the surface.
    Wheel,
    /// Touch starts on the surface.
    TouchStart,
    /// Touch moves on the surface.
    TouchMove,
    /// Touch ends on the surface.
    TouchEnd,
    /// Key presses anywhere.
    KeyDown,
}

/// The listener channels a controller currently holds.
///
/// Surface channels are acquired once when the controller is attached. Drag channels are
/// acquired when a mouse gesture starts and released when it ends, so cursor motion outside a
/// gesture never reaches the controller. [`SurfaceBinding::release_all`] gives everything back.
#[derive(Debug, Clone, Default)]
pub struct SurfaceBinding {
    channels: HashSet<InputChannel>,
}

impl SurfaceBinding {
    /// Channels held for the controller's whole lifetime.
    pub const SURFACE: [InputChannel; 7] = [
        InputChannel::ContextMenu,
        InputChannel::PointerDown,
        InputChannel::Wheel,
        InputChannel::TouchStart,
        InputChannel::TouchEnd,
        InputChannel::TouchMove,
        InputChannel::KeyDown,
    ];

    /// Channels held only during a mouse gesture.
    pub const DRAG: [InputChannel; 2] = [InputChannel::PointerMove, InputChannel::PointerUp];

    /// Acquire the surface channels.
    pub fn attach(&mut self) {
        self.channels.extend(Self::SURFACE);
    }

    /// Acquire the drag channels.
    pub fn acquire_drag(&mut self) {
        self.channels.extend(Self::DRAG);
    }

    /// Release the drag channels.
    pub fn release_drag(&mut self) {
        for channel in Self::DRAG {
            self.channels.remove(&channel);
        }
    }

    /// Release every channel, returning how many were held.
    pub fn release_all(&mut self) -> usize {
        let released = self.channels.len();
        self.channels.clear();
        released
    }

    /// Is the controller listening on `channel`?
    pub fn is_listening(&self, channel: InputChannel) -> bool {
        self.channels.contains(&channel)
    }

    /// Number of channels held.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Are no channels held?
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Which mouse button starts which gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct MouseBindings {
    /// Starts a pan, or an orbit if a modifier key is held.
    pub pan: MouseButton,
    /// Starts a dolly.
    pub dolly: MouseButton,
    /// Starts an orbit.
    pub rotate: MouseButton,
}

impl Default for MouseBindings {
    fn default() -> Self {
        Self {
            pan: MouseButton::Left,
            dolly: MouseButton::Middle,
            rotate: MouseButton::Right,
        }
    }
}

/// The four keys that pan the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct OrbitKeys {
    /// Pans the view left.
    pub left: KeyCode,
    /// Pans the view up.
    pub up: KeyCode,
    /// Pans the view right.
    pub right: KeyCode,
    /// Pans the view down.
    pub bottom: KeyCode,
}

impl Default for OrbitKeys {
    fn default() -> Self {
        Self {
            left: KeyCode::ArrowLeft,
            up: KeyCode::ArrowUp,
            right: KeyCode::ArrowRight,
            bottom: KeyCode::ArrowDown,
        }
    }
}

/// What a wheel step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum WheelAction {
    /// Tilt the camera's polar angle one degree per step.
    #[default]
    Tilt,
    /// Dolly toward or away from the target.
    Dolly,
}

/// Remembers where the last pointer and touch events were, turning absolute positions into
/// deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerTracker {
    pointer: DVec2,
    touch: DVec2,
    pinch_distance: f64,
    touch_count: usize,
}

impl PointerTracker {
    /// Start tracking a mouse drag.
    pub fn begin_drag(&mut self, position: DVec2) {
        self.pointer = position;
    }

    /// The movement since the last call, in pixels.
    pub fn drag(&mut self, position: DVec2) -> DVec2 {
        let delta = position - self.pointer;
        self.pointer = position;
        delta
    }

    /// Start tracking a single-finger drag.
    pub fn begin_touch(&mut self, position: DVec2) {
        self.touch = position;
    }

    /// The single-finger movement since the last call, in pixels.
    pub fn touch_drag(&mut self, position: DVec2) -> DVec2 {
        let delta = position - self.touch;
        self.touch = position;
        delta
    }

    /// Start tracking a pinch between two fingers.
    pub fn begin_pinch(&mut self, a: DVec2, b: DVec2) {
        self.pinch_distance = a.distance(b);
    }

    /// Re-anchor on the given touch points: one finger drags, two fingers pinch.
    pub fn begin_touches(&mut self, touches: &[DVec2]) {
        self.touch_count = touches.len();
        match touches {
            [one] => self.begin_touch(*one),
            [a, b] => self.begin_pinch(*a, *b),
            _ => {}
        }
    }

    /// How many touch points the anchors were taken from.
    pub fn touch_count(&self) -> usize {
        self.touch_count
    }

    /// The ratio between the current and previous finger distance. `None` when either distance
    /// is zero, since the fingers have met and there is no scale to apply.
    pub fn pinch(&mut self, a: DVec2, b: DVec2) -> Option<f64> {
        let distance = a.distance(b);
        let previous = std::mem::replace(&mut self.pinch_distance, distance);
        let ratio = distance / previous;
        (ratio > 0.0 && ratio.is_finite()).then_some(ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_channels_come_and_go() {
        let mut binding = SurfaceBinding::default();
        assert!(binding.is_empty());

        binding.attach();
        assert_eq!(binding.len(), 7);
        assert!(!binding.is_listening(InputChannel::PointerMove));

        binding.acquire_drag();
        assert!(binding.is_listening(InputChannel::PointerMove));
        assert!(binding.is_listening(InputChannel::PointerUp));
        assert_eq!(binding.len(), 9);

        binding.release_drag();
        assert_eq!(binding.len(), 7);
        assert!(binding.is_listening(InputChannel::KeyDown));

        assert_eq!(binding.release_all(), 7);
        assert_eq!(binding.release_all(), 0);
    }

    #[test]
    fn every_event_has_a_channel() {
        let event = InputEvent::TouchMove { touches: vec![] };
        assert_eq!(event.channel(), InputChannel::TouchMove);
        assert_eq!(InputEvent::TouchEnd.channel(), InputChannel::TouchEnd);
        assert_eq!(
            InputEvent::PointerUp {
                button: MouseButton::Left
            }
            .channel(),
            InputChannel::PointerUp
        );
    }

    #[test]
    fn tracker_produces_deltas() {
        let mut tracker = PointerTracker::default();
        tracker.begin_drag(DVec2::new(10.0, 10.0));
        assert_eq!(tracker.drag(DVec2::new(15.0, 7.0)), DVec2::new(5.0, -3.0));
        assert_eq!(tracker.drag(DVec2::new(15.0, 7.0)), DVec2::ZERO);

        tracker.begin_pinch(DVec2::ZERO, DVec2::new(100.0, 0.0));
        assert_eq!(tracker.pinch(DVec2::ZERO, DVec2::new(0.0, 150.0)), Some(1.5));
    }

    #[test]
    fn pinch_from_zero_distance_is_skipped() {
        let mut tracker = PointerTracker::default();
        tracker.begin_pinch(DVec2::ONE, DVec2::ONE);
        assert_eq!(tracker.pinch(DVec2::ZERO, DVec2::X), None);
        assert_eq!(tracker.pinch(DVec2::ZERO, DVec2::new(2.0, 0.0)), Some(2.0));
    }

    #[test]
    fn begin_touches_anchors_by_count() {
        let mut tracker = PointerTracker::default();
        tracker.begin_touches(&[DVec2::ZERO, DVec2::new(0.0, 40.0)]);
        assert_eq!(tracker.touch_count(), 2);
        assert_eq!(tracker.pinch(DVec2::ZERO, DVec2::new(0.0, 80.0)), Some(2.0));

        tracker.begin_touches(&[DVec2::new(5.0, 5.0)]);
        assert_eq!(tracker.touch_count(), 1);
        assert_eq!(tracker.touch_drag(DVec2::new(6.0, 5.0)), DVec2::X);

        tracker.begin_touches(&[]);
        assert_eq!(tracker.touch_count(), 0);
    }

    #[test]
    fn pinch_to_a_single_point_is_skipped() {
        let mut tracker = PointerTracker::default();
        tracker.begin_pinch(DVec2::ZERO, DVec2::new(100.0, 0.0));
        assert_eq!(tracker.pinch(DVec2::ZERO, DVec2::ZERO), None);
        // Spreading again from a single point has no previous distance either.
        assert_eq!(tracker.pinch(DVec2::ZERO, DVec2::new(50.0, 0.0)), None);
        assert_eq!(tracker.pinch(DVec2::ZERO, DVec2::new(100.0, 0.0)), Some(2.0));
    }
}
