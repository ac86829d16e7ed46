//! The primary [`Component`] of the controller, [`OrbitController`].

use bevy_ecs::prelude::*;
use bevy_input::keyboard::KeyCode;
use bevy_input::mouse::MouseButton;
use bevy_log::prelude::*;
use bevy_math::{DQuat, DVec2, DVec3};

use super::{
    camera::{CameraProjection, OrbitCamera},
    damping::Damping,
    gestures::{self, Gesture, PendingDelta, WHEEL_TILT_STEP},
    limits::OrbitLimits,
    session::{
        InputEvent, InteractionSession, Modifiers, MouseBindings, OrbitKeys, PointerTracker,
        Response, SurfaceBinding, WheelAction,
    },
    spherical::{Spherical, UpFrame},
};

/// Squared displacement, or small-angle rotation, below which an update is not a visible change.
const CHANGE_EPSILON: f64 = 1e-6;

/// Notifications emitted by an [`OrbitController`]. Drain them with
/// [`OrbitController::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitEvent {
    /// A gesture session began.
    Start,
    /// A gesture session ended.
    End,
    /// The camera visibly moved or zoomed.
    Change,
}

/// The camera pose captured by [`OrbitController::save_state`] and restored by
/// [`OrbitController::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SavedState {
    /// Orbit target.
    pub target: DVec3,
    /// Camera position.
    pub position: DVec3,
    /// Orthographic zoom, if the camera had one.
    pub zoom: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
enum DollyDirection {
    In,
    Out,
}

/// Tracks all state of an orbit camera controller: its settings, the current gesture, and the
/// motion waiting to be applied.
///
/// # Moving the Camera
///
/// The [`OrbitCamPlugin`](crate::OrbitCamPlugin) feeds bevy input to every controller and calls
/// [`OrbitController::update`] once per frame. Without the plugin:
///
/// 1. Attach the controller to a camera with [`OrbitController::new`] or
///    [`OrbitController::attach`].
/// 2. Forward input with [`OrbitController::handle_input`].
/// 3. Call [`OrbitController::update`] every frame, and read notifications with
///    [`OrbitController::drain_events`].
/// 4. Call [`OrbitController::dispose`] when the controller is discarded.
#[derive(Debug, Clone, Component)]
pub struct OrbitController {
    /// When false, all input is ignored. Updates, auto-rotation, and damping keep running.
    pub enabled: bool,
    /// The point the camera orbits around.
    pub target: DVec3,
    /// Distance, zoom, and angle limits.
    pub limits: OrbitLimits,
    /// Inertia of rotation and pan.
    pub damping: Damping,
    /// Allow dollying (or zooming, for orthographic cameras).
    pub enable_zoom: bool,
    /// Dolly speed multiplier.
    pub zoom_speed: f64,
    /// Allow orbiting.
    pub enable_rotate: bool,
    /// Orbit speed multiplier.
    pub rotate_speed: f64,
    /// Let vertical pointer drags tilt the polar angle. Off by default, so drags only orbit
    /// around the up axis.
    pub enable_polar_drag: bool,
    /// Allow panning.
    pub enable_pan: bool,
    /// Pan speed multiplier for pointer and touch input.
    pub pan_speed: f64,
    /// Pan along the camera's local up axis instead of the ground plane.
    pub screen_space_panning: bool,
    /// Pixels panned per key press.
    pub key_pan_speed: f64,
    /// Orbit automatically while no gesture is active.
    pub auto_rotate: bool,
    /// Auto-rotation speed. `2.0` takes 30 seconds per revolution at 60 updates per second.
    pub auto_rotate_speed: f64,
    /// Allow panning with the keyboard.
    pub enable_keys: bool,
    /// The keys that pan.
    pub keys: OrbitKeys,
    /// The mouse buttons that start each gesture.
    pub mouse_buttons: MouseBindings,
    /// What the mouse wheel does.
    pub wheel_action: WheelAction,
    /// Logical size of the input surface in pixels, used to normalize drags.
    pub viewport: DVec2,
    spherical: Spherical,
    up_frame: UpFrame,
    pending: PendingDelta,
    session: InteractionSession,
    tracker: PointerTracker,
    binding: SurfaceBinding,
    saved: SavedState,
    zoom_changed: bool,
    last_position: DVec3,
    last_rotation: DQuat,
    events: Vec<OrbitEvent>,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            enabled: true,
            target: DVec3::ZERO,
            limits: Default::default(),
            damping: Default::default(),
            enable_zoom: true,
            zoom_speed: 1.0,
            enable_rotate: true,
            rotate_speed: 1.0,
            enable_polar_drag: false,
            enable_pan: true,
            pan_speed: 1.0,
            screen_space_panning: false,
            key_pan_speed: 7.0,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            enable_keys: true,
            keys: Default::default(),
            mouse_buttons: Default::default(),
            wheel_action: Default::default(),
            viewport: DVec2::ONE,
            spherical: Default::default(),
            up_frame: Default::default(),
            pending: Default::default(),
            session: Default::default(),
            tracker: Default::default(),
            binding: Default::default(),
            saved: Default::default(),
            zoom_changed: false,
            last_position: DVec3::ZERO,
            last_rotation: DQuat::IDENTITY,
            events: Vec::new(),
        }
    }
}

impl OrbitController {
    /// Create a controller with default settings, attached to `camera`.
    pub fn new(camera: &mut OrbitCamera) -> Self {
        Self::default().attached(camera)
    }

    /// Builder form of [`OrbitController::attach`].
    #[must_use = "attached returns the modified controller"]
    pub fn attached(mut self, camera: &mut OrbitCamera) -> Self {
        self.attach(camera);
        self
    }

    /// Bind the controller to `camera`: fix the orbit axis to the camera's up vector, start
    /// listening for input, snapshot the pose for [`OrbitController::reset`], and run one
    /// update.
    pub fn attach(&mut self, camera: &mut OrbitCamera) {
        self.up_frame = UpFrame::new(camera.up);
        self.binding.attach();
        self.save_state(camera);
        self.update(camera);
    }

    /// Is the controller listening for input?
    pub fn is_attached(&self) -> bool {
        !self.binding.is_empty()
    }

    /// Stop listening for input. Safe to call more than once. The controller can still be
    /// updated, so damping and auto-rotation keep running.
    pub fn dispose(&mut self) {
        let released = self.binding.release_all();
        if released > 0 {
            debug!("Orbit controller released {released} input listeners");
        }
        self.session = InteractionSession::None;
    }

    /// The current polar angle in radians, measured from the up axis.
    pub fn polar_angle(&self) -> f64 {
        self.spherical.phi
    }

    /// The current azimuthal angle in radians.
    pub fn azimuthal_angle(&self) -> f64 {
        self.spherical.theta
    }

    /// The current distance between camera and target.
    pub fn distance(&self) -> f64 {
        self.spherical.radius
    }

    /// The active gesture.
    pub fn session(&self) -> InteractionSession {
        self.session
    }

    /// Motion that has not been applied yet.
    pub fn pending(&self) -> &PendingDelta {
        &self.pending
    }

    /// The input listeners currently held.
    pub fn binding(&self) -> &SurfaceBinding {
        &self.binding
    }

    /// The pose [`OrbitController::reset`] returns to.
    pub fn saved_state(&self) -> &SavedState {
        &self.saved
    }

    /// Take all notifications emitted since the last call.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, OrbitEvent> {
        self.events.drain(..)
    }

    /// Remember the current target, camera position, and zoom.
    pub fn save_state(&mut self, camera: &OrbitCamera) {
        self.saved = SavedState {
            target: self.target,
            position: camera.position,
            zoom: camera.zoom(),
        };
    }

    /// Return to the pose captured by the last [`OrbitController::save_state`].
    pub fn reset(&mut self, camera: &mut OrbitCamera) {
        self.target = self.saved.target;
        camera.position = self.saved.position;
        if let (Some(saved), Some(CameraProjection::Orthographic { zoom, .. })) =
            (self.saved.zoom, camera.projection.as_mut())
        {
            *zoom = saved;
        }
        camera.projection_changed = true;
        self.pending.reset();
        self.emit(OrbitEvent::Change);
        self.update(camera);
        self.binding.release_drag();
        self.session = InteractionSession::None;
    }

    /// Apply all pending motion to `camera`. Call once per frame.
    ///
    /// Returns `true` if the camera visibly moved or zoomed, in which case a
    /// [`OrbitEvent::Change`] is emitted.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = self.up_frame.spherical(offset);

        if self.auto_rotate && !self.session.is_active() {
            self.apply_gesture(camera, Gesture::AutoRotate);
        }

        spherical.theta += self.pending.theta;
        spherical.phi += self.pending.phi;
        self.limits.constrain(&mut spherical);

        spherical.radius = self
            .limits
            .clamp_radius(spherical.radius * self.pending.scale);

        self.target += self.pending.pan;

        camera.position = self.target + self.up_frame.offset(&spherical);
        camera.look_at(self.target);
        self.spherical = spherical;

        self.damping.settle(&mut self.pending);

        // Small-angle approximation: cos(x/2) = 1 - x^2 / 8.
        let rotated = 8.0 * (1.0 - self.last_rotation.dot(camera.rotation).abs());
        let moved = self.last_position.distance_squared(camera.position);
        if self.zoom_changed || moved > CHANGE_EPSILON || rotated > CHANGE_EPSILON {
            self.emit(OrbitEvent::Change);
            self.last_position = camera.position;
            self.last_rotation = camera.rotation;
            self.zoom_changed = false;
            return true;
        }
        false
    }

    /// Feed one input event to the controller.
    ///
    /// Events on channels the controller isn't listening to are [`Response::Ignored`]. Mouse
    /// and touch moves update the camera immediately.
    pub fn handle_input(&mut self, camera: &mut OrbitCamera, event: &InputEvent) -> Response {
        if !self.binding.is_listening(event.channel()) {
            return Response::Ignored;
        }
        match event {
            InputEvent::PointerDown {
                button,
                position,
                modifiers,
            } => self.pointer_down(*button, *position, *modifiers),
            InputEvent::PointerMove { position } => self.pointer_move(camera, *position),
            InputEvent::PointerUp { .. } => self.pointer_up(),
            InputEvent::Wheel { delta_y } => self.wheel(camera, *delta_y),
            InputEvent::TouchStart { touches } => self.touch_start(touches),
            InputEvent::TouchMove { touches } => self.touch_move(camera, touches),
            InputEvent::TouchEnd => self.touch_end(),
            InputEvent::ContextMenu => {
                if self.enabled {
                    Response::Consumed
                } else {
                    Response::Ignored
                }
            }
            InputEvent::KeyDown { key } => self.key_down(camera, *key),
        }
    }

    /// Accumulate a gesture into the pending motion without updating the camera.
    pub fn apply_gesture(&mut self, camera: &mut OrbitCamera, gesture: Gesture) {
        match gesture {
            Gesture::Rotate(pixels) => {
                self.pending
                    .rotate_left(gestures::rotation_angle(pixels.x, self.viewport));
                if self.enable_polar_drag {
                    self.pending
                        .rotate_up(gestures::rotation_angle(pixels.y, self.viewport));
                }
            }
            Gesture::Pan(pixels) => self.pan(camera, pixels),
            Gesture::DragDolly(dy) => {
                let factor = gestures::zoom_scale(self.zoom_speed);
                if dy > 0.0 {
                    self.dolly(camera, DollyDirection::In, factor);
                } else if dy < 0.0 {
                    self.dolly(camera, DollyDirection::Out, factor);
                }
            }
            Gesture::Pinch(ratio) => {
                let factor = gestures::pinch_scale(ratio, self.zoom_speed);
                self.dolly(camera, DollyDirection::In, factor);
            }
            Gesture::WheelDolly(dy) => {
                let factor = gestures::zoom_scale(self.zoom_speed);
                if dy < 0.0 {
                    self.dolly(camera, DollyDirection::Out, factor);
                } else if dy > 0.0 {
                    self.dolly(camera, DollyDirection::In, factor);
                }
            }
            Gesture::WheelTilt(dy) => {
                if dy < 0.0 {
                    self.pending.rotate_up(-WHEEL_TILT_STEP);
                } else if dy > 0.0 {
                    self.pending.rotate_up(WHEEL_TILT_STEP);
                }
            }
            Gesture::AutoRotate => self
                .pending
                .rotate_left(gestures::auto_rotation_angle(self.auto_rotate_speed)),
        }
    }

    fn emit(&mut self, event: OrbitEvent) {
        match event {
            OrbitEvent::Start => debug!("Orbit session {:?} started", self.session),
            OrbitEvent::End => debug!("Orbit session {:?} ended", self.session),
            OrbitEvent::Change => trace!("Orbit camera changed"),
        }
        self.events.push(event);
    }

    fn pan(&mut self, camera: &OrbitCamera, pixels: DVec2) {
        let Some(projection) = camera.projection else {
            warn!("Orbit controller encountered an unknown camera projection, pan disabled.");
            self.enable_pan = false;
            return;
        };
        gestures::pan(
            &mut self.pending,
            camera,
            &projection,
            self.target,
            self.viewport,
            self.screen_space_panning,
            pixels,
        );
    }

    fn dolly(&mut self, camera: &mut OrbitCamera, direction: DollyDirection, factor: f64) {
        let Some(projection) = camera.projection.as_mut() else {
            warn!("Orbit controller encountered an unknown camera projection, dolly disabled.");
            self.enable_zoom = false;
            return;
        };
        let zoomed = match direction {
            DollyDirection::In => {
                gestures::dolly_in(&mut self.pending, projection, &self.limits, factor)
            }
            DollyDirection::Out => {
                gestures::dolly_out(&mut self.pending, projection, &self.limits, factor)
            }
        };
        if zoomed {
            camera.projection_changed = true;
            self.zoom_changed = true;
        }
    }

    fn pointer_down(
        &mut self,
        button: MouseButton,
        position: DVec2,
        modifiers: Modifiers,
    ) -> Response {
        if !self.enabled {
            return Response::Ignored;
        }
        let buttons = self.mouse_buttons;
        let next = if button == buttons.pan {
            if modifiers.any() {
                self.enable_rotate.then_some(InteractionSession::Rotate)
            } else {
                self.enable_pan.then_some(InteractionSession::Pan)
            }
        } else if button == buttons.dolly {
            self.enable_zoom.then_some(InteractionSession::Dolly)
        } else if button == buttons.rotate {
            self.enable_rotate.then_some(InteractionSession::Rotate)
        } else {
            None
        };

        if let Some(next) = next {
            self.tracker.begin_drag(position);
            self.session = next;
            self.binding.acquire_drag();
            self.emit(OrbitEvent::Start);
        }
        Response::Consumed
    }

    fn pointer_move(&mut self, camera: &mut OrbitCamera, position: DVec2) -> Response {
        // Keep tracking while disabled so re-enabling mid-drag doesn't jump.
        let delta = self.tracker.drag(position);
        if !self.enabled {
            return Response::Ignored;
        }
        let gesture = match self.session {
            InteractionSession::Rotate if self.enable_rotate => {
                Gesture::Rotate(delta * self.rotate_speed)
            }
            InteractionSession::Dolly if self.enable_zoom => Gesture::DragDolly(delta.y),
            InteractionSession::Pan if self.enable_pan => Gesture::Pan(delta * self.pan_speed),
            _ => return Response::Consumed,
        };
        self.apply_gesture(camera, gesture);
        self.update(camera);
        Response::Consumed
    }

    // Runs even while disabled, or toggling `enabled` mid-drag would leave the session open.
    fn pointer_up(&mut self) -> Response {
        self.binding.release_drag();
        self.emit(OrbitEvent::End);
        self.session = InteractionSession::None;
        Response::Consumed
    }

    fn wheel(&mut self, camera: &mut OrbitCamera, delta_y: f64) -> Response {
        let wheel_allowed = matches!(
            self.session,
            InteractionSession::None | InteractionSession::Rotate
        );
        if !self.enabled || !self.enable_zoom || !wheel_allowed {
            return Response::Ignored;
        }
        self.emit(OrbitEvent::Start);
        let gesture = match self.wheel_action {
            WheelAction::Tilt => Gesture::WheelTilt(delta_y),
            WheelAction::Dolly => Gesture::WheelDolly(delta_y),
        };
        self.apply_gesture(camera, gesture);
        self.update(camera);
        self.emit(OrbitEvent::End);
        Response::Consumed
    }

    fn touch_start(&mut self, touches: &[DVec2]) -> Response {
        if !self.enabled {
            return Response::Ignored;
        }
        if !self.enable_zoom && !self.enable_pan {
            return Response::Consumed;
        }
        self.tracker.begin_touches(touches);
        let next = match touches {
            [_] | [_, _] => InteractionSession::TouchDollyPan,
            _ => InteractionSession::None,
        };
        self.enter_touch_session(next);
        Response::Consumed
    }

    fn touch_move(&mut self, camera: &mut OrbitCamera, touches: &[DVec2]) -> Response {
        if !self.enabled || self.session != InteractionSession::TouchDollyPan {
            return Response::Ignored;
        }
        if !self.enable_zoom && !self.enable_pan {
            return Response::Consumed;
        }
        // A finger came or went without a start event; the old anchors would jump.
        if touches.len() != self.tracker.touch_count() {
            self.tracker.begin_touches(touches);
            if !matches!(touches, [_] | [_, _]) {
                self.enter_touch_session(InteractionSession::None);
            }
            return Response::Consumed;
        }
        match touches {
            [one] => {
                let delta = self.tracker.touch_drag(*one);
                if self.enable_pan {
                    self.apply_gesture(camera, Gesture::Pan(delta * self.pan_speed));
                }
            }
            [a, b] => {
                let ratio = self.tracker.pinch(*a, *b);
                if self.enable_zoom {
                    if let Some(ratio) = ratio {
                        self.apply_gesture(camera, Gesture::Pinch(ratio));
                    }
                }
            }
            _ => return Response::Consumed,
        }
        self.update(camera);
        Response::Consumed
    }

    // Ends a touch session even while disabled, like `pointer_up`.
    fn touch_end(&mut self) -> Response {
        if self.session != InteractionSession::TouchDollyPan {
            return if self.enabled {
                Response::Consumed
            } else {
                Response::Ignored
            };
        }
        self.tracker.begin_touches(&[]);
        self.enter_touch_session(InteractionSession::None);
        Response::Consumed
    }

    /// Switch sessions from a touch event, emitting [`OrbitEvent::Start`] or
    /// [`OrbitEvent::End`] only when a gesture actually begins or finishes.
    fn enter_touch_session(&mut self, next: InteractionSession) {
        let was_active = self.session.is_active();
        if was_active && !next.is_active() {
            self.emit(OrbitEvent::End);
        }
        self.session = next;
        if !was_active && next.is_active() {
            self.emit(OrbitEvent::Start);
        }
    }

    fn key_down(&mut self, camera: &mut OrbitCamera, key: KeyCode) -> Response {
        if !self.enabled || !self.enable_keys || !self.enable_pan {
            return Response::Ignored;
        }
        let speed = self.key_pan_speed;
        let pixels = if key == self.keys.up {
            DVec2::new(0.0, speed)
        } else if key == self.keys.bottom {
            DVec2::new(0.0, -speed)
        } else if key == self.keys.left {
            DVec2::new(speed, 0.0)
        } else if key == self.keys.right {
            DVec2::new(-speed, 0.0)
        } else {
            return Response::Ignored;
        };
        self.apply_gesture(camera, Gesture::Pan(pixels));
        self.update(camera);
        Response::Consumed
    }
}
