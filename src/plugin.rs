//! Connects [`OrbitController`]s to bevy's input events, transforms, and projections.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::{
    keyboard::{KeyCode, KeyboardInput},
    mouse::{MouseButtonInput, MouseWheel},
    touch::{TouchInput, TouchPhase, Touches},
    ButtonInput, ButtonState, InputSystem,
};
use bevy_log::prelude::*;
use bevy_math::{DVec2, Vec3};
use bevy_reflect::prelude::*;
use bevy_render::camera::Projection;
use bevy_transform::{components::Transform, TransformSystem};
use bevy_window::{CursorMoved, RequestRedraw, Window};

use crate::controller::{
    camera::OrbitCamera,
    component::{OrbitController, OrbitEvent},
    damping::Damping,
    limits::OrbitLimits,
    session::{InputEvent, InteractionSession, Modifiers, MouseBindings, OrbitKeys, WheelAction},
};

/// Adds [`OrbitController`] functionality to the app.
pub struct OrbitCamPlugin;

impl Plugin for OrbitCamPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<OrbitCamEvent>()
            .add_event::<RequestRedraw>()
            .add_systems(
                PreUpdate,
                (attach_controllers, forward_inputs)
                    .chain()
                    .after(InputSystem),
            )
            .add_systems(
                PostUpdate,
                tick_controllers.before(TransformSystem::TransformPropagate),
            )
            .register_type::<OrbitUp>()
            .register_type::<OrbitLimits>()
            .register_type::<Damping>()
            .register_type::<MouseBindings>()
            .register_type::<OrbitKeys>()
            .register_type::<WheelAction>()
            .register_type::<InteractionSession>();
    }
}

/// Optional. The axis an [`OrbitController`] orbits around. Cameras without this component orbit
/// around +Y.
///
/// Read when the controller is attached; changing it later only affects which way the camera's
/// local up points.
#[derive(Debug, Clone, Copy, PartialEq, Component, Reflect)]
#[reflect(Component)]
pub struct OrbitUp(pub Vec3);

impl Default for OrbitUp {
    fn default() -> Self {
        Self(Vec3::Y)
    }
}

/// Sent for every [`OrbitEvent`] a controller emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct OrbitCamEvent {
    /// The camera entity whose controller emitted the event.
    pub camera: Entity,
    /// What happened.
    pub kind: OrbitEvent,
}

fn orbit_camera(
    transform: &Transform,
    projection: &Projection,
    up: Option<&OrbitUp>,
) -> OrbitCamera {
    let up = up.copied().unwrap_or_default().0;
    OrbitCamera::from_transform(transform, projection, up)
}

/// Attach newly added controllers to their camera.
pub fn attach_controllers(
    mut cameras: Query<
        (
            Entity,
            &mut OrbitController,
            &mut Transform,
            &mut Projection,
            Option<&OrbitUp>,
        ),
        Added<OrbitController>,
    >,
) {
    for (entity, mut controller, mut transform, mut projection, up) in &mut cameras {
        if let Err(errors) = controller.limits.validate() {
            for error in errors {
                warn!("Orbit camera {entity} has invalid limits: {error}");
            }
        }
        if controller.is_attached() {
            continue;
        }
        if matches!(*projection, Projection::Custom(_)) {
            warn_once!(
                "Orbit camera {entity} has a custom projection, pan and dolly will be disabled."
            );
        }
        let mut camera = orbit_camera(&transform, &projection, up);
        controller.attach(&mut camera);
        camera.write_to(&mut transform, &mut projection);
        debug!("Attached orbit controller to {entity}");
    }
}

fn modifiers(keys: &ButtonInput<KeyCode>) -> Modifiers {
    Modifiers {
        ctrl: keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
        shift: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        meta: keys.any_pressed([KeyCode::SuperLeft, KeyCode::SuperRight]),
    }
}

/// Translate this frame's window input into [`InputEvent`]s and hand them to every attached
/// controller.
///
/// Bevy delivers each kind of input in its own queue, so ordering within a frame is approximate:
/// cursor motion comes first, then presses, releases, wheel, touch, and keys. Presses anchor at
/// the latest cursor position.
#[allow(clippy::too_many_arguments)]
pub fn forward_inputs(
    mut buttons: EventReader<MouseButtonInput>,
    mut cursor: EventReader<CursorMoved>,
    mut wheel: EventReader<MouseWheel>,
    mut touch: EventReader<TouchInput>,
    mut keyboard: EventReader<KeyboardInput>,
    keys: Res<ButtonInput<KeyCode>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    mut cameras: Query<(
        &mut OrbitController,
        &mut Transform,
        &mut Projection,
        Option<&OrbitUp>,
    )>,
    mut last_cursor: Local<DVec2>,
) {
    let mut inputs: Vec<(Entity, InputEvent)> = Vec::new();
    let modifiers = modifiers(&keys);

    for moved in cursor.read() {
        *last_cursor = moved.position.as_dvec2();
        inputs.push((
            moved.window,
            InputEvent::PointerMove {
                position: *last_cursor,
            },
        ));
    }
    let clicks: Vec<MouseButtonInput> = buttons.read().cloned().collect();
    for press in clicks.iter().filter(|b| b.state == ButtonState::Pressed) {
        inputs.push((
            press.window,
            InputEvent::PointerDown {
                button: press.button,
                position: *last_cursor,
                modifiers,
            },
        ));
    }
    for release in clicks.iter().filter(|b| b.state == ButtonState::Released) {
        inputs.push((
            release.window,
            InputEvent::PointerUp {
                button: release.button,
            },
        ));
    }
    for scroll in wheel.read() {
        // Winit reports scrolling away from the user as positive.
        inputs.push((
            scroll.window,
            InputEvent::Wheel {
                delta_y: -scroll.y as f64,
            },
        ));
    }
    for event in touch.read() {
        let active = || -> Vec<DVec2> {
            touches
                .iter()
                .map(|touch| touch.position().as_dvec2())
                .collect()
        };
        let input = match event.phase {
            TouchPhase::Started => InputEvent::TouchStart { touches: active() },
            TouchPhase::Moved => InputEvent::TouchMove { touches: active() },
            TouchPhase::Ended | TouchPhase::Canceled => InputEvent::TouchEnd,
        };
        inputs.push((event.window, input));
    }
    for key in keyboard.read() {
        if key.state == ButtonState::Pressed {
            inputs.push((key.window, InputEvent::KeyDown { key: key.key_code }));
        }
    }

    if inputs.is_empty() {
        return;
    }

    for (mut controller, mut transform, mut projection, up) in &mut cameras {
        if !controller.is_attached() {
            continue;
        }
        let mut camera = orbit_camera(&transform, &projection, up);
        for (window, input) in &inputs {
            if let Ok(window) = windows.get(*window) {
                controller.viewport = DVec2::new(window.width() as f64, window.height() as f64);
            }
            let response = controller.handle_input(&mut camera, input);
            trace!("Orbit controller {response:?} {input:?}");
        }
        camera.write_to(&mut transform, &mut projection);
    }
}

/// Advance every controller by one frame, write the result back to the camera, and send the
/// controller's notifications as [`OrbitCamEvent`]s.
pub fn tick_controllers(
    mut cameras: Query<(
        Entity,
        &mut OrbitController,
        &mut Transform,
        &mut Projection,
        Option<&OrbitUp>,
    )>,
    mut events: EventWriter<OrbitCamEvent>,
    mut redraw: EventWriter<RequestRedraw>,
) {
    for (entity, mut controller, mut transform, mut projection, up) in &mut cameras {
        let mut camera = orbit_camera(&transform, &projection, up);
        if controller.update(&mut camera) {
            camera.write_to(&mut transform, &mut projection);
        }

        let mut changed = false;
        for kind in controller.drain_events() {
            changed |= kind == OrbitEvent::Change;
            events.write(OrbitCamEvent {
                camera: entity,
                kind,
            });
        }
        if changed {
            redraw.write(RequestRedraw);
        }
    }
}
