#![warn(missing_docs)]

//! An orbit camera controller for bevy.
//!
//! The camera circles a target point, keeping a fixed up axis. Users can:
//!
//! - Orbit with the right mouse button, or the left button while holding a modifier key.
//! - Pan with the left mouse button, one finger, or the arrow keys.
//! - Dolly with the middle mouse button or a two finger pinch. Orthographic cameras zoom instead.
//! - Tilt with the mouse wheel, or dolly with it by setting [`WheelAction::Dolly`].
//!
//! Damping, auto-rotation, and distance, zoom, and angle limits are all configured through
//! public fields on [`OrbitController`].
//!
//! [`OrbitController`]: controller::component::OrbitController
//! [`WheelAction::Dolly`]: controller::session::WheelAction::Dolly
//!
//! # Getting Started
//!
//! Add the [`OrbitCamPlugin`], then add an [`OrbitController`] to an entity with a `Transform`
//! and a `Projection`, like a `Camera3d`:
//!
//! ```ignore
//! app.add_plugins(OrbitCamPlugin);
//! commands.spawn((
//!     Camera3d::default(),
//!     Transform::from_xyz(0.0, 2.0, 10.0),
//!     OrbitController::default(),
//! ));
//! ```
//!
//! Controller notifications are sent as [`OrbitCamEvent`]s.
//!
//! # Without the Plugin
//!
//! The controller does not depend on the ECS. Hosts with their own event loop can drive an
//! [`OrbitCamera`] directly with [`OrbitController::handle_input`] and
//! [`OrbitController::update`].
//!
//! [`OrbitCamera`]: controller::camera::OrbitCamera
//! [`OrbitController::handle_input`]: controller::component::OrbitController::handle_input
//! [`OrbitController::update`]: controller::component::OrbitController::update

pub mod controller;
pub mod plugin;

pub use plugin::{OrbitCamEvent, OrbitCamPlugin, OrbitUp};

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            camera::{CameraProjection, OrbitCamera},
            component::{OrbitController, OrbitEvent},
            damping::Damping,
            limits::OrbitLimits,
            session::{InputEvent, Modifiers, MouseBindings, OrbitKeys, Response, WheelAction},
        },
        plugin::{OrbitCamEvent, OrbitCamPlugin, OrbitUp},
    };
}
