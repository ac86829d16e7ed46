//! The camera controller, independent of how input reaches it.
//!
//! [`component::OrbitController`] owns the orbit state and gesture sessions. Everything else in
//! this module is the math and bookkeeping it is built from.

pub mod camera;
pub mod component;
pub mod damping;
pub mod gestures;
pub mod limits;
pub mod session;
pub mod spherical;
