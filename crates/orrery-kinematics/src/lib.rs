//! Stateless orbital animation for the orrery.
//!
//! Each [`CelestialBody`] moves on a circle in the XZ plane around its parent
//! (or the origin) and spins about its own tilted axis. [`OrbitalKinematics::update`]
//! maps an elapsed simulation time straight to world transforms; nothing is
//! integrated, so the same time always yields the same transforms.

mod body;
mod error;
mod kinematics;
mod preset;

pub use body::{BodyId, CelestialBody, RotationDirection};
pub use error::KinematicsError;
pub use kinematics::{BodyTransform, BodyTransforms, OrbitalKinematics};
pub use preset::solar_system;
