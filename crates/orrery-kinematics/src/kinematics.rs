//! Time to transform mapping for a set of bodies.

use std::f64::consts::TAU;
use std::ops::Index;

use glam::{DVec3, Mat4, Vec3};

use crate::body::{BodyId, CelestialBody};
use crate::error::KinematicsError;

/// World-space state of one body at a given time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    /// Parent's orbit position, or the origin for root bodies.
    pub orbit_center: Vec3,
    /// Body centre in world space.
    pub orbit_position: Vec3,
    /// Unwrapped orbital angle in radians.
    pub orbital_angle: f64,
    /// Unwrapped spin angle in radians, direction applied.
    pub spin_angle: f64,
    /// `T(orbit_position) * Rx(tilt) * Ry(spin) * S(size)`.
    pub model: Mat4,
}

/// Transforms for every body, indexed by [`BodyId`].
#[derive(Debug, Clone, PartialEq)]
pub struct BodyTransforms {
    time: f64,
    transforms: Vec<BodyTransform>,
}

impl BodyTransforms {
    /// Simulation time these transforms were computed for.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn get(&self, id: BodyId) -> Option<&BodyTransform> {
        self.transforms.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &BodyTransform)> {
        self.transforms
            .iter()
            .enumerate()
            .map(|(i, t)| (BodyId(i), t))
    }
}

impl Index<BodyId> for BodyTransforms {
    type Output = BodyTransform;

    fn index(&self, id: BodyId) -> &BodyTransform {
        &self.transforms[id.0]
    }
}

/// Validated list of bodies, parents before children.
#[derive(Debug, Clone, Default)]
pub struct OrbitalKinematics {
    bodies: Vec<CelestialBody>,
}

impl OrbitalKinematics {
    /// Register every body in order, failing on the first invalid one.
    pub fn new(bodies: impl IntoIterator<Item = CelestialBody>) -> Result<Self, KinematicsError> {
        let mut kinematics = Self::default();
        for body in bodies {
            kinematics.add_body(body)?;
        }
        Ok(kinematics)
    }

    /// Validate and append a body. Its parent must already be registered.
    pub fn add_body(&mut self, body: CelestialBody) -> Result<BodyId, KinematicsError> {
        self.validate(&body)?;
        let id = BodyId(self.bodies.len());
        log::debug!(
            "registered body '{}' as #{} (parent {:?}, radius {}, size {})",
            body.name,
            id.0,
            body.parent,
            body.orbit_radius,
            body.size
        );
        self.bodies.push(body);
        Ok(id)
    }

    fn validate(&self, body: &CelestialBody) -> Result<(), KinematicsError> {
        let invalid = |reason: &str| KinematicsError::InvalidParameter {
            body: body.name.clone(),
            reason: reason.to_string(),
        };

        if body.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if !body.size.is_finite() || body.size <= 0.0 {
            return Err(invalid("size must be finite and positive"));
        }
        if !body.orbit_radius.is_finite() || body.orbit_radius < 0.0 {
            return Err(invalid("orbit radius must be finite and non-negative"));
        }
        if !body.orbit_speed.is_finite() || !body.spin_speed.is_finite() {
            return Err(invalid("angular speeds must be finite"));
        }
        if !body.axial_tilt.is_finite() {
            return Err(invalid("axial tilt must be finite"));
        }
        if let Some(parent) = body.parent
            && parent.0 >= self.bodies.len()
        {
            return Err(KinematicsError::UnknownParent {
                body: body.name.clone(),
                parent: parent.0,
            });
        }
        if self.bodies.iter().any(|b| b.name == body.name) {
            return Err(KinematicsError::DuplicateName(body.name.clone()));
        }
        Ok(())
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&CelestialBody> {
        self.bodies.get(id.0)
    }

    /// Look a body up by name.
    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.bodies.iter().position(|b| b.name == name).map(BodyId)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Ids of bodies orbiting `parent` directly.
    pub fn children(&self, parent: BodyId) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies
            .iter()
            .enumerate()
            .filter(move |(_, b)| b.parent == Some(parent))
            .map(|(i, _)| BodyId(i))
    }

    /// Compute every body's transform at `time` seconds.
    ///
    /// Pure: depends only on `time` and the registered bodies. A single
    /// forward pass suffices because parents precede their children.
    ///
    /// Any finite `time` yields finite transforms. Once `speed * time`
    /// overflows `f64` the phase is meaningless, and such an angle is treated
    /// as zero for the matrices; the unwrapped angles report the overflow.
    pub fn update(&self, time: f64) -> BodyTransforms {
        let mut positions: Vec<DVec3> = Vec::with_capacity(self.bodies.len());
        let mut transforms = Vec::with_capacity(self.bodies.len());

        for body in &self.bodies {
            let center = body.parent.map_or(DVec3::ZERO, |p| positions[p.0]);
            let orbital_angle = body.orbital_angle(time);
            let spin_angle = body.spin_angle(time);

            // Reduce before trigonometry so long runs keep full precision.
            let (sin_a, cos_a) = reduce_angle(orbital_angle).sin_cos();
            let position = center + body.orbit_radius * DVec3::new(cos_a, 0.0, sin_a);

            let model = Mat4::from_translation(position.as_vec3())
                * Mat4::from_rotation_x(body.axial_tilt as f32)
                * Mat4::from_rotation_y(reduce_angle(spin_angle) as f32)
                * Mat4::from_scale(Vec3::splat(body.size as f32));

            positions.push(position);
            transforms.push(BodyTransform {
                orbit_center: center.as_vec3(),
                orbit_position: position.as_vec3(),
                orbital_angle,
                spin_angle,
                model,
            });
        }

        BodyTransforms { time, transforms }
    }
}

/// Map an unwrapped angle into `[0, TAU)`; overflowed angles map to zero.
fn reduce_angle(angle: f64) -> f64 {
    if angle.is_finite() {
        angle.rem_euclid(TAU)
    } else {
        0.0
    }
}
