//! Scene context: the kinematics, how each body looks, and the transforms of
//! the latest update.

use std::path::PathBuf;

use glam::Vec3;
use orrery_config::{BodyConfig, SceneConfig};
use orrery_kinematics::{
    BodyId, BodyTransforms, CelestialBody, KinematicsError, OrbitalKinematics, RotationDirection,
};
use orrery_mesh::MeshError;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// A body names a parent that is missing or listed after it.
    #[error("body '{body}' orbits '{parent}', which is not listed before it")]
    UnknownParent { body: String, parent: String },

    #[error("scene transforms requested before the first update")]
    NotInitialized,
}

/// Per-body material inputs for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyAppearance {
    pub color: [f32; 3],
    /// Albedo texture, relative to the configured texture directory.
    pub texture: Option<PathBuf>,
    pub emissive: bool,
}

#[derive(Debug)]
pub struct Scene {
    kinematics: OrbitalKinematics,
    appearances: Vec<BodyAppearance>,
    transforms: Option<BodyTransforms>,
}

impl Scene {
    /// Resolve parent names and validate every body of `config`.
    pub fn from_config(config: &SceneConfig) -> Result<Self, SceneError> {
        let mut kinematics = OrbitalKinematics::default();
        let mut appearances = Vec::with_capacity(config.bodies.len());

        for body in &config.bodies {
            let parent = match body.parent.as_deref() {
                None => None,
                Some(name) => Some(kinematics.find(name).ok_or_else(|| {
                    SceneError::UnknownParent {
                        body: body.name.clone(),
                        parent: name.to_string(),
                    }
                })?),
            };
            let id = kinematics.add_body(celestial_body(body, parent))?;
            debug!("Registered body '{}' as #{}", body.name, id.index());

            appearances.push(BodyAppearance {
                color: body.color,
                texture: body.texture.clone(),
                emissive: body.emissive,
            });
        }

        info!("Scene ready with {} bodies", kinematics.len());
        Ok(Self {
            kinematics,
            appearances,
            transforms: None,
        })
    }

    /// Recompute every transform for simulation time `time`.
    pub fn update(&mut self, time: f64) -> &BodyTransforms {
        self.transforms.insert(self.kinematics.update(time))
    }

    /// Transforms of the most recent [`update`](Self::update).
    pub fn transforms(&self) -> Result<&BodyTransforms, SceneError> {
        self.transforms.as_ref().ok_or(SceneError::NotInitialized)
    }

    pub fn kinematics(&self) -> &OrbitalKinematics {
        &self.kinematics
    }

    pub fn appearances(&self) -> &[BodyAppearance] {
        &self.appearances
    }

    pub fn appearance(&self, id: BodyId) -> Option<&BodyAppearance> {
        self.appearances.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.appearances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appearances.is_empty()
    }

    /// Position of the first emissive body at the latest update, or the
    /// origin when there is none.
    pub fn light_position(&self) -> Vec3 {
        let Some(transforms) = &self.transforms else {
            return Vec3::ZERO;
        };
        self.appearances
            .iter()
            .position(|a| a.emissive)
            .and_then(|i| transforms.get(BodyId(i)))
            .map_or(Vec3::ZERO, |t| t.orbit_position)
    }
}

/// Convert periods and degrees of a config entry into kinematic parameters.
fn celestial_body(config: &BodyConfig, parent: Option<BodyId>) -> CelestialBody {
    let body = CelestialBody::new(config.name.clone(), config.size)
        .with_orbit_period(parent, config.orbit_radius, config.orbit_period)
        .with_axial_tilt(config.axial_tilt_deg.to_radians());

    if config.tidally_locked {
        return body.tidally_locked();
    }
    let direction = if config.retrograde {
        RotationDirection::Retrograde
    } else {
        RotationDirection::Prograde
    };
    body.with_spin_period(config.spin_period)
        .with_direction(direction)
}
