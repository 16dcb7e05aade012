//! Celestial body descriptors.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// Index of a body inside an [`OrbitalKinematics`](crate::OrbitalKinematics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Sense of a body's spin about its own axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationDirection {
    /// Counter-clockwise seen from above the north pole.
    #[default]
    Prograde,
    /// Clockwise seen from above the north pole (Venus, Uranus).
    Retrograde,
}

impl RotationDirection {
    /// `1.0` for prograde, `-1.0` for retrograde.
    pub fn sign(self) -> f64 {
        match self {
            Self::Prograde => 1.0,
            Self::Retrograde => -1.0,
        }
    }
}

/// Static description of one body. Angles are radians, speeds radians per
/// second, and lengths scene units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub name: String,
    /// Body whose orbit position is this body's orbit centre.
    pub parent: Option<BodyId>,
    /// Uniform scale applied to the unit sphere.
    pub size: f64,
    pub orbit_radius: f64,
    /// Signed orbital angular speed. Positive speeds sweep from +X towards +Z,
    /// which is clockwise seen from above (+Y); negative ones run the other way.
    pub orbit_speed: f64,
    /// Spin angular speed before `rotation_direction` is applied.
    pub spin_speed: f64,
    /// Tilt of the spin axis away from +Y, about the X axis.
    pub axial_tilt: f64,
    pub rotation_direction: RotationDirection,
}

impl CelestialBody {
    /// A static body of the given size at the origin.
    pub fn new(name: impl Into<String>, size: f64) -> Self {
        Self {
            name: name.into(),
            parent: None,
            size,
            orbit_radius: 0.0,
            orbit_speed: 0.0,
            spin_speed: 0.0,
            axial_tilt: 0.0,
            rotation_direction: RotationDirection::Prograde,
        }
    }

    /// Orbit `parent` (or the origin when `None`) at `radius` with the given
    /// angular speed.
    pub fn orbiting(mut self, parent: Option<BodyId>, radius: f64, speed: f64) -> Self {
        self.parent = parent;
        self.orbit_radius = radius;
        self.orbit_speed = speed;
        self
    }

    pub fn with_spin(mut self, speed: f64) -> Self {
        self.spin_speed = speed;
        self
    }

    pub fn with_axial_tilt(mut self, radians: f64) -> Self {
        self.axial_tilt = radians;
        self
    }

    pub fn with_direction(mut self, direction: RotationDirection) -> Self {
        self.rotation_direction = direction;
        self
    }

    /// Spin once per orbit so the same face always points at the parent.
    ///
    /// The orbit sweeps +X towards +Z while a positive Y rotation turns +X
    /// towards -Z, so the lock spins with the opposite sign of the orbit.
    pub fn tidally_locked(mut self) -> Self {
        self.spin_speed = -self.orbit_speed;
        self.rotation_direction = RotationDirection::Prograde;
        self
    }

    /// Orbit with the given period in seconds. See [`period_to_speed`](Self::period_to_speed).
    pub fn with_orbit_period(self, parent: Option<BodyId>, radius: f64, period: f64) -> Self {
        self.orbiting(parent, radius, Self::period_to_speed(period))
    }

    pub fn with_spin_period(self, period: f64) -> Self {
        self.with_spin(Self::period_to_speed(period))
    }

    /// Convert a period in seconds to an angular speed.
    ///
    /// A period of zero means "no motion". A negative period gives a negative
    /// speed, i.e. motion in the opposite sense.
    pub fn period_to_speed(period: f64) -> f64 {
        if period == 0.0 { 0.0 } else { TAU / period }
    }

    /// Orbital angle at `time` seconds, unwrapped.
    pub fn orbital_angle(&self, time: f64) -> f64 {
        self.orbit_speed * time
    }

    /// Spin angle at `time` seconds, unwrapped, with the rotation direction applied.
    pub fn spin_angle(&self, time: f64) -> f64 {
        self.rotation_direction.sign() * self.spin_speed * time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_conversion() {
        assert_eq!(CelestialBody::period_to_speed(0.0), 0.0);
        assert!((CelestialBody::period_to_speed(20.0) - TAU / 20.0).abs() < 1e-15);
        assert!(CelestialBody::period_to_speed(-5.0) < 0.0);
    }

    #[test]
    fn test_retrograde_flips_spin() {
        let pro = CelestialBody::new("a", 1.0).with_spin(0.5);
        let retro = pro.clone().with_direction(RotationDirection::Retrograde);
        assert_eq!(pro.spin_angle(4.0), 2.0);
        assert_eq!(retro.spin_angle(4.0), -2.0);
    }

    #[test]
    fn test_tidal_lock_cancels_orbit() {
        let moon = CelestialBody::new("moon", 0.25)
            .with_orbit_period(Some(BodyId(1)), 2.0, 5.0)
            .with_direction(RotationDirection::Retrograde)
            .tidally_locked();
        assert_eq!(moon.rotation_direction, RotationDirection::Prograde);
        for t in [0.0, 1.3, 7.0, 250.0] {
            assert_eq!(moon.spin_angle(t), -moon.orbital_angle(t));
        }
    }

    #[test]
    fn test_body_ron_roundtrip() {
        let body = CelestialBody::new("venus", 0.45)
            .with_orbit_period(Some(BodyId(0)), 7.0, 12.0)
            .with_spin_period(40.0)
            .with_direction(RotationDirection::Retrograde);
        let text = ron::to_string(&body).unwrap();
        let back: CelestialBody = ron::from_str(&text).unwrap();
        assert_eq!(body, back);
    }
}
