//! Built-in scene: the sun, earth and moon, plus venus and mars.

use crate::body::{BodyId, CelestialBody, RotationDirection};

/// Bodies of the default scene in registration order (sun, earth, moon,
/// venus, mars). Feed the result to [`OrbitalKinematics::new`](crate::OrbitalKinematics::new).
///
/// Periods are in seconds of simulation time, compressed so a full earth year
/// takes twenty seconds.
pub fn solar_system() -> Vec<CelestialBody> {
    let sun = BodyId(0);
    let earth = BodyId(1);

    vec![
        CelestialBody::new("sun", 1.0),
        CelestialBody::new("earth", 0.5)
            .with_orbit_period(Some(sun), 10.0, 20.0)
            .with_spin_period(10.0)
            .with_axial_tilt(23.5_f64.to_radians()),
        CelestialBody::new("moon", 0.25)
            .with_orbit_period(Some(earth), 2.0, 5.0)
            .tidally_locked(),
        CelestialBody::new("venus", 0.45)
            .with_orbit_period(Some(sun), 7.0, 12.0)
            .with_spin_period(40.0)
            .with_axial_tilt(2.6_f64.to_radians())
            .with_direction(RotationDirection::Retrograde),
        CelestialBody::new("mars", 0.3)
            .with_orbit_period(Some(sun), 15.0, 38.0)
            .with_spin_period(10.3)
            .with_axial_tilt(25.2_f64.to_radians()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrbitalKinematics;

    #[test]
    fn test_preset_is_valid() {
        let k = OrbitalKinematics::new(solar_system()).unwrap();
        assert_eq!(k.len(), 5);
        assert_eq!(k.find("moon"), Some(BodyId(2)));
    }

    #[test]
    fn test_earth_year_is_twenty_seconds() {
        let k = OrbitalKinematics::new(solar_system()).unwrap();
        let start = k.update(0.0);
        let year = k.update(20.0);
        let earth = BodyId(1);
        assert!(
            (start[earth].orbit_position - year[earth].orbit_position).length() < 1e-4
        );
    }
}
