use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

use crate::{
    constants::{EARTH_MASS, EARTH_RADIUS, G, MOON_MASS, MOON_RADIUS},
    sim::Body,
};

/// Average distance between earth and the sun, in kilometers
const AU_KM: f64 = 1.495e8;
const SUN_MASS: f64 = 333000.0 * EARTH_MASS;
const SUN_RADIUS: f64 = 696340.0;

#[allow(clippy::excessive_precision)] // Copy-pasted from online sources
pub fn earth_moon() -> Vec<Body> {
    vec![
        Body {
            mass: EARTH_MASS,
            radius: EARTH_RADIUS,
            pos: (0.0, 0.0, 0.0).into(),
            vel: (0.0, 0.0, 0.0).into(),
        },
        Body {
            mass: MOON_MASS,
            radius: MOON_RADIUS,
            pos: (
                -2.675244393757571e4,
                -3.991567778823322e5,
                3.408771797387548e4,
            )
                .into(),
            vel: (
                9.735210145581824e-1,
                -3.777496830110240e-2,
                -3.756741770019315e-2,
            )
                .into(),
        },
    ]
}

/// A sun at the origin followed by `n_objects - 1` light bodies on roughly circular orbits
/// around it, scattered through a thick disk.
pub fn orbiting_cloud(n_objects: usize) -> Vec<Body> {
    let mut objs = Vec::new();
    if n_objects == 0 {
        return objs;
    }

    let center = Point3::new(0.0, 0.0, 0.0);
    objs.push(Body {
        mass: SUN_MASS,
        radius: SUN_RADIUS,
        pos: center,
        vel: Vector3::new(0.0, 0.0, 0.0),
    });

    let rotate_around = Vector3::new(0.0, 0.0, 1.0);
    for _ in 1..n_objects {
        let angle = rand::random_range(0.0..std::f64::consts::TAU);
        let dist = rand::random_range(0.4..5.0) * AU_KM;
        let height = rand::random_range(-0.05..0.05) * dist;
        let pos = Point3::new(dist * angle.cos(), dist * angle.sin(), height);

        let radius = (pos - center).magnitude();
        let norm_pos = (pos - center).normalize();
        let vel_basis = (G * SUN_MASS / radius).sqrt();
        let vel = rotate_around.cross(norm_pos).normalize() * vel_basis;

        objs.push(Body {
            mass: rand::random_range(1e18..1e25),
            radius: rand::random_range(1e2..1e4),
            pos,
            vel,
        });
    }

    objs
}

/// Sum of the momenta of all bodies.
pub fn total_momentum(bodies: &[Body]) -> Vector3<f64> {
    bodies
        .iter()
        .fold(Vector3::new(0.0, 0.0, 0.0), |acc, b| acc + b.vel * b.mass)
}

/// Mass-weighted mean position.
pub fn barycenter(bodies: &[Body]) -> Point3<f64> {
    let total_mass: f64 = bodies.iter().map(|b| b.mass).sum();
    let weighted = bodies
        .iter()
        .fold(Vector3::new(0.0, 0.0, 0.0), |acc, b| acc + b.pos.to_vec() * b.mass);
    Point3::from_vec(weighted / total_mass)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_has_requested_size_and_bound_orbits() {
        let cloud = orbiting_cloud(50);
        assert_eq!(cloud.len(), 50);
        for obj in &cloud[1..] {
            let r = obj.pos.to_vec().magnitude();
            let escape = (2.0 * G * SUN_MASS / r).sqrt();
            assert!(obj.vel.magnitude() < escape);
            assert!(obj.vel.dot(obj.pos.to_vec()).abs() < 1e-6 * r * obj.vel.magnitude());
        }
    }

    #[test]
    fn empty_and_single_clouds() {
        assert!(orbiting_cloud(0).is_empty());
        let one = orbiting_cloud(1);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].mass, SUN_MASS);
    }

    #[test]
    fn earth_moon_barycenter_is_near_earth() {
        let bodies = earth_moon();
        let bc = barycenter(&bodies);
        assert!(bc.to_vec().magnitude() < EARTH_RADIUS);
        assert_eq!(total_momentum(&bodies), bodies[1].vel * MOON_MASS);
    }
}
