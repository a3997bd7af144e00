use nalgebra::{Point3, Unit, Vector3};
use std::f64::consts::PI;

/// Unit vector in the xy-plane at `angle_degrees` from the +x axis.
pub fn planar_direction(angle_degrees: f64) -> Unit<Vector3<f64>> {
    let theta = angle_degrees.to_radians();
    Unit::new_unchecked(Vector3::new(theta.cos(), theta.sin(), 0.0))
}

/// In-plane perpendicular of a planar direction, rotated +90 degrees about z.
pub fn planar_perpendicular(direction: &Unit<Vector3<f64>>) -> Unit<Vector3<f64>> {
    Unit::new_normalize(Vector3::new(-direction.y, direction.x, 0.0))
}

/// Angle in degrees of the `index`-th of `count` directions evenly spread over a full turn.
pub fn even_spread_degrees(index: usize, count: usize, phase_degrees: f64) -> f64 {
    index as f64 * 360.0 / count as f64 + phase_degrees
}

/// Angular offsets (degrees) of `count` secondary arms fanned around a parent direction.
///
/// The increment is `360 / (count + 1)` and the fan starts half an increment before the
/// parent, so for two branches the offsets are `-60` and `+60`.
pub fn fan_offsets_degrees(count: usize) -> Vec<f64> {
    let step = 360.0 / (count + 1) as f64;
    (0..count).map(|k| k as f64 * step - step / 2.0).collect()
}

/// Positions of `count` beads walked outward from `anchor`.
///
/// Bead `j` (1-based) sits at `anchor + j * (spacing * direction + lift * z)`.
pub fn bead_walk(
    anchor: &Point3<f64>,
    direction: &Unit<Vector3<f64>>,
    spacing: f64,
    lift: f64,
    count: usize,
) -> Vec<Point3<f64>> {
    let step = direction.into_inner() * spacing + Vector3::z() * lift;
    (1..=count).map(|j| anchor + step * j as f64).collect()
}

/// Radius of a regular polygon with `size` vertices and edge length `spacing`.
pub fn ring_radius(spacing: f64, size: usize) -> f64 {
    spacing / (2.0 * (PI / size as f64).sin())
}

/// Vertices of a regular ring of `size` atoms around `center`.
///
/// `u` and `v` span the ring plane; vertex `k` sits at angle `2πk / size` measured from `u`.
pub fn ring_positions(
    center: &Point3<f64>,
    radius: f64,
    size: usize,
    u: &Unit<Vector3<f64>>,
    v: &Unit<Vector3<f64>>,
) -> Vec<Point3<f64>> {
    (0..size)
        .map(|k| {
            let phi = 2.0 * PI * k as f64 / size as f64;
            center + (u.into_inner() * phi.cos() + v.into_inner() * phi.sin()) * radius
        })
        .collect()
}
