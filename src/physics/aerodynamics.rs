use nalgebra::Vector2;

/// Quadratic drag force opposing the velocity (downrange, up frame).
///
/// |F| = 1/2 rho v^2 Cd A. Zero at rest.
pub fn drag_force(vel: &Vector2<f64>, air_density: f64, cd: f64, area: f64) -> Vector2<f64> {
    let speed = vel.norm();
    if speed > 1e-9 {
        let q_dyn = 0.5 * air_density * speed * speed;
        let drag_mag = q_dyn * cd * area;
        -vel / speed * drag_mag
    } else {
        Vector2::zeros()
    }
}
