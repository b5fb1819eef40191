use std::f64::consts::PI;

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Rotation matrix about the Y axis
pub fn rotation_about_y(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[cos, 0.0, -sin], [0.0, 1.0, 0.0], [sin, 0.0, cos]]
}

/// Rotation matrix about the X axis
pub fn rotation_about_x(angle: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Distributes `count` points over a sphere of the given radius using the
/// golden-angle (Fibonacci) lattice, which avoids pole clustering.
pub fn fibonacci_sphere(count: usize, radius: f64) -> Vec<[f64; 3]> {
    let golden_angle = PI * (1.0 + 5.0_f64.sqrt());
    (0..count)
        .map(|i| {
            let i = i as f64 + 0.5;
            let theta = (1.0 - 2.0 * i / count as f64).acos();
            let phi = golden_angle * i;
            [
                radius * theta.sin() * phi.cos(),
                radius * theta.sin() * phi.sin(),
                radius * theta.cos(),
            ]
        })
        .collect()
}

/// Perspective scale factor for a depth `z` at the given focal length.
/// Grows as points approach the camera, shrinks as they recede.
pub fn perspective_scale(focal_length: f64, z: f64) -> f64 {
    focal_length / (focal_length + z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn length(v: &[f64; 3]) -> f64 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn fibonacci_sphere_points_lie_on_the_sphere() {
        let points = fibonacci_sphere(800, 100.0);
        assert_eq!(points.len(), 800);
        for p in &points {
            let r = length(p);
            assert!((r - 100.0).abs() < 1e-9, "point off the sphere: r = {r}");
        }
    }

    #[test]
    fn fibonacci_sphere_is_deterministic_and_spans_both_poles() {
        let a = fibonacci_sphere(200, 50.0);
        let b = fibonacci_sphere(200, 50.0);
        assert_eq!(a, b);
        // first point sits near the +z pole, last near the -z pole
        assert!(a[0][2] > 49.0, "first z = {}", a[0][2]);
        assert!(a[199][2] < -49.0, "last z = {}", a[199][2]);
    }

    #[test]
    fn rotation_about_y_quarter_turn_sends_x_to_z() {
        let m = rotation_about_y(FRAC_PI_2);
        let v = multiply_matrix_vector(&m, &[1.0, 0.0, 0.0]);
        assert!(v[0].abs() < 1e-12);
        assert!(v[1].abs() < 1e-12);
        assert!((v[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rotation_about_x_quarter_turn_sends_y_to_z() {
        let m = rotation_about_x(FRAC_PI_2);
        let v = multiply_matrix_vector(&m, &[0.0, 1.0, 0.0]);
        assert!(v[0].abs() < 1e-12);
        assert!(v[1].abs() < 1e-12);
        assert!((v[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn composed_matrix_matches_sequential_application() {
        let ry = rotation_about_y(0.7);
        let rx = rotation_about_x(-0.3);
        let composed = multiply_matrices(&rx, &ry);
        let v = [3.0, -2.0, 5.0];
        let sequential = multiply_matrix_vector(&rx, &multiply_matrix_vector(&ry, &v));
        let direct = multiply_matrix_vector(&composed, &v);
        for i in 0..3 {
            assert!((sequential[i] - direct[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn perspective_scale_grows_toward_the_camera() {
        assert!((perspective_scale(300.0, 0.0) - 1.0).abs() < 1e-12);
        assert!((perspective_scale(300.0, -150.0) - 2.0).abs() < 1e-12);
        assert!((perspective_scale(300.0, 300.0) - 0.5).abs() < 1e-12);
    }
}
