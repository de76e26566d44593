//! Small vector helpers over plain `[f64; N]` arrays.

/// Component-wise difference `a - b`.
pub fn sub3(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Component-wise sum.
pub fn add3(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Multiplies every component by `s`.
pub fn scale3(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

/// Dot product of two 3D vectors.
pub fn dot3(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product of two 3D vectors.
pub fn cross3(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean length.
pub fn length3(a: [f64; 3]) -> f64 {
    dot3(a, a).sqrt()
}

/// Squared distance between two points.
pub fn distance_squared3(a: [f64; 3], b: [f64; 3]) -> f64 {
    let d = sub3(a, b);
    dot3(d, d)
}

/// Returns the unit vector along `a`, or the zero vector for degenerate input.
pub fn normalize3(a: [f64; 3]) -> [f64; 3] {
    let len = length3(a);
    if len > 1e-12 {
        scale3(a, 1.0 / len)
    } else {
        [0.0, 0.0, 0.0]
    }
}

/// Area of a 3D triangle.
pub fn triangle_area_3d(p0: [f64; 3], p1: [f64; 3], p2: [f64; 3]) -> f64 {
    0.5 * length3(cross3(sub3(p1, p0), sub3(p2, p0)))
}

/// Area of a 2D triangle.
pub fn triangle_area_2d(p0: [f64; 2], p1: [f64; 2], p2: [f64; 2]) -> f64 {
    let v1 = [p1[0] - p0[0], p1[1] - p0[1]];
    let v2 = [p2[0] - p0[0], p2[1] - p0[1]];
    0.5 * (v1[0] * v2[1] - v1[1] * v2[0]).abs()
}

/// Centroid of a set of positions. Empty input yields the origin.
pub fn centroid3<'a>(points: impl IntoIterator<Item = &'a [f64; 3]>) -> [f64; 3] {
    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    for p in points {
        sum = add3(sum, *p);
        count += 1;
    }
    if count == 0 {
        return sum;
    }
    scale3(sum, 1.0 / count as f64)
}

/// Rounds to `decimals` places the way the host does before comparing transforms.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_areas() {
        assert!((triangle_area_3d([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]) - 0.5).abs() < 1e-12);
        assert!((triangle_area_2d([0.0, 0.0], [2.0, 0.0], [0.0, 2.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_degenerate() {
        assert_eq!(normalize3([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
        let n = normalize3([3.0, 0.0, 4.0]);
        assert!((length3(n) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.99951, 3), 1.0);
        assert_eq!(round_to(0.0004, 3), 0.0);
        assert_eq!(round_to(1.2345, 2), 1.23);
    }

    #[test]
    fn test_centroid_empty() {
        let empty: Vec<[f64; 3]> = Vec::new();
        assert_eq!(centroid3(&empty), [0.0, 0.0, 0.0]);
    }
}
