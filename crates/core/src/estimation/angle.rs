//! Angle arithmetic in degrees

/// Normalize an angle into [-180, 180).
pub fn wrap_180(angle: f32) -> f32 {
    let mut r = (angle + 180.0) % 360.0;
    if r < 0.0 {
        r += 360.0;
    }
    // r + 360 can round up to exactly 360 for tiny negative remainders
    if r >= 360.0 {
        r -= 360.0;
    }
    r - 180.0
}

/// Shortest signed difference `a - b`, in [-180, 180).
///
/// ```text
/// ((a - b + 180) mod 360) - 180
/// ```
pub fn angle_diff_180(a: f32, b: f32) -> f32 {
    wrap_180(a - b)
}
