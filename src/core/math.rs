/// `a` at `t == 0`, `b` at `t == 1`. No clamping, callers extrapolate on purpose.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Interpolates two channel values. `t` is clamped to `[0, 1]` so the
/// result always fits in a `u8`.
#[inline]
pub fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    lerp_f32(a as f32, b as f32, t).round().clamp(0.0, 255.0) as u8
}
