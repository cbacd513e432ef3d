//! Time and integration helpers for the frame loop
//!
//! Pure functions; all times are in milliseconds.

/// Elapsed time credited to one frame, capped at `cap_ms`
#[inline]
pub fn frame_delta(last_ms: f64, now_ms: f64, cap_ms: f64) -> f64 {
    (now_ms - last_ms).min(cap_ms).max(0.0)
}

/// Progress through the acceleration window, clamped to [0.0, 1.0]
///
/// A non-positive window means full speed immediately.
#[inline]
pub fn acceleration_progress(elapsed_ms: f64, window_ms: f64) -> f64 {
    if window_ms <= 0.0 {
        return 1.0;
    }
    (elapsed_ms / window_ms).clamp(0.0, 1.0)
}

/// Fraction of target speed reached at ramp progress `t`: 1 - (1-t)^3
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let rest = 1.0 - t.clamp(0.0, 1.0);
    1.0 - rest.powi(3)
}

/// Linear interpolation between two values
///
/// # Arguments
/// * `from` - Start value
/// * `to` - End value
/// * `t` - Interpolation factor
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Distance in px covered at `velocity` px/s over `dt_ms`
#[inline]
pub fn displacement(velocity: f64, dt_ms: f64) -> f64 {
    velocity * dt_ms / 1000.0
}

/// Split an accumulated distance into whole px to commit and the signed remainder
///
/// The remainder always has magnitude < 1 and the sign of the input.
#[inline]
pub fn split_whole(accumulated: f64) -> (f64, f64) {
    let whole = accumulated.trunc();
    (whole, accumulated - whole)
}
