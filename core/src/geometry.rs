//! Stateless vector helpers shared by every stage.
//!
//! Plain arithmetic is left to [`glam::Vec2`]; this module only holds the
//! operations whose degenerate inputs need a defined answer.

use glam::Vec2;

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Cosine of the angle between two vectors given their precomputed lengths.
///
/// Returns `None` when either vector has zero length or the quotient is not
/// finite, since the angle is undefined there.
#[must_use]
pub fn cos_theta(a: Vec2, b: Vec2, length_a: f32, length_b: f32) -> Option<f32> {
    let denominator = length_a * length_b;
    if denominator == 0.0 {
        return None;
    }
    let cosine = a.dot(b) / denominator;
    cosine.is_finite().then_some(cosine)
}

/// Restricts `value` to `low..=high`.
#[must_use]
pub fn clamp_number(value: f32, low: f32, high: f32) -> f32 {
    value.min(high).max(low)
}

/// Restricts both components of a normalized position to `[0, 1]`.
#[must_use]
pub fn clamp_unit(position: Vec2) -> Vec2 {
    Vec2::new(
        clamp_number(position.x, 0.0, 1.0),
        clamp_number(position.y, 0.0, 1.0),
    )
}
