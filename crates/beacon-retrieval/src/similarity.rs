//! Cosine similarity.

/// Cosine similarity of two equal-length vectors, in [-1, 1].
///
/// Returns 0.0 when either vector has zero magnitude, is empty, or the
/// lengths differ. Use [`checked_cosine_similarity`] to detect the latter.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    checked_cosine_similarity(a, b).unwrap_or(0.0)
}

/// Cosine similarity, `None` when the lengths differ.
pub fn checked_cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let (mut dot, mut mag_a, mut mag_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let denom = mag_a.sqrt() * mag_b.sqrt();
    let sim = dot / denom;
    if denom < f64::EPSILON || !sim.is_finite() {
        Some(0.0)
    } else {
        Some(sim.clamp(-1.0, 1.0))
    }
}
