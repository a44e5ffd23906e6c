//! Similarity Scorer: cosine similarity remapped onto [0, 1].
//!
//! Every score in the pipeline uses the remapped scale `(cos + 1) / 2`;
//! raw cosine values never leave this module.

/// Raw cosine similarity in [-1, 1]. `None` when either vector has zero norm
/// or the dimensions differ.
fn cosine(v1: &[f32], v2: &[f32]) -> Option<f64> {
    if v1.len() != v2.len() || v1.is_empty() {
        return None;
    }
    let mut dot = 0.0_f64;
    let mut norm1 = 0.0_f64;
    let mut norm2 = 0.0_f64;
    for (a, b) in v1.iter().zip(v2) {
        let (a, b) = (*a as f64, *b as f64);
        dot += a * b;
        norm1 += a * a;
        norm2 += b * b;
    }
    if norm1 == 0.0 || norm2 == 0.0 {
        return None;
    }
    Some((dot / (norm1.sqrt() * norm2.sqrt())).clamp(-1.0, 1.0))
}

/// Maps a cosine value in [-1, 1] onto [0, 1].
pub fn remap(cos: f64) -> f64 {
    ((cos.clamp(-1.0, 1.0) + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Similarity on the [0, 1] scale. Zero-norm or mismatched vectors score 0.
pub fn similarity(v1: &[f32], v2: &[f32]) -> f64 {
    cosine(v1, v2).map(remap).unwrap_or(0.0)
}
