//! Embedding encoding and distance math.

use crate::error::{SearchError, SearchResult};

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Encode a vector as little-endian `f32` bytes.
#[must_use]
pub fn encode(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * F32_BYTES);
    for &value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode little-endian `f32` bytes.
pub fn decode(blob: &[u8]) -> SearchResult<Vec<f32>> {
    if blob.len() % F32_BYTES != 0 {
        return Err(SearchError::InvalidData(format!(
            "embedding blob length {} is not a multiple of {F32_BYTES}",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(F32_BYTES)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Reject vectors that cannot take part in a cosine comparison.
pub fn validate(vector: &[f32]) -> SearchResult<()> {
    if vector.is_empty() {
        return Err(SearchError::InvalidVector("vector is empty".to_string()));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(SearchError::InvalidVector(
            "vector contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

/// `1 - cosine_similarity(a, b)`, in `[0, 2]`.
///
/// `None` when the dimensions differ, either vector is empty, or either has
/// zero norm.
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a <= 0.0 || norm_b <= 0.0 {
        return None;
    }
    Some((1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 2.0))
}
