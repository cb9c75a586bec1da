//! uint8 quantization for stored embeddings.
//!
//! Vectors are stored as one byte per dimension plus a (scale, offset)
//! pair, cutting blob size 4x with negligible recall loss at 384 dims.

use ndarray::Array1;

/// Quantize a float32 embedding to uint8 bytes.
///
/// Maps [min, max] linearly onto [0, 255]. Returns (bytes, scale,
/// offset) such that original ≈ byte * scale + offset.
pub fn quantize_uint8(embedding: &Array1<f32>) -> (Vec<u8>, f32, f32) {
    let min_val = embedding.iter().copied().fold(f32::INFINITY, f32::min);
    let max_val = embedding.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let range = max_val - min_val;
    if range < 1e-9 {
        return (vec![0u8; embedding.len()], 0.0, min_val);
    }

    let scale = range / 255.0;
    let offset = min_val;

    let bytes: Vec<u8> = embedding
        .iter()
        .map(|&v| ((v - offset) / scale).round().clamp(0.0, 255.0) as u8)
        .collect();

    (bytes, scale, offset)
}

/// Reverse of [`quantize_uint8`].
pub fn dequantize_uint8(bytes: &[u8], scale: f32, offset: f32) -> Array1<f32> {
    Array1::from_iter(bytes.iter().map(|&b| b as f32 * scale + offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_roundtrip_accuracy() {
        let original = array![0.12, -0.44, 0.91, 0.0, -0.87, 0.33];
        let (bytes, scale, offset) = quantize_uint8(&original);
        let restored = dequantize_uint8(&bytes, scale, offset);

        for (a, b) in original.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 0.01, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_constant_vector() {
        let original = array![0.7, 0.7, 0.7];
        let (bytes, scale, offset) = quantize_uint8(&original);
        assert_eq!(scale, 0.0);
        assert_eq!(offset, 0.7);
        assert!(bytes.iter().all(|&b| b == 0));

        let restored = dequantize_uint8(&bytes, scale, offset);
        assert_eq!(restored, array![0.7, 0.7, 0.7]);
    }
}
