use crate::config::{Number, EPSILON};
use wide::f32x8;

const LANES: usize = 8;

fn lane(chunk: &[Number]) -> f32x8 {
    let mut values = [0.0; LANES];
    values.copy_from_slice(chunk);
    f32x8::new(values)
}

/// Largest absolute component, or `None` if any component is not finite.
fn max_abs(vector: &[Number]) -> Option<Number> {
    vector.iter().try_fold(0.0 as Number, |acc, &x| {
        if x.is_finite() {
            Some(acc.max(x.abs()))
        } else {
            None
        }
    })
}

/// Cosine similarity of `a` and `b` using SIMD operations.
///
/// Neither input needs to be normalized. Both vectors are scaled by their
/// largest component first, so very small or very large magnitudes neither
/// underflow nor overflow the `f32` accumulators. The similarity is `0.0`
/// when either vector is exactly zero or contains a non-finite component.
/// Callers are responsible for passing vectors of equal length.
pub fn compute_cosine_similarity_simd(a: &[Number], b: &[Number]) -> Number {
    debug_assert_eq!(a.len(), b.len());

    let (Some(scale_a), Some(scale_b)) = (max_abs(a), max_abs(b)) else {
        return 0.0;
    };
    if scale_a == 0.0 || scale_b == 0.0 {
        return 0.0;
    }
    let (splat_a, splat_b) = (f32x8::splat(scale_a), f32x8::splat(scale_b));

    let mut dot_product = f32x8::splat(0.0);
    let mut mag_a = f32x8::splat(0.0);
    let mut mag_b = f32x8::splat(0.0);

    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let (a_tail, b_tail) = (a_chunks.remainder(), b_chunks.remainder());

    for (ca, cb) in a_chunks.zip(b_chunks) {
        let va = lane(ca) / splat_a;
        let vb = lane(cb) / splat_b;
        dot_product += va * vb;
        mag_a += va * va;
        mag_b += vb * vb;
    }

    let mut scalar_dot_product = dot_product.reduce_add();
    let mut scalar_mag_a = mag_a.reduce_add();
    let mut scalar_mag_b = mag_b.reduce_add();

    // Handle remaining elements
    for (&x, &y) in a_tail.iter().zip(b_tail) {
        let (x, y) = (x / scale_a, y / scale_b);
        scalar_dot_product += x * y;
        scalar_mag_a += x * x;
        scalar_mag_b += y * y;
    }

    // Each scaled vector has a component of magnitude 1, so both norms are >= 1.
    let similarity = scalar_dot_product / (scalar_mag_a.sqrt() * scalar_mag_b.sqrt());
    similarity.clamp(-1.0, 1.0)
}

pub fn magnitude(vector: &[Number]) -> Number {
    vector.iter().map(|&x| x * x).sum::<Number>().sqrt()
}

pub fn normalize_vector(vector: &mut [Number]) {
    let magnitude = magnitude(vector);
    if magnitude > EPSILON {
        for x in vector.iter_mut() {
            *x /= magnitude;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_cosine(a: &[Number], b: &[Number]) -> Number {
        let dot: Number = a.iter().zip(b).map(|(x, y)| x * y).sum();
        dot / (magnitude(a) * magnitude(b))
    }

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![0.3, -1.2, 4.0, 0.5, 0.0, 2.2, -0.7, 1.1, 3.3];
        assert!((compute_cosine_similarity_simd(&v, &v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn orthogonal_and_opposite_vectors() {
        let x = [1.0, 0.0, 0.0];
        let y = [0.0, 1.0, 0.0];
        let neg_x = [-2.0, 0.0, 0.0];
        assert!(compute_cosine_similarity_simd(&x, &y).abs() < 1e-6);
        assert!((compute_cosine_similarity_simd(&x, &neg_x) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero() {
        let zero = [0.0; 16];
        let v: Vec<Number> = (0..16).map(|i| i as Number).collect();
        assert_eq!(compute_cosine_similarity_simd(&zero, &v), 0.0);
        assert_eq!(compute_cosine_similarity_simd(&v, &zero), 0.0);
        assert_eq!(compute_cosine_similarity_simd(&zero, &zero), 0.0);
    }

    #[test]
    fn simd_matches_scalar_with_tail() {
        let a: Vec<Number> = (0..19).map(|i| (i as Number * 0.37).sin()).collect();
        let b: Vec<Number> = (0..19).map(|i| (i as Number * 0.11).cos()).collect();
        let simd = compute_cosine_similarity_simd(&a, &b);
        assert!((simd - scalar_cosine(&a, &b)).abs() < 1e-5);
    }

    #[test]
    #[allow(overflowing_literals)]
    fn tiny_and_huge_magnitudes_still_match_themselves() {
        for v in [
            vec![1e-4, 0.0],
            vec![1e-30, 2e-30, 0.0],
            vec![1e20, 1e20],
            vec![3e38, -3e38, 1e38, 0.0, 5e37, 1.0, 2.0, 3.0, 4e38],
        ] {
            let similarity = compute_cosine_similarity_simd(&v, &v);
            assert!((similarity - 1.0).abs() < 1e-5, "{:?} -> {}", v, similarity);
        }
        let similarity = compute_cosine_similarity_simd(&[1e-4, 0.0], &[0.0, 1e-4]);
        assert!(similarity.abs() < 1e-6);
    }

    #[test]
    fn non_finite_components_score_zero() {
        let v = [1.0, 2.0, 3.0];
        assert_eq!(compute_cosine_similarity_simd(&[f32::NAN, 1.0, 0.0], &v), 0.0);
        assert_eq!(compute_cosine_similarity_simd(&v, &[f32::INFINITY, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn normalize_produces_unit_vector() {
        let mut v = vec![3.0, 4.0];
        normalize_vector(&mut v);
        assert!((magnitude(&v) - 1.0).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize_vector(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
