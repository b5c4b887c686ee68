//! Shared machinery of the candidate-mixing strategies.
//!
//! Knoll, Yliluoma, barycentric, tetrahedral, natural-neighbour, N-closest
//! and N-convex all work the same way per pixel:
//!
//! 1. build a short list of `(palette index, weight)` candidates whose
//!    weighted mix approximates the pixel color,
//! 2. order the candidates by luminance,
//! 3. walk the cumulative weights and pick the candidate the position's
//!    threshold falls into.
//!
//! Over a tile of the threshold matrix each candidate then covers its share
//! of the pixels. Geometry is done on the three color channels; alpha only
//! enters through the metric.

use std::sync::Arc;

use crate::api::DitherError;
use crate::color::WorkingColor;
use crate::matrix::bayer::bayer_matrix;
use crate::matrix::ThresholdMatrix;
use crate::palette::Palette;

pub(crate) type Vec3 = [f32; 3];

/// Default Bayer size for candidate selection.
pub(crate) const DEFAULT_MATRIX_SIZE: usize = 8;

/// Barycentric weights below this are treated as outside the simplex.
pub(crate) const WEIGHT_TOLERANCE: f32 = -1e-4;

const DEGENERATE: f32 = 1e-12;

/// Shared Bayer matrix for candidate selection.
pub(crate) fn candidate_matrix(size: usize) -> Result<Arc<ThresholdMatrix>, DitherError> {
    Ok(Arc::new(bayer_matrix(size)?))
}

/// Threshold in `(0, 1)` for a position.
#[inline]
pub(crate) fn unit_threshold(matrix: &ThresholdMatrix, x: usize, y: usize) -> f32 {
    matrix.threshold(x, y) + 0.5
}

/// Pick one candidate by cumulative weight.
///
/// Candidates are ordered by ascending luminance (stable, so equal
/// luminance keeps the incoming order) and weights are normalized. Returns
/// the first candidate when all weights are zero.
pub(crate) fn pick_weighted(palette: &Palette, candidates: &mut [(usize, f32)], threshold: f32) -> u8 {
    candidates.sort_by(|a, b| {
        palette
            .color(a.0)
            .luminance()
            .total_cmp(&palette.color(b.0).luminance())
    });
    let total: f32 = candidates.iter().map(|&(_, w)| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return candidates.first().map_or(0, |&(idx, _)| idx as u8);
    }
    let mut cumulative = 0.0;
    for &(idx, weight) in candidates.iter() {
        cumulative += weight.max(0.0) / total;
        if threshold < cumulative {
            return idx as u8;
        }
    }
    // Rounding left the threshold past the last boundary.
    candidates.last().map_or(0, |&(idx, _)| idx as u8)
}

#[inline]
pub(crate) fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub(crate) fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub(crate) fn length_sq(a: Vec3) -> f32 {
    dot(a, a)
}

#[inline]
pub(crate) fn point(color: WorkingColor) -> Vec3 {
    color.color_channels()
}

/// Position of the projection of `p` onto segment `a..b`, clamped to
/// `[0, 1]`. `None` when the segment has no length.
pub(crate) fn segment_weight(p: Vec3, a: Vec3, b: Vec3) -> Option<f32> {
    let ab = sub(b, a);
    let len = length_sq(ab);
    if len < DEGENERATE {
        return None;
    }
    Some((dot(sub(p, a), ab) / len).clamp(0.0, 1.0))
}

/// Barycentric weights of the projection of `p` onto triangle `abc`.
///
/// Weights may be negative when the projection falls outside. `None` for a
/// degenerate triangle.
pub(crate) fn triangle_weights(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<[f32; 3]> {
    let e1 = sub(b, a);
    let e2 = sub(c, a);
    let d11 = dot(e1, e1);
    let d12 = dot(e1, e2);
    let d22 = dot(e2, e2);
    let det = d11 * d22 - d12 * d12;
    if det.abs() < DEGENERATE {
        return None;
    }
    let d = sub(p, a);
    let (p1, p2) = (dot(d, e1), dot(d, e2));
    let l1 = (d22 * p1 - d12 * p2) / det;
    let l2 = (d11 * p2 - d12 * p1) / det;
    Some([1.0 - l1 - l2, l1, l2])
}

/// Barycentric weights of `p` in tetrahedron `abcd`. `None` when flat.
pub(crate) fn tetrahedron_weights(p: Vec3, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Option<[f32; 4]> {
    let e1 = sub(b, a);
    let e2 = sub(c, a);
    let e3 = sub(d, a);
    let det = e1[0] * (e2[1] * e3[2] - e2[2] * e3[1]) - e2[0] * (e1[1] * e3[2] - e1[2] * e3[1])
        + e3[0] * (e1[1] * e2[2] - e1[2] * e2[1]);
    if det.abs() < DEGENERATE {
        return None;
    }
    let inv = 1.0 / det;
    let q = sub(p, a);
    // Cramer's rule on [e1 e2 e3] * l = q.
    let l1 = (q[0] * (e2[1] * e3[2] - e2[2] * e3[1]) - e2[0] * (q[1] * e3[2] - q[2] * e3[1])
        + e3[0] * (q[1] * e2[2] - q[2] * e2[1]))
        * inv;
    let l2 = (e1[0] * (q[1] * e3[2] - q[2] * e3[1]) - q[0] * (e1[1] * e3[2] - e1[2] * e3[1])
        + e3[0] * (e1[1] * q[2] - e1[2] * q[1]))
        * inv;
    let l3 = (e1[0] * (e2[1] * q[2] - e2[2] * q[1]) - e2[0] * (e1[1] * q[2] - e1[2] * q[1])
        + q[0] * (e1[1] * e2[2] - e1[2] * e2[1]))
        * inv;
    Some([1.0 - l1 - l2 - l3, l1, l2, l3])
}

/// Clamp negative weights within tolerance to zero; `None` if any weight is
/// clearly negative.
pub(crate) fn inside<const N: usize>(weights: [f32; N]) -> Option<[f32; N]> {
    if weights.iter().any(|&w| w < WEIGHT_TOLERANCE || !w.is_finite()) {
        return None;
    }
    Some(weights.map(|w| w.max(0.0)))
}
