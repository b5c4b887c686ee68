//! Space-filling curve traversal orders.
//!
//! A curve is enumerated over the full square that covers the image in
//! absolute coordinates (`max(width, start_y + height)` per side), then
//! filtered to the rows of one region. Order and coverage survive the
//! filtering: each region cell appears exactly once, in curve order.

pub mod hilbert;
pub mod peano;

use std::fmt;

use crate::api::DitherError;

/// Traversal order used by curve diffusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CurveKind {
    /// Hilbert curve over a `2^k` square.
    #[default]
    Hilbert,
    /// Peano curve over a `3^k` square.
    Peano,
    /// Plain raster order, left to right, top to bottom.
    Linear,
}

impl CurveKind {
    pub fn name(&self) -> &'static str {
        match self {
            CurveKind::Hilbert => "hilbert",
            CurveKind::Peano => "peano",
            CurveKind::Linear => "linear",
        }
    }

    fn max_order(&self) -> u32 {
        match self {
            CurveKind::Hilbert => hilbert::MAX_ORDER,
            CurveKind::Peano => peano::MAX_ORDER,
            CurveKind::Linear => 0,
        }
    }

    /// Smallest order covering `extent` cells per side.
    pub fn required_order(&self, extent: usize) -> u32 {
        match self {
            CurveKind::Hilbert => hilbert::order_for(extent),
            CurveKind::Peano => peano::order_for(extent),
            CurveKind::Linear => 0,
        }
    }

    /// Side of the covering square for `order`.
    pub fn side(&self, order: u32) -> u64 {
        match self {
            CurveKind::Hilbert => 1u64 << order,
            CurveKind::Peano => 3u64.pow(order),
            CurveKind::Linear => 0,
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Region cells in curve order, as region-local `(x, y)`.
///
/// `order` fixes a minimum curve order; the effective order is the larger
/// of it and the order needed to cover the region. Rows are taken from
/// `start_y..start_y + height` of the covering square.
///
/// # Errors
///
/// [`DitherError::InvalidParameter`] when the image is too large for the
/// curve's maximum order.
pub fn traverse(
    kind: CurveKind,
    width: usize,
    height: usize,
    start_y: usize,
    order: Option<u32>,
) -> Result<Vec<(usize, usize)>, DitherError> {
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }
    let d2xy: fn(u32, u64) -> (u64, u64) = match kind {
        CurveKind::Hilbert => hilbert::d2xy,
        CurveKind::Peano => peano::d2xy,
        CurveKind::Linear => {
            return Ok((0..height)
                .flat_map(|y| (0..width).map(move |x| (x, y)))
                .collect())
        }
    };

    let extent = width.max(start_y + height);
    let order = kind.required_order(extent).max(order.unwrap_or(0));
    if order > kind.max_order() {
        return Err(DitherError::InvalidParameter {
            name: "order",
            reason: format!(
                "{} curve order {} exceeds the maximum of {}",
                kind,
                order,
                kind.max_order()
            ),
        });
    }

    let side = kind.side(order);
    let top = start_y as u64;
    let bottom = top + height as u64;
    let mut cells = Vec::with_capacity(width * height);
    for d in 0..side * side {
        let (x, y) = d2xy(order, d);
        if x < width as u64 && y >= top && y < bottom {
            cells.push((x as usize, (y - top) as usize));
        }
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_covers(cells: &[(usize, usize)], width: usize, height: usize) {
        assert_eq!(cells.len(), width * height, "wrong number of cells");
        let unique: HashSet<_> = cells.iter().copied().collect();
        assert_eq!(unique.len(), cells.len(), "a cell was visited twice");
        assert!(cells.iter().all(|&(x, y)| x < width && y < height));
    }

    #[test]
    fn test_full_square_bijection() {
        for (kind, n) in [(CurveKind::Hilbert, 16), (CurveKind::Peano, 27)] {
            let cells = traverse(kind, n, n, 0, None).unwrap();
            assert_covers(&cells, n, n);
        }
    }

    #[test]
    fn test_rectangles_are_covered() {
        for kind in [CurveKind::Hilbert, CurveKind::Peano, CurveKind::Linear] {
            for (w, h) in [(1, 1), (7, 3), (3, 10), (20, 5)] {
                let cells = traverse(kind, w, h, 0, None).unwrap();
                assert_covers(&cells, w, h);
            }
        }
    }

    #[test]
    fn test_thin_regions_visit_each_cell_once() {
        for kind in [CurveKind::Peano, CurveKind::Hilbert] {
            for (w, h) in [(2, 7), (7, 2), (1, 9), (2, 2)] {
                let cells = traverse(kind, w, h, 0, None).unwrap();
                assert_covers(&cells, w, h);
            }
        }
        // A thin slice lower in the image
        let cells = traverse(CurveKind::Peano, 2, 7, 11, None).unwrap();
        assert_covers(&cells, 2, 7);
    }

    #[test]
    fn test_slices_partition_the_image() {
        // Two slices of one image visit the same cells as the whole pass.
        let whole = traverse(CurveKind::Hilbert, 10, 12, 0, Some(4)).unwrap();
        let top = traverse(CurveKind::Hilbert, 10, 5, 0, Some(4)).unwrap();
        let bottom = traverse(CurveKind::Hilbert, 10, 7, 5, Some(4)).unwrap();
        let expected_top: Vec<_> = whole.iter().copied().filter(|c| c.1 < 5).collect();
        let expected_bottom: Vec<_> = whole
            .iter()
            .filter(|c| c.1 >= 5)
            .map(|&(x, y)| (x, y - 5))
            .collect();
        assert_eq!(top, expected_top);
        assert_eq!(bottom, expected_bottom);
    }

    #[test]
    fn test_fixed_order_is_a_minimum() {
        let small = traverse(CurveKind::Hilbert, 8, 8, 0, Some(1)).unwrap();
        assert_covers(&small, 8, 8);
    }

    #[test]
    fn test_linear_is_raster() {
        let cells = traverse(CurveKind::Linear, 2, 2, 9, None).unwrap();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_order_limit() {
        assert!(traverse(CurveKind::Peano, 10, 10, 0, Some(11)).is_err());
    }
}
