//! Hilbert curve index to coordinate conversion.

/// Largest supported order (a 32768 x 32768 square).
pub const MAX_ORDER: u32 = 15;

/// Coordinates of index `d` on the Hilbert curve of side `2^order`.
///
/// Each level reads two bits of `d` to pick a quadrant and rotates or
/// reflects the partial coordinates so sub-curves join end to start.
pub fn d2xy(order: u32, d: u64) -> (u64, u64) {
    let side = 1u64 << order;
    let mut x = 0u64;
    let mut y = 0u64;
    let mut d = d;
    let mut s = 1u64;
    while s < side {
        let rx = (d / 2) & 1;
        let ry = (d ^ rx) & 1;
        if ry == 0 {
            if rx == 1 {
                x = s - 1 - x;
                y = s - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        x += s * rx;
        y += s * ry;
        d /= 4;
        s *= 2;
    }
    (x, y)
}

/// Smallest order whose square covers `extent` cells per side.
pub fn order_for(extent: usize) -> u32 {
    let mut order = 0;
    while (1usize << order) < extent {
        order += 1;
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_one() {
        let points: Vec<_> = (0..4).map(|d| d2xy(1, d)).collect();
        assert_eq!(points, vec![(0, 0), (0, 1), (1, 1), (1, 0)]);
    }

    #[test]
    fn test_order_for() {
        assert_eq!(order_for(0), 0);
        assert_eq!(order_for(1), 0);
        assert_eq!(order_for(2), 1);
        assert_eq!(order_for(5), 3);
        assert_eq!(order_for(64), 6);
    }

    #[test]
    fn test_steps_are_unit_moves() {
        let order = 4;
        let points: Vec<_> = (0..256).map(|d| d2xy(order, d)).collect();
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let step = a.0.abs_diff(b.0) + a.1.abs_diff(b.1);
            assert_eq!(step, 1, "{:?} -> {:?} is not a unit step", a, b);
        }
    }
}
