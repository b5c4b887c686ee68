//! Peano curve index to coordinate conversion.
//!
//! The index is read as `2 * order` base-3 digits `a1 b1 a2 b2 ...`. Digit
//! `a_i` selects the column and `b_i` the row of the 3x3 sub-square at level
//! `i`; a column digit is mirrored (`2 - a`) when the preceding row digits
//! sum to an odd value, and a row digit when the column digits up to and
//! including its level do. The mirroring is what makes every sub-curve run
//! serpentine and join the next one edge to edge.

/// Largest supported order (a 59049 x 59049 square).
pub const MAX_ORDER: u32 = 10;

/// Coordinates of index `d` on the Peano curve of side `3^order`.
pub fn d2xy(order: u32, d: u64) -> (u64, u64) {
    let mut digits = [0u8; 2 * MAX_ORDER as usize];
    let count = 2 * order as usize;
    let mut rest = d;
    for slot in digits[..count].iter_mut().rev() {
        *slot = (rest % 3) as u8;
        rest /= 3;
    }

    let mut x = 0u64;
    let mut y = 0u64;
    let mut column_sum = 0u32;
    let mut row_sum = 0u32;
    for level in 0..order as usize {
        let a = digits[2 * level] as u64;
        let b = digits[2 * level + 1] as u64;
        column_sum += a as u32;
        let xi = if row_sum % 2 == 0 { a } else { 2 - a };
        let yi = if column_sum % 2 == 0 { b } else { 2 - b };
        row_sum += b as u32;
        x = x * 3 + xi;
        y = y * 3 + yi;
    }
    (x, y)
}

/// Smallest order whose square covers `extent` cells per side.
pub fn order_for(extent: usize) -> u32 {
    let mut order = 0;
    let mut side = 1usize;
    while side < extent {
        side *= 3;
        order += 1;
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_one_is_column_serpentine() {
        let points: Vec<_> = (0..9).map(|d| d2xy(1, d)).collect();
        assert_eq!(
            points,
            vec![
                (0, 0),
                (0, 1),
                (0, 2),
                (1, 2),
                (1, 1),
                (1, 0),
                (2, 0),
                (2, 1),
                (2, 2)
            ]
        );
    }

    #[test]
    fn test_steps_are_unit_moves() {
        let order = 3;
        let points: Vec<_> = (0..729).map(|d| d2xy(order, d)).collect();
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let step = a.0.abs_diff(b.0) + a.1.abs_diff(b.1);
            assert_eq!(step, 1, "{:?} -> {:?} is not a unit step", a, b);
        }
        assert_eq!(points.last(), Some(&(26, 26)));
    }

    #[test]
    fn test_order_for() {
        assert_eq!(order_for(1), 0);
        assert_eq!(order_for(3), 1);
        assert_eq!(order_for(4), 2);
        assert_eq!(order_for(27), 3);
    }
}
