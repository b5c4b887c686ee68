//! Per-pixel content labels with majority smoothing.

use super::ContentClass;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: usize,
    height: usize,
    labels: Vec<ContentClass>,
}

impl LabelMap {
    /// Expand row-major block labels (`blocks_x` per row) to pixels.
    pub fn from_blocks(
        blocks: &[ContentClass],
        blocks_x: usize,
        block_size: usize,
        width: usize,
        height: usize,
    ) -> Self {
        let mut labels = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = (y / block_size) * blocks_x;
            labels.extend((0..width).map(|x| blocks[row + x / block_size]));
        }
        Self { width, height, labels }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> ContentClass {
        self.labels[y * self.width + x]
    }

    pub fn labels(&self) -> &[ContentClass] {
        &self.labels
    }

    /// Pixel count per class, indexed like [`ContentClass::ALL`].
    pub fn histogram(&self) -> [usize; ContentClass::COUNT] {
        let mut counts = [0; ContentClass::COUNT];
        for &label in &self.labels {
            counts[label as usize] += 1;
        }
        counts
    }

    /// Majority filter over a `(2r+1)²` window clipped to the image.
    ///
    /// A label is replaced by the window's dominant label only when that label
    /// holds more than half of the window's cells. Ties between dominant
    /// labels go to the lower class.
    pub fn smooth(&self, radius: usize) -> Self {
        if radius == 0 {
            return self.clone();
        }
        let mut labels = self.labels.clone();
        for y in 0..self.height {
            let (y0, y1) = (y.saturating_sub(radius), (y + radius + 1).min(self.height));
            for x in 0..self.width {
                let (x0, x1) = (x.saturating_sub(radius), (x + radius + 1).min(self.width));
                let mut counts = [0usize; ContentClass::COUNT];
                for wy in y0..y1 {
                    for wx in x0..x1 {
                        counts[self.get(wx, wy) as usize] += 1;
                    }
                }
                let cells = (x1 - x0) * (y1 - y0);
                let (dominant, count) = counts
                    .iter()
                    .enumerate()
                    .fold((0, 0), |best, (i, &c)| if c > best.1 { (i, c) } else { best });
                if count * 2 > cells {
                    labels[y * self.width + x] = ContentClass::ALL[dominant];
                }
            }
        }
        Self {
            width: self.width,
            height: self.height,
            labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ContentClass::*;

    #[test]
    fn test_expand_blocks() {
        let map = LabelMap::from_blocks(&[Structure, Smooth, Detail, Extreme], 2, 2, 3, 3);
        assert_eq!(map.get(0, 0), Structure);
        assert_eq!(map.get(2, 0), Smooth);
        assert_eq!(map.get(1, 2), Detail);
        assert_eq!(map.get(2, 2), Extreme);
    }

    #[test]
    fn test_isolated_label_is_absorbed() {
        let mut blocks = vec![Balanced; 25];
        blocks[12] = Detail;
        let map = LabelMap::from_blocks(&blocks, 5, 1, 5, 5).smooth(1);
        assert_eq!(map.get(2, 2), Balanced);
        assert_eq!(map.histogram()[Balanced as usize], 25);
    }

    #[test]
    fn test_no_majority_keeps_label() {
        // Three labels in a 3-pixel strip: no label exceeds half the window.
        let map = LabelMap::from_blocks(&[Structure, Smooth, Detail], 3, 1, 3, 1).smooth(1);
        assert_eq!(map.get(1, 0), Smooth);
    }
}
