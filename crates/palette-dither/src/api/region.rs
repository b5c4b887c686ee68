//! Rectangular pixel region with a destination index buffer.

use super::error::DitherError;

/// A horizontal slice of a larger image, ready to be dithered.
///
/// `source` holds storage pixels at `source_stride` elements per row, `dest`
/// receives one palette index per pixel at `dest_stride` bytes per row. Row
/// `y` of the region is row `start_y + y` of the full image, which is what
/// coordinate-dependent strategies (ordered matrices, noise, curves) index
/// by, so independently dithered slices line up.
///
/// # Example
///
/// ```
/// use palette_dither::PixelRegion;
///
/// let pixels = [0u8; 6];
/// let mut indices = [0u8; 6];
/// let region = PixelRegion::new(&pixels, 3, &mut indices, 3, 3, 2, 10).unwrap();
/// assert_eq!(region.absolute_y(1), 11);
/// ```
#[derive(Debug)]
pub struct PixelRegion<'a, P> {
    source: &'a [P],
    source_stride: usize,
    dest: &'a mut [u8],
    dest_stride: usize,
    width: usize,
    height: usize,
    start_y: usize,
}

fn required_len(stride: usize, width: usize, height: usize) -> usize {
    if width == 0 || height == 0 {
        0
    } else {
        (height - 1) * stride + width
    }
}

fn check_buffer(
    buffer: &'static str,
    len: usize,
    stride: usize,
    width: usize,
    height: usize,
) -> Result<(), DitherError> {
    if stride < width {
        return Err(DitherError::InvalidStride { stride, width });
    }
    let required = required_len(stride, width, height);
    if len < required {
        return Err(DitherError::RegionTooSmall {
            buffer,
            len,
            required,
        });
    }
    Ok(())
}

impl<'a, P> PixelRegion<'a, P> {
    /// Describe a region over caller-owned buffers.
    ///
    /// # Errors
    ///
    /// - [`DitherError::InvalidStride`] if either stride is below `width`
    /// - [`DitherError::RegionTooSmall`] if either buffer cannot hold
    ///   `height` rows at its stride
    pub fn new(
        source: &'a [P],
        source_stride: usize,
        dest: &'a mut [u8],
        dest_stride: usize,
        width: usize,
        height: usize,
        start_y: usize,
    ) -> Result<Self, DitherError> {
        check_buffer("source", source.len(), source_stride, width, height)?;
        check_buffer("destination", dest.len(), dest_stride, width, height)?;
        Ok(Self {
            source,
            source_stride,
            dest,
            dest_stride,
            width,
            height,
            start_y,
        })
    }

    /// Region over tightly packed buffers (`stride == width`).
    pub fn packed(
        source: &'a [P],
        dest: &'a mut [u8],
        width: usize,
        height: usize,
        start_y: usize,
    ) -> Result<Self, DitherError> {
        Self::new(source, width, dest, width, width, height, start_y)
    }

    /// Sibling region reading the same source, writing `dest` instead.
    pub fn with_dest<'b>(
        &self,
        dest: &'b mut [u8],
        dest_stride: usize,
    ) -> Result<PixelRegion<'b, P>, DitherError>
    where
        'a: 'b,
    {
        PixelRegion::new(
            self.source,
            self.source_stride,
            dest,
            dest_stride,
            self.width,
            self.height,
            self.start_y,
        )
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn start_y(&self) -> usize {
        self.start_y
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Row `y` of the region in full-image coordinates.
    #[inline]
    pub fn absolute_y(&self, y: usize) -> usize {
        self.start_y + y
    }

    /// Storage pixel at region coordinates `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &P {
        &self.source[y * self.source_stride + x]
    }

    /// Palette index currently stored at `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> u8 {
        self.dest[y * self.dest_stride + x]
    }

    /// Write the palette index for `(x, y)`.
    #[inline]
    pub fn set_index(&mut self, x: usize, y: usize, idx: u8) {
        self.dest[y * self.dest_stride + x] = idx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_must_cover_width() {
        let src = [0u8; 8];
        let mut dst = [0u8; 8];
        let err = PixelRegion::new(&src, 2, &mut dst, 4, 4, 2, 0).unwrap_err();
        assert_eq!(err, DitherError::InvalidStride { stride: 2, width: 4 });
    }

    #[test]
    fn test_buffer_length_checked_against_stride() {
        let src = [0u8; 9];
        let mut dst = [0u8; 12];
        // 3 rows at stride 4 need (3 - 1) * 4 + 3 = 11 elements
        let err = PixelRegion::new(&src, 4, &mut dst, 4, 3, 3, 0).unwrap_err();
        assert_eq!(
            err,
            DitherError::RegionTooSmall {
                buffer: "source",
                len: 9,
                required: 11
            }
        );
    }

    #[test]
    fn test_last_row_may_be_short() {
        let src = [0u8; 11];
        let mut dst = [0u8; 11];
        assert!(PixelRegion::new(&src, 4, &mut dst, 4, 3, 3, 0).is_ok());
    }

    #[test]
    fn test_empty_region_accepts_empty_buffers() {
        let src: [u8; 0] = [];
        let mut dst: [u8; 0] = [];
        let region = PixelRegion::packed(&src, &mut dst, 0, 5, 0).unwrap();
        assert!(region.is_empty());
    }

    #[test]
    fn test_strided_access() {
        let src = [1u8, 2, 99, 3, 4, 99];
        let mut dst = [0u8; 6];
        let mut region = PixelRegion::new(&src, 3, &mut dst, 3, 2, 2, 0).unwrap();
        assert_eq!(*region.pixel(1, 1), 4);
        region.set_index(1, 1, 7);
        assert_eq!(region.index(1, 1), 7);
        drop(region);
        assert_eq!(dst, [0, 0, 0, 0, 7, 0]);
    }

    #[test]
    fn test_with_dest_shares_source() {
        let src = [5u8; 4];
        let mut dst = [0u8; 4];
        let mut scratch = vec![0u8; 4];
        let region = PixelRegion::packed(&src, &mut dst, 2, 2, 6).unwrap();
        let mut sibling = region.with_dest(&mut scratch, 2).unwrap();
        assert_eq!(sibling.start_y(), 6);
        assert_eq!(*sibling.pixel(1, 1), 5);
        sibling.set_index(0, 0, 1);
        assert_eq!(scratch[0], 1);
    }
}
