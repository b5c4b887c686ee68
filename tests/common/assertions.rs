//! Assertion helpers for tests.

/// Assert every index addresses a palette of `len` colors
pub fn assert_indices_in_range(indices: &[u8], len: usize) {
    if let Some(pos) = indices.iter().position(|&i| i as usize >= len) {
        panic!(
            "Index {} at position {} is outside a {}-color palette",
            indices[pos], pos, len
        );
    }
}

/// Assert data starts with the PNG signature
pub fn assert_png(data: &[u8]) {
    assert!(
        data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        "Expected PNG data, got {} bytes starting with {:?}",
        data.len(),
        &data[..8.min(data.len())]
    );
}
