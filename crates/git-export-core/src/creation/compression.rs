//! Compression level conversion.
//!
//! User levels follow one scale for every container:
//!
//! - **1-3**: Fast compression
//! - **6** or unset: Default compression
//! - **7-9**: Best compression

/// Converts a user compression level (1-9) to a flate2 level.
///
/// # Examples
///
/// ```
/// use git_export_core::creation::compression::compression_level_to_flate2;
///
/// assert_eq!(compression_level_to_flate2(None), flate2::Compression::default());
/// assert_eq!(compression_level_to_flate2(Some(9)), flate2::Compression::best());
/// ```
#[must_use]
pub fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n.min(9))),
    }
}

/// Converts a user compression level (1-9) to a bzip2 level.
#[must_use]
pub fn compression_level_to_bzip2(level: Option<u8>) -> bzip2::Compression {
    match level {
        None | Some(6) => bzip2::Compression::default(),
        Some(0 | 1) => bzip2::Compression::fast(),
        Some(7..=9) => bzip2::Compression::best(),
        Some(n) => bzip2::Compression::new(u32::from(n.min(9))),
    }
}

/// Converts a user compression level (1-9) to a deflate level for ZIP
/// entries. `None` keeps the writer's default.
#[must_use]
pub fn compression_level_to_zip(level: Option<u8>) -> Option<i64> {
    level.map(|n| i64::from(n.clamp(1, 9)))
}
