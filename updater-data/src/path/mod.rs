use std::path::{Path, PathBuf};

use unic_ucd::GeneralCategory;

mod error;

pub use self::error::InvalidNameError;

#[cfg(not(windows))]
/// The platform-specific separator as a string, used when joining a folder's
/// path with the name of one of its children.
pub const PATH_PLATFORM_SEP: &str = "/";

#[cfg(windows)]
/// The platform-specific separator as a string, used when joining a folder's
/// path with the name of one of its children.
pub const PATH_PLATFORM_SEP: &str = "\\";

#[inline]
fn is_any_separator(c: char) -> bool {
    c == '/' || c == '\\' || std::path::is_separator(c)
}

/// Appends `name` to `parent` as a single new path segment.
///
/// Separators at either end of `name` are dropped, so the result never holds a
/// doubled separator and a name such as `"/bin"` cannot replace `parent` the way
/// [`Path::join`] would. The casing of `name` is preserved.
pub fn combine<P: AsRef<Path>>(parent: P, name: &str) -> PathBuf {
    let segment = name.trim_matches(is_any_separator);
    let mut path = parent.as_ref().to_path_buf();
    if !segment.is_empty() {
        path.push(segment);
    }
    path
}

/// Checks that `name` can be stored as exactly one segment of a child path.
pub fn validate_name(name: &str) -> Result<(), InvalidNameError> {
    if name.is_empty() {
        return Err(InvalidNameError::Empty);
    }

    if name == "." || name == ".." {
        return Err(InvalidNameError::Relative);
    }

    for c in name.chars() {
        if is_any_separator(c) {
            return Err(InvalidNameError::Separator);
        }
        if GeneralCategory::of(c) == GeneralCategory::Control {
            return Err(InvalidNameError::Control);
        }
    }

    Ok(())
}
