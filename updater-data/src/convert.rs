//! Overflow-checked narrowing of platform-width sizes.

use std::convert::TryFrom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value {value} does not fit in {target}")]
pub struct OverflowError {
    pub value: usize,
    pub target: &'static str,
}

/// Converts `value` to a 32-bit signed integer, failing if it exceeds `i32::MAX`.
#[inline]
pub fn to_i32(value: usize) -> Result<i32, OverflowError> {
    i32::try_from(value).map_err(|_| OverflowError {
        value,
        target: "i32",
    })
}

/// Converts `value` to a 32-bit unsigned integer, failing if it exceeds `u32::MAX`.
#[inline]
pub fn to_u32(value: usize) -> Result<u32, OverflowError> {
    u32::try_from(value).map_err(|_| OverflowError {
        value,
        target: "u32",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i32_bounds() {
        assert_eq!(to_i32(0), Ok(0));
        assert_eq!(to_i32(65536), Ok(65536));
        assert_eq!(to_i32(i32::MAX as usize), Ok(i32::MAX));

        let err = to_i32(i32::MAX as usize + 1).unwrap_err();
        assert_eq!(err.value, i32::MAX as usize + 1);
        assert_eq!(err.target, "i32");
    }

    #[test]
    fn u32_bounds() {
        assert_eq!(to_u32(0), Ok(0));
        assert_eq!(to_u32(i32::MAX as usize + 1), Ok(i32::MAX as u32 + 1));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn u32_overflow() {
        assert_eq!(to_u32(u32::MAX as usize), Ok(u32::MAX));
        assert!(to_u32(u32::MAX as usize + 1).is_err());
        assert!(to_u32(usize::MAX).is_err());
        assert!(to_i32(usize::MAX).is_err());
    }

    #[test]
    fn error_message() {
        let err = to_i32(usize::MAX).unwrap_err();
        assert_eq!(err.to_string(), format!("value {} does not fit in i32", usize::MAX));
    }
}
