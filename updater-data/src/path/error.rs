use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidNameError {
    Empty,
    Separator,
    Relative,
    Control,
}

impl std::error::Error for InvalidNameError {}

impl fmt::Display for InvalidNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl InvalidNameError {
    pub fn as_str(&self) -> &str {
        match self {
            InvalidNameError::Empty => "no name provided",
            InvalidNameError::Separator => "name contains a path separator",
            InvalidNameError::Relative => "name is a relative path chunk",
            InvalidNameError::Control => "name contains a control character",
        }
    }
}
