use std::string::FromUtf8Error;

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Stream is not ready for reading.")]
    NotReady,

    #[error("Unexpected end of stream at offset {offset:#x}: needed {needed} bytes, {available} available.")]
    ShortRead {
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("Text at offset {offset:#x} is not valid UTF-8.")]
    InvalidText {
        offset: u64,
        #[source]
        source: FromUtf8Error,
    },

    #[error("Text at offset {offset:#x} declares {len} bytes, limit is {limit}.")]
    StringTooLong { offset: u64, len: u64, limit: u32 },

    #[error("Failed to read stream at offset {offset:#x}.")]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },
}

impl ReadError {
    /// `true` when the stream ended before a read could complete.
    pub fn is_short_read(&self) -> bool {
        matches!(self, ReadError::ShortRead { .. })
    }
}
