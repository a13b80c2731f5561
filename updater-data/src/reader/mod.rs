//! Sequential decoding of little-endian manifest fields.
//!
//! A [`BinaryReader`] borrows an already open [`ByteStream`] and decodes one
//! field at a time from its current position. The wire format is fixed:
//!
//! - integers are little-endian, two's complement when signed;
//! - floats are IEEE-754, reinterpreted from their raw bits;
//! - strings are a `u32` little-endian byte length followed by the bytes;
//! - char runs are raw bytes whose count is supplied by the caller.
//!
//! A read that hits the end of the stream fails with [`ReadError::ShortRead`]
//! and never yields a zero-filled or partial value. Short reads only happen at
//! the end of the stream, so the stream is left there and
//! [`position`](BinaryReader::position) counts the bytes that were consumed.

use std::io::{self, Read};

use byteorder::{ByteOrder, LittleEndian};

mod error;
mod stream;

pub use self::error::ReadError;
pub use self::stream::ByteStream;

// Upper bound on what a length prefix may pre-allocate before any bytes arrive.
const PREALLOC_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Bytes must form valid UTF-8.
    Utf8,
    /// Every byte maps to the char with the same code point.
    Latin1,
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Utf8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Largest byte length accepted for a string or char run. `None` accepts
    /// anything the stream can supply.
    pub max_string_len: Option<u32>,
    pub text_encoding: TextEncoding,
}

impl ReaderOptions {
    pub fn new() -> ReaderOptions {
        ReaderOptions {
            max_string_len: None,
            text_encoding: TextEncoding::default(),
        }
    }

    pub fn max_string_len(mut self, len: u32) -> ReaderOptions {
        self.max_string_len = Some(len);
        self
    }

    pub fn text_encoding(mut self, encoding: TextEncoding) -> ReaderOptions {
        self.text_encoding = encoding;
        self
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions::new()
    }
}

pub struct BinaryReader<'a, R: ByteStream> {
    stream: &'a mut R,
    position: u64,
    options: ReaderOptions,
}

impl<'a, R: ByteStream> BinaryReader<'a, R> {
    /// Wraps `stream` with the default [`ReaderOptions`].
    pub fn new(stream: &'a mut R) -> Result<BinaryReader<'a, R>, ReadError> {
        Self::with_options(stream, ReaderOptions::default())
    }

    pub fn with_options(
        stream: &'a mut R,
        options: ReaderOptions,
    ) -> Result<BinaryReader<'a, R>, ReadError> {
        if !stream.is_ready() {
            return Err(ReadError::NotReady);
        }

        Ok(BinaryReader {
            stream,
            position: 0,
            options,
        })
    }

    /// Number of bytes consumed since construction.
    #[inline(always)]
    pub fn position(&self) -> u64 {
        self.position
    }

    #[inline(always)]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Closes the underlying stream. The reader cannot be used afterwards.
    pub fn close(self) -> Result<(), ReadError> {
        let offset = self.position;
        tracing::debug!(offset = format_args!("{:#x}", offset), "closing stream");
        self.stream
            .close()
            .map_err(|source| ReadError::Io { offset, source })
    }

    /// Gives the stream back without closing it.
    pub fn into_inner(self) -> &'a mut R {
        self.stream
    }

    /// Skips `count` bytes.
    pub fn ignore(&mut self, count: usize) -> Result<(), ReadError> {
        let start = self.position;
        let needed = count as u64;
        let skipped = io::copy(&mut (&mut *self.stream).take(needed), &mut io::sink())
            .map_err(|source| ReadError::Io {
                offset: start,
                source,
            })?;
        self.position += skipped;

        tracing::debug!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", self.position),
            bytes = skipped,
            "ignored"
        );

        if skipped < needed {
            return Err(ReadError::ShortRead {
                offset: start,
                needed,
                available: skipped,
            });
        }
        Ok(())
    }

    /// Reads `count` raw bytes and decodes them as text.
    pub fn read_chars(&mut self, count: usize) -> Result<String, ReadError> {
        let start = self.position;
        let len = count as u64;
        self.check_text_len(start, len)?;
        let bytes = self.read_bytes(count)?;
        let text = self.decode_text(start, bytes)?;

        tracing::debug!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", self.position),
            len,
            "read chars"
        );
        Ok(text)
    }

    /// Reads a `u32` byte length followed by that many bytes of text.
    pub fn read_string(&mut self) -> Result<String, ReadError> {
        let start = self.position;
        let len = self.read_u32()?;
        self.check_text_len(start, u64::from(len))?;
        let bytes = self.read_bytes(len as usize)?;
        let text = self.decode_text(start, bytes)?;

        tracing::debug!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", self.position),
            len,
            "read string"
        );
        Ok(text)
    }

    /// Reads exactly `count` raw bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, ReadError> {
        let start = self.position;
        let mut buf = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        let result = (&mut *self.stream)
            .take(count as u64)
            .read_to_end(&mut buf);
        self.position += buf.len() as u64;

        if let Err(source) = result {
            return Err(ReadError::Io {
                offset: start,
                source,
            });
        }

        if buf.len() < count {
            return Err(ReadError::ShortRead {
                offset: start,
                needed: count as u64,
                available: buf.len() as u64,
            });
        }
        Ok(buf)
    }

    pub fn read_bool(&mut self) -> Result<bool, ReadError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i8(&mut self) -> Result<i8, ReadError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_i16(&mut self) -> Result<i16, ReadError> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_i16(&buf))
    }

    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_u16(&buf))
    }

    pub fn read_i32(&mut self) -> Result<i32, ReadError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_i32(&buf))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    pub fn read_i64(&mut self) -> Result<i64, ReadError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_i64(&buf))
    }

    pub fn read_u64(&mut self) -> Result<u64, ReadError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_u64(&buf))
    }

    /// Reads a single precision float from its raw bits.
    pub fn read_f32(&mut self) -> Result<f32, ReadError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads a double precision float from its raw bits.
    pub fn read_f64(&mut self) -> Result<f64, ReadError> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        let start = self.position;
        let mut filled = 0;

        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    self.position += filled as u64;
                    return Err(ReadError::Io {
                        offset: start,
                        source,
                    });
                }
            }
        }
        self.position += filled as u64;

        if filled < buf.len() {
            return Err(ReadError::ShortRead {
                offset: start,
                needed: buf.len() as u64,
                available: filled as u64,
            });
        }

        tracing::trace!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", self.position),
            bytes = filled,
            "read field"
        );
        Ok(())
    }

    fn check_text_len(&self, offset: u64, len: u64) -> Result<(), ReadError> {
        match self.options.max_string_len {
            Some(limit) if len > u64::from(limit) => {
                Err(ReadError::StringTooLong { offset, len, limit })
            }
            _ => Ok(()),
        }
    }

    fn decode_text(&self, offset: u64, bytes: Vec<u8>) -> Result<String, ReadError> {
        match self.options.text_encoding {
            TextEncoding::Utf8 => {
                String::from_utf8(bytes).map_err(|source| ReadError::InvalidText { offset, source })
            }
            TextEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &mut Cursor<Vec<u8>>) -> BinaryReader<'_, Cursor<Vec<u8>>> {
        BinaryReader::new(data).unwrap()
    }

    #[test]
    fn integers() {
        let mut data = Cursor::new(vec![
            0xff, // i8
            0xfe, // u8
            0x34, 0x12, // u16
            0xfe, 0xff, // i16
            0x78, 0x56, 0x34, 0x12, // u32
            0xff, 0xff, 0xff, 0x7f, // i32
            0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // u64
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, // i64
        ]);
        let mut r = reader(&mut data);

        assert_eq!(r.read_i8().unwrap(), -1);
        assert_eq!(r.read_u8().unwrap(), 0xfe);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(r.read_i32().unwrap(), i32::MAX);
        assert_eq!(r.read_u64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(r.read_i64().unwrap(), i64::MIN);
        assert_eq!(r.position(), 30);
    }

    #[test]
    fn floats_from_bits() {
        let mut bytes = 0x3F80_0000u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0x3FF0_0000_0000_0000u64.to_le_bytes());
        bytes.extend_from_slice(&0x7FC0_0001u32.to_le_bytes());
        let mut data = Cursor::new(bytes);
        let mut r = reader(&mut data);

        assert_eq!(r.read_f32().unwrap(), 1.0f32);
        assert_eq!(r.read_f64().unwrap(), 1.0f64);

        // NaN payloads come through untouched.
        let nan = r.read_f32().unwrap();
        assert!(nan.is_nan());
        assert_eq!(nan.to_bits(), 0x7FC0_0001);
    }

    #[test]
    fn strings() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.push(b'x');
        bytes.extend_from_slice(&65536u32.to_le_bytes());
        bytes.extend(std::iter::repeat(b'a').take(65536));
        let mut data = Cursor::new(bytes);
        let mut r = reader(&mut data);

        assert_eq!(r.read_string().unwrap(), "");
        assert_eq!(r.read_string().unwrap(), "x");
        let long = r.read_string().unwrap();
        assert_eq!(long.len(), 65536);
        assert!(long.bytes().all(|b| b == b'a'));
        assert_eq!(r.position(), 4 + 5 + 4 + 65536);
    }

    #[test]
    fn chars() {
        let mut data = Cursor::new(b"BOXhello".to_vec());
        let mut r = reader(&mut data);

        assert_eq!(r.read_chars(3).unwrap(), "BOX");
        assert_eq!(r.read_chars(0).unwrap(), "");
        assert_eq!(r.read_chars(5).unwrap(), "hello");
    }

    #[test]
    fn ignore_skips_exactly() {
        let mut data = Cursor::new(vec![1, 2, 3, 4, 5]);
        let mut r = reader(&mut data);

        r.ignore(3).unwrap();
        assert_eq!(r.position(), 3);
        assert_eq!(r.read_u8().unwrap(), 4);
        r.ignore(0).unwrap();
        assert_eq!(r.read_u8().unwrap(), 5);
    }

    #[test]
    fn ignore_past_end() {
        let mut data = Cursor::new(vec![1, 2]);
        let mut r = reader(&mut data);

        match r.ignore(4) {
            Err(ReadError::ShortRead {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 0);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn short_reads() {
        let mut data = Cursor::new(vec![0x01, 0x02, 0x03]);
        let mut r = reader(&mut data);
        assert!(r.read_u32().unwrap_err().is_short_read());
        // the stream is exhausted after a short read
        assert_eq!(r.position(), 3);
        assert!(r.read_u8().unwrap_err().is_short_read());

        let mut data = Cursor::new(vec![]);
        let mut r = reader(&mut data);
        assert!(r.read_i8().unwrap_err().is_short_read());
        assert!(r.read_f64().unwrap_err().is_short_read());
        assert!(r.read_chars(1).unwrap_err().is_short_read());
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn short_string_prefix_and_body() {
        let mut data = Cursor::new(vec![0x05, 0x00]);
        assert!(reader(&mut data).read_string().unwrap_err().is_short_read());

        let mut bytes = 10u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        let mut data = Cursor::new(bytes);
        let mut r = reader(&mut data);
        match r.read_string() {
            Err(ReadError::ShortRead {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 4);
                assert_eq!(needed, 10);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn huge_prefix_does_not_allocate() {
        let mut data = Cursor::new(u32::MAX.to_le_bytes().to_vec());
        assert!(reader(&mut data).read_string().unwrap_err().is_short_read());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn chars_beyond_u32_are_short_reads() {
        let mut data = Cursor::new(vec![1, 2, 3]);
        let mut r = reader(&mut data);
        match r.read_chars(u32::MAX as usize + 1) {
            Err(ReadError::ShortRead {
                needed, available, ..
            }) => {
                assert_eq!(needed, u32::MAX as u64 + 1);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn string_limit() {
        let mut bytes = 8u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"too long");
        let mut data = Cursor::new(bytes);
        let options = ReaderOptions::new().max_string_len(4);
        let mut r = BinaryReader::with_options(&mut data, options).unwrap();

        match r.read_string() {
            Err(ReadError::StringTooLong { len, limit, .. }) => {
                assert_eq!(len, 8);
                assert_eq!(limit, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // only the prefix was consumed
        assert_eq!(r.position(), 4);
        assert!(matches!(
            r.read_chars(5),
            Err(ReadError::StringTooLong { len: 5, .. })
        ));
        assert_eq!(r.read_chars(4).unwrap(), "too ");
    }

    #[test]
    fn invalid_utf8() {
        let mut bytes = 2u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xc3, 0x28]);
        let mut data = Cursor::new(bytes);
        let err = reader(&mut data).read_string().unwrap_err();
        assert!(matches!(err, ReadError::InvalidText { offset: 0, .. }));
    }

    #[test]
    fn latin1_maps_raw_bytes() {
        let mut data = Cursor::new(vec![0x41, 0xe9, 0xff]);
        let options = ReaderOptions::new().text_encoding(TextEncoding::Latin1);
        let mut r = BinaryReader::with_options(&mut data, options).unwrap();
        assert_eq!(r.read_chars(3).unwrap(), "A\u{e9}\u{ff}");
    }

    #[test]
    fn bools() {
        let mut data = Cursor::new(vec![0, 1, 7]);
        let mut r = reader(&mut data);
        assert!(!r.read_bool().unwrap());
        assert!(r.read_bool().unwrap());
        assert!(r.read_bool().unwrap());
    }

    struct Unready;

    impl Read for Unready {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl ByteStream for Unready {
        fn is_ready(&self) -> bool {
            false
        }
    }

    #[test]
    fn rejects_unready_stream() {
        let mut stream = Unready;
        assert!(matches!(
            BinaryReader::new(&mut stream),
            Err(ReadError::NotReady)
        ));
    }

    #[derive(Default)]
    struct Tracked {
        data: Cursor<Vec<u8>>,
        closed: bool,
        fail_after: Option<u64>,
    }

    impl Read for Tracked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if let Some(limit) = self.fail_after {
                if self.data.position() >= limit {
                    return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
                }
            }
            let n = buf.len().min(1);
            self.data.read(&mut buf[..n])
        }
    }

    impl ByteStream for Tracked {
        fn close(&mut self) -> io::Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    #[test]
    fn close_forwards_to_stream() {
        let mut stream = Tracked {
            data: Cursor::new(vec![0x2a, 0x00]),
            ..Default::default()
        };
        let mut r = BinaryReader::new(&mut stream).unwrap();
        assert_eq!(r.read_u16().unwrap(), 42);
        r.close().unwrap();
        assert!(stream.closed);
    }

    #[test]
    fn into_inner_leaves_stream_open() {
        let mut stream = Tracked {
            data: Cursor::new(vec![1, 2]),
            ..Default::default()
        };
        let mut r = BinaryReader::new(&mut stream).unwrap();
        r.read_u8().unwrap();
        let inner = r.into_inner();
        assert!(!inner.closed);
        assert_eq!(inner.data.position(), 1);
    }

    #[test]
    fn byte_at_a_time_stream() {
        let mut stream = Tracked {
            data: Cursor::new(0xdead_beefu32.to_le_bytes().to_vec()),
            ..Default::default()
        };
        let mut r = BinaryReader::new(&mut stream).unwrap();
        assert_eq!(r.read_u32().unwrap(), 0xdead_beef);
    }

    #[test]
    fn io_errors_are_not_short_reads() {
        let mut stream = Tracked {
            data: Cursor::new(vec![1, 2, 3, 4]),
            closed: false,
            fail_after: Some(2),
        };
        let mut r = BinaryReader::new(&mut stream).unwrap();
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, ReadError::Io { offset: 0, .. }));
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn buffered_and_limited_streams() {
        let file = std::io::BufReader::new(Cursor::new(vec![9, 8, 7, 6]));
        let mut limited = file.take(2);
        let mut r = BinaryReader::new(&mut limited).unwrap();
        assert_eq!(r.read_u16().unwrap(), 0x0809);
        assert!(r.read_u8().unwrap_err().is_short_read());
    }
}
