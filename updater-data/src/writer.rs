//! Encoding of manifest fields in the layout [`BinaryReader`](crate::BinaryReader) decodes.

use std::io::{Read, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::convert::{self, OverflowError};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Overflow(#[from] OverflowError),

    #[error("Failed to write stream.")]
    Io(#[from] std::io::Error),
}

pub struct BinaryWriter<'a, W: Write> {
    stream: &'a mut W,
    position: u64,
}

impl<'a, W: Write> BinaryWriter<'a, W> {
    pub fn new(stream: &'a mut W) -> BinaryWriter<'a, W> {
        BinaryWriter {
            stream,
            position: 0,
        }
    }

    /// Number of bytes written since construction.
    #[inline(always)]
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn flush(&mut self) -> Result<(), WriteError> {
        Ok(self.stream.flush()?)
    }

    /// Writes a `u32` byte length followed by the UTF-8 bytes of `value`.
    pub fn write_string(&mut self, value: &str) -> Result<(), WriteError> {
        let len = convert::to_u32(value.len())?;
        self.write_u32(len)?;
        self.write_chars(value)
    }

    /// Writes the bytes of `value` with no length prefix.
    pub fn write_chars(&mut self, value: &str) -> Result<(), WriteError> {
        self.write_bytes(value.as_bytes())
    }

    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), WriteError> {
        self.stream.write_all(value)?;
        self.position += value.len() as u64;
        Ok(())
    }

    /// Writes `count` zero bytes, the counterpart of [`BinaryReader::ignore`](crate::BinaryReader::ignore).
    pub fn write_padding(&mut self, count: usize) -> Result<(), WriteError> {
        std::io::copy(
            &mut std::io::repeat(0).take(count as u64),
            &mut *self.stream,
        )?;
        self.position += count as u64;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), WriteError> {
        self.write_u8(value as u8)
    }

    pub fn write_i8(&mut self, value: i8) -> Result<(), WriteError> {
        self.stream.write_i8(value)?;
        self.position += 1;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), WriteError> {
        self.stream.write_u8(value)?;
        self.position += 1;
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<(), WriteError> {
        self.stream.write_i16::<LittleEndian>(value)?;
        self.position += 2;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), WriteError> {
        self.stream.write_u16::<LittleEndian>(value)?;
        self.position += 2;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), WriteError> {
        self.stream.write_i32::<LittleEndian>(value)?;
        self.position += 4;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), WriteError> {
        self.stream.write_u32::<LittleEndian>(value)?;
        self.position += 4;
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<(), WriteError> {
        self.stream.write_i64::<LittleEndian>(value)?;
        self.position += 8;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<(), WriteError> {
        self.stream.write_u64::<LittleEndian>(value)?;
        self.position += 8;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), WriteError> {
        self.write_u32(value.to_bits())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), WriteError> {
        self.write_u64(value.to_bits())
    }
}
