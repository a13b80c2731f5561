use std::io::{BufReader, Cursor, Read, Take};

/// A readable source of manifest bytes.
///
/// The stream is opened and owned by the caller. A [`BinaryReader`](super::BinaryReader)
/// only borrows it, checks [`is_ready`](ByteStream::is_ready) once on construction
/// and forwards [`close`](ByteStream::close) when it is itself closed.
pub trait ByteStream: Read {
    fn is_ready(&self) -> bool {
        true
    }

    fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl ByteStream for std::fs::File {}

impl ByteStream for &[u8] {}

impl<T: AsRef<[u8]>> ByteStream for Cursor<T> {}

impl<R: ByteStream> ByteStream for BufReader<R> {
    fn is_ready(&self) -> bool {
        self.get_ref().is_ready()
    }

    fn close(&mut self) -> std::io::Result<()> {
        self.get_mut().close()
    }
}

impl<R: ByteStream> ByteStream for Take<R> {
    fn is_ready(&self) -> bool {
        self.get_ref().is_ready()
    }

    fn close(&mut self) -> std::io::Result<()> {
        self.get_mut().close()
    }
}
