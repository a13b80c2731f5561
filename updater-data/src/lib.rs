//! Data layer for update packages.
//!
//! Use [BinaryReader][BinaryReader] to decode manifest fields from a byte stream, and
//! [Folder][Folder] to model the decoded content as a case-insensitive tree.

pub mod convert;
pub mod path;
pub mod reader;
pub mod tree;
pub mod writer;

pub use convert::OverflowError;
pub use path::InvalidNameError;
pub use reader::{BinaryReader, ByteStream, ReadError, ReaderOptions, TextEncoding};
pub use tree::{Children, File, Folder, NameKey, Node, TreeError};
pub use writer::{BinaryWriter, WriteError};
