//! Case-insensitive folder and file tree built from decoded manifest names.
//!
//! A [`Folder`] owns its children through [`Rc`], and every child keeps a
//! [`Weak`](std::rc::Weak) link back to its folder. Dropping the root handle
//! therefore frees the whole tree, while any node can still walk upwards to
//! rebuild its ancestry.
//!
//! Sibling names are compared ignoring case (see [`NameKey`]). What happens when
//! two siblings collide depends on the method used to add them:
//! [`Folder::insert_file`] and [`Folder::insert_subfolder`] replace and return
//! the previous node, while [`Folder::create_file`] and
//! [`Folder::create_subfolder`] refuse with [`TreeError::DuplicateName`].

use std::path::{Path, PathBuf};
use std::rc::Rc;

mod file;
mod folder;
mod name;

pub use self::file::File;
pub use self::folder::Folder;
pub use self::name::{Children, NameKey};

use crate::path::InvalidNameError;

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Name `{name}` already exists in `{}`.", .parent.display())]
    DuplicateName { parent: PathBuf, name: String },

    #[error("`{name}` was created for another folder than `{}`.", .parent.display())]
    ForeignParent { parent: PathBuf, name: String },

    #[error("Cannot add `{name}` to `{}` while its children are being viewed.", .parent.display())]
    ChildrenInUse { parent: PathBuf, name: String },

    #[error("Invalid name `{name}`.")]
    InvalidName {
        name: String,
        #[source]
        source: InvalidNameError,
    },
}

#[derive(Debug, Clone)]
pub enum Node {
    Folder(Rc<Folder>),
    File(Rc<File>),
}

impl Node {
    #[inline(always)]
    pub fn as_folder(&self) -> Option<&Rc<Folder>> {
        match self {
            Node::Folder(folder) => Some(folder),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn as_file(&self) -> Option<&Rc<File>> {
        match self {
            Node::File(file) => Some(file),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        match self {
            Node::Folder(folder) => folder.name(),
            Node::File(file) => file.name(),
        }
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        match self {
            Node::Folder(folder) => folder.path(),
            Node::File(file) => file.path(),
        }
    }
}
