use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use super::{Folder, TreeError};
use crate::path;

/// A leaf entry of a [`Folder`].
#[derive(Debug)]
pub struct File {
    name: String,
    path: PathBuf,
    parent: Weak<Folder>,
}

impl File {
    /// Creates a file under `parent`. The file is not added to `parent.files()`
    /// until it is inserted.
    pub fn new<S: Into<String>>(name: S, parent: &Rc<Folder>) -> Result<Rc<File>, TreeError> {
        let name = name.into();
        path::validate_name(&name).map_err(|source| TreeError::InvalidName {
            name: name.clone(),
            source,
        })?;

        Ok(Rc::new(File {
            path: path::combine(parent.path(), &name),
            parent: Rc::downgrade(parent),
            name,
        }))
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The containing folder, or `None` once it has been dropped.
    #[inline(always)]
    pub fn parent(&self) -> Option<Rc<Folder>> {
        self.parent.upgrade()
    }

    pub(crate) fn is_child_of(&self, folder: &Folder) -> bool {
        std::ptr::eq(self.parent.as_ptr(), folder)
    }
}
