use std::cell::{Ref, RefCell};
use std::path::{Component, Path, PathBuf};
use std::rc::{Rc, Weak};

use super::{Children, File, Node, TreeError};
use crate::path::{self, InvalidNameError};

/// A directory node.
///
/// `name`, `path` and the parent link are fixed at construction. Only the two
/// child maps grow afterwards.
#[derive(Debug)]
pub struct Folder {
    name: String,
    path: PathBuf,
    parent: Weak<Folder>,
    files: RefCell<Children<File>>,
    subfolders: RefCell<Children<Folder>>,
}

impl Folder {
    /// Creates a folder with no parent. Its path is `name` as given.
    pub fn root<S: Into<String>>(name: S) -> Result<Rc<Folder>, TreeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TreeError::InvalidName {
                name,
                source: InvalidNameError::Empty,
            });
        }

        Ok(Rc::new(Folder {
            path: PathBuf::from(&name),
            name,
            parent: Weak::new(),
            files: RefCell::new(Children::new()),
            subfolders: RefCell::new(Children::new()),
        }))
    }

    /// Creates a folder under `parent`, or a root when `parent` is `None`.
    ///
    /// The folder is not added to `parent.subfolders()` until it is inserted.
    pub fn new<S: Into<String>>(
        name: S,
        parent: Option<&Rc<Folder>>,
    ) -> Result<Rc<Folder>, TreeError> {
        let parent = match parent {
            Some(parent) => parent,
            None => return Folder::root(name),
        };

        let name = name.into();
        path::validate_name(&name).map_err(|source| TreeError::InvalidName {
            name: name.clone(),
            source,
        })?;

        Ok(Rc::new(Folder {
            path: path::combine(parent.path(), &name),
            name,
            parent: Rc::downgrade(parent),
            files: RefCell::new(Children::new()),
            subfolders: RefCell::new(Children::new()),
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

    /// The containing folder. `None` for a root, or once the parent has been dropped.
    #[inline(always)]
    pub fn parent(&self) -> Option<Rc<Folder>> {
        self.parent.upgrade()
    }

    /// Number of ancestors still reachable from this folder.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(folder) = current {
            depth += 1;
            current = folder.parent();
        }
        depth
    }

    /// A view of the files in this folder. Adding a file while the view is
    /// held fails with [`TreeError::ChildrenInUse`].
    pub fn files(&self) -> Ref<'_, Children<File>> {
        self.files.borrow()
    }

    /// A view of the subfolders of this folder. Adding a subfolder while the
    /// view is held fails with [`TreeError::ChildrenInUse`].
    pub fn subfolders(&self) -> Ref<'_, Children<Folder>> {
        self.subfolders.borrow()
    }

    #[inline(always)]
    pub fn file(&self, name: &str) -> Option<Rc<File>> {
        self.files.borrow().get(name).cloned()
    }

    #[inline(always)]
    pub fn subfolder(&self, name: &str) -> Option<Rc<Folder>> {
        self.subfolders.borrow().get(name).cloned()
    }

    /// Adds `file`, replacing any file whose name is equal ignoring case.
    ///
    /// Returns the replaced file. `file` must have been created for this folder.
    pub fn insert_file(&self, file: Rc<File>) -> Result<Option<Rc<File>>, TreeError> {
        if !file.is_child_of(self) {
            return Err(TreeError::ForeignParent {
                parent: self.path.clone(),
                name: file.name().to_string(),
            });
        }

        let name = file.name().to_string();
        let replaced = self
            .files
            .try_borrow_mut()
            .map_err(|_| self.in_use(&name))?
            .insert(&name, file);
        if let Some(old) = &replaced {
            tracing::debug!(folder = %self.path.display(), old = old.name(), new = %name, "replaced file");
        }
        Ok(replaced)
    }

    /// Adds `folder`, replacing any subfolder whose name is equal ignoring case.
    ///
    /// Returns the replaced folder. `folder` must have been created for this folder.
    pub fn insert_subfolder(&self, folder: Rc<Folder>) -> Result<Option<Rc<Folder>>, TreeError> {
        if !std::ptr::eq(folder.parent.as_ptr(), self) {
            return Err(TreeError::ForeignParent {
                parent: self.path.clone(),
                name: folder.name().to_string(),
            });
        }

        let name = folder.name().to_string();
        let replaced = self
            .subfolders
            .try_borrow_mut()
            .map_err(|_| self.in_use(&name))?
            .insert(&name, folder);
        if let Some(old) = &replaced {
            tracing::debug!(folder = %self.path.display(), old = old.name(), new = %name, "replaced subfolder");
        }
        Ok(replaced)
    }

    /// Creates and adds a file, refusing names already taken by another file.
    pub fn create_file(self: &Rc<Self>, name: &str) -> Result<Rc<File>, TreeError> {
        if self.files.borrow().contains(name) {
            return Err(self.duplicate(name));
        }

        let file = File::new(name, self)?;
        self.insert_file(Rc::clone(&file))?;
        Ok(file)
    }

    /// Creates and adds a subfolder, refusing names already taken by another subfolder.
    pub fn create_subfolder(self: &Rc<Self>, name: &str) -> Result<Rc<Folder>, TreeError> {
        if self.subfolders.borrow().contains(name) {
            return Err(self.duplicate(name));
        }

        let folder = Folder::new(name, Some(self))?;
        self.insert_subfolder(Rc::clone(&folder))?;
        Ok(folder)
    }

    /// Returns the subfolder called `name`, creating it first if needed.
    pub fn subfolder_or_create(self: &Rc<Self>, name: &str) -> Result<Rc<Folder>, TreeError> {
        match self.subfolder(name) {
            Some(folder) => Ok(folder),
            None => self.create_subfolder(name),
        }
    }

    /// Resolves `path` relative to this folder, ignoring case.
    ///
    /// The last component may name a file or a subfolder; subfolders win when
    /// both exist. `.` components are skipped, any other non-name component
    /// yields `None`. An empty path resolves to this folder.
    pub fn lookup<P: AsRef<Path>>(self: &Rc<Self>, path: P) -> Option<Node> {
        let mut names = vec![];
        for component in path.as_ref().components() {
            match component {
                Component::Normal(name) => names.push(name.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }

        let (last, parents) = match names.split_last() {
            Some(split) => split,
            None => return Some(Node::Folder(Rc::clone(self))),
        };

        let mut current = Rc::clone(self);
        for name in parents {
            current = current.subfolder(name)?;
        }

        if let Some(folder) = current.subfolder(last) {
            return Some(Node::Folder(folder));
        }
        current.file(last).map(Node::File)
    }

    /// Resolves a full `path` as reported by a node of this tree.
    ///
    /// `path` must start with this folder's own path.
    pub fn find<P: AsRef<Path>>(self: &Rc<Self>, path: P) -> Option<Node> {
        let relative = path.as_ref().strip_prefix(&self.path).ok()?;
        self.lookup(relative)
    }

    /// Every descendant, depth first.
    ///
    /// Within a folder, subfolders come first, each followed by its own
    /// descendants, then files. Siblings are in case-insensitive order.
    pub fn walk(&self) -> Vec<Node> {
        let mut out = vec![];
        self.walk_into(&mut out);
        out
    }

    fn walk_into(&self, out: &mut Vec<Node>) {
        for folder in self.subfolders.borrow().iter() {
            out.push(Node::Folder(Rc::clone(folder)));
            folder.walk_into(out);
        }
        for file in self.files.borrow().iter() {
            out.push(Node::File(Rc::clone(file)));
        }
    }

    /// Number of files in this folder and all of its descendants.
    pub fn file_count(&self) -> usize {
        self.files.borrow().len()
            + self
                .subfolders
                .borrow()
                .iter()
                .map(|folder| folder.file_count())
                .sum::<usize>()
    }

    fn in_use(&self, name: &str) -> TreeError {
        TreeError::ChildrenInUse {
            parent: self.path.clone(),
            name: name.to_string(),
        }
    }

    fn duplicate(&self, name: &str) -> TreeError {
        TreeError::DuplicateName {
            parent: self.path.clone(),
            name: name.to_string(),
        }
    }
}
