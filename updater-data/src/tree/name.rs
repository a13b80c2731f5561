use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::rc::Rc;

use unic_normal::StrNormalForm;

/// Case-insensitive ordering key for sibling names.
///
/// Names are NFC-normalised and lowercased, so `"Data"`, `"DATA"` and `"data"`
/// all map to the same key, as do composed and decomposed spellings of the
/// same accented name. The name as written stays on the node itself.
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NameKey(String);

impl NameKey {
    pub fn new(name: &str) -> NameKey {
        NameKey(name.nfc().flat_map(char::to_lowercase).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The children of one kind held by a folder, ordered by [`NameKey`].
#[derive(Debug)]
pub struct Children<T> {
    entries: BTreeMap<NameKey, Rc<T>>,
}

impl<T> Children<T> {
    pub(crate) fn new() -> Children<T> {
        Children {
            entries: BTreeMap::new(),
        }
    }

    /// Looks `name` up ignoring case.
    #[inline(always)]
    pub fn get(&self, name: &str) -> Option<&Rc<T>> {
        self.entries.get(&NameKey::new(name))
    }

    #[inline(always)]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&NameKey::new(name))
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the children in ascending case-insensitive order.
    pub fn iter(&self) -> btree_map::Values<'_, NameKey, Rc<T>> {
        self.entries.values()
    }

    pub(crate) fn insert(&mut self, name: &str, node: Rc<T>) -> Option<Rc<T>> {
        self.entries.insert(NameKey::new(name), node)
    }
}

impl<'a, T> IntoIterator for &'a Children<T> {
    type Item = &'a Rc<T>;
    type IntoIter = btree_map::Values<'a, NameKey, Rc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
