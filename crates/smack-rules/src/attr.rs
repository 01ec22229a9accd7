//! Access to the Smack labels stored on filesystem objects.
//!
//! Files carry their labels in extended attributes. The rule database never
//! touches them; tools that label files go through [`AttributeStore`].

use crate::error::{Error, Result};
use crate::label::Label;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Value stored in the transmute attribute of a transmuting directory.
pub const TRANSMUTE_VALUE: &str = "TRUE";

/// The Smack attributes a filesystem object can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKind {
    /// Label of the object itself.
    Access,
    /// Label a process takes on when executing the file.
    Execute,
    /// Label required to map the file into memory.
    Mmap,
    /// Directory flag making new children inherit the directory label.
    Transmute,
}

impl AttributeKind {
    /// Every attribute kind, in display order.
    pub const ALL: [AttributeKind; 4] = [
        AttributeKind::Access,
        AttributeKind::Execute,
        AttributeKind::Mmap,
        AttributeKind::Transmute,
    ];

    /// Extended attribute name holding this label.
    pub fn xattr_name(self) -> &'static str {
        match self {
            AttributeKind::Access => "security.SMACK64",
            AttributeKind::Execute => "security.SMACK64EXEC",
            AttributeKind::Mmap => "security.SMACK64MMAP",
            AttributeKind::Transmute => "security.SMACK64TRANSMUTE",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Access => write!(f, "access"),
            AttributeKind::Execute => write!(f, "execute"),
            AttributeKind::Mmap => write!(f, "mmap"),
            AttributeKind::Transmute => write!(f, "transmute"),
        }
    }
}

/// Reads and writes Smack labels on paths.
///
/// `follow_symlinks` selects whether a symbolic link itself or its target is
/// labelled.
pub trait AttributeStore {
    /// Returns the label of `kind` on `path`, or `None` if it is not set.
    fn get_label(&self, path: &Path, kind: AttributeKind, follow_symlinks: bool)
    -> Result<Option<Label>>;

    /// Sets the label of `kind` on `path`.
    fn set_label(
        &mut self,
        path: &Path,
        kind: AttributeKind,
        follow_symlinks: bool,
        label: &Label,
    ) -> Result<()>;

    /// Removes the label of `kind` from `path`. Removing an unset label
    /// succeeds.
    fn remove_label(&mut self, path: &Path, kind: AttributeKind, follow_symlinks: bool)
    -> Result<()>;
}

/// An [`AttributeStore`] kept in memory.
///
/// Symbolic links are not modelled, so `follow_symlinks` has no effect.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttributeStore {
    labels: HashMap<(PathBuf, AttributeKind), Label>,
}

impl MemoryAttributeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every label set on `path`, in [`AttributeKind::ALL`] order.
    pub fn labels_of(&self, path: &Path) -> Vec<(AttributeKind, &Label)> {
        AttributeKind::ALL
            .iter()
            .filter_map(|kind| {
                self.labels
                    .get(&(path.to_path_buf(), *kind))
                    .map(|label| (*kind, label))
            })
            .collect()
    }
}

impl AttributeStore for MemoryAttributeStore {
    fn get_label(
        &self,
        path: &Path,
        kind: AttributeKind,
        _follow_symlinks: bool,
    ) -> Result<Option<Label>> {
        Ok(self.labels.get(&(path.to_path_buf(), kind)).cloned())
    }

    fn set_label(
        &mut self,
        path: &Path,
        kind: AttributeKind,
        _follow_symlinks: bool,
        label: &Label,
    ) -> Result<()> {
        if kind == AttributeKind::Transmute && label.as_str() != TRANSMUTE_VALUE {
            return Err(Error::InvalidLabel {
                label: label.to_string(),
            });
        }
        self.labels
            .insert((path.to_path_buf(), kind), label.clone());
        Ok(())
    }

    fn remove_label(
        &mut self,
        path: &Path,
        kind: AttributeKind,
        _follow_symlinks: bool,
    ) -> Result<()> {
        self.labels.remove(&(path.to_path_buf(), kind));
        Ok(())
    }
}
