//! File identifiers.
//!
//! Every source file is identified by a 16-bit [`FileId`] so that it fits
//! into the high bits of a [`Span`](crate::span::Span). Ids are handed out
//! by a process-wide interner that maps ids to rooted paths and back. The
//! interner lives for the whole process and is never torn down; accesses
//! are serialized by a lock.

use std::collections::HashMap;
use std::num::NonZeroU16;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// The global file id interner.
static INTERNER: Lazy<RwLock<Interner>> = Lazy::new(|| {
    RwLock::new(Interner { to_id: HashMap::new(), from_id: Vec::new() })
});

struct Interner {
    to_id: HashMap<Arc<PathBuf>, FileId>,
    from_id: Vec<Option<Arc<PathBuf>>>,
}

/// Identifies a source file.
///
/// The id space is 16 bits wide and monotonically consumed; running out of
/// ids is a hard error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FileId(NonZeroU16);

impl FileId {
    /// Intern a rooted path, creating a new id if the path is seen for the
    /// first time.
    ///
    /// # Panics
    ///
    /// If the 16-bit id space is exhausted.
    pub fn intern(path: &Path) -> Self {
        let mut interner = INTERNER.write();
        if let Some(&id) = interner.to_id.get(&path.to_path_buf()) {
            return id;
        }

        let path = Arc::new(path.to_path_buf());
        let id = next_id(&interner);
        interner.to_id.insert(Arc::clone(&path), id);
        interner.from_id.push(Some(path));
        id
    }

    /// Create a fresh id that is not associated with a path.
    ///
    /// Used for anonymous sources such as test inputs and strings compiled
    /// on the fly. Each call consumes one id.
    ///
    /// # Panics
    ///
    /// If the 16-bit id space is exhausted.
    pub fn unique() -> Self {
        let mut interner = INTERNER.write();
        let id = next_id(&interner);
        interner.from_id.push(None);
        id
    }

    /// The path this id was interned with, if any.
    pub fn path(self) -> Option<PathBuf> {
        let interner = INTERNER.read();
        interner
            .from_id
            .get(usize::from(self.0.get() - 1))
            .and_then(|slot| slot.as_deref().cloned())
    }

    /// The underlying non-zero number.
    pub const fn into_raw(self) -> u16 {
        self.0.get()
    }

    /// Construct from the underlying number; zero yields `None`.
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match NonZeroU16::new(raw) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

/// The id the next interned file will receive.
fn next_id(interner: &Interner) -> FileId {
    let next = interner.from_id.len() + 1;
    let raw = u16::try_from(next).unwrap_or_else(|_| panic!("out of file ids"));
    FileId(NonZeroU16::new(raw).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let a = FileId::intern(Path::new("main.vel"));
        let b = FileId::intern(Path::new("main.vel"));
        assert_eq!(a, b);
        assert_eq!(a.path().as_deref(), Some(Path::new("main.vel")));
    }

    #[test]
    fn unique_ids_differ() {
        let a = FileId::unique();
        let b = FileId::unique();
        assert_ne!(a, b);
        assert_eq!(a.path(), None);
    }

    #[test]
    fn raw_round_trip() {
        let id = FileId::unique();
        assert_eq!(FileId::from_raw(id.into_raw()), Some(id));
        assert_eq!(FileId::from_raw(0), None);
    }
}
