//! decide whether freshly generated text has to be written
//!
//! Rewriting an unchanged file would touch its modification time and trigger needless
//! recompilation, so callers compare first.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Nothing has been written before
    Missing,
    /// The existing text differs
    Changed,
    Unchanged,
}

impl ChangeStatus {
    pub fn detect(new: &str, existing: Option<&str>) -> Self {
        match existing {
            None => Self::Missing,
            Some(existing) if existing == new => Self::Unchanged,
            Some(_) => Self::Changed,
        }
    }

    pub fn requires_write(self) -> bool {
        self != Self::Unchanged
    }
}

/// `true` unless `existing` is byte-for-byte equal to `new`
pub fn requires_write(new: &str, existing: Option<&str>) -> bool {
    ChangeStatus::detect(new, existing).requires_write()
}
