//! Identifier newtypes for the workbench core.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Index into `ExploreTree::nodes`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "NodeId(INVALID)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifier of a tab in a project's visuals panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

static NEXT_TAB_ID: AtomicU64 = AtomicU64::new(1);

impl TabId {
    pub fn next() -> Self {
        Self(NEXT_TAB_ID.fetch_add(1, Ordering::SeqCst))
    }
}

/// Identifier of a project, stable across reordering and closing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub u64);

static NEXT_PROJECT_ID: AtomicU64 = AtomicU64::new(1);

impl ProjectId {
    pub fn next() -> Self {
        Self(NEXT_PROJECT_ID.fetch_add(1, Ordering::SeqCst))
    }
}
