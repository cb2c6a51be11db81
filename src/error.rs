//! Errors raised while building and tagging a hierarchy.

use crate::layout::{MAX_CHILDREN, MAX_DEPTH};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// Every class has a base: the relation set is empty or fully cyclic.
    #[error("no root class found: every class has a base")]
    NoRootFound,

    #[error("ambiguous root: {} classes have no base ({})", .candidates.len(), .candidates.join(", "))]
    AmbiguousRoot { candidates: Vec<String> },

    #[error("requested root '{0}' is not declared")]
    UnknownRoot(String),

    #[error("requested root '{root}' derives from '{parent}'")]
    RootHasParent { root: String, parent: String },

    #[error(
        "class '{class}' derives from both '{first}' and '{second}'; \
         multiple inheritance is not supported (set multiple_inheritance = \"last_wins\" to keep the last base)"
    )]
    MultipleInheritanceUnsupported {
        class: String,
        first: String,
        second: String,
    },

    /// The parent chain loops back on itself.
    #[error("cyclic hierarchy: {}", .cycle.join(" -> "))]
    CyclicHierarchy { cycle: Vec<String> },

    #[error("class '{class}' has {children} direct subclasses, at most {max} fit in one tag level", max = MAX_CHILDREN)]
    ChildCapacityExceeded { class: String, children: usize },

    #[error("class '{class}' sits at depth {depth}, at most {max} levels fit in a tag", max = MAX_DEPTH)]
    DepthExceeded { class: String, depth: usize },
}
