//! # Inheritance-Chain Class Tags (class-tag)
//!
//! Turns a single-inheritance class hierarchy into integer tags whose bits
//! spell out every ancestor, so "is X a Y?" becomes a shift and a compare.
//!
//! ## Design
//!
//! A `Tag` is a `u64`. The root is `1`; every level below it appends one
//! nibble holding the child's sibling index plus one:
//!
//! ```text
//! BaseShape      = 0b1                 // 1
//! DynamicShape   = 0b1_0001            // 17
//! Line           = 0b1_0010            // 18
//! RigidShape     = 0b1_0001_0010       // 274
//! Box            = 0b1_0001_0010_0010  // 4386
//! ```
//!
//! ## Pipeline
//!
//! ```ignore
//! use class_tag::{tag_hierarchy, ClassDecl, Hierarchy, InheritancePolicy, RootPolicy};
//!
//! let classes = [
//!     ClassDecl::new("BaseShape"),
//!     ClassDecl::new("Line").with_base("BaseShape"),
//! ];
//! let hierarchy = Hierarchy::from_classes(&classes, InheritancePolicy::Reject)?;
//! let tags = tag_hierarchy(&hierarchy, RootPolicy::Strict, None)?;
//! assert_eq!(tags.tag_of("Line"), Some(17));
//! ```
//!
//! Subclass checks need no table at all:
//!
//! ```ignore
//! use class_tag::is_descendant_of;
//!
//! assert!(is_descendant_of(4386, 17)); // Box is a DynamicShape
//! ```

pub mod assign;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod root;

pub use assign::{assign_tags, tag_hierarchy, StaleEdge, TagEntry, TagTable};
pub use error::HierarchyError;
pub use hierarchy::{ClassDecl, ClassNode, Hierarchy, HierarchyBuilder, InheritancePolicy, Relation};
pub use layout::{
    child_tag, depth_of, is_descendant_of, is_valid_tag, parent_of, sibling_index, LEVEL_BITS,
    LEVEL_MASK, MAX_CHILDREN, MAX_DEPTH, ROOT_TAG, TAG_BITS,
};
pub use root::{resolve_root, RootPolicy};

/// Class tag: the root marker bit followed by one 4-bit slot per ancestor edge.
pub type Tag = u64;
