//! Hierarchy model: a name-indexed class tree built from inheritance relations.
//!
//! [`HierarchyBuilder`] consumes the relation stream once and is then frozen
//! into an immutable [`Hierarchy`] snapshot that root resolution and tag
//! assignment only ever read.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::HierarchyError;

/// One class declaration as discovered by a front-end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    /// Direct bases, in source order.
    pub bases: Vec<String>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    /// The (derived, base) edges this declaration contributes.
    pub fn relations(&self) -> impl Iterator<Item = Relation<'_>> {
        self.bases.iter().map(|base| Relation {
            derived: &self.name,
            base,
        })
    }
}

/// A single inheritance edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Relation<'a> {
    pub derived: &'a str,
    pub base: &'a str,
}

/// What to do when a class names more than one distinct base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritancePolicy {
    /// Fail with [`HierarchyError::MultipleInheritanceUnsupported`].
    #[default]
    Reject,
    /// Keep only the last base as the parent. Earlier bases keep the class
    /// in their child list as a stale edge.
    LastWins,
}

/// A node of the class tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassNode {
    pub name: String,
    /// Direct subclasses in discovery order.
    pub children: Vec<String>,
    pub parent: Option<String>,
}

impl ClassNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// True if `child` sits in this node's child list but its parent
    /// pointer names a different class.
    pub fn is_stale_child(&self, child: &ClassNode) -> bool {
        child.parent.as_deref() != Some(self.name.as_str())
    }
}

/// Incremental builder fed from the relation stream.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    policy: InheritancePolicy,
    nodes: Vec<ClassNode>,
    index: HashMap<String, usize>,
}

impl HierarchyBuilder {
    pub fn new(policy: InheritancePolicy) -> Self {
        Self {
            policy,
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Ensure a node named `name` exists, returning its index.
    pub fn declare(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(ClassNode::new(name));
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Record that `derived` inherits from `base`.
    pub fn ingest(&mut self, derived: &str, base: &str) -> Result<(), HierarchyError> {
        let derived_idx = self.declare(derived);
        let base_idx = self.declare(base);

        if let Some(existing) = &self.nodes[derived_idx].parent
            && existing != base
            && self.policy == InheritancePolicy::Reject
        {
            return Err(HierarchyError::MultipleInheritanceUnsupported {
                class: derived.to_string(),
                first: existing.clone(),
                second: base.to_string(),
            });
        }

        let siblings = &mut self.nodes[base_idx].children;
        if !siblings.iter().any(|c| c == derived) {
            siblings.push(derived.to_string());
        }
        self.nodes[derived_idx].parent = Some(base.to_string());
        Ok(())
    }

    /// Declare a class and ingest each of its bases in order.
    pub fn add_class(&mut self, decl: &ClassDecl) -> Result<(), HierarchyError> {
        self.declare(&decl.name);
        for rel in decl.relations() {
            self.ingest(rel.derived, rel.base)?;
        }
        Ok(())
    }

    /// Freeze into an immutable snapshot.
    pub fn finish(self) -> Hierarchy {
        Hierarchy {
            nodes: self.nodes,
            index: self.index,
        }
    }
}

/// Immutable class tree, nodes kept in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
    nodes: Vec<ClassNode>,
    index: HashMap<String, usize>,
}

impl Hierarchy {
    /// Build a hierarchy from a stream of declarations.
    pub fn from_classes<'a>(
        classes: impl IntoIterator<Item = &'a ClassDecl>,
        policy: InheritancePolicy,
    ) -> Result<Self, HierarchyError> {
        let mut builder = HierarchyBuilder::new(policy);
        for decl in classes {
            builder.add_class(decl)?;
        }
        Ok(builder.finish())
    }

    /// Build a hierarchy from bare (derived, base) pairs.
    pub fn from_relations<'a>(
        relations: impl IntoIterator<Item = (&'a str, &'a str)>,
        policy: InheritancePolicy,
    ) -> Result<Self, HierarchyError> {
        let mut builder = HierarchyBuilder::new(policy);
        for (derived, base) in relations {
            builder.ingest(derived, base)?;
        }
        Ok(builder.finish())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&ClassNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All nodes in first-seen order.
    #[inline]
    pub fn nodes(&self) -> &[ClassNode] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
