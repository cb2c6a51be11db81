//! Tag assignment: breadth-first walk from the root, one nibble per level.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::error::HierarchyError;
use crate::hierarchy::{ClassNode, Hierarchy};
use crate::layout::{child_tag, is_descendant_of, MAX_CHILDREN, MAX_DEPTH, ROOT_TAG};
use crate::root::{resolve_root, RootPolicy};
use crate::Tag;

/// A tagged class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagEntry {
    pub name: String,
    pub tag: Tag,
    /// Tree depth (0 = root)
    pub depth: u8,
    /// Parent class (None for the root)
    pub parent: Option<String>,
}

/// A child-list entry whose class was re-parented by a later relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StaleEdge {
    pub base: String,
    pub class: String,
}

/// Ordered name ↔ tag mapping produced by [`assign_tags`].
///
/// Entries are kept in assignment order (root first, then breadth-first),
/// which is also the order the header lists them in.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TagTable {
    entries: Vec<TagEntry>,
    #[serde(skip)]
    name_to_idx: HashMap<String, usize>,
    #[serde(skip)]
    tag_to_idx: HashMap<Tag, usize>,
    stale_edges: Vec<StaleEdge>,
    unreached: Vec<String>,
}

impl TagTable {
    fn push(&mut self, entry: TagEntry) {
        let idx = self.entries.len();
        self.name_to_idx.insert(entry.name.clone(), idx);
        self.tag_to_idx.insert(entry.tag, idx);
        self.entries.push(entry);
    }

    /// Name → tag
    #[inline]
    pub fn tag_of(&self, name: &str) -> Option<Tag> {
        self.name_to_idx.get(name).map(|&i| self.entries[i].tag)
    }

    /// Tag → name
    #[inline]
    pub fn name_of(&self, tag: Tag) -> Option<&str> {
        self.tag_to_idx
            .get(&tag)
            .map(|&i| self.entries[i].name.as_str())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&TagEntry> {
        self.name_to_idx.get(name).map(|&i| &self.entries[i])
    }

    /// The root entry, if anything was tagged.
    #[inline]
    pub fn root(&self) -> Option<&TagEntry> {
        self.entries.first()
    }

    /// All entries in assignment order.
    #[inline]
    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Is `derived` the class `base` or one of its subclasses?
    ///
    /// Returns `None` if either name is untagged.
    pub fn is_subclass_of(&self, derived: &str, base: &str) -> Option<bool> {
        Some(is_descendant_of(self.tag_of(derived)?, self.tag_of(base)?))
    }

    /// Strict descendants of `name`, in assignment order.
    pub fn descendants_of(&self, name: &str) -> Vec<&TagEntry> {
        let Some(ancestor) = self.tag_of(name) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|e| e.tag != ancestor && is_descendant_of(e.tag, ancestor))
            .collect()
    }

    /// Child-list entries skipped because the class was re-parented.
    pub fn stale_edges(&self) -> &[StaleEdge] {
        &self.stale_edges
    }

    /// Classes not reachable from the root (other parentless trees).
    pub fn unreached(&self) -> &[String] {
        &self.unreached
    }
}

/// Assign a tag to every class reachable from `root`.
///
/// The child at zero-based index `i` of a node tagged `t` receives
/// `(t << 4) + i + 1`. Stale edges keep their slot index but are not
/// followed; the class is tagged through the parent its pointer names.
pub fn assign_tags(hierarchy: &Hierarchy, root: &str) -> Result<TagTable, HierarchyError> {
    let root_node = hierarchy
        .get(root)
        .ok_or_else(|| HierarchyError::UnknownRoot(root.to_string()))?;

    let mut table = TagTable::default();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&ClassNode, Tag, u8)> = VecDeque::new();

    table.push(TagEntry {
        name: root_node.name.clone(),
        tag: ROOT_TAG,
        depth: 0,
        parent: None,
    });
    visited.insert(root_node.name.as_str());
    queue.push_back((root_node, ROOT_TAG, 0));

    while let Some((node, tag, depth)) = queue.pop_front() {
        if node.children.len() > MAX_CHILDREN {
            return Err(HierarchyError::ChildCapacityExceeded {
                class: node.name.clone(),
                children: node.children.len(),
            });
        }

        for (index, child_name) in node.children.iter().enumerate() {
            let Some(child) = hierarchy.get(child_name) else {
                continue;
            };
            if node.is_stale_child(child) {
                table.stale_edges.push(StaleEdge {
                    base: node.name.clone(),
                    class: child.name.clone(),
                });
                continue;
            }
            if !visited.insert(child.name.as_str()) {
                let cycle = parent_cycle(hierarchy, &child.name)
                    .unwrap_or_else(|| vec![node.name.clone(), child.name.clone()]);
                return Err(HierarchyError::CyclicHierarchy { cycle });
            }

            let child_depth = depth + 1;
            if child_depth > MAX_DEPTH {
                return Err(HierarchyError::DepthExceeded {
                    class: child.name.clone(),
                    depth: child_depth as usize,
                });
            }

            let assigned = child_tag(tag, index);
            table.push(TagEntry {
                name: child.name.clone(),
                tag: assigned,
                depth: child_depth,
                parent: Some(node.name.clone()),
            });
            queue.push_back((child, assigned, child_depth));
        }
    }

    // Anything left over is either another tree or a loop of parent pointers.
    for node in hierarchy.nodes() {
        if visited.contains(node.name.as_str()) {
            continue;
        }
        if let Some(cycle) = parent_cycle(hierarchy, &node.name) {
            return Err(HierarchyError::CyclicHierarchy { cycle });
        }
        table.unreached.push(node.name.clone());
    }

    Ok(table)
}

/// Resolve the root and assign tags in one step.
pub fn tag_hierarchy(
    hierarchy: &Hierarchy,
    policy: RootPolicy,
    requested_root: Option<&str>,
) -> Result<TagTable, HierarchyError> {
    let root = resolve_root(hierarchy, policy, requested_root)?;
    assign_tags(hierarchy, root)
}

/// Follow parent pointers from `start`; if they loop, return the loop
/// closed on its first member (`A -> B -> A`).
fn parent_cycle(hierarchy: &Hierarchy, start: &str) -> Option<Vec<String>> {
    let mut path: Vec<&str> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut current = hierarchy.get(start)?;

    loop {
        let name = current.name.as_str();
        if let Some(&at) = position.get(name) {
            let mut cycle: Vec<String> = path[at..].iter().map(|s| s.to_string()).collect();
            cycle.push(name.to_string());
            return Some(cycle);
        }
        position.insert(name, path.len());
        path.push(name);
        current = hierarchy.get(current.parent.as_deref()?)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{ClassDecl, InheritancePolicy};
    use crate::layout::{depth_of, parent_of, sibling_index, LEVEL_BITS, LEVEL_MASK};

    fn build(relations: &[(&'static str, &'static str)]) -> Hierarchy {
        Hierarchy::from_relations(relations.iter().copied(), InheritancePolicy::Reject).unwrap()
    }

    fn order(table: &TagTable) -> Vec<(&str, Tag)> {
        table
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.tag))
            .collect()
    }

    #[test]
    fn small_tree_gets_expected_tags() {
        let h = build(&[("B", "A"), ("C", "A"), ("D", "B")]);
        let table = tag_hierarchy(&h, RootPolicy::Strict, None).unwrap();
        assert_eq!(order(&table), [("A", 1), ("B", 17), ("C", 18), ("D", 273)]);
    }

    #[test]
    fn shape_hierarchy_matches_hand_written_constants() {
        let decls = [
            ClassDecl::new("BaseShape"),
            ClassDecl::new("DynamicShape").with_base("BaseShape"),
            ClassDecl::new("Particle").with_base("DynamicShape"),
            ClassDecl::new("RigidShape").with_base("DynamicShape"),
            ClassDecl::new("Ball").with_base("RigidShape"),
            ClassDecl::new("Box").with_base("RigidShape"),
            ClassDecl::new("Line").with_base("BaseShape"),
        ];
        let h = Hierarchy::from_classes(&decls, InheritancePolicy::Reject).unwrap();
        let table = tag_hierarchy(&h, RootPolicy::Strict, None).unwrap();

        assert_eq!(table.tag_of("BaseShape"), Some(1));
        assert_eq!(table.tag_of("DynamicShape"), Some(17));
        assert_eq!(table.tag_of("Line"), Some(18));
        assert_eq!(table.tag_of("Particle"), Some(273));
        assert_eq!(table.tag_of("RigidShape"), Some(274));
        assert_eq!(table.tag_of("Ball"), Some(4385));
        assert_eq!(table.tag_of("Box"), Some(4386));

        assert_eq!(table.is_subclass_of("Ball", "DynamicShape"), Some(true));
        assert_eq!(table.is_subclass_of("Line", "DynamicShape"), Some(false));
        assert_eq!(table.is_subclass_of("Ghost", "BaseShape"), None);
        assert_eq!(table.name_of(4386), Some("Box"));

        let under_rigid: Vec<_> = table
            .descendants_of("RigidShape")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(under_rigid, ["Ball", "Box"]);
    }

    #[test]
    fn every_child_encodes_parent_and_index() {
        let h = build(&[
            ("B", "A"),
            ("C", "A"),
            ("D", "B"),
            ("E", "B"),
            ("F", "C"),
            ("G", "E"),
        ]);
        let table = tag_hierarchy(&h, RootPolicy::Strict, None).unwrap();
        assert_eq!(table.root().unwrap().tag, ROOT_TAG);

        for entry in table.entries() {
            let Some(parent) = &entry.parent else {
                assert_eq!(entry.tag, ROOT_TAG);
                assert_eq!(parent_of(entry.tag), None);
                continue;
            };
            let parent_tag = table.tag_of(parent).unwrap();
            let index = h
                .get(parent)
                .unwrap()
                .children
                .iter()
                .position(|c| c == &entry.name)
                .unwrap() as Tag;

            assert_eq!(entry.tag >> LEVEL_BITS, parent_tag);
            assert_eq!((entry.tag - 1) & LEVEL_MASK, index);
            assert_eq!(parent_of(entry.tag), Some(parent_tag));
            assert_eq!(sibling_index(entry.tag), Some(index as u8));
            assert_eq!(depth_of(entry.tag), entry.depth);
        }
    }

    #[test]
    fn single_class_is_tagged_one() {
        let decls = [ClassDecl::new("Alone")];
        let h = Hierarchy::from_classes(&decls, InheritancePolicy::Reject).unwrap();
        let table = tag_hierarchy(&h, RootPolicy::Strict, None).unwrap();
        assert_eq!(order(&table), [("Alone", 1)]);
    }

    #[test]
    fn fifteen_children_fit() {
        let names: Vec<String> = (0..MAX_CHILDREN).map(|i| format!("C{i}")).collect();
        let h = Hierarchy::from_relations(
            names.iter().map(|n| (n.as_str(), "Root")),
            InheritancePolicy::Reject,
        )
        .unwrap();
        let table = assign_tags(&h, "Root").unwrap();
        assert_eq!(table.tag_of("C14"), Some((1 << 4) + 15));
    }

    #[test]
    fn sixteen_children_overflow() {
        let names: Vec<String> = (0..=MAX_CHILDREN).map(|i| format!("C{i}")).collect();
        let h = Hierarchy::from_relations(
            names.iter().map(|n| (n.as_str(), "Root")),
            InheritancePolicy::Reject,
        )
        .unwrap();
        assert_eq!(
            assign_tags(&h, "Root").unwrap_err(),
            HierarchyError::ChildCapacityExceeded {
                class: "Root".into(),
                children: 16,
            }
        );
    }

    #[test]
    fn chain_deeper_than_tag_width_fails() {
        let names: Vec<String> = (0..=MAX_DEPTH as usize + 1).map(|i| format!("L{i}")).collect();
        let pairs: Vec<(&str, &str)> = names
            .windows(2)
            .map(|w| (w[1].as_str(), w[0].as_str()))
            .collect();
        let h = Hierarchy::from_relations(pairs, InheritancePolicy::Reject).unwrap();
        let err = assign_tags(&h, "L0").unwrap_err();
        assert_eq!(
            err,
            HierarchyError::DepthExceeded {
                class: format!("L{}", MAX_DEPTH + 1),
                depth: MAX_DEPTH as usize + 1,
            }
        );
    }

    #[test]
    fn detached_cycle_is_reported() {
        // Root tree A <- B, plus a loop X -> Y -> X hanging off nothing.
        let h = build(&[("B", "A"), ("X", "Y"), ("Y", "X")]);
        let err = tag_hierarchy(&h, RootPolicy::Strict, None).unwrap_err();
        match err {
            HierarchyError::CyclicHierarchy { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.contains(&"X".to_string()));
                assert!(cycle.contains(&"Y".to_string()));
            }
            other => panic!("Expected CyclicHierarchy, got: {:?}", other),
        }
    }

    #[test]
    fn repeated_relation_after_sibling_is_not_a_cycle() {
        let h = build(&[("B", "A"), ("C", "A"), ("B", "A")]);
        let table = tag_hierarchy(&h, RootPolicy::Strict, None).unwrap();
        assert_eq!(order(&table), [("A", 1), ("B", 17), ("C", 18)]);
    }

    #[test]
    fn other_trees_are_left_unreached() {
        let h = build(&[("B", "A"), ("Y", "X")]);
        let table = tag_hierarchy(&h, RootPolicy::Strict, Some("A")).unwrap();
        assert_eq!(order(&table), [("A", 1), ("B", 17)]);
        assert_eq!(table.unreached(), ["Y".to_string(), "X".to_string()]);
    }

    #[test]
    fn stale_edge_keeps_its_slot() {
        // Mixed first lists Left, then Right; Right wins as parent.
        let decls = [
            ClassDecl::new("Root"),
            ClassDecl::new("Left").with_base("Root"),
            ClassDecl::new("Right").with_base("Root"),
            ClassDecl::new("Mixed").with_base("Left").with_base("Right"),
            ClassDecl::new("Plain").with_base("Left"),
        ];
        let h = Hierarchy::from_classes(&decls, InheritancePolicy::LastWins).unwrap();
        let table = tag_hierarchy(&h, RootPolicy::Strict, None).unwrap();

        // Left = 17, Right = 18; Mixed tagged only under Right.
        assert_eq!(table.tag_of("Mixed"), Some((18 << 4) + 1));
        // Plain is Left's second child, slot 0 still belongs to Mixed.
        assert_eq!(table.tag_of("Plain"), Some((17 << 4) + 2));
        assert_eq!(
            table.stale_edges(),
            [StaleEdge {
                base: "Left".into(),
                class: "Mixed".into()
            }]
        );
    }

    #[test]
    fn assignment_is_deterministic() {
        let rels = [("B", "A"), ("C", "A"), ("D", "C"), ("E", "C")];
        let first = order(&tag_hierarchy(&build(&rels), RootPolicy::Strict, None).unwrap())
            .iter()
            .map(|(n, t)| (n.to_string(), *t))
            .collect::<Vec<_>>();
        let second = order(&tag_hierarchy(&build(&rels), RootPolicy::Strict, None).unwrap())
            .iter()
            .map(|(n, t)| (n.to_string(), *t))
            .collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    #[test]
    fn table_serializes_entries_in_order() {
        let h = build(&[("B", "A")]);
        let table = assign_tags(&h, "A").unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["entries"][0]["name"], "A");
        assert_eq!(json["entries"][1]["tag"], 17);
        assert!(json.get("name_to_idx").is_none());
    }
}
