//! Root resolution: find the class the whole tag tree hangs from.

use serde::Deserialize;

use crate::error::HierarchyError;
use crate::hierarchy::Hierarchy;

/// How to pick the root when several classes have no base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootPolicy {
    /// More than one parentless class is an error.
    #[default]
    Strict,
    /// Take the last parentless class in discovery order.
    LastSeen,
}

/// Resolve the root of `hierarchy`.
///
/// An explicit `requested` root wins over `policy`; it must be declared and
/// must not have a base.
pub fn resolve_root<'h>(
    hierarchy: &'h Hierarchy,
    policy: RootPolicy,
    requested: Option<&str>,
) -> Result<&'h str, HierarchyError> {
    if let Some(name) = requested {
        let node = hierarchy
            .get(name)
            .ok_or_else(|| HierarchyError::UnknownRoot(name.to_string()))?;
        if let Some(parent) = &node.parent {
            return Err(HierarchyError::RootHasParent {
                root: name.to_string(),
                parent: parent.clone(),
            });
        }
        return Ok(node.name.as_str());
    }

    let candidates: Vec<&str> = hierarchy
        .nodes()
        .iter()
        .filter(|n| n.parent.is_none())
        .map(|n| n.name.as_str())
        .collect();

    match (candidates.as_slice(), policy) {
        ([], _) => Err(HierarchyError::NoRootFound),
        ([only], _) => Ok(*only),
        (many, RootPolicy::Strict) => Err(HierarchyError::AmbiguousRoot {
            candidates: many.iter().map(|s| s.to_string()).collect(),
        }),
        ([.., last], RootPolicy::LastSeen) => Ok(*last),
    }
}
