//! Subtree closure over a resolved tree, used for cascading deletes and for
//! refusing parent moves that would close a cycle.

use uuid::Uuid;

use crate::domain::{ResolvedMenuNode, ResolvedTree};
use crate::error::DomainError;

/// `target` followed by every transitive descendant, depth-first pre-order.
pub fn collect_subtree_ids(tree: &ResolvedTree, target: &Uuid) -> Result<Vec<Uuid>, DomainError> {
    let node = tree.find(target).ok_or(DomainError::MenuNotFound(*target))?;

    let mut ids = Vec::with_capacity(node.size());
    collect(node, &mut ids);
    Ok(ids)
}

/// Same as [`collect_subtree_ids`] without the target itself.
pub fn descendant_ids(tree: &ResolvedTree, target: &Uuid) -> Result<Vec<Uuid>, DomainError> {
    let mut ids = collect_subtree_ids(tree, target)?;
    ids.remove(0);
    Ok(ids)
}

fn collect(node: &ResolvedMenuNode, out: &mut Vec<Uuid>) {
    out.push(node.id());
    for child in &node.children {
        collect(child, out);
    }
}
