// ============================================================================
// Access Core - Hierarchy Builder
// File: crates/access-core/src/services/hierarchy.rs
// ============================================================================
//! Rebuilds the multi-root menu tree from flat rows.
//!
//! The builder is pure: callers fetch menus, grants and features and hand
//! them over. Sibling order follows the input order, nothing is re-sorted.
//! A menu whose parent is not part of the input is promoted to a root, which
//! is what keeps grant-filtered listings complete.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{AccessMenu, FeatureView, Menu, ResolvedMenuNode, ResolvedTree};
use crate::error::DomainError;

#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    menus: Vec<Menu>,
    grants: HashMap<Uuid, AccessMenu>,
    features: Option<Vec<FeatureView>>,
}

impl HierarchyBuilder {
    pub fn new(menus: Vec<Menu>) -> Self {
        Self {
            menus,
            ..Self::default()
        }
    }

    /// Annotates each node with the role's access row, if any.
    pub fn with_grants(mut self, grants: Vec<AccessMenu>) -> Self {
        self.grants = grants.into_iter().map(|g| (g.menu_id, g)).collect();
        self
    }

    /// Attaches features to their menu; global ones are returned separately.
    pub fn with_features(mut self, features: Vec<FeatureView>) -> Self {
        self.features = Some(features);
        self
    }

    pub fn build(self) -> Result<ResolvedTree, DomainError> {
        let Self { menus, mut grants, features } = self;

        // Index, keeping the first row for a repeated id.
        let mut order: Vec<Uuid> = Vec::with_capacity(menus.len());
        let mut nodes: HashMap<Uuid, ResolvedMenuNode> = HashMap::with_capacity(menus.len());
        for menu in menus {
            let id = menu.id;
            if nodes.contains_key(&id) {
                warn!("Duplicate menu row {} ignored while building hierarchy", id);
                continue;
            }
            let mut node = ResolvedMenuNode::new(menu);
            node.access = grants.remove(&id);
            order.push(id);
            nodes.insert(id, node);
        }

        let mut global_features = Vec::new();
        for view in features.into_iter().flatten() {
            match view.feature.menu_id {
                None => global_features.push(view),
                Some(menu_id) => match nodes.get_mut(&menu_id) {
                    Some(node) => node.features.push(view),
                    None => debug!("Feature {} skipped: menu {} not in result set", view.feature.id, menu_id),
                },
            }
        }

        // Link every node to its parent, or promote it.
        let mut roots: Vec<Uuid> = Vec::new();
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for id in &order {
            match nodes.get(id).and_then(|n| n.menu.parent_id) {
                Some(parent_id) if nodes.contains_key(&parent_id) => {
                    children.entry(parent_id).or_default().push(*id);
                }
                Some(parent_id) => {
                    debug!("Menu {} promoted to root: parent {} not in result set", id, parent_id);
                    roots.push(*id);
                }
                None => roots.push(*id),
            }
        }

        let mut visited = HashSet::with_capacity(order.len());
        let mut tree = Vec::with_capacity(roots.len());
        for root in roots {
            tree.push(materialize(root, &mut nodes, &children, &mut visited)?);
        }

        // Anything left over hangs off a parent chain that never reaches a root.
        if let Some(id) = order.iter().find(|id| nodes.contains_key(id)) {
            warn!("Menu hierarchy contains a cycle through {}", id);
            return Err(DomainError::HierarchyCycle(*id));
        }

        Ok(ResolvedTree { tree, global_features })
    }
}

fn materialize(
    id: Uuid,
    nodes: &mut HashMap<Uuid, ResolvedMenuNode>,
    children: &HashMap<Uuid, Vec<Uuid>>,
    visited: &mut HashSet<Uuid>,
) -> Result<ResolvedMenuNode, DomainError> {
    if !visited.insert(id) {
        return Err(DomainError::HierarchyCycle(id));
    }
    let mut node = nodes.remove(&id).ok_or(DomainError::HierarchyCycle(id))?;
    if let Some(child_ids) = children.get(&id) {
        node.children.reserve(child_ids.len());
        for child in child_ids {
            node.children.push(materialize(*child, nodes, children, visited)?);
        }
    }
    Ok(node)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{CreateFeatureInput, CreateMenuInput, Feature, FeaturePermissions};

    pub(crate) fn menu(name: &str, parent_id: Option<Uuid>) -> Menu {
        Menu::new(
            CreateMenuInput {
                name: name.to_string(),
                parent_id,
                ..Default::default()
            },
            None,
            None,
        )
        .unwrap()
    }

    pub(crate) fn feature(name: &str, menu_id: Option<Uuid>) -> Feature {
        Feature::new(
            CreateFeatureInput {
                name: name.to_string(),
                menu_id,
                ..Default::default()
            },
            None,
        )
        .unwrap()
    }

    fn names(nodes: &[ResolvedMenuNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.menu.name.as_str()).collect()
    }

    #[test]
    fn test_builds_nested_tree_in_input_order() {
        let a = menu("A", None);
        let b = menu("B", Some(a.id));
        let c = menu("C", Some(b.id));
        let d = menu("D", Some(a.id));
        let e = menu("E", None);

        let resolved = HierarchyBuilder::new(vec![c.clone(), a.clone(), d.clone(), b.clone(), e.clone()])
            .build()
            .unwrap();

        assert_eq!(names(&resolved.tree), vec!["A", "E"]);
        assert_eq!(names(&resolved.tree[0].children), vec!["D", "B"]);
        assert_eq!(names(&resolved.tree[0].children[1].children), vec!["C"]);
        assert_eq!(resolved.node_count(), 5);
        assert!(resolved.global_features.is_empty());
    }

    #[test]
    fn test_every_menu_appears_exactly_once() {
        let a = menu("A", None);
        let b = menu("B", Some(a.id));
        let c = menu("C", Some(a.id));
        let d = menu("D", Some(c.id));
        let input = vec![a, b, c, d];
        let expected: HashSet<Uuid> = input.iter().map(|m| m.id).collect();

        let resolved = HierarchyBuilder::new(input).build().unwrap();
        let ids = resolved.menu_ids();

        assert_eq!(ids.len(), expected.len());
        assert_eq!(ids.into_iter().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn test_orphan_is_promoted_to_root() {
        let missing_parent = Uuid::new_v4();
        let orphan = menu("Orphan", Some(missing_parent));

        let resolved = HierarchyBuilder::new(vec![orphan.clone()]).build().unwrap();

        assert_eq!(resolved.tree.len(), 1);
        assert_eq!(resolved.tree[0].id(), orphan.id);
        assert!(resolved.tree[0].children.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_tree() {
        let resolved = HierarchyBuilder::new(Vec::new()).build().unwrap();
        assert!(resolved.tree.is_empty());
        assert_eq!(resolved.node_count(), 0);
    }

    #[test]
    fn test_two_node_cycle_is_rejected() {
        let mut a = menu("A", None);
        let b = menu("B", Some(a.id));
        a.parent_id = Some(b.id);

        let result = HierarchyBuilder::new(vec![a.clone(), b]).build();
        assert!(matches!(result, Err(DomainError::HierarchyCycle(id)) if id == a.id));
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let mut a = menu("A", None);
        a.parent_id = Some(a.id);
        let root = menu("Root", None);

        let result = HierarchyBuilder::new(vec![root, a.clone()]).build();
        assert!(matches!(result, Err(DomainError::HierarchyCycle(id)) if id == a.id));
    }

    #[test]
    fn test_descendant_of_cycle_is_rejected() {
        let mut a = menu("A", None);
        let b = menu("B", Some(a.id));
        a.parent_id = Some(b.id);
        let c = menu("C", Some(b.id));

        let result = HierarchyBuilder::new(vec![c, a, b]).build();
        assert!(matches!(result, Err(DomainError::HierarchyCycle(_))));
    }

    #[test]
    fn test_duplicate_rows_keep_first() {
        let a = menu("A", None);
        let mut renamed = a.clone();
        renamed.name = "A-again".to_string();

        let resolved = HierarchyBuilder::new(vec![a, renamed]).build().unwrap();
        assert_eq!(names(&resolved.tree), vec!["A"]);
    }

    #[test]
    fn test_features_attach_to_menus_and_globals_split_out() {
        let a = menu("A", None);
        let b = menu("B", Some(a.id));
        let hidden_menu = Uuid::new_v4();

        let views = vec![
            FeatureView::unscoped(feature("a-export", Some(a.id))),
            FeatureView::unscoped(feature("global-audit", None)),
            FeatureView::unscoped(feature("b-approve", Some(b.id))),
            FeatureView::unscoped(feature("a-import", Some(a.id))),
            FeatureView::unscoped(feature("invisible", Some(hidden_menu))),
        ];

        let resolved = HierarchyBuilder::new(vec![a, b])
            .with_features(views)
            .build()
            .unwrap();

        let root = &resolved.tree[0];
        let root_features: Vec<&str> = root.features.iter().map(|f| f.feature.name.as_str()).collect();
        assert_eq!(root_features, vec!["a-export", "a-import"]);
        assert_eq!(root.children[0].features.len(), 1);
        assert_eq!(resolved.global_features.len(), 1);
        assert_eq!(resolved.global_features[0].feature.name, "global-audit");
    }

    #[test]
    fn test_grants_annotate_nodes() {
        let role_id = Uuid::new_v4();
        let a = menu("A", None);
        let b = menu("B", Some(a.id));
        let grant = AccessMenu::new(role_id, b.id, None);

        let resolved = HierarchyBuilder::new(vec![a, b.clone()])
            .with_grants(vec![grant])
            .with_features(vec![FeatureView::scoped(
                feature("b-edit", Some(b.id)),
                FeaturePermissions::read_only(),
            )])
            .build()
            .unwrap();

        assert!(!resolved.tree[0].is_selected());
        let child = &resolved.tree[0].children[0];
        assert!(child.is_selected());
        assert!(child.features[0].is_granted());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let a = menu("A", None);
        let b = menu("B", Some(a.id));
        let c = menu("C", None);
        let input = vec![a, b, c];

        let first = HierarchyBuilder::new(input.clone()).build().unwrap();
        let second = HierarchyBuilder::new(input).build().unwrap();
        assert_eq!(first, second);
    }
}
