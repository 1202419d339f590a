//! Resolved (in-memory) menu tree. Built per request, never persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use access_shared::PaginationMeta;

use super::{AccessMenu, Feature, FeaturePermissions, Menu};

/// A feature as shown in a resolved tree.
///
/// `permissions` is `None` for unscoped reads; for role-scoped reads it holds
/// the role's flags, all false when the role has no grant on the feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureView {
    #[serde(flatten)]
    pub feature: Feature,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub permissions: Option<FeaturePermissions>,
}

impl FeatureView {
    pub fn unscoped(feature: Feature) -> Self {
        Self { feature, permissions: None }
    }

    pub fn scoped(feature: Feature, permissions: FeaturePermissions) -> Self {
        Self { feature, permissions: Some(permissions) }
    }

    pub fn is_granted(&self) -> bool {
        self.permissions.is_some_and(|p| p.has_any())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMenuNode {
    #[serde(flatten)]
    pub menu: Menu,
    /// The role's grant on this menu, for role-scoped reads.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub access: Option<AccessMenu>,
    pub features: Vec<FeatureView>,
    pub children: Vec<ResolvedMenuNode>,
}

impl ResolvedMenuNode {
    pub fn new(menu: Menu) -> Self {
        Self {
            menu,
            access: None,
            features: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.menu.id
    }

    pub fn is_selected(&self) -> bool {
        self.access.is_some()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ResolvedMenuNode::size).sum::<usize>()
    }
}

/// Resolved forest plus the global (menu-less) features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTree {
    pub tree: Vec<ResolvedMenuNode>,
    pub global_features: Vec<FeatureView>,
}

impl ResolvedTree {
    pub fn node_count(&self) -> usize {
        self.tree.iter().map(ResolvedMenuNode::size).sum()
    }

    /// Menu ids in depth-first pre-order.
    pub fn menu_ids(&self) -> Vec<Uuid> {
        fn walk(node: &ResolvedMenuNode, out: &mut Vec<Uuid>) {
            out.push(node.id());
            for child in &node.children {
                walk(child, out);
            }
        }

        let mut ids = Vec::with_capacity(self.node_count());
        for root in &self.tree {
            walk(root, &mut ids);
        }
        ids
    }

    pub fn find(&self, menu_id: &Uuid) -> Option<&ResolvedMenuNode> {
        fn search<'a>(nodes: &'a [ResolvedMenuNode], menu_id: &Uuid) -> Option<&'a ResolvedMenuNode> {
            nodes.iter().find_map(|node| {
                if node.id() == *menu_id {
                    Some(node)
                } else {
                    search(&node.children, menu_id)
                }
            })
        }

        search(&self.tree, menu_id)
    }
}

/// Page of the flat menu listing, assembled into a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuPage {
    #[serde(flatten)]
    pub resolved: ResolvedTree,
    pub pagination: PaginationMeta,
}

/// Row counts touched by a cascading menu deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtreeDeletion {
    pub menus: u64,
    pub features: u64,
    pub access_menus: u64,
    pub access_features: u64,
}
