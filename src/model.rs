use serde::{Deserialize, Serialize};

/// Identifier reserved for the display-only node placed above the viewer.
pub const SYNTHETIC_ROOT_ID: &str = "sagenex-root";
pub const SYNTHETIC_ROOT_NAME: &str = "SAGENEX";

/// One person in the sponsor tree, as delivered by the backend.
///
/// The tree must be finite and acyclic. Nothing here checks that; a cyclic
/// structure cannot be built from owned children anyway, so the only way to
/// get one is through the data source itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub user_id: String,
    pub full_name: String,
    #[serde(rename = "packageUSD", default)]
    pub package_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_split_sponsor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_sponsor_id: Option<String>,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

/// The viewer's sponsor, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentNode {
    pub user_id: String,
    pub full_name: String,
}

/// Payload of the team tree endpoint. `tree` is rooted at the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeResponse {
    pub tree: TreeNode,
    #[serde(default)]
    pub parent: Option<ParentNode>,
}

impl TreeNode {
    pub fn new(user_id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            full_name: full_name.into(),
            package_usd: 0.0,
            is_split_sponsor: None,
            original_sponsor_id: None,
            children: Vec::new(),
        }
    }

    pub fn with_package(mut self, package_usd: f64) -> Self {
        self.package_usd = package_usd;
        self
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_synthetic_root(&self) -> bool {
        self.user_id == SYNTHETIC_ROOT_ID
    }

    /// Places `self` as the only child of the branded display root.
    pub fn with_synthetic_root(self) -> Self {
        TreeNode::new(SYNTHETIC_ROOT_ID, SYNTHETIC_ROOT_NAME).with_children(vec![self])
    }

    /// Inverse of [`TreeNode::with_synthetic_root`]. Trees that were never
    /// wrapped come back unchanged.
    pub fn strip_synthetic_root(self) -> Self {
        if self.is_synthetic_root() && self.children.len() == 1 {
            let mut children = self.children;
            return children.remove(0);
        }
        self
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Number of levels, counting this node as level one.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}
