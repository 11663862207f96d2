// src/tree.rs

use tracing::debug;

use crate::error::{HuffError, Result};
use crate::frequency::FrequencyTable;

/// Longest code a `CodeEntry` can hold.
pub const MAX_CODE_BITS: u32 = 64;

/// A node of the prefix-code tree. Left edges are 0 bits, right edges 1 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn leaf(symbol: u8, weight: u64) -> Self {
        TreeNode::Leaf { symbol, weight }
    }

    pub fn merge(left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Subtree frequency. Trees read back from a stream weigh 0.
    pub fn weight(&self) -> u64 {
        match self {
            TreeNode::Leaf { weight, .. } | TreeNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> u32 {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// `(symbol, depth)` of every leaf in pre-order. Two trees with the same
    /// list have the same shape and the same symbols in the same places.
    pub fn leaf_depths(&self) -> Vec<(u8, u32)> {
        fn walk(node: &TreeNode, depth: u32, out: &mut Vec<(u8, u32)>) {
            match node {
                TreeNode::Leaf { symbol, .. } => out.push((*symbol, depth)),
                TreeNode::Internal { left, right, .. } => {
                    walk(left, depth + 1, out);
                    walk(right, depth + 1, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(self, 0, &mut out);
        out
    }
}

/// Builds the prefix tree for `freqs`, or `None` when no symbol occurs.
///
/// Leaves are stable-sorted by descending frequency, so equal frequencies
/// keep ascending symbol order. The two lightest nodes sit at the tail of
/// the sorted list: the last becomes the right child, the one before it the
/// left child. The merged node is reinserted after every node at least as
/// heavy as itself.
pub fn build_tree(freqs: &FrequencyTable) -> Result<Option<TreeNode>> {
    let mut nodes: Vec<TreeNode> = (0..=u8::MAX)
        .map(|symbol| TreeNode::leaf(symbol, freqs.count(symbol)))
        .collect();
    nodes.sort_by(|a, b| b.weight().cmp(&a.weight()));
    let present = nodes.partition_point(|node| node.weight() > 0);
    nodes.truncate(present);

    while let Some(right) = nodes.pop() {
        let Some(left) = nodes.pop() else {
            nodes.push(right);
            break;
        };
        let merged = TreeNode::merge(left, right);
        let at = nodes.partition_point(|node| node.weight() >= merged.weight());
        nodes.insert(at, merged);
    }

    let root = nodes.pop();
    if let Some(root) = &root {
        let depth = root.depth();
        if depth > MAX_CODE_BITS {
            return Err(HuffError::malformed(format!(
                "longest code is {} bits, limit is {}",
                depth, MAX_CODE_BITS
            )));
        }
        debug!(leaves = root.leaf_count(), depth, weight = root.weight(), "built prefix tree");
    }
    Ok(root)
}
