// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Parent/child view over flat rows.
//!
//! The tree is an arena built once from the rows; its shape never changes
//! afterwards. Expansion lives outside it as a set of node keys, and filtering
//! produces a separate [`FilteredForest`] projection.

use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

use crate::{NodeIndex, NodeKey, Row, RowIndex};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("parent cycle through node {key}")]
    Cycle { key: NodeKey },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub key: NodeKey,
    pub row: RowIndex,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    pub level: usize,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeIndex>,
    index: HashMap<NodeKey, NodeIndex>,
    default_expanded_levels: usize,
}

impl Tree {
    /// Builds the forest. Rows whose parent is missing become roots; rows
    /// without a usable id, or repeating an earlier id, are skipped.
    pub fn build(
        rows: &[Row],
        id_field: &str,
        parent_id_field: &str,
        default_expanded_levels: usize,
    ) -> Result<Self, TreeError> {
        let mut nodes = Vec::with_capacity(rows.len());
        let mut index = HashMap::with_capacity(rows.len());
        let mut parent_keys = Vec::with_capacity(rows.len());

        for (position, row) in rows.iter().enumerate() {
            let Some(key) = row.get_path(id_field).and_then(NodeKey::from_value) else {
                warn!("tree row {position} has no usable {id_field:?}; skipped");
                continue;
            };
            if index.contains_key(&key) {
                warn!("tree row {position} repeats id {key}; skipped");
                continue;
            }
            index.insert(key.clone(), NodeIndex::new(nodes.len()));
            parent_keys.push(row.get_path(parent_id_field).and_then(NodeKey::from_value));
            nodes.push(TreeNode {
                key,
                row: RowIndex::new(position),
                parent: None,
                children: Vec::new(),
                level: 0,
            });
        }

        let parents = parent_keys
            .iter()
            .map(|key| key.as_ref().and_then(|key| index.get(key).copied()))
            .collect::<Vec<_>>();
        detect_cycle(&nodes, &parents)?;

        let mut roots = Vec::new();
        for (position, parent) in parents.iter().enumerate() {
            let child = NodeIndex::new(position);
            match parent {
                Some(parent) => {
                    nodes[position].parent = Some(*parent);
                    nodes[parent.get()].children.push(child);
                }
                None => roots.push(child),
            }
        }

        let mut stack = roots.iter().rev().map(|root| (*root, 0)).collect::<Vec<_>>();
        while let Some((node, level)) = stack.pop() {
            nodes[node.get()].level = level;
            stack.extend(
                nodes[node.get()]
                    .children
                    .iter()
                    .rev()
                    .map(|child| (*child, level + 1)),
            );
        }

        debug!("built tree: {} nodes, {} roots", nodes.len(), roots.len());
        Ok(Self {
            nodes,
            roots,
            index,
            default_expanded_levels,
        })
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    pub fn node(&self, index: NodeIndex) -> &TreeNode {
        &self.nodes[index.get()]
    }

    pub fn get(&self, key: &NodeKey) -> Option<&TreeNode> {
        self.index.get(key).map(|index| self.node(*index))
    }

    pub fn row_for(&self, key: &NodeKey) -> Option<RowIndex> {
        self.get(key).map(|node| node.row)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub const fn default_expanded_levels(&self) -> usize {
        self.default_expanded_levels
    }

    /// Keys of every node above the default expansion depth.
    pub fn default_expanded(&self) -> BTreeSet<NodeKey> {
        self.nodes
            .iter()
            .filter(|node| node.level < self.default_expanded_levels)
            .map(|node| node.key.clone())
            .collect()
    }

    /// Keys of nodes that have children.
    pub fn branch_keys(&self) -> BTreeSet<NodeKey> {
        self.nodes
            .iter()
            .filter(|node| !node.is_leaf())
            .map(|node| node.key.clone())
            .collect()
    }

    /// Keeps nodes that match or have a matching descendant. Kept nodes carry
    /// only their kept children.
    pub fn filter<P>(&self, predicate: P) -> FilteredForest
    where
        P: Fn(&TreeNode) -> bool,
    {
        let mut kept = vec![false; self.nodes.len()];
        for index in self.pre_order().into_iter().rev() {
            let node = self.node(index);
            let keep = predicate(node) || node.children.iter().any(|child| kept[child.get()]);
            kept[index.get()] = keep;
        }

        let keep = |indices: &[NodeIndex]| {
            indices
                .iter()
                .copied()
                .filter(|index| kept[index.get()])
                .collect::<Vec<_>>()
        };
        let children = self
            .nodes
            .iter()
            .zip(&kept)
            .map(|(node, is_kept)| if *is_kept { keep(&node.children) } else { Vec::new() })
            .collect();
        FilteredForest {
            roots: keep(&self.roots),
            kept,
            children,
        }
    }

    /// Every node, pre-order.
    fn pre_order(&self) -> Vec<NodeIndex> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = self.roots.iter().rev().copied().collect::<Vec<_>>();
        while let Some(index) = stack.pop() {
            out.push(index);
            stack.extend(self.node(index).children.iter().rev().copied());
        }
        out
    }

    /// The whole tree as a forest, as if every node matched.
    pub fn unfiltered(&self) -> FilteredForest {
        self.filter(|_| true)
    }
}

fn detect_cycle(nodes: &[TreeNode], parents: &[Option<NodeIndex>]) -> Result<(), TreeError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unseen,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unseen; nodes.len()];
    let mut path = Vec::new();
    for start in 0..nodes.len() {
        let mut current = Some(start);
        while let Some(position) = current {
            match marks[position] {
                Mark::Done => break,
                Mark::OnPath => {
                    return Err(TreeError::Cycle {
                        key: nodes[position].key.clone(),
                    });
                }
                Mark::Unseen => {
                    marks[position] = Mark::OnPath;
                    path.push(position);
                    current = parents[position].map(NodeIndex::get);
                }
            }
        }
        for position in path.drain(..) {
            marks[position] = Mark::Done;
        }
    }
    Ok(())
}

/// Ancestor-preserving projection of a [`Tree`], stored flat per node slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredForest {
    roots: Vec<NodeIndex>,
    kept: Vec<bool>,
    children: Vec<Vec<NodeIndex>>,
}

impl FilteredForest {
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Kept children of a node; empty for nodes outside the projection.
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.children
            .get(index.get())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, index: NodeIndex) -> bool {
        self.kept.get(index.get()).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.kept.iter().filter(|kept| **kept).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every node in the projection, pre-order, ignoring expansion.
    pub fn node_indices(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = self.roots.iter().rev().copied().collect::<Vec<_>>();
        while let Some(index) = stack.pop() {
            out.push(index);
            stack.extend(self.children(index).iter().rev().copied());
        }
        out
    }
}

/// A row as it appears on screen after flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleNode {
    pub node: NodeIndex,
    pub key: NodeKey,
    pub row: RowIndex,
    pub level: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Pre-order walk of the forest. Roots are always emitted; a node's children
/// only when its key is in `expanded`.
pub fn flatten(tree: &Tree, forest: &FilteredForest, expanded: &BTreeSet<NodeKey>) -> Vec<VisibleNode> {
    let mut out = Vec::new();
    let mut stack = forest.roots().iter().rev().copied().collect::<Vec<_>>();
    while let Some(index) = stack.pop() {
        let node = tree.node(index);
        let children = forest.children(index);
        let is_expanded = expanded.contains(&node.key);
        out.push(VisibleNode {
            node: index,
            key: node.key.clone(),
            row: node.row,
            level: node.level,
            has_children: !children.is_empty(),
            expanded: is_expanded,
        });
        if is_expanded {
            stack.extend(children.iter().rev().copied());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Tree, TreeError, flatten};
    use crate::{NodeIndex, NodeKey, Row, RowIndex, Value};
    use std::collections::BTreeSet;
    use std::thread;

    fn row(id: i64, parent: Option<i64>) -> Row {
        Row::new()
            .with("id", id)
            .with("parentId", parent)
            .with("name", format!("node-{id}"))
    }

    fn keys(tree: &Tree, nodes: &[super::VisibleNode]) -> Vec<i64> {
        nodes
            .iter()
            .map(|visible| match &tree.node(visible.node).key {
                NodeKey::Int(value) => *value,
                NodeKey::Text(_) => -1,
            })
            .collect()
    }

    #[test]
    fn roots_and_children_keep_input_order() {
        let rows = vec![
            row(1, None),
            row(2, Some(1)),
            row(3, None),
            row(4, Some(1)),
            row(5, Some(3)),
        ];
        let tree = Tree::build(&rows, "id", "parentId", 1).expect("tree builds");

        let roots = tree
            .roots()
            .iter()
            .map(|root| tree.node(*root).key.clone())
            .collect::<Vec<_>>();
        assert_eq!(roots, vec![NodeKey::Int(1), NodeKey::Int(3)]);

        let first = tree.get(&NodeKey::Int(1)).expect("node 1");
        let children = first
            .children
            .iter()
            .map(|child| tree.node(*child).key.clone())
            .collect::<Vec<_>>();
        assert_eq!(children, vec![NodeKey::Int(2), NodeKey::Int(4)]);
        assert!(tree.get(&NodeKey::Int(2)).expect("node 2").is_leaf());
    }

    #[test]
    fn child_listed_before_parent_is_still_attached() {
        let rows = vec![row(2, Some(1)), row(1, None)];
        let tree = Tree::build(&rows, "id", "parentId", 0).expect("tree builds");
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.get(&NodeKey::Int(2)).expect("node 2").level, 1);
    }

    #[test]
    fn unknown_parent_becomes_root() {
        let rows = vec![row(1, None), row(2, Some(99))];
        let tree = Tree::build(&rows, "id", "parentId", 1).expect("tree builds");
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.get(&NodeKey::Int(2)).expect("node 2").level, 0);
    }

    #[test]
    fn levels_follow_depth_and_drive_default_expansion() {
        let rows = vec![row(1, None), row(2, Some(1)), row(3, Some(2)), row(4, Some(3))];
        let tree = Tree::build(&rows, "id", "parentId", 2).expect("tree builds");
        let levels = tree.nodes().map(|node| node.level).collect::<Vec<_>>();
        assert_eq!(levels, vec![0, 1, 2, 3]);
        assert_eq!(
            tree.default_expanded(),
            BTreeSet::from([NodeKey::Int(1), NodeKey::Int(2)])
        );
    }

    #[test]
    fn self_parent_and_longer_cycles_are_rejected() {
        let own = vec![row(1, Some(1))];
        assert_eq!(
            Tree::build(&own, "id", "parentId", 1),
            Err(TreeError::Cycle {
                key: NodeKey::Int(1)
            })
        );

        let ring = vec![row(1, Some(3)), row(2, Some(1)), row(3, Some(2)), row(4, None)];
        assert!(matches!(
            Tree::build(&ring, "id", "parentId", 1),
            Err(TreeError::Cycle { .. })
        ));
    }

    #[test]
    fn rows_without_ids_and_duplicate_ids_are_skipped() {
        let rows = vec![
            row(1, None),
            Row::new().with("name", "orphan"),
            Row::new().with("id", 1).with("name", "dupe"),
        ];
        let tree = Tree::build(&rows, "id", "parentId", 1).expect("tree builds");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.row_for(&NodeKey::Int(1)), Some(RowIndex::new(0)));
    }

    #[test]
    fn filter_keeps_ancestors_of_matching_descendants() {
        let rows = vec![row(1, None), row(2, Some(1)), row(3, Some(2)), row(4, Some(1))];
        let tree = Tree::build(&rows, "id", "parentId", 0).expect("tree builds");

        let forest = tree.filter(|node| node.key == NodeKey::Int(3));
        assert_eq!(forest.roots().len(), 1);
        let root = forest.roots()[0];
        assert_eq!(tree.node(root).key, NodeKey::Int(1));
        assert_eq!(forest.children(root).len(), 1);
        let middle = forest.children(root)[0];
        assert_eq!(tree.node(middle).key, NodeKey::Int(2));
        assert_eq!(tree.node(forest.children(middle)[0]).key, NodeKey::Int(3));
        assert_eq!(forest.len(), 3);
        assert!(!forest.contains(NodeIndex::new(3)));
    }

    #[test]
    fn filter_prunes_non_matching_leaves_under_a_matching_parent() {
        let rows = vec![row(1, None), row(2, Some(1)), row(3, Some(1))];
        let tree = Tree::build(&rows, "id", "parentId", 0).expect("tree builds");
        let forest = tree.filter(|node| node.key != NodeKey::Int(3));
        assert_eq!(forest.children(forest.roots()[0]).len(), 1);
    }

    #[test]
    fn flatten_hides_collapsed_subtrees() {
        let rows = vec![row(1, None), row(2, Some(1)), row(3, Some(2)), row(4, None)];
        let tree = Tree::build(&rows, "id", "parentId", 1).expect("tree builds");
        let forest = tree.unfiltered();

        let collapsed = flatten(&tree, &forest, &BTreeSet::new());
        assert_eq!(keys(&tree, &collapsed), vec![1, 4]);

        let defaults = flatten(&tree, &forest, &tree.default_expanded());
        assert_eq!(keys(&tree, &defaults), vec![1, 2, 4]);
        assert!(defaults[0].has_children && defaults[0].expanded);
        assert!(defaults[1].has_children && !defaults[1].expanded);

        let everything = flatten(&tree, &forest, &tree.branch_keys());
        assert_eq!(keys(&tree, &everything), vec![1, 2, 3, 4]);
    }

    #[test]
    fn flatten_of_fully_expanded_tree_reaches_every_row() {
        let rows = vec![row(10, None), row(11, Some(10)), row(12, Some(11)), row(13, Some(99))];
        let tree = Tree::build(&rows, "id", "parentId", 0).expect("tree builds");
        let visible = flatten(&tree, &tree.unfiltered(), &tree.branch_keys());
        let mut reached = visible.iter().map(|node| node.row.get()).collect::<Vec<_>>();
        reached.sort_unstable();
        assert_eq!(reached, vec![0, 1, 2, 3]);
    }

    #[test]
    fn deep_chains_filter_and_flatten_on_a_small_stack() {
        let handle = thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let rows = (0..100_000_i64)
                    .map(|id| row(id, (id > 0).then(|| id - 1)))
                    .collect::<Vec<_>>();
                let tree = Tree::build(&rows, "id", "parentId", 0).expect("tree builds");
                let forest = tree.filter(|node| node.key == NodeKey::Int(99_999));
                let visible = flatten(&tree, &forest, &tree.branch_keys());
                (forest.len(), visible.len(), visible.last().map(|node| node.level))
            })
            .expect("spawn");
        let (kept, visible, deepest) = handle.join().expect("no stack overflow");
        assert_eq!(kept, 100_000);
        assert_eq!(visible, 100_000);
        assert_eq!(deepest, Some(99_999));
    }

    #[test]
    fn numeric_ids_link_to_string_parent_ids() {
        let rows = vec![
            Row::new().with("id", 1).with("name", "root"),
            Row::new().with("id", 2).with("parentId", "1"),
            Row::new().with("id", "3").with("parentId", 2),
        ];
        let tree = Tree::build(&rows, "id", "parentId", 1).expect("tree builds");
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.get(&NodeKey::Int(2)).expect("node 2").level, 1);
        assert_eq!(tree.get(&NodeKey::Int(3)).expect("node 3").level, 2);
    }

    #[test]
    fn text_ids_work_as_keys() {
        let rows = vec![
            Row::new().with("id", "repo").with("parentId", Value::Null),
            Row::new().with("id", "repo/svc").with("parentId", "repo"),
        ];
        let tree = Tree::build(&rows, "id", "parentId", 1).expect("tree builds");
        assert_eq!(tree.get(&NodeKey::from("repo/svc")).expect("svc").level, 1);
    }
}
