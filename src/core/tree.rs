use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Mind-map node as stored in the element's data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TreeNode {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            children: Vec::new(),
            color: None,
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Rejects trees where an id appears more than once.
    pub fn validate(&self) -> ChartResult<()> {
        let mut seen = HashSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.id.as_str()) {
                return Err(ChartError::InvalidData(format!(
                    "tree node id `{}` appears more than once",
                    node.id
                )));
            }
            stack.extend(node.children.iter());
        }
        Ok(())
    }
}

/// Fixed box and spacing constants for the tree layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeLayoutMetrics {
    pub node_width: f64,
    pub node_height: f64,
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
}

impl Default for TreeLayoutMetrics {
    fn default() -> Self {
        Self {
            node_width: 120.0,
            node_height: 40.0,
            horizontal_gap: 60.0,
            vertical_gap: 20.0,
        }
    }
}

impl TreeLayoutMetrics {
    /// Horizontal distance between a parent's and a child's left edges.
    #[must_use]
    pub fn column_width(self) -> f64 {
        self.node_width + self.horizontal_gap
    }
}

/// Layout result for one node. `(x, y)` is the box's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode<'a> {
    pub node: &'a TreeNode,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub level: usize,
    pub children: Vec<PositionedNode<'a>>,
}

/// Axis-aligned bounds of a positioned subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl LayoutBounds {
    #[must_use]
    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.max_y - self.min_y
    }
}

impl PositionedNode<'_> {
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height * 0.5
    }

    #[must_use]
    pub fn bounds(&self) -> LayoutBounds {
        let own = LayoutBounds {
            min_x: self.x,
            min_y: self.y,
            max_x: self.x + self.width,
            max_y: self.y + self.height,
        };
        self.children.iter().fold(own, |acc, child| {
            let child = child.bounds();
            LayoutBounds {
                min_x: acc.min_x.min(child.min_x),
                min_y: acc.min_y.min(child.min_y),
                max_x: acc.max_x.max(child.max_x),
                max_y: acc.max_y.max(child.max_y),
            }
        })
    }

    /// Visits the subtree depth-first, parents before children.
    pub fn walk<'s>(&'s self, visit: &mut impl FnMut(&'s Self)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[must_use]
pub fn layout_tree(root: &TreeNode, x: f64, y: f64) -> PositionedNode<'_> {
    layout_tree_with(root, x, y, TreeLayoutMetrics::default())
}

/// Recursive left-to-right layout.
///
/// Children stack vertically one column to the right, their combined span
/// `n*node_height + (n-1)*vertical_gap` centered on the parent's center line.
///
/// Spacing only accounts for direct children, so sibling subtrees that each
/// fan out into several children can overlap in deeper columns.
#[must_use]
pub fn layout_tree_with(
    root: &TreeNode,
    x: f64,
    y: f64,
    metrics: TreeLayoutMetrics,
) -> PositionedNode<'_> {
    layout_level(root, x, y, 0, metrics)
}

fn layout_level(
    node: &TreeNode,
    x: f64,
    y: f64,
    level: usize,
    metrics: TreeLayoutMetrics,
) -> PositionedNode<'_> {
    let count = node.children.len();
    let mut children = Vec::with_capacity(count);
    if count > 0 {
        let total_height =
            count as f64 * metrics.node_height + (count - 1) as f64 * metrics.vertical_gap;
        let parent_center_y = y + metrics.node_height * 0.5;
        let start_y = parent_center_y - total_height * 0.5;
        let child_x = x + metrics.column_width();
        for (index, child) in node.children.iter().enumerate() {
            let child_y = start_y + index as f64 * (metrics.node_height + metrics.vertical_gap);
            children.push(layout_level(child, child_x, child_y, level + 1, metrics));
        }
    }

    PositionedNode {
        node,
        x,
        y,
        width: metrics.node_width,
        height: metrics.node_height,
        level,
        children,
    }
}
