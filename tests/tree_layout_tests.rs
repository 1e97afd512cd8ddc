use chart_embed::core::{TreeLayoutMetrics, TreeNode, layout_tree, layout_tree_with};

fn two_level_tree() -> TreeNode {
    TreeNode::new("root", "Root")
        .with_child(TreeNode::new("a", "A").with_child(TreeNode::new("a1", "A1")))
        .with_child(TreeNode::new("b", "B").with_child(TreeNode::new("b1", "B1")))
}

#[test]
fn children_are_symmetric_around_the_root_center() {
    let root = two_level_tree();
    let positioned = layout_tree(&root, 0.0, 0.0);

    let upper = &positioned.children[0];
    let lower = &positioned.children[1];
    let center = positioned.center_y();
    assert!((center - upper.center_y() - (lower.center_y() - center)).abs() <= 1e-9);
    assert!(upper.center_y() < center);
}

#[test]
fn grandchildren_sit_two_columns_from_the_root() {
    let root = two_level_tree();
    let metrics = TreeLayoutMetrics::default();
    let positioned = layout_tree(&root, 0.0, 0.0);

    for child in &positioned.children {
        assert_eq!(child.children.len(), 1);
        let grandchild = &child.children[0];
        assert_eq!(grandchild.level, 2);
        assert!((grandchild.x - positioned.x - 2.0 * metrics.column_width()).abs() <= 1e-9);
        assert!((grandchild.center_y() - child.center_y()).abs() <= 1e-9);
    }
}

#[test]
fn sibling_span_uses_the_vertical_gap() {
    let root = TreeNode::new("r", "R")
        .with_child(TreeNode::new("1", "1"))
        .with_child(TreeNode::new("2", "2"))
        .with_child(TreeNode::new("3", "3"));
    let metrics = TreeLayoutMetrics::default();
    let positioned = layout_tree_with(&root, 10.0, 100.0, metrics);

    let first = &positioned.children[0];
    let last = &positioned.children[2];
    let span = last.y + last.height - first.y;
    assert!((span - (3.0 * metrics.node_height + 2.0 * metrics.vertical_gap)).abs() <= 1e-9);
    assert!((positioned.children[1].center_y() - positioned.center_y()).abs() <= 1e-9);
    assert!((first.x - 10.0 - metrics.column_width()).abs() <= 1e-9);
}

#[test]
fn bounds_cover_every_node() {
    let root = two_level_tree();
    let positioned = layout_tree(&root, 0.0, 0.0);
    let bounds = positioned.bounds();

    let mut visited = 0;
    positioned.walk(&mut |node| {
        visited += 1;
        assert!(node.x >= bounds.min_x && node.x + node.width <= bounds.max_x);
        assert!(node.y >= bounds.min_y && node.y + node.height <= bounds.max_y);
    });
    assert_eq!(visited, root.node_count());
    assert!((bounds.width() - (2.0 * 180.0 + 120.0)).abs() <= 1e-9);
}

#[test]
fn custom_metrics_change_the_column_width() {
    let metrics = TreeLayoutMetrics {
        node_width: 80.0,
        node_height: 30.0,
        horizontal_gap: 20.0,
        vertical_gap: 10.0,
    };
    let root = two_level_tree();
    let positioned = layout_tree_with(&root, 0.0, 0.0, metrics);
    assert_eq!(positioned.children[0].x, 100.0);
    assert_eq!(positioned.children[0].children[0].x, 200.0);
}

#[test]
fn tree_json_accepts_missing_children() {
    let root: TreeNode =
        serde_json::from_str(r#"{"id":"r","text":"Root","children":[{"id":"c","text":"Leaf"}]}"#)
            .expect("tree json");
    assert_eq!(root.node_count(), 2);
    assert!(root.children[0].children.is_empty());
    assert!(root.validate().is_ok());
}
