use std::f64::consts::TAU;

use chart_embed::core::{
    Interpolation, Point2, TreeNode, allocate_pie_angles, compute_axis_scale, generate_path,
    layout_tree,
};
use chart_embed::render::clamp_raster_size;
use proptest::prelude::*;

proptest! {
    #[test]
    fn axis_max_always_exceeds_the_observed_max(
        values in prop::collection::vec(0.001f64..1_000_000.0, 1..32)
    ) {
        let axis = compute_axis_scale(&values).expect("axis");
        let observed = values.iter().copied().fold(f64::MIN, f64::max);
        prop_assert!(axis.max >= observed * 1.1 - 1e-9);
        prop_assert!(axis.max < observed * 1.1 + 1.0);
        prop_assert_eq!(axis.max.fract(), 0.0);
        prop_assert_eq!(axis.grid_lines.len(), 5);
    }

    #[test]
    fn pie_sweeps_cover_the_full_circle(
        values in prop::collection::vec(0.0f64..10_000.0, 1..16),
        bump in 0.01f64..100.0
    ) {
        let mut values = values;
        values[0] += bump;
        let slices = allocate_pie_angles(&values).expect("slices");
        let total: f64 = slices.iter().map(|slice| slice.sweep()).sum();
        prop_assert!((total - TAU).abs() <= 1e-9);
        prop_assert!(slices.iter().all(|slice| slice.sweep() >= 0.0));
    }

    #[test]
    fn short_inputs_never_produce_cubics(
        ys in prop::collection::vec(-500.0f64..500.0, 0..3),
        mode_index in 0usize..4
    ) {
        let mode = [
            Interpolation::Linear,
            Interpolation::Step,
            Interpolation::Curve,
            Interpolation::Monotone,
        ][mode_index];
        let points: Vec<Point2> = ys
            .iter()
            .enumerate()
            .map(|(index, y)| Point2::new(index as f64 * 10.0, *y))
            .collect();
        let path = generate_path(&points, mode);
        prop_assert_eq!(path.cubic_count(), 0);
        prop_assert_eq!(path.line_count(), points.len().saturating_sub(1));
    }

    #[test]
    fn cubic_modes_emit_one_segment_per_pair(
        ys in prop::collection::vec(-500.0f64..500.0, 3..40)
    ) {
        let points: Vec<Point2> = ys
            .iter()
            .enumerate()
            .map(|(index, y)| Point2::new(index as f64 * 7.5, *y))
            .collect();
        for mode in [Interpolation::Curve, Interpolation::Monotone] {
            let path = generate_path(&points, mode);
            prop_assert_eq!(path.cubic_count(), points.len() - 1);
        }
    }

    #[test]
    fn children_stay_centered_on_their_parent(child_count in 1usize..12) {
        let root = (0..child_count).fold(TreeNode::new("root", "Root"), |root, index| {
            root.with_child(TreeNode::new(format!("c{index}"), "child"))
        });
        let positioned = layout_tree(&root, 0.0, 0.0);
        let first = positioned.children.first().expect("first child");
        let last = positioned.children.last().expect("last child");
        let mid = (first.center_y() + last.center_y()) * 0.5;
        prop_assert!((mid - positioned.center_y()).abs() <= 1e-9);
    }

    #[test]
    fn clamped_raster_keeps_aspect_ratio(
        width in 10.0f64..5_000.0,
        height in 10.0f64..5_000.0
    ) {
        let target = clamp_raster_size(width, height, 2.0, 1_200).expect("target");
        prop_assert!(target.width <= 1_200 && target.height <= 1_200);
        let expected_ratio = width / height;
        let actual_ratio = f64::from(target.width) / f64::from(target.height);
        let tolerance = 1.0 / f64::from(target.width.min(target.height)) * expected_ratio.max(1.0) * 2.0;
        prop_assert!((actual_ratio - expected_ratio).abs() <= tolerance + 1e-9);
    }
}
