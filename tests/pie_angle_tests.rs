use std::f64::consts::{FRAC_PI_2, PI, TAU};

use approx::assert_relative_eq;
use chart_embed::ChartError;
use chart_embed::core::{PIE_LABEL_MIN_SHARE, Point2, allocate_pie_angles, polar_point};

#[test]
fn slices_are_proportional_and_contiguous() {
    let slices = allocate_pie_angles(&[400.0, 300.0, 600.0, 800.0]).expect("slices");
    let total = 2_100.0;

    assert_eq!(slices.len(), 4);
    assert_relative_eq!(slices[0].start_angle, 0.0);
    for pair in slices.windows(2) {
        assert_relative_eq!(pair[0].end_angle, pair[1].start_angle);
    }
    assert_relative_eq!(slices[2].sweep(), 600.0 / total * TAU, epsilon = 1e-12);
    assert_relative_eq!(slices[3].end_angle, TAU, epsilon = 1e-12);
}

#[test]
fn single_value_is_a_full_circle() {
    let slices = allocate_pie_angles(&[42.0]).expect("slices");
    assert!(slices[0].is_full_circle());
    assert_relative_eq!(slices[0].share, 1.0);
}

#[test]
fn negative_values_get_empty_slices() {
    let slices = allocate_pie_angles(&[10.0, -5.0, 10.0]).expect("slices");
    assert_relative_eq!(slices[1].sweep(), 0.0);
    assert!(!slices[1].show_label);
    assert_relative_eq!(slices[2].start_angle, PI);
}

#[test]
fn label_threshold_is_five_percent() {
    let slices = allocate_pie_angles(&[95.0, 5.0]).expect("slices");
    assert_relative_eq!(slices[1].share, PIE_LABEL_MIN_SHARE);
    assert!(slices[1].show_label);

    let slices = allocate_pie_angles(&[96.0, 3.9]).expect("slices");
    assert!(!slices[1].show_label);
}

#[test]
fn non_finite_or_empty_totals_are_rejected() {
    assert!(matches!(
        allocate_pie_angles(&[1.0, f64::INFINITY]),
        Err(ChartError::InvalidData(_))
    ));
    assert!(allocate_pie_angles(&[0.0, 0.0]).is_err());
}

#[test]
fn polar_point_grows_clockwise_in_screen_space() {
    let center = Point2::new(100.0, 100.0);
    let down = polar_point(center, 10.0, FRAC_PI_2);
    assert_relative_eq!(down.x, 100.0, epsilon = 1e-9);
    assert_relative_eq!(down.y, 110.0, epsilon = 1e-9);
}

#[test]
fn mid_angle_is_between_bounds() {
    let slices = allocate_pie_angles(&[1.0, 1.0]).expect("slices");
    assert_relative_eq!(slices[0].mid_angle(), FRAC_PI_2);
    assert_relative_eq!(slices[1].mid_angle(), PI + FRAC_PI_2);
}
