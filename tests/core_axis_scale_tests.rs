use chart_embed::ChartError;
use chart_embed::core::{
    BandScale, LinearScale, SeriesPoint, all_series_values, compute_axis_scale,
    compute_axis_scale_with, format_axis_value,
};

#[test]
fn axis_max_adds_ten_percent_headroom_and_rounds_up() {
    let points = vec![
        SeriesPoint::new("Jan", 400.0),
        SeriesPoint::new("Feb", 300.0),
        SeriesPoint::new("Mar", 600.0),
    ];
    let axis = compute_axis_scale(&all_series_values(&points)).expect("axis");
    assert_eq!(axis.max, 660.0);
    assert_eq!(axis.grid_lines.first().copied(), Some(0.0));
    assert_eq!(axis.grid_lines.last().copied(), Some(660.0));
}

#[test]
fn secondary_series_participate_in_the_axis_max() {
    let points = vec![
        SeriesPoint::new("a", 10.0).with_secondary_a(50.0),
        SeriesPoint::new("b", 20.0).with_secondary_b(91.0),
    ];
    let axis = compute_axis_scale(&all_series_values(&points)).expect("axis");
    assert_eq!(axis.max, (91.0f64 * 1.1).ceil());
}

#[test]
fn fractional_max_rounds_to_next_integer() {
    let axis = compute_axis_scale(&[0.5]).expect("axis");
    assert_eq!(axis.max, 1.0);
    let axis = compute_axis_scale(&[7.0]).expect("axis");
    assert_eq!(axis.max, 8.0);
}

#[test]
fn all_negative_series_fall_back_to_unit_axis() {
    let axis = compute_axis_scale(&[-5.0, -1.0]).expect("axis");
    assert_eq!(axis.max, 1.0);
    assert_eq!(axis.grid_lines.len(), 5);
}

#[test]
fn grid_values_are_evenly_spaced() {
    let axis = compute_axis_scale_with(&[90.0], 4).expect("axis");
    assert_eq!(axis.max, 99.0);
    assert_eq!(axis.grid_lines, vec![0.0, 33.0, 66.0, 99.0]);
}

#[test]
fn invalid_axis_inputs_are_rejected() {
    assert!(matches!(
        compute_axis_scale(&[1.0, f64::NAN]),
        Err(ChartError::InvalidData(_))
    ));
    assert!(compute_axis_scale_with(&[1.0], 1).is_err());
    assert!(compute_axis_scale(&[]).is_err());
}

#[test]
fn linear_scale_maps_value_axis_upward() {
    let scale = LinearScale::new(0.0, 660.0, 300.0, 20.0).expect("scale");
    assert!((scale.to_pixel(0.0) - 300.0).abs() <= 1e-9);
    assert!((scale.to_pixel(660.0) - 20.0).abs() <= 1e-9);
    assert!((scale.to_domain(160.0) - 330.0).abs() <= 1e-9);
}

#[test]
fn band_scale_centers_categories() {
    let bands = BandScale::new(40.0, 300.0, 3).expect("bands");
    assert!((bands.band_width() - 100.0).abs() <= 1e-9);
    assert!((bands.center(0) - 90.0).abs() <= 1e-9);
    assert!((bands.center(2) - 290.0).abs() <= 1e-9);
}

#[test]
fn degenerate_scales_are_rejected() {
    assert!(LinearScale::new(5.0, 5.0, 0.0, 100.0).is_err());
    assert!(BandScale::new(0.0, 100.0, 0).is_err());
}

#[test]
fn axis_labels_are_compact() {
    assert_eq!(format_axis_value(660.0), "660");
    assert_eq!(format_axis_value(0.25), "0.25");
}
