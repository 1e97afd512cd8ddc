use approx::assert_relative_eq;
use chart_embed::core::{
    BandScale, Interpolation, LinearScale, PathCommand, Point2, SeriesPoint, SeriesSlot,
    generate_area_path, generate_path, project_area_geometry, project_series_points,
};

fn three_points() -> [Point2; 3] {
    [
        Point2::new(50.0, 120.0),
        Point2::new(150.0, 160.0),
        Point2::new(250.0, 40.0),
    ]
}

#[test]
fn monotone_area_emits_one_cubic_per_pair_and_closes_on_baseline() {
    let path = generate_area_path(&three_points(), Interpolation::Monotone, 200.0);

    assert_eq!(path.cubic_count(), 2);
    assert!(path.is_closed());
    let tail: Vec<PathCommand> = path.commands.iter().rev().skip(1).take(2).copied().collect();
    assert_eq!(tail[0], PathCommand::LineTo(Point2::new(50.0, 200.0)));
    assert_eq!(tail[1], PathCommand::LineTo(Point2::new(250.0, 200.0)));
    assert!(path.to_svg_d().starts_with("M50 120 C"));
}

#[test]
fn monotone_control_points_keep_endpoint_heights() {
    let path = generate_path(&three_points(), Interpolation::Monotone);
    let PathCommand::CubicTo {
        control1,
        control2,
        to,
    } = path.commands[1]
    else {
        panic!("expected a cubic segment");
    };
    assert_eq!(control1.y, 120.0);
    assert_eq!(control2.y, 160.0);
    assert_eq!(to, Point2::new(150.0, 160.0));
    assert!((control1.x - (50.0 + 100.0 / 3.0)).abs() <= 1e-9);
}

#[test]
fn curve_mode_passes_through_every_point() {
    let points = three_points();
    let path = generate_path(&points, Interpolation::Curve);
    assert_eq!(path.cubic_count(), 2);
    let ends: Vec<Point2> = path
        .commands
        .iter()
        .filter_map(|command| match command {
            PathCommand::MoveTo(point) => Some(*point),
            PathCommand::CubicTo { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(ends, points.to_vec());
}

#[test]
fn curve_controls_are_pinned_to_segment_heights() {
    let points = [
        Point2::new(0.0, 100.0),
        Point2::new(30.0, 0.0),
        Point2::new(60.0, 100.0),
    ];
    let path = generate_path(&points, Interpolation::Curve);

    let cubics: Vec<(Point2, Point2, Point2)> = path
        .commands
        .iter()
        .filter_map(|command| match *command {
            PathCommand::CubicTo {
                control1,
                control2,
                to,
            } => Some((control1, control2, to)),
            _ => None,
        })
        .collect();
    assert_eq!(cubics.len(), 2);
    for (pair, (control1, control2, to)) in points.windows(2).zip(cubics) {
        let third = (pair[1].x - pair[0].x) / 3.0;
        assert_eq!(control1.y, pair[0].y);
        assert_eq!(control2.y, pair[1].y);
        assert_relative_eq!(control1.x, pair[0].x + third);
        assert_relative_eq!(control2.x, pair[1].x - third);
        assert_eq!(to, pair[1]);
    }
    assert_eq!(path, generate_path(&points, Interpolation::Monotone));
}

#[test]
fn cubic_modes_fall_back_to_lines_below_three_points() {
    let points = [Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)];
    for mode in [Interpolation::Curve, Interpolation::Monotone] {
        let path = generate_path(&points, mode);
        assert_eq!(path.cubic_count(), 0, "{mode:?}");
        assert_eq!(path.line_count(), 1, "{mode:?}");
    }
}

#[test]
fn single_point_path_is_just_a_move() {
    let path = generate_path(&[Point2::new(3.0, 4.0)], Interpolation::Linear);
    assert_eq!(path.to_svg_d(), "M3 4");
}

#[test]
fn linear_mode_draws_straight_segments() {
    let path = generate_path(&three_points(), Interpolation::Linear);
    assert_eq!(path.line_count(), 2);
    assert_eq!(path.to_svg_d(), "M50 120 L150 160 L250 40");
}

#[test]
fn area_geometry_shares_the_outline_with_the_stroke() {
    let points = vec![
        SeriesPoint::new("Jan", 400.0),
        SeriesPoint::new("Feb", 300.0),
        SeriesPoint::new("Mar", 600.0),
    ];
    let bands = BandScale::new(0.0, 300.0, 3).expect("bands");
    let values = LinearScale::new(0.0, 660.0, 200.0, 0.0).expect("values");
    let projected = project_series_points(&points, SeriesSlot::A, bands, values);
    let geometry = project_area_geometry(&projected, Interpolation::Monotone, 200.0);

    assert_eq!(geometry.line.cubic_count(), 2);
    assert_eq!(geometry.fill.cubic_count(), 2);
    assert!(geometry.fill.is_closed());
    assert!(!geometry.line.is_closed());
    assert_eq!(
        geometry.fill.commands[..geometry.line.commands.len()],
        geometry.line.commands[..]
    );
}
