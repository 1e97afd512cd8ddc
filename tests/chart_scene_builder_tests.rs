use chart_embed::ChartError;
use chart_embed::api::{
    ChartConfig, ChartType, ElementConfig, PlotArea, SAMPLE_DATA_CAPTION, SceneStyle, SchemaKind,
    build_chart_scene, build_element_scene, resolve_chart_data,
};
use chart_embed::core::{Interpolation, SceneSize, SeriesPoint};
use chart_embed::render::{Color, LineStrokeStyle, Scene, SceneLayerKind};

fn scenario_points() -> Vec<SeriesPoint> {
    vec![
        SeriesPoint::new("Jan", 400.0),
        SeriesPoint::new("Feb", 300.0),
        SeriesPoint::new("Mar", 600.0),
    ]
}

fn element_size() -> SceneSize {
    SceneSize::from_millimeters(120.0, 80.0)
}

fn layer_texts(scene: &Scene, kind: SceneLayerKind) -> Vec<String> {
    scene
        .layer(kind)
        .map(|layer| layer.texts.iter().map(|text| text.text.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn bar_chart_has_axis_bars_and_labels() {
    let config = ChartConfig::default().with_chart_type(ChartType::Bar);
    let scene = build_chart_scene(&config, &scenario_points(), element_size()).expect("scene");

    let series = scene.layer(SceneLayerKind::Series).expect("series layer");
    assert_eq!(series.rects.len(), 3);

    let ticks = layer_texts(&scene, SceneLayerKind::Axis);
    assert_eq!(ticks.first().map(String::as_str), Some("0"));
    assert_eq!(ticks.last().map(String::as_str), Some("660"));

    let labels = layer_texts(&scene, SceneLayerKind::Labels);
    assert_eq!(labels.len(), 6);
    for category in ["Jan", "Feb", "Mar"] {
        assert!(labels.iter().any(|label| label == category), "{category}");
    }
    for value in ["400", "300", "600"] {
        assert!(labels.iter().any(|label| label == value), "{value}");
    }
}

#[test]
fn tallest_bar_reaches_its_share_of_the_axis() {
    let style = SceneStyle::default();
    let size = element_size();
    let plot = PlotArea::from_scene(size, &style).expect("plot");
    let config = ChartConfig::default();
    let scene = build_chart_scene(&config, &scenario_points(), size).expect("scene");

    let bars = &scene.layer(SceneLayerKind::Series).expect("series").rects;
    let tallest = bars
        .iter()
        .map(|bar| bar.height)
        .fold(f64::MIN, f64::max);
    assert!((tallest - plot.height() * 600.0 / 660.0).abs() <= 1e-6);
    for bar in bars {
        assert!((bar.y + bar.height - plot.bottom).abs() <= 1e-9);
    }
}

#[test]
fn grid_toggle_only_hides_grid_lines() {
    let points = scenario_points();
    let with_grid = build_chart_scene(&ChartConfig::default(), &points, element_size())
        .expect("scene");
    let without_grid = build_chart_scene(
        &ChartConfig::default().with_grid(false),
        &points,
        element_size(),
    )
    .expect("scene");

    let grid = with_grid.layer(SceneLayerKind::Grid).expect("grid");
    assert_eq!(grid.lines.len(), 5);
    assert!(grid
        .lines
        .iter()
        .all(|line| line.stroke_style == LineStrokeStyle::Dashed));
    assert!(without_grid.layer(SceneLayerKind::Grid).expect("grid").is_empty());
    assert_eq!(
        layer_texts(&with_grid, SceneLayerKind::Axis),
        layer_texts(&without_grid, SceneLayerKind::Axis)
    );
}

#[test]
fn line_chart_draws_markers_only_when_enabled() {
    let points = scenario_points();
    let config = ChartConfig::default()
        .with_chart_type(ChartType::Line)
        .with_interpolation(Interpolation::Monotone);
    let scene = build_chart_scene(&config, &points, element_size()).expect("scene");
    let series = scene.layer(SceneLayerKind::Series).expect("series");
    assert_eq!(series.paths.len(), 1);
    assert_eq!(series.paths[0].data.cubic_count(), 2);
    assert_eq!(
        scene.layer(SceneLayerKind::Markers).expect("markers").circles.len(),
        3
    );

    let hidden = build_chart_scene(&config.with_points(false), &points, element_size())
        .expect("scene");
    assert!(hidden.layer(SceneLayerKind::Markers).expect("markers").is_empty());
    assert_eq!(layer_texts(&hidden, SceneLayerKind::Labels).len(), 6);
}

#[test]
fn area_chart_fills_under_a_stroked_outline() {
    let config = ChartConfig::default().with_chart_type(ChartType::Area);
    let scene = build_chart_scene(&config, &scenario_points(), element_size()).expect("scene");
    let series = scene.layer(SceneLayerKind::Series).expect("series");

    assert_eq!(series.paths.len(), 2);
    let fill = &series.paths[0];
    assert!(fill.data.is_closed());
    assert_eq!(fill.data.cubic_count(), 2);
    let fill_color = fill.fill.expect("fill color");
    assert!((fill_color.alpha - 0.3).abs() <= 1e-9);
    assert!(series.paths[1].stroke.is_some());
}

#[test]
fn secondary_series_add_grouped_bars() {
    let points = vec![
        SeriesPoint::new("Jan", 400.0).with_secondary_a(240.0).with_secondary_b(100.0),
        SeriesPoint::new("Feb", 300.0).with_secondary_a(139.0),
    ];
    let scene = build_chart_scene(&ChartConfig::default(), &points, element_size())
        .expect("scene");
    let bars = &scene.layer(SceneLayerKind::Series).expect("series").rects;
    assert_eq!(bars.len(), 5);
    assert!(bars[0].x < bars[1].x && bars[1].x < bars[2].x);
    assert_eq!(bars[0].fill_color, Color::from_hex("#8884d8").expect("color"));
    assert_eq!(bars[1].fill_color, Color::from_hex("#82ca9d").expect("color"));
}

#[test]
fn negative_bars_collapse_onto_the_baseline() {
    let points = vec![SeriesPoint::new("a", -20.0), SeriesPoint::new("b", 10.0)];
    let scene = build_chart_scene(&ChartConfig::default(), &points, element_size())
        .expect("scene");
    let bars = &scene.layer(SceneLayerKind::Series).expect("series").rects;
    assert_eq!(bars[0].height, 0.0);
}

#[test]
fn pie_chart_draws_slices_labels_and_legend() {
    let points = vec![
        SeriesPoint::new("Jan", 400.0),
        SeriesPoint::new("Feb", 300.0),
        SeriesPoint::new("Mar", 600.0),
        SeriesPoint::new("Apr", 2.0),
    ];
    let config = ChartConfig::default().with_chart_type(ChartType::Pie);
    let scene = build_chart_scene(&config, &points, element_size()).expect("scene");

    let series = scene.layer(SceneLayerKind::Series).expect("series");
    assert_eq!(series.paths.len(), 4);
    assert!(series.paths.iter().all(|path| path.data.is_closed()));

    let percentages = layer_texts(&scene, SceneLayerKind::Labels);
    assert_eq!(percentages.len(), 3);
    assert!(percentages.iter().all(|label| label.ends_with('%')));

    let legend = scene.layer(SceneLayerKind::Legend).expect("legend");
    assert_eq!(legend.rects.len(), 4);
    assert_eq!(legend.texts.len(), 4);
    assert!(legend.texts[2].text.starts_with("Mar ("));
    assert!(scene.layer(SceneLayerKind::Axis).expect("axis").is_empty());
}

#[test]
fn single_slice_pie_is_a_circle() {
    let config = ChartConfig::default().with_chart_type(ChartType::Pie);
    let scene = build_chart_scene(&config, &[SeriesPoint::new("all", 5.0)], element_size())
        .expect("scene");
    let series = scene.layer(SceneLayerKind::Series).expect("series");
    assert_eq!(series.circles.len(), 1);
    assert!(series.paths.is_empty());
    assert_eq!(layer_texts(&scene, SceneLayerKind::Labels), vec!["100%"]);
}

#[test]
fn empty_and_tiny_inputs_are_rejected() {
    let config = ChartConfig::default();
    assert!(matches!(
        build_chart_scene(&config, &[], element_size()),
        Err(ChartError::InvalidData(_))
    ));
    assert!(build_chart_scene(&config, &scenario_points(), SceneSize::new(40.0, 30.0)).is_err());
    assert!(build_chart_scene(&config, &scenario_points(), SceneSize::new(0.0, 30.0)).is_err());
}

#[test]
fn long_category_names_are_truncated_to_the_band() {
    let points = vec![
        SeriesPoint::new("An extremely long category name for a narrow band", 1.0),
        SeriesPoint::new("b", 2.0),
        SeriesPoint::new("c", 3.0),
        SeriesPoint::new("d", 4.0),
    ];
    let scene = build_chart_scene(&ChartConfig::default(), &points, element_size())
        .expect("scene");
    let labels = layer_texts(&scene, SceneLayerKind::Labels);
    assert!(labels.iter().any(|label| label.ends_with('…')));
}

#[test]
fn sample_data_scenes_carry_a_caption() {
    let resolved = resolve_chart_data(SchemaKind::Chart, "not json", None);
    assert!(resolved.is_sample());
    let scene = build_element_scene(
        &resolved,
        &ElementConfig::default(),
        element_size(),
        &SceneStyle::default(),
    )
    .expect("scene");

    let overlay = layer_texts(&scene, SceneLayerKind::Overlay);
    assert_eq!(overlay, vec![SAMPLE_DATA_CAPTION.to_owned()]);
}
