use chart_embed::api::{ChartConfig, ChartType, build_chart_scene};
use chart_embed::core::{SceneSize, SeriesPoint};
use chart_embed::render::{
    Color, LinePrimitive, LineStrokeStyle, RectPrimitive, Scene, SceneLayerKind, TextHAlign,
    TextPrimitive,
};

#[test]
fn document_reports_the_scene_size() {
    let scene = Scene::new(SceneSize::new(320.0, 180.5)).with_background(Color::WHITE);
    let document = scene.to_vector_document().expect("document");

    assert_eq!(document.width, 320.0);
    assert_eq!(document.height, 180.5);
    assert!(document.svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"320\" height=\"180.5\""));
    assert!(document.svg.contains("<rect x=\"0\" y=\"0\" width=\"320\" height=\"180.5\" fill=\"#ffffff\"/>"));
    assert!(document.svg.ends_with("</svg>"));
}

#[test]
fn layers_serialize_in_paint_order() {
    let mut scene = Scene::new(SceneSize::new(100.0, 100.0));
    scene.push_text(
        SceneLayerKind::Labels,
        TextPrimitive::new("top", 10.0, 10.0, 12.0, Color::BLACK, TextHAlign::Left),
    );
    scene.push_line(
        SceneLayerKind::Grid,
        LinePrimitive::new(0.0, 50.0, 100.0, 50.0, 1.0, Color::BLACK)
            .with_stroke_style(LineStrokeStyle::Dashed),
    );
    let svg = scene.to_vector_document().expect("document").svg;

    let grid = svg.find("data-layer=\"Grid\"").expect("grid group");
    let labels = svg.find("data-layer=\"Labels\"").expect("labels group");
    assert!(grid < labels);
    assert!(svg.contains("stroke-dasharray=\"3 3\""));
    assert!(!svg.contains("data-layer=\"Series\""));
}

#[test]
fn translucent_fills_emit_opacity() {
    let mut scene = Scene::new(SceneSize::new(50.0, 50.0));
    scene.push_rect(
        SceneLayerKind::Series,
        RectPrimitive::new(0.0, 0.0, 10.0, 10.0, Color::rgb(1.0, 0.0, 0.0).with_alpha(0.3))
            .with_corner_radius(2.0),
    );
    let svg = scene.to_vector_document().expect("document").svg;
    assert!(svg.contains("fill=\"#ff0000\" fill-opacity=\"0.3\""));
    assert!(svg.contains("rx=\"2\" ry=\"2\""));
}

#[test]
fn text_is_escaped_and_bold_is_kept() {
    let mut scene = Scene::new(SceneSize::new(50.0, 50.0));
    scene.push_text(
        SceneLayerKind::Labels,
        TextPrimitive::new("R&D <1>", 25.0, 25.0, 11.0, Color::BLACK, TextHAlign::Center).bold(),
    );
    let svg = scene.to_vector_document().expect("document").svg;
    assert!(svg.contains("text-anchor=\"middle\""));
    assert!(svg.contains("font-weight=\"bold\">R&amp;D &lt;1&gt;</text>"));
}

#[test]
fn invalid_primitives_fail_serialization() {
    let mut scene = Scene::new(SceneSize::new(50.0, 50.0));
    scene.push_rect(
        SceneLayerKind::Series,
        RectPrimitive::new(0.0, 0.0, -1.0, 10.0, Color::BLACK),
    );
    assert!(scene.to_vector_document().is_err());
}

#[test]
fn chart_serialization_is_deterministic() {
    let points = vec![
        SeriesPoint::new("Jan", 400.0),
        SeriesPoint::new("Feb", 300.0),
        SeriesPoint::new("Mar", 600.0),
    ];
    let config = ChartConfig::default().with_chart_type(ChartType::Area);
    let size = SceneSize::from_millimeters(120.0, 80.0);
    let first = build_chart_scene(&config, &points, size)
        .expect("scene")
        .to_vector_document()
        .expect("document");
    let second = build_chart_scene(&config, &points, size)
        .expect("scene")
        .to_vector_document()
        .expect("document");
    assert_eq!(first, second);
    assert_eq!(first.svg.matches("<path ").count(), 2);
}
