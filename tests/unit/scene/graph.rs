use super::*;
use crate::design::state::MaskShape;

fn frame() -> GeometryFrame {
    GeometryFrame::from_ppi(10.0, 1.5, 10.0, 10.0)
}

#[test]
fn push_behind_puts_node_first() {
    let mut g = SceneGraph::new(frame(), Rgba8::WHITE);
    g.push(SceneNode::Qr(QrNode {
        data: "x".into(),
        anchor: Point::new(0.0, 0.0),
        size_px: 1.0,
        color: Rgba8::BLACK,
    }));
    g.push_behind(SceneNode::Guide(GuideNode {
        x: 1.0,
        height: 2.0,
        color: Rgba8::BLACK,
        opacity: 0.3,
        stroke_width: 1.0,
        dash: 1.0,
    }));
    assert!(matches!(g.nodes[0], SceneNode::Guide(_)));
}

#[test]
fn width_placement_scales_to_width_and_anchors_bottom() {
    let p = ImagePlacement::Width {
        anchor: Point::new(100.0, 200.0),
        width: 50.0,
        origin_x: OriginX::Center,
        origin_y: OriginY::Bottom,
    };
    let a = p.image_affine(200.0, 100.0);
    assert_eq!(a * Point::new(0.0, 0.0), Point::new(75.0, 175.0));
    assert_eq!(a * Point::new(200.0, 100.0), Point::new(125.0, 200.0));
}

#[test]
fn contain_fits_inside_box() {
    let p = ImagePlacement::Contain {
        center: Point::new(0.0, 0.0),
        box_w: 100.0,
        box_h: 100.0,
        zoom: 1.0,
    };
    let a = p.image_affine(400.0, 200.0);
    assert_eq!(a * Point::new(0.0, 0.0), Point::new(-50.0, -25.0));
    assert_eq!(a * Point::new(400.0, 200.0), Point::new(50.0, 25.0));
}

#[test]
fn cover_fills_rect() {
    let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
    let a = ImagePlacement::Cover { rect }.image_affine(400.0, 200.0);
    let tl = a * Point::new(0.0, 0.0);
    let br = a * Point::new(400.0, 200.0);
    assert!(tl.x <= 0.0 && tl.y <= 0.0);
    assert!(br.x >= 100.0 && br.y >= 100.0);
    assert_eq!(tl.y, 0.0);
}

fn text(font: &str, fallback_font: Option<&str>) -> TextNode {
    TextNode {
        role: TextRole::Title,
        lines: vec!["A".into()],
        font: font.into(),
        fallback_font: fallback_font.map(Into::into),
        size_px: 10.0,
        line_box_px: 11.3,
        line_advance_px: 14.69,
        letter_spacing_px: 0.0,
        anchor: Point::new(0.0, 0.0),
        origin_x: OriginX::Center,
        origin_y: OriginY::Center,
        angle_degrees: 0.0,
        color: Rgba8::BLACK,
        opacity: 1.0,
        shadow: None,
    }
}

#[test]
fn asset_references_cover_images_fallbacks_and_fonts() {
    let mut g = SceneGraph::new(frame(), Rgba8::WHITE);
    let image = |source: &str, fallback: Option<&str>| ImageNode {
        role: ImageRole::Icon,
        source: source.into(),
        fallback: fallback.map(Into::into),
        placement: ImagePlacement::Cover {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
        },
        tint: None,
        opacity: 1.0,
        clip: None,
        on_missing: None,
    };
    g.push(SceneNode::Image(image("icons/a.png", Some("symbols/heart.png"))));
    g.push(SceneNode::Image(image("icons/a.png", None)));
    g.push(SceneNode::Text(text("fonts/a.ttf", Some("fonts/b.ttf"))));
    g.push(SceneNode::Text(text("fonts/a.ttf", None)));

    assert_eq!(g.image_references().count(), 3);
    assert_eq!(
        g.asset_references(),
        vec!["fonts/a.ttf", "fonts/b.ttf", "icons/a.png", "symbols/heart.png"]
    );
}

#[test]
fn text_block_height_and_top() {
    let t = TextNode {
        role: TextRole::Title,
        lines: vec!["A".into(), "B".into(), "C".into()],
        font: "f.ttf".into(),
        fallback_font: None,
        size_px: 10.0,
        line_box_px: 11.3,
        line_advance_px: 14.69,
        letter_spacing_px: 0.0,
        anchor: Point::new(0.0, 0.0),
        origin_x: OriginX::Center,
        origin_y: OriginY::Center,
        angle_degrees: 0.0,
        color: Rgba8::BLACK,
        opacity: 1.0,
        shadow: None,
    };
    assert!((t.block_height() - (11.3 + 2.0 * 14.69)).abs() < 1e-9);
    assert!((t.local_top() + t.block_height() / 2.0).abs() < 1e-9);
}

#[test]
fn placeholder_center_is_outline_center() {
    let p = PlaceholderNode {
        outline: ClipRegion::slot(Point::new(30.0, 40.0), 10.0, 10.0, MaskShape::Rect),
        color: Rgba8::BLACK,
        stroke_width: 1.0,
        dash: 1.0,
        button_diameter: 2.0,
        plus_length: 1.0,
        plus_thickness: 0.2,
    };
    assert_eq!(p.center(), Point::new(30.0, 40.0));
}

#[test]
fn qr_bounds_sit_on_anchor() {
    let q = QrNode {
        data: "x".into(),
        anchor: Point::new(50.0, 100.0),
        size_px: 20.0,
        color: Rgba8::BLACK,
    };
    assert_eq!(q.bounds(), Rect::new(40.0, 80.0, 60.0, 100.0));
}
