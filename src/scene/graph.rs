use crate::compose::mask::ClipRegion;
use crate::crop::projection::project;
use crate::crop::transform::CropTransform;
use crate::foundation::core::{Affine, OriginX, OriginY, Point, Rect, Rgba8, Vec2};
use crate::geometry::resolver::GeometryFrame;

/// Flat, fully resolved description of one cover render.
///
/// Rebuilt from scratch for every render; nodes paint in order.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraph {
    /// Geometry every node coordinate is expressed in.
    pub frame: GeometryFrame,
    /// Surface fill.
    pub background: Rgba8,
    /// Nodes, back to front.
    pub nodes: Vec<SceneNode>,
}

impl SceneGraph {
    /// Empty scene.
    pub fn new(frame: GeometryFrame, background: Rgba8) -> Self {
        Self {
            frame,
            background,
            nodes: Vec::new(),
        }
    }

    /// Append a node on top.
    pub fn push(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Insert a node behind everything already placed.
    pub fn push_behind(&mut self, node: SceneNode) {
        self.nodes.insert(0, node);
    }

    /// Text nodes, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &TextNode> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Text(t) => Some(t),
            _ => None,
        })
    }

    /// Image nodes, in paint order.
    pub fn images(&self) -> impl Iterator<Item = &ImageNode> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Image(i) => Some(i),
            _ => None,
        })
    }

    /// Placeholder nodes, in paint order.
    pub fn placeholders(&self) -> impl Iterator<Item = &PlaceholderNode> {
        self.nodes.iter().filter_map(|n| match n {
            SceneNode::Placeholder(p) => Some(p),
            _ => None,
        })
    }

    /// Image sources and their fallbacks, in paint order. May repeat.
    pub fn image_references(&self) -> impl Iterator<Item = &str> {
        self.images()
            .flat_map(|i| std::iter::once(i.source.as_str()).chain(i.fallback.as_deref()))
    }

    /// Every image and font reference the scene may load.
    pub fn asset_references(&self) -> Vec<&str> {
        let fonts = self
            .texts()
            .flat_map(|t| std::iter::once(t.font.as_str()).chain(t.fallback_font.as_deref()));
        let mut refs: Vec<&str> = self.image_references().chain(fonts).collect();
        refs.sort_unstable();
        refs.dedup();
        refs
    }

    /// The first text node with `role`.
    pub fn text(&self, role: TextRole) -> Option<&TextNode> {
        self.texts().find(|t| t.role == role)
    }

    /// The first image node with `role`.
    pub fn image(&self, role: ImageRole) -> Option<&ImageNode> {
        self.images().find(|i| i.role == role)
    }
}

/// One drawable element.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneNode {
    /// Non-printing panel boundary.
    Guide(GuideNode),
    /// Text block.
    Text(TextNode),
    /// Raster or vector image.
    Image(ImageNode),
    /// Empty-slot affordance.
    Placeholder(PlaceholderNode),
    /// QR code.
    Qr(QrNode),
}

/// Vertical dashed line at a panel boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct GuideNode {
    /// Line x.
    pub x: f64,
    /// Line length (surface height).
    pub height: f64,
    /// Stroke color.
    pub color: Rgba8,
    /// Opacity.
    pub opacity: f32,
    /// Stroke width.
    pub stroke_width: f64,
    /// Dash and gap length.
    pub dash: f64,
}

/// What a text node shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextRole {
    /// Front-panel title lines.
    Title,
    /// Front-panel date under the title.
    Date,
    /// Magazine headline.
    Magazine,
    /// Rotated spine text.
    Spine,
    /// Back-panel copyright.
    Copyright,
}

/// Soft shadow under text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextShadow {
    /// Shadow color (alpha included).
    pub color: Rgba8,
    /// Gaussian blur radius in pixels.
    pub blur_px: f64,
}

/// Center-aligned lines of text anchored at a point.
///
/// Lines are stacked `line_advance_px` apart inside a box whose height is
/// [`TextNode::block_height`]. The block is placed relative to `anchor` per `origin_x`/`origin_y`
/// and then rotated about `anchor` by `angle_degrees`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextNode {
    /// Role.
    pub role: TextRole,
    /// Lines, top to bottom.
    pub lines: Vec<String>,
    /// Font asset reference.
    pub font: String,
    /// Font used when `font` cannot be loaded.
    pub fallback_font: Option<String>,
    /// Font size.
    pub size_px: f64,
    /// Height of one line box.
    pub line_box_px: f64,
    /// Distance between consecutive line tops.
    pub line_advance_px: f64,
    /// Extra spacing after each glyph.
    pub letter_spacing_px: f64,
    /// Anchor point.
    pub anchor: Point,
    /// Horizontal origin.
    pub origin_x: OriginX,
    /// Vertical origin.
    pub origin_y: OriginY,
    /// Clockwise rotation about the anchor.
    pub angle_degrees: f64,
    /// Fill color.
    pub color: Rgba8,
    /// Opacity.
    pub opacity: f32,
    /// Optional shadow.
    pub shadow: Option<TextShadow>,
}

impl TextNode {
    /// Height of the whole block.
    pub fn block_height(&self) -> f64 {
        let n = self.lines.len().max(1) as f64;
        self.line_box_px + self.line_advance_px * (n - 1.0)
    }

    /// Top of the block in its local (unrotated) frame, relative to the anchor.
    pub fn local_top(&self) -> f64 {
        self.origin_y.top_of(0.0, self.block_height())
    }

    /// Map the block's local frame (origin at the anchor, y down) to surface pixels.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.anchor.to_vec2()) * Affine::rotate(self.angle_degrees.to_radians())
    }
}

/// What an image node shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageRole {
    /// Front-panel icon.
    Icon,
    /// Spine icon.
    SpineIcon,
    /// Main image (graphic, photo or magazine).
    Main,
}

/// How an image is sized and positioned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImagePlacement {
    /// Scale to `width` keeping aspect, anchored at `anchor`.
    Width {
        /// Anchor point.
        anchor: Point,
        /// Target width.
        width: f64,
        /// Horizontal origin.
        origin_x: OriginX,
        /// Vertical origin.
        origin_y: OriginY,
    },
    /// Fit inside a box centered at `center`, then multiply by `zoom`.
    Contain {
        /// Box center.
        center: Point,
        /// Box width.
        box_w: f64,
        /// Box height.
        box_h: f64,
        /// Extra scale.
        zoom: f64,
    },
    /// Cover `rect` completely, centered.
    Cover {
        /// Area to cover.
        rect: Rect,
    },
    /// Re-project a captured crop onto a window.
    Cropped {
        /// Captured crop.
        crop: CropTransform,
        /// Window center.
        window_center: Point,
        /// Window width in surface pixels.
        window_width: f64,
    },
}

impl ImagePlacement {
    /// Transform from source-image pixels to surface pixels.
    pub fn image_affine(&self, image_w: f64, image_h: f64) -> Affine {
        match *self {
            Self::Width {
                anchor,
                width,
                origin_x,
                origin_y,
            } => {
                let s = width / image_w;
                let left = match origin_x {
                    OriginX::Left => anchor.x,
                    OriginX::Center => anchor.x - width / 2.0,
                };
                let top = origin_y.top_of(anchor.y, image_h * s);
                Affine::translate(Vec2::new(left, top)) * Affine::scale(s)
            }
            Self::Contain {
                center,
                box_w,
                box_h,
                zoom,
            } => {
                let s = (box_w / image_w).min(box_h / image_h) * zoom;
                centered(center, s, image_w, image_h)
            }
            Self::Cover { rect } => {
                let s = (rect.width() / image_w).max(rect.height() / image_h);
                centered(rect.center(), s, image_w, image_h)
            }
            Self::Cropped {
                crop,
                window_center,
                window_width,
            } => project(&crop, window_center, window_width).image_affine(image_w, image_h),
        }
    }
}

fn centered(center: Point, s: f64, image_w: f64, image_h: f64) -> Affine {
    Affine::translate(Vec2::new(
        center.x - image_w * s / 2.0,
        center.y - image_h * s / 2.0,
    )) * Affine::scale(s)
}

/// An image placed on the cover.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageNode {
    /// Role.
    pub role: ImageRole,
    /// Asset reference.
    pub source: String,
    /// Reference drawn instead when `source` fails to load.
    pub fallback: Option<String>,
    /// Placement.
    pub placement: ImagePlacement,
    /// Replace RGB with this color, keeping alpha.
    pub tint: Option<Rgba8>,
    /// Opacity.
    pub opacity: f32,
    /// Absolute clip in surface pixels.
    pub clip: Option<ClipRegion>,
    /// Drawn instead when the image cannot be loaded at all.
    pub on_missing: Option<PlaceholderNode>,
}

/// Dashed outline with a centered "+" button.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceholderNode {
    /// Outline shape.
    pub outline: ClipRegion,
    /// Outline and button color.
    pub color: Rgba8,
    /// Outline stroke width.
    pub stroke_width: f64,
    /// Outline dash and gap length.
    pub dash: f64,
    /// Button circle diameter.
    pub button_diameter: f64,
    /// Length of each "+" bar.
    pub plus_length: f64,
    /// Thickness of each "+" bar.
    pub plus_thickness: f64,
}

impl PlaceholderNode {
    /// Center of the outline.
    pub fn center(&self) -> Point {
        self.outline.bounds().center()
    }
}

/// QR code anchored by its bottom-center.
#[derive(Clone, Debug, PartialEq)]
pub struct QrNode {
    /// Encoded text.
    pub data: String,
    /// Bottom-center anchor.
    pub anchor: Point,
    /// Side length.
    pub size_px: f64,
    /// Module color (the background is transparent).
    pub color: Rgba8,
}

impl QrNode {
    /// Square covered by the code.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.anchor.x - self.size_px / 2.0,
            self.anchor.y - self.size_px,
            self.anchor.x + self.size_px / 2.0,
            self.anchor.y,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
