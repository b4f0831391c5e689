use crate::compose::mask::{ClipRegion, CompositeMode};
use crate::config::EngineConfig;
use crate::design::state::{DesignState, ImageRef, LayoutVariant, MaskShape};
use crate::foundation::core::{OriginX, OriginY, Point, Rect};
use crate::geometry::resolver::GeometryFrame;
use crate::layout::text::{self, TextContent, TitleBlock};
use crate::scene::graph::{
    GuideNode, ImageNode, ImagePlacement, ImageRole, PlaceholderNode, QrNode, SceneGraph,
    SceneNode, TextNode, TextRole, TextShadow,
};

/// Switches applied on top of the design for a single render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw the non-printing panel guides.
    pub show_guides: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { show_guides: true }
    }
}

impl RenderOptions {
    /// Options for print output: guides hidden.
    pub fn print() -> Self {
        Self { show_guides: false }
    }
}

/// Builds the complete scene for a design and a geometry.
///
/// The front panel is placed by one pure function per [`LayoutVariant`]; spine, back panel and
/// guides are placed independently of the variant.
#[derive(Clone, Copy, Debug)]
pub struct LayoutPlacer<'a> {
    config: &'a EngineConfig,
}

impl<'a> LayoutPlacer<'a> {
    /// Build a placer over engine constants.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Rebuild the whole scene from scratch.
    #[tracing::instrument(skip(self, state, frame), fields(layout = state.layout.as_str()))]
    pub fn build_scene(
        &self,
        state: &DesignState,
        frame: &GeometryFrame,
        opts: RenderOptions,
    ) -> SceneGraph {
        let ctx = Placement {
            cfg: self.config,
            state,
            frame,
        };
        let mut scene = SceneGraph::new(*frame, state.cover_color);
        if opts.show_guides {
            ctx.place_guides(&mut scene);
        }
        ctx.place_spine(&mut scene);
        ctx.place_back(&mut scene);
        match state.layout {
            LayoutVariant::Icon => ctx.place_icon(&mut scene),
            LayoutVariant::Text => ctx.place_text(&mut scene),
            LayoutVariant::TextIcon => ctx.place_text_icon(&mut scene),
            LayoutVariant::Graphic => ctx.place_graphic(&mut scene),
            LayoutVariant::PhotoText => ctx.place_photo_text(&mut scene),
            LayoutVariant::Magazine => ctx.place_magazine(&mut scene),
        }
        tracing::debug!(nodes = scene.nodes.len(), "scene built");
        scene
    }
}

struct Placement<'a> {
    cfg: &'a EngineConfig,
    state: &'a DesignState,
    frame: &'a GeometryFrame,
}

impl Placement<'_> {
    fn cm(&self, v: f64) -> f64 {
        self.frame.cm(v)
    }

    fn bottom_base(&self) -> f64 {
        self.frame.height_px - self.cm(self.cfg.bottom_base_cm)
    }

    fn front_center(&self) -> Point {
        Point::new(self.frame.front_center_x, self.frame.center_y)
    }

    fn place_guides(&self, scene: &mut SceneGraph) {
        let g = &self.cfg.guides;
        for x in [self.frame.back_spine_x, self.frame.spine_front_x] {
            scene.push(SceneNode::Guide(GuideNode {
                x,
                height: self.frame.height_px,
                color: self.state.text_color,
                opacity: g.opacity,
                stroke_width: self.cm(g.stroke_cm),
                dash: self.cm(g.dash_cm),
            }));
        }
    }

    fn place_spine(&self, scene: &mut SceneGraph) {
        let base = self.bottom_base();
        let x = self.frame.spine_center_x;
        let icon = self.state.icon.as_ref().filter(|_| self.state.spine.symbol);
        if let Some(icon) = icon {
            scene.push(SceneNode::Image(ImageNode {
                role: ImageRole::SpineIcon,
                source: icon.clone(),
                fallback: self.cfg.fallback_icon.clone(),
                placement: ImagePlacement::Width {
                    anchor: Point::new(x, base),
                    width: self.cm(self.cfg.spine_icon_cm),
                    origin_x: OriginX::Center,
                    origin_y: OriginY::Bottom,
                },
                tint: Some(self.state.text_color),
                opacity: 1.0,
                clip: None,
                on_missing: None,
            }));
        }

        let Some(spine) = text::spine_text(self.state, &self.cfg.spine_separator) else {
            return;
        };
        let y = if icon.is_some() {
            base - self.cm(self.cfg.spine_icon_clearance_cm)
        } else {
            base
        };
        let size = self.cfg.typography.base_details * self.frame.ppi * self.state.text_scale;
        scene.push(SceneNode::Text(self.text_node(
            TextRole::Spine,
            vec![spine],
            size,
            1.0,
            Point::new(x, y),
            OriginX::Left,
            OriginY::Center,
            -90.0,
            1.0,
        )));
    }

    fn place_back(&self, scene: &mut SceneGraph) {
        let base = self.bottom_base();
        let x = self.frame.back_center_x;
        let typo = &self.cfg.typography;
        if !self.state.copyright.is_empty() {
            let size = typo.base_copy * self.frame.ppi * self.state.text_scale;
            let mut node = self.text_node(
                TextRole::Copyright,
                vec![self.state.copyright.clone()],
                size,
                1.0,
                Point::new(x, base),
                OriginX::Center,
                OriginY::Bottom,
                0.0,
                typo.copyright_opacity,
            );
            node.letter_spacing_px = typo.copyright_letter_spacing_em * size;
            scene.push(SceneNode::Text(node));
        }
        if self.state.qr.enabled && !self.state.qr.url.is_empty() {
            scene.push(SceneNode::Qr(QrNode {
                data: self.state.qr.url.clone(),
                anchor: Point::new(x, base - self.cm(self.cfg.qr_lift_cm)),
                size_px: self.cm(self.cfg.qr_size_cm),
                color: self.state.text_color,
            }));
        }
    }

    fn place_icon(&self, scene: &mut SceneGraph) {
        let size = self.cm(self.cfg.icon_size_cm) * self.state.text_scale;
        self.push_front_icon(scene, self.front_center(), size);
    }

    fn place_text(&self, scene: &mut SceneGraph) {
        let block = TitleBlock::measure(self.state, self.cfg, self.frame.ppi, false);
        self.push_title_block(scene, &block, self.front_center(), OriginY::Center);
    }

    fn place_text_icon(&self, scene: &mut SceneGraph) {
        let center = self.front_center();
        let scale = self.state.text_scale;
        let block = TitleBlock::measure(self.state, self.cfg, self.frame.ppi, true);
        let icon_size = self.cm(self.cfg.icon_size_cm) * scale;
        let gap = self.cm(self.cfg.block_gap_cm) * scale * self.cfg.icon_gap_factor;
        let total = block.height + gap + icon_size;
        let top = center.y - total / 2.0;
        self.push_title_block(scene, &block, Point::new(center.x, top), OriginY::Top);
        let icon_center = Point::new(center.x, top + block.height + gap + icon_size / 2.0);
        self.push_front_icon(scene, icon_center, icon_size);
    }

    fn place_graphic(&self, scene: &mut SceneGraph) {
        let center = Point::new(
            self.frame.front_center_x,
            self.frame.center_y - self.cm(self.cfg.graphic_offset_cm),
        );
        let placeholder = self.slot_placeholder(center);
        match &self.state.main_image {
            Some(image) => scene.push(SceneNode::Image(ImageNode {
                role: ImageRole::Main,
                source: image.source.clone(),
                fallback: None,
                placement: ImagePlacement::Contain {
                    center,
                    box_w: self.cm(self.state.slot.w),
                    box_h: self.cm(self.state.slot.h),
                    zoom: self.state.text_scale,
                },
                tint: Some(self.state.text_color),
                opacity: 1.0,
                clip: None,
                on_missing: Some(placeholder),
            })),
            None => scene.push(SceneNode::Placeholder(placeholder)),
        }
    }

    fn place_photo_text(&self, scene: &mut SceneGraph) {
        let slot = self.state.slot;
        let center = Point::new(
            self.frame.front_center_x,
            self.frame.center_y - self.cm(self.cfg.photo_slot_offset_cm),
        );
        let placeholder = self.slot_placeholder(center);
        match &self.state.main_image {
            Some(image) => {
                let (w, h) = (self.cm(slot.w), self.cm(slot.h));
                let clip = ClipRegion::slot(center, w, h, self.state.mask);
                self.push_clipped_image(
                    scene,
                    image,
                    CompositeMode::Slot,
                    clip,
                    center,
                    w,
                    placeholder,
                );
            }
            None => scene.push(SceneNode::Placeholder(placeholder)),
        }
        let text_top = center.y + self.cm(slot.h) / 2.0 + self.cm(self.cfg.photo_text_gap_cm);
        let block = TitleBlock::measure(self.state, self.cfg, self.frame.ppi, true);
        self.push_title_block(scene, &block, Point::new(center.x, text_top), OriginY::Top);
    }

    fn place_magazine(&self, scene: &mut SceneGraph) {
        let panel = self.frame.front_panel();
        let placeholder = self.placeholder(ClipRegion::Rect(panel));
        match &self.state.main_image {
            Some(image) => self.push_clipped_image(
                scene,
                image,
                CompositeMode::FullBleed,
                ClipRegion::Rect(panel),
                panel.center(),
                panel.width(),
                placeholder,
            ),
            None => scene.push(SceneNode::Placeholder(placeholder)),
        }

        let typo = &self.cfg.typography;
        let content = text::magazine_content(self.state, self.cfg);
        let size = typo.magazine_title * self.frame.ppi * self.state.text_scale;
        let mut node = self.text_node(
            TextRole::Magazine,
            content.lines,
            size,
            typo.magazine_line_height,
            Point::new(self.frame.front_center_x, self.cm(self.cfg.magazine_top_cm)),
            OriginX::Center,
            OriginY::Top,
            0.0,
            content.opacity,
        );
        node.shadow = Some(TextShadow {
            color: typo.shadow_color,
            blur_px: self.cm(typo.shadow_blur_cm),
        });
        scene.push(SceneNode::Text(node));
    }

    /// A main image clipped in absolute coordinates. Cropped images are re-projected onto the
    /// window; uncropped ones cover the clip bounds. Full-bleed images go behind every node.
    #[allow(clippy::too_many_arguments)]
    fn push_clipped_image(
        &self,
        scene: &mut SceneGraph,
        image: &ImageRef,
        mode: CompositeMode,
        clip: ClipRegion,
        window_center: Point,
        window_width: f64,
        placeholder: PlaceholderNode,
    ) {
        let placement = match image.crop {
            Some(crop) => ImagePlacement::Cropped {
                crop,
                window_center,
                window_width,
            },
            None => ImagePlacement::Cover {
                rect: clip.bounds(),
            },
        };
        tracing::debug!(?mode, ?placement, "clipped main image");
        let node = SceneNode::Image(ImageNode {
            role: ImageRole::Main,
            source: image.source.clone(),
            fallback: None,
            placement,
            tint: None,
            opacity: 1.0,
            clip: Some(clip),
            on_missing: Some(placeholder),
        });
        match mode {
            CompositeMode::Slot => scene.push(node),
            CompositeMode::FullBleed => scene.push_behind(node),
        }
    }

    fn push_front_icon(&self, scene: &mut SceneGraph, center: Point, size: f64) {
        let (source, fallback, opacity) = match &self.state.icon {
            Some(icon) => (icon.clone(), self.cfg.fallback_icon.clone(), 1.0),
            None => match &self.cfg.fallback_icon {
                Some(ghost) => (ghost.clone(), None, self.cfg.ghost_opacity),
                None => return,
            },
        };
        scene.push(SceneNode::Image(ImageNode {
            role: ImageRole::Icon,
            source,
            fallback,
            placement: ImagePlacement::Width {
                anchor: center,
                width: size,
                origin_x: OriginX::Center,
                origin_y: OriginY::Center,
            },
            tint: Some(self.state.text_color),
            opacity,
            clip: None,
            on_missing: None,
        }));
    }

    /// Push a title block anchored at `anchor` (horizontal center) with `origin_y`.
    fn push_title_block(
        &self,
        scene: &mut SceneGraph,
        block: &TitleBlock,
        anchor: Point,
        origin_y: OriginY,
    ) {
        let typo = &self.cfg.typography;
        let top = origin_y.top_of(anchor.y, block.height);
        scene.push(SceneNode::Text(self.text_node(
            TextRole::Title,
            block.title.lines.clone(),
            block.title_size_px,
            typo.line_height,
            Point::new(anchor.x, top),
            OriginX::Center,
            OriginY::Top,
            0.0,
            block.title.opacity,
        )));
        if let Some(TextContent { lines, opacity, .. }) = &block.date {
            let date_top = top + block.title_height + block.date_gap_px;
            scene.push(SceneNode::Text(self.text_node(
                TextRole::Date,
                lines.clone(),
                block.date_size_px,
                typo.line_height,
                Point::new(anchor.x, date_top),
                OriginX::Center,
                OriginY::Top,
                0.0,
                *opacity,
            )));
        }
    }

    fn slot_placeholder(&self, center: Point) -> PlaceholderNode {
        let scale = self.state.text_scale;
        let w = self.cm(self.state.slot.w) * scale;
        let h = self.cm(self.state.slot.h) * scale;
        self.placeholder(ClipRegion::slot(center, w, h, self.state.mask))
    }

    fn placeholder(&self, outline: ClipRegion) -> PlaceholderNode {
        let p = &self.cfg.placeholder;
        let button = self.cm(p.button_cm);
        PlaceholderNode {
            outline,
            color: p.color,
            stroke_width: self.cm(p.stroke_cm),
            dash: self.cm(p.dash_cm),
            button_diameter: button,
            plus_length: button / 2.0,
            plus_thickness: self.cm(p.plus_thickness_cm),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text_node(
        &self,
        role: TextRole,
        lines: Vec<String>,
        size_px: f64,
        line_height: f64,
        anchor: Point,
        origin_x: OriginX,
        origin_y: OriginY,
        angle_degrees: f64,
        opacity: f32,
    ) -> TextNode {
        let line_box_px = size_px * self.cfg.typography.glyph_box;
        TextNode {
            role,
            lines,
            font: self.state.font.clone(),
            fallback_font: self.cfg.fallback_font.clone(),
            size_px,
            line_box_px,
            line_advance_px: line_box_px * line_height,
            letter_spacing_px: 0.0,
            anchor,
            origin_x,
            origin_y,
            angle_degrees,
            color: self.state.text_color,
            opacity,
            shadow: None,
        }
    }
}

/// Outline of the main-image slot in surface pixels, as drawn for the design's layout.
///
/// `None` for layouts without a main image.
pub fn main_slot_bounds(
    state: &DesignState,
    cfg: &EngineConfig,
    frame: &GeometryFrame,
) -> Option<Rect> {
    if !state.layout.uses_main_image() {
        return None;
    }
    let x = frame.front_center_x;
    match state.layout {
        LayoutVariant::PhotoText => {
            let center = Point::new(x, frame.center_y - frame.cm(cfg.photo_slot_offset_cm));
            let (w, h) = (frame.cm(state.slot.w), frame.cm(state.slot.h));
            Some(ClipRegion::slot(center, w, h, state.mask).bounds())
        }
        LayoutVariant::Graphic => {
            let center = Point::new(x, frame.center_y - frame.cm(cfg.graphic_offset_cm));
            let (w, h) = (frame.cm(state.slot.w), frame.cm(state.slot.h));
            Some(ClipRegion::slot(center, w, h, MaskShape::Rect).bounds())
        }
        _ => Some(frame.front_panel()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/placer.rs"]
mod tests;
