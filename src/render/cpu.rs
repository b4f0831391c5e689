use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use kurbo::Shape;

use crate::assets::loader::{LoadedImage, cache_key};
use crate::assets::qr::QrMatrix;
use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_params};
use crate::assets::system_font::{SYSTEM_FONT_REF, load_system_font};
use crate::compose::mask::{ClipRegion, MaskCompositor, PixelBounds};
use crate::compose::pixel::{
    blur_params, blur_rgba8_premul, clear_rgba8, premul_over_at, premul_over_in_place,
    tint_rgba8_premul_in_place,
};
use crate::foundation::core::{Affine, BezPath, OriginX, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{CoverError, CoverResult};
use crate::render::backend::{FrameRGBA, RenderBackend, SceneAssets};
use crate::render::text::{ShapedLine, TextBrushRgba8, TextLayoutEngine};
use crate::scene::graph::{
    GuideNode, ImageNode, PlaceholderNode, QrNode, SceneGraph, SceneNode, TextNode,
};

/// CPU rasterizer powered by `vello_cpu`.
///
/// Vector nodes are batched into passes over the whole surface. Clipped images and shadowed text
/// are drawn into layers of their own and composited in paint order.
///
/// Paints and fonts are cached across renders; entries the latest render did not use are dropped
/// when it finishes.
pub struct CpuRasterizer {
    text: TextLayoutEngine,
    system_fonts: bool,
    system_font: Option<Option<Arc<Vec<u8>>>>,
    image_cache: HashMap<PaintKey, vello_cpu::Image>,
    font_cache: HashMap<String, vello_cpu::peniko::FontData>,
    used_paints: HashSet<PaintKey>,
    used_fonts: HashSet<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PaintKey {
    source: String,
    tint: Option<[u8; 4]>,
    raster: Option<(u32, u32)>,
}

struct Surface {
    width: u16,
    height: u16,
    data: Vec<u8>,
    pass: Option<vello_cpu::RenderContext>,
}

impl Surface {
    fn ctx(&mut self) -> &mut vello_cpu::RenderContext {
        let (w, h) = (self.width, self.height);
        self.pass.get_or_insert_with(|| vello_cpu::RenderContext::new(w, h))
    }

    fn flush(&mut self) -> CoverResult<()> {
        if let Some(mut ctx) = self.pass.take() {
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
            ctx.render_to_pixmap(&mut pixmap);
            premul_over_in_place(&mut self.data, pixmap.data_as_u8_slice())?;
        }
        Ok(())
    }
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRasterizer {
    /// Rasterizer with empty caches and the system font fallback enabled.
    pub fn new() -> Self {
        Self {
            text: TextLayoutEngine::new(),
            system_fonts: true,
            system_font: None,
            image_cache: HashMap::new(),
            font_cache: HashMap::new(),
            used_paints: HashSet::new(),
            used_fonts: HashSet::new(),
        }
    }

    /// Whether text falls back to an installed sans-serif face when its fonts fail to load.
    pub fn with_system_fonts(mut self, enabled: bool) -> Self {
        self.system_fonts = enabled;
        self
    }

    /// Drop cached paints, e.g. after the asset behind a reference changed.
    pub fn clear_caches(&mut self) {
        self.image_cache.clear();
        self.font_cache.clear();
    }

    pub(crate) fn cached_paints(&self) -> usize {
        self.image_cache.len()
    }

    pub(crate) fn cached_fonts(&self) -> usize {
        self.font_cache.len()
    }

    fn retain_used(&mut self) {
        self.image_cache.retain(|k, _| self.used_paints.contains(k));
        self.font_cache.retain(|k, _| self.used_fonts.contains(k));
        self.used_paints.clear();
        self.used_fonts.clear();
    }
}

impl RenderBackend for CpuRasterizer {
    #[tracing::instrument(skip_all, fields(nodes = scene.nodes.len()))]
    fn render_scene(
        &mut self,
        scene: &SceneGraph,
        assets: &mut dyn SceneAssets,
    ) -> CoverResult<FrameRGBA> {
        let (width, height) = scene.frame.pixel_size();
        let w16: u16 = width
            .try_into()
            .map_err(|_| CoverError::render("surface width exceeds u16"))?;
        let h16: u16 = height
            .try_into()
            .map_err(|_| CoverError::render("surface height exceeds u16"))?;

        self.used_paints.clear();
        self.used_fonts.clear();

        let mut data = vec![0u8; width as usize * height as usize * 4];
        clear_rgba8(&mut data, scene.background.premul());
        let mut surface = Surface {
            width: w16,
            height: h16,
            data,
            pass: None,
        };

        for node in &scene.nodes {
            match node {
                SceneNode::Guide(g) => draw_guide(surface.ctx(), g),
                SceneNode::Placeholder(p) => draw_placeholder(surface.ctx(), p),
                SceneNode::Qr(q) => draw_qr(surface.ctx(), q),
                SceneNode::Text(t) => self.draw_text_node(&mut surface, t, assets)?,
                SceneNode::Image(i) => self.draw_image_node(&mut surface, i, assets)?,
            }
        }
        surface.flush()?;
        self.retain_used();

        Ok(FrameRGBA {
            width,
            height,
            data: surface.data,
            premultiplied: true,
        })
    }
}

impl CpuRasterizer {
    fn draw_text_node(
        &mut self,
        surface: &mut Surface,
        node: &TextNode,
        assets: &mut dyn SceneAssets,
    ) -> CoverResult<()> {
        let Some((font_ref, font_bytes)) = self.resolve_font(node, assets) else {
            tracing::warn!(role = ?node.role, font = %node.font, "no usable font, skipping text");
            return Ok(());
        };
        let font = self.font_for(&font_ref, &font_bytes);

        let mut shaped = Vec::with_capacity(node.lines.len());
        for line in &node.lines {
            if line.is_empty() {
                shaped.push(None);
                continue;
            }
            let l = self.text.layout_line(
                line,
                &font_ref,
                &font_bytes,
                node.size_px as f32,
                node.letter_spacing_px as f32,
                TextBrushRgba8::from(node.color),
            );
            match l {
                Ok(l) => shaped.push(Some(l)),
                Err(e) => {
                    tracing::warn!(
                        role = ?node.role,
                        error = %e,
                        "text layout failed, skipping text"
                    );
                    return Ok(());
                }
            }
        }
        let block_w = shaped
            .iter()
            .flatten()
            .map(|l| l.width)
            .fold(0.0, f64::max);

        if let Some(shadow) = node.shadow {
            let (radius, sigma) = blur_params(shadow.blur_px);
            let local = Rect::new(0.0, 0.0, block_w, node.block_height())
                + Vec2::new(block_left(node, block_w), node.local_top());
            let area = node
                .transform()
                .transform_rect_bbox(local)
                .inflate(f64::from(radius), f64::from(radius));
            let (sw, sh) = (u32::from(surface.width), u32::from(surface.height));
            if let Some(bounds) = PixelBounds::covering(area, sw, sh) {
                surface.flush()?;
                let (lw, lh) = (
                    u16::try_from(bounds.width)
                        .map_err(|_| CoverError::render("shadow layer exceeds u16"))?,
                    u16::try_from(bounds.height)
                        .map_err(|_| CoverError::render("shadow layer exceeds u16"))?,
                );
                let mut ctx = vello_cpu::RenderContext::new(lw, lh);
                paint_lines(
                    &mut ctx,
                    node,
                    &shaped,
                    block_w,
                    &font,
                    bounds.to_layer(),
                    shadow.color,
                    node.opacity,
                );
                ctx.flush();
                let mut pixmap = vello_cpu::Pixmap::new(lw, lh);
                ctx.render_to_pixmap(&mut pixmap);
                let blurred = blur_rgba8_premul(
                    pixmap.data_as_u8_slice(),
                    bounds.width,
                    bounds.height,
                    radius,
                    sigma,
                )?;
                premul_over_at(
                    &mut surface.data,
                    sw,
                    sh,
                    &blurred,
                    bounds.width,
                    bounds.height,
                    bounds.x,
                    bounds.y,
                )?;
            }
        }

        paint_lines(
            surface.ctx(),
            node,
            &shaped,
            block_w,
            &font,
            Affine::IDENTITY,
            node.color,
            node.opacity,
        );
        Ok(())
    }

    fn draw_image_node(
        &mut self,
        surface: &mut Surface,
        node: &ImageNode,
        assets: &mut dyn SceneAssets,
    ) -> CoverResult<()> {
        let Some((key, loaded)) = resolve_image(node, assets) else {
            if let Some(p) = &node.on_missing {
                draw_placeholder(surface.ctx(), p);
            }
            return Ok(());
        };
        let Some(loaded) = loaded else {
            tracing::debug!(source = %node.source, "image pending, left out of this render");
            return Ok(());
        };

        let (iw, ih) = loaded.size();
        let xf = node.placement.image_affine(iw, ih);
        match node.clip {
            None => self.paint_image(surface.ctx(), &key, &loaded, xf, node.tint, node.opacity),
            Some(clip) => {
                surface.flush()?;
                let (sw, sh) = (u32::from(surface.width), u32::from(surface.height));
                MaskCompositor::new().composite_clipped(
                    &mut surface.data,
                    sw,
                    sh,
                    &clip,
                    node.opacity,
                    |ctx, base| self.paint_image(ctx, &key, &loaded, base * xf, node.tint, 1.0),
                )
            }
        }
    }

    fn paint_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        key: &str,
        image: &LoadedImage,
        transform: Affine,
        tint: Option<Rgba8>,
        opacity: f32,
    ) -> CoverResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let (paint, w, h, transform) = match image {
            LoadedImage::Raster(img) => {
                let paint_key = PaintKey {
                    source: cache_key(key),
                    tint: tint.map(|c| [c.r, c.g, c.b, c.a]),
                    raster: None,
                };
                self.used_paints.insert(paint_key.clone());
                let paint = match self.image_cache.get(&paint_key) {
                    Some(p) => p.clone(),
                    None => {
                        let p = image_paint(&img.rgba8_premul, img.width, img.height, tint)?;
                        self.image_cache.insert(paint_key, p.clone());
                        p
                    }
                };
                (paint, f64::from(img.width), f64::from(img.height), transform)
            }
            LoadedImage::Vector(tree) => {
                let (w, h, adjust) = svg_raster_params(tree, transform)?;
                let paint_key = PaintKey {
                    source: cache_key(key),
                    tint: tint.map(|c| [c.r, c.g, c.b, c.a]),
                    raster: Some((w, h)),
                };
                self.used_paints.insert(paint_key.clone());
                let paint = match self.image_cache.get(&paint_key) {
                    Some(p) => p.clone(),
                    None => {
                        let bytes = rasterize_svg_to_premul_rgba8(tree, w, h)?;
                        let p = image_paint(&bytes, w, h, tint)?;
                        self.image_cache.insert(paint_key, p.clone());
                        p
                    }
                };
                (paint, f64::from(w), f64::from(h), adjust)
            }
        };

        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint);
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }

    /// First font that loads and parses: the node's own, its fallback, then the system face.
    fn resolve_font(
        &mut self,
        node: &TextNode,
        assets: &mut dyn SceneAssets,
    ) -> Option<(String, Arc<Vec<u8>>)> {
        for reference in std::iter::once(&node.font).chain(node.fallback_font.as_ref()) {
            let bytes = match assets.font(reference) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(
                        role = ?node.role,
                        font = %reference,
                        error = %e,
                        "font unavailable"
                    );
                    continue;
                }
            };
            let key = cache_key(reference);
            match self.text.family_for(&key, &bytes) {
                Ok(_) => return Some((key, bytes)),
                Err(e) => {
                    tracing::warn!(
                        role = ?node.role,
                        font = %reference,
                        error = %e,
                        "font unusable"
                    );
                }
            }
        }
        if !self.system_fonts {
            return None;
        }
        let bytes = self.system_font.get_or_insert_with(load_system_font).clone()?;
        match self.text.family_for(SYSTEM_FONT_REF, &bytes) {
            Ok(_) => Some((SYSTEM_FONT_REF.to_string(), bytes)),
            Err(e) => {
                tracing::warn!(error = %e, "system font unusable");
                None
            }
        }
    }

    fn font_for(&mut self, reference: &str, bytes: &Arc<Vec<u8>>) -> vello_cpu::peniko::FontData {
        self.used_fonts.insert(reference.to_string());
        if let Some(font) = self.font_cache.get(reference) {
            return font.clone();
        }
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        self.font_cache.insert(reference.to_string(), font.clone());
        font
    }
}

/// The reference that loaded and its image, `Some((_, None))` while pending, `None` when both the
/// source and the fallback failed.
fn resolve_image(
    node: &ImageNode,
    assets: &mut dyn SceneAssets,
) -> Option<(String, Option<LoadedImage>)> {
    match assets.image(&node.source) {
        Ok(img) => return Some((node.source.clone(), img)),
        Err(e) => tracing::warn!(role = ?node.role, error = %e, "image unavailable"),
    }
    let fallback = node.fallback.as_ref()?;
    match assets.image(fallback) {
        Ok(img) => Some((fallback.clone(), img)),
        Err(e) => {
            tracing::warn!(role = ?node.role, error = %e, "fallback image unavailable");
            None
        }
    }
}

fn block_left(node: &TextNode, block_w: f64) -> f64 {
    match node.origin_x {
        OriginX::Left => 0.0,
        OriginX::Center => -block_w / 2.0,
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_lines(
    ctx: &mut vello_cpu::RenderContext,
    node: &TextNode,
    shaped: &[Option<ShapedLine>],
    block_w: f64,
    font: &vello_cpu::peniko::FontData,
    base: Affine,
    color: Rgba8,
    opacity: f32,
) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }

    let left = block_left(node, block_w);
    let top = node.local_top();
    for (i, line) in shaped.iter().enumerate() {
        let Some(line) = line else { continue };
        let x = left + (block_w - line.width) / 2.0;
        let y = top + node.line_advance_px * i as f64 + (node.line_box_px - line.height) / 2.0;
        ctx.set_transform(affine_to_cpu(
            base * node.transform() * Affine::translate(Vec2::new(x, y)),
        ));

        for l in line.layout.lines() {
            for item in l.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn fill(ctx: &mut vello_cpu::RenderContext, path: &BezPath, color: Rgba8) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.fill_path(&bezpath_to_cpu(path));
}

/// Outline of `path` as a fillable path, dashed when `dash > 0`.
pub(crate) fn stroke_outline(path: &BezPath, width: f64, dash: f64) -> BezPath {
    let mut style = kurbo::Stroke::new(width);
    if dash > 0.0 {
        style = style.with_dashes(0.0, [dash, dash]);
    }
    kurbo::stroke(path.iter(), &style, &kurbo::StrokeOpts::default(), 0.1)
}

fn draw_guide(ctx: &mut vello_cpu::RenderContext, g: &GuideNode) {
    let mut line = BezPath::new();
    line.move_to(Point::new(g.x, 0.0));
    line.line_to(Point::new(g.x, g.height));
    let outline = stroke_outline(&line, g.stroke_width, g.dash);
    fill(ctx, &outline, g.color.with_opacity(g.opacity));
}

fn draw_placeholder(ctx: &mut vello_cpu::RenderContext, p: &PlaceholderNode) {
    let outline = stroke_outline(&p.outline.to_path(), p.stroke_width, p.dash);
    fill(ctx, &outline, p.color);

    let c = p.center();
    let button = ClipRegion::Circle {
        center: c,
        radius: p.button_diameter / 2.0,
    };
    fill(ctx, &stroke_outline(&button.to_path(), p.stroke_width, 0.0), p.color);

    let mut plus = Rect::from_center_size(c, (p.plus_thickness, p.plus_length)).to_path(0.1);
    plus.extend(Rect::from_center_size(c, (p.plus_length, p.plus_thickness)).path_elements(0.1));
    fill(ctx, &plus, p.color);
}

fn draw_qr(ctx: &mut vello_cpu::RenderContext, q: &QrNode) {
    match QrMatrix::encode(&q.data) {
        Ok(m) => fill(ctx, &m.to_path(q.bounds()), q.color),
        Err(e) => tracing::warn!(error = %e, "qr code not drawn"),
    }
}

fn image_paint(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
    tint: Option<Rgba8>,
) -> CoverResult<vello_cpu::Image> {
    let pixmap = match tint {
        Some(c) => {
            let mut tinted = rgba8_premul.to_vec();
            tint_rgba8_premul_in_place(&mut tinted, c);
            pixmap_from_premul_bytes(&tinted, width, height)?
        }
        None => pixmap_from_premul_bytes(rgba8_premul, width, height)?,
    };
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CoverResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CoverError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CoverError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CoverError::render("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
