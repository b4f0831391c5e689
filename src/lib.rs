//! covercraft composes print-ready book covers.
//!
//! A cover is three panels (back, spine, front) laid out from a declarative [`DesignState`]:
//!
//! - [`GeometryResolver`] turns physical centimeters into a [`GeometryFrame`] for a display area
//!   or a print resolution
//! - [`LayoutPlacer`] builds a [`SceneGraph`] for the active [`LayoutVariant`]
//! - [`CropSession`] captures a photo framing once, as a resolution-independent
//!   [`CropTransform`], that every later render re-projects
//! - [`CoverEngine`] renders previews and DPI exports through the CPU rasterizer
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod config;
mod crop;
mod design;
mod export;
mod foundation;
mod geometry;
mod layout;
mod relay;
mod render;
mod scene;
mod session;

pub use crate::foundation::core::{Affine, BezPath, OriginX, OriginY, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{CoverError, CoverResult};

pub use crate::assets::decode::DecodedImage;
pub use crate::assets::loader::{
    AssetCache, AssetError, AssetSource, FsAssetSource, ImageLoader, LoadedImage,
    MemoryAssetSource, decode_data_url, encode_data_url, normalize_rel_path,
};
pub use crate::assets::qr::QrMatrix;
pub use crate::assets::upload::{
    PreparedUpload, UploadEncoding, UploadPolicy, UploadTarget, fit_long_side, prepare_upload,
};
pub use crate::compose::mask::{ClipRegion, CompositeMode, MaskCompositor, PixelBounds};
pub use crate::config::{CropConfig, EngineConfig, GuideStyle, PlaceholderStyle, Typography};
pub use crate::crop::capture::{CropRequest, CropSession, CropWindow, QuarterTurn, ZoomRange};
pub use crate::crop::projection::{ProjectedPlacement, project};
pub use crate::crop::transform::CropTransform;
pub use crate::design::state::{
    DesignState, ImageRef, LayoutVariant, MaskPreset, MaskShape, QrSettings, SlotSize,
    SpineToggles, TextLine, TextScale,
};
pub use crate::export::raster::{
    ExportFormat, ExportRasterizer, ExportedRaster, export_frame, export_multiplier,
    export_pixel_size,
};
pub use crate::geometry::resolver::{DisplayArea, GeometryFrame, GeometryResolver, ViewportPolicy};
pub use crate::layout::placer::{LayoutPlacer, RenderOptions, main_slot_bounds};
pub use crate::layout::text::spine_text;
pub use crate::relay::order::{NotificationRelay, OrderDelivery, OrderMetadata, submit_order};
pub use crate::render::backend::{FrameRGBA, LoaderAssets, RenderBackend, SceneAssets};
pub use crate::render::cpu::CpuRasterizer;
pub use crate::scene::graph::{
    GuideNode, ImageNode, ImagePlacement, ImageRole, PlaceholderNode, QrNode, SceneGraph,
    SceneNode, TextNode, TextRole, TextShadow,
};
pub use crate::session::engine::{CoverEngine, RenderedCover};
pub use crate::session::requests::{Delivery, ImageRequestTracker, ImageTicket};
