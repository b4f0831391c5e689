pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod qr;
pub(crate) mod svg_raster;
pub(crate) mod system_font;
pub(crate) mod upload;
