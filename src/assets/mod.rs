pub(crate) mod color;
pub(crate) mod decode;
pub(crate) mod icons;
pub(crate) mod svg_raster;
pub(crate) mod text;
