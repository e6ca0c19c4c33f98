//! Static diagram description: JSON configuration, validated layout model and built-in preset.

pub(crate) mod config;
pub(crate) mod model;
pub(crate) mod preset;
