//! Pipeviz renders animated CI/CD pipeline diagrams.
//!
//! A diagram is a fixed set of nodes joined by routed connections, with particles flowing along
//! each connection. The API is session-oriented:
//!
//! - Load and validate a [`DiagramConfig`] into a [`Diagram`]
//! - Start an [`AnimationSession`] on a [`FrameTarget`] such as [`CpuSurface`]
//! - Render single frames or stream them into a [`FrameSink`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod encode;
mod foundation;
mod geometry;
mod layout;
mod particle;
mod render;
mod session;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, MAX_SURFACE_DIM, Point, Rect, Vec2,
};
pub use crate::foundation::error::{PipevizError, PipevizResult};

pub use crate::assets::color::Color;
pub use crate::assets::icons::{
    FsIconProvider, IconCache, IconImage, IconLoad, IconLoadReport, IconProvider, load_icons,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig, write_png};
pub use crate::geometry::edge::{Anchor, Side, edge_point, on_boundary};
pub use crate::geometry::route::{Axis, Route, RouteStyle};
pub use crate::layout::config::{ConnectionDef, Diagram, DiagramConfig, NodeDef, Theme};
pub use crate::layout::model::{Connection, Layout, Node, NodeIcons, NodeKind};
pub use crate::particle::{Particle, ParticleTuning, next_progress};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::cpu::CpuSurface;
pub use crate::render::frame::FrameRenderer;
pub use crate::render::surface::{
    DrawSurface, FrameTarget, Shadow, StrokeStyle, TextAlign, TextStyle, with_shadow,
    with_transform,
};
pub use crate::session::cancel::CancelToken;
pub use crate::session::driver::{AnimationSession, LoopOpts, LoopStats, Pacing, SessionOpts};
