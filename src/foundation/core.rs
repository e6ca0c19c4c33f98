use crate::foundation::error::{PipevizError, PipevizResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Largest accepted surface edge, in pixels.
pub const MAX_SURFACE_DIM: u32 = 16_384;

/// 0-based index of a rendered frame since the animation started.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> PipevizResult<Self> {
        let fps = Self { num, den };
        fps.validate()?;
        Ok(fps)
    }

    pub(crate) fn validate(self) -> PipevizResult<()> {
        if self.den == 0 {
            return Err(PipevizError::config("fps den must be > 0"));
        }
        if self.num == 0 {
            return Err(PipevizError::config("fps num must be > 0"));
        }
        Ok(())
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Duration of one frame.
    pub fn frame_duration(self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.frame_duration_secs())
    }
}

/// Logical drawing-surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    pub(crate) fn validate(self) -> PipevizResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PipevizError::config("surface width and height must be > 0"));
        }
        if self.width > MAX_SURFACE_DIM || self.height > MAX_SURFACE_DIM {
            return Err(PipevizError::config(format!(
                "surface {}x{} exceeds {MAX_SURFACE_DIM}x{MAX_SURFACE_DIM}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
