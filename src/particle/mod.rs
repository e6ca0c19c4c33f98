//! Particles travelling along connection routes.

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::core::Point;
use crate::foundation::error::{PipevizError, PipevizResult};
use crate::foundation::rng::Rng64;
use crate::geometry::route::Route;
use crate::render::surface::{DrawSurface, Shadow, with_shadow};

/// Ranges the per-particle parameters are drawn from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleTuning {
    /// Lower bound of progress gained per frame.
    pub speed_min: f64,
    /// Upper bound of progress gained per frame.
    pub speed_max: f64,
    /// Lower bound of the dot radius.
    pub size_min: f64,
    /// Upper bound of the dot radius.
    pub size_max: f64,
    /// Lower bound of the glow blur radius.
    pub glow_min: f64,
    /// Upper bound of the glow blur radius.
    pub glow_max: f64,
    /// Lower bound of the hue, in degrees.
    pub hue_min: f64,
    /// Upper bound of the hue, in degrees.
    pub hue_max: f64,
    /// HSL saturation of every particle.
    pub saturation: f64,
    /// HSL lightness of every particle.
    pub lightness: f64,
    /// Pool size per connection.
    pub particles_per_connection: usize,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            speed_min: 0.002,
            speed_max: 0.005,
            size_min: 4.0,
            size_max: 7.0,
            glow_min: 3.0,
            glow_max: 5.0,
            hue_min: 180.0,
            hue_max: 240.0,
            saturation: 0.8,
            lightness: 0.6,
            particles_per_connection: 2,
        }
    }
}

impl ParticleTuning {
    pub(crate) fn validate(&self) -> PipevizResult<()> {
        let ranges = [
            ("speed", self.speed_min, self.speed_max),
            ("size", self.size_min, self.size_max),
            ("glow", self.glow_min, self.glow_max),
            ("hue", self.hue_min, self.hue_max),
        ];
        for (name, lo, hi) in ranges {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(PipevizError::config(format!(
                    "particle {name} range must be finite"
                )));
            }
            if lo > hi {
                return Err(PipevizError::config(format!(
                    "particle {name}_min ({lo}) must be <= {name}_max ({hi})"
                )));
            }
        }
        if self.speed_min <= 0.0 {
            return Err(PipevizError::config("particle speed_min must be > 0"));
        }
        if self.size_min < 0.0 || self.glow_min < 0.0 {
            return Err(PipevizError::config(
                "particle size and glow must be non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.saturation) || !(0.0..=1.0).contains(&self.lightness) {
            return Err(PipevizError::config(
                "particle saturation and lightness must be within 0..=1",
            ));
        }
        if self.particles_per_connection == 0 {
            return Err(PipevizError::config(
                "particles_per_connection must be >= 1",
            ));
        }
        Ok(())
    }
}

/// A marker moving along one connection.
///
/// The connection is referenced by index into the layout, which outlives every particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    connection: usize,
    /// Position along the route in `[0, 1]`.
    pub progress: f64,
    speed: f64,
    size: f64,
    glow: f64,
    color: Color,
}

impl Particle {
    /// Draw speed, size, glow and hue for a new particle on `connection`, starting at progress 0.
    pub(crate) fn spawn(connection: usize, tuning: &ParticleTuning, rng: &mut Rng64) -> Self {
        let speed = rng.range_f64(tuning.speed_min, tuning.speed_max);
        let size = rng.range_f64(tuning.size_min, tuning.size_max);
        let hue = rng.range_f64(tuning.hue_min, tuning.hue_max);
        let glow = rng.range_f64(tuning.glow_min, tuning.glow_max);
        Self {
            connection,
            progress: 0.0,
            speed,
            size,
            glow,
            color: Color::hsla(hue, tuning.saturation, tuning.lightness, 1.0),
        }
    }

    /// Index of the connection this particle travels on.
    pub fn connection(&self) -> usize {
        self.connection
    }

    /// Progress gained per update.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Dot radius.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Glow blur radius.
    pub fn glow(&self) -> f64 {
        self.glow
    }

    /// Dot and glow color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Advance by `speed`; overshooting past 1 restarts at exactly 0 (the excess is dropped).
    pub fn update(&mut self) {
        self.progress = next_progress(self.progress, self.speed);
    }

    /// Current position on `route`.
    pub fn position(&self, route: &Route) -> Point {
        route.point_at(self.progress)
    }

    /// Draw the dot with its glow. The glow is scoped to this call.
    pub fn draw(&self, surface: &mut dyn DrawSurface, route: &Route) {
        let center = self.position(route);
        let shadow = Shadow::glow(self.color, self.glow);
        with_shadow(surface, Some(shadow), |s| {
            s.fill_circle(center, self.size, self.color);
        });
    }
}

/// Progress after one tick: `p + s`, or `0` once that exceeds 1.
pub fn next_progress(progress: f64, speed: f64) -> f64 {
    let next = progress + speed;
    if next > 1.0 { 0.0 } else { next }
}

/// Build `per_connection` particles for each of `connections` connections, phase-offset to
/// `i / per_connection` so they start evenly spread along their path.
pub(crate) fn build_pool(
    connections: usize,
    tuning: &ParticleTuning,
    rng: &mut Rng64,
) -> Vec<Particle> {
    let n = tuning.particles_per_connection;
    let mut pool = Vec::with_capacity(connections * n);
    for c in 0..connections {
        for i in 0..n {
            let mut p = Particle::spawn(c, tuning, rng);
            p.progress = i as f64 / n as f64;
            pool.push(p);
        }
    }
    pool
}

#[cfg(test)]
#[path = "../../tests/unit/particle/mod.rs"]
mod tests;
