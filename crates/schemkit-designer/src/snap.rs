//! Point snapping used by the interaction layer before it builds commands.

use schemkit_settings::GridSettings;

use crate::model::Point;

/// Maps a raw scene point to the point a gesture should use.
pub trait Snapper {
    fn snap(&self, p: Point) -> Point;

    /// Prefer the nearest pin within reach, else fall back to [`snap`].
    ///
    /// [`snap`]: Snapper::snap
    fn snap_with_pins(&self, p: Point, pins: &[Point]) -> Point {
        let _ = pins;
        self.snap(p)
    }
}

/// Leaves points untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnap;

impl Snapper for NoSnap {
    fn snap(&self, p: Point) -> Point {
        p
    }
}

/// Rounds to a square grid and attracts points to nearby pins.
#[derive(Debug, Clone, Copy)]
pub struct GridSnapper {
    pub spacing: f64,
    pub enabled: bool,
    pub pin_threshold: f64,
}

impl Default for GridSnapper {
    fn default() -> Self {
        Self::from_settings(&GridSettings::default())
    }
}

impl GridSnapper {
    pub fn new(spacing: f64) -> Self {
        Self {
            spacing,
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &GridSettings) -> Self {
        Self {
            spacing: settings.spacing,
            enabled: settings.snap_enabled,
            pin_threshold: settings.pin_snap_threshold,
        }
    }
}

impl Snapper for GridSnapper {
    fn snap(&self, p: Point) -> Point {
        if !self.enabled || self.spacing <= 0.0 {
            return p;
        }
        Point::new(
            (p.x / self.spacing).round() * self.spacing,
            (p.y / self.spacing).round() * self.spacing,
        )
    }

    fn snap_with_pins(&self, p: Point, pins: &[Point]) -> Point {
        pins.iter()
            .map(|pin| (pin, pin.distance_to(&p)))
            .filter(|(_, d)| *d < self.pin_threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(pin, _)| *pin)
            .unwrap_or_else(|| self.snap(p))
    }
}
