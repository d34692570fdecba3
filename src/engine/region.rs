//! Region Controller
//!
//! Owns the selected time region of the loaded clip. The provider reports
//! raw bounds while the user drags; the controller clamps them into a valid
//! region and keeps two views of it:
//! - the display region, updated on every drag step
//! - the committed region, updated only when a drag gesture settles
//!
//! The request builder only ever reads the committed region.

use serde::{Deserialize, Serialize};

/// Default length of the initial region in seconds
pub const DEFAULT_REGION_SECS: f64 = 30.0;

/// Smallest region length the controller will produce
pub const REGION_EPSILON: f64 = 0.01;

/// Raw region bounds as reported by a provider (not validated)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub start: f64,
    pub end: f64,
}

impl RegionBounds {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// A validated region: `0 <= start < end <= duration`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    start: f64,
    end: f64,
}

impl Region {
    /// Clamp raw bounds into a valid region of a clip of `duration` seconds
    ///
    /// Never fails for a positive duration: out-of-range or inverted bounds
    /// are pulled back inside the clip and `end` is pushed past `start`.
    pub fn clamped(bounds: RegionBounds, duration: f64) -> Self {
        let eps = REGION_EPSILON.min(duration);

        let mut start = if bounds.start.is_finite() {
            bounds.start.clamp(0.0, duration)
        } else {
            0.0
        };
        let mut end = if bounds.end.is_finite() {
            bounds.end.clamp(0.0, duration)
        } else {
            duration
        };

        if end < start + eps {
            end = start + eps;
        }
        if end > duration {
            end = duration;
            start = (duration - eps).max(0.0);
        }

        Self { start, end }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Region length in seconds
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Check whether a time lies inside the region (inclusive)
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

impl From<Region> for RegionBounds {
    fn from(region: Region) -> Self {
        RegionBounds::new(region.start, region.end)
    }
}

/// Holds the region of the currently loaded clip
#[derive(Debug, Clone)]
pub struct RegionController {
    /// Clip duration, known once the provider is ready
    duration: Option<f64>,

    /// Length of the region created on ready
    default_length: f64,

    /// Last settled region (read by the request builder)
    committed: Option<Region>,

    /// Latest region including intermediate drag updates
    display: Option<Region>,

    /// Set while a submission is in flight
    locked: bool,
}

impl Default for RegionController {
    fn default() -> Self {
        Self::new(DEFAULT_REGION_SECS)
    }
}

impl RegionController {
    /// Create a controller whose initial region spans `default_length` seconds
    pub fn new(default_length: f64) -> Self {
        Self {
            duration: None,
            default_length,
            committed: None,
            display: None,
            locked: false,
        }
    }

    /// Provider finished loading a clip of `duration` seconds
    ///
    /// Creates the initial region `{0, min(duration, default_length)}`.
    /// Returns `None` (and creates nothing) for a non-positive duration.
    ///
    /// # Example
    /// ```
    /// use gelang::engine::RegionController;
    /// let mut regions = RegionController::new(30.0);
    /// let region = regions.on_provider_ready(42.0).unwrap();
    /// assert_eq!((region.start(), region.end()), (0.0, 30.0));
    /// ```
    pub fn on_provider_ready(&mut self, duration: f64) -> Option<Region> {
        if !duration.is_finite() || duration <= 0.0 {
            log::warn!("[REGION] Ignoring ready with invalid duration {}", duration);
            return None;
        }

        let region = Region::clamped(
            RegionBounds::new(0.0, duration.min(self.default_length)),
            duration,
        );
        self.duration = Some(duration);
        self.committed = Some(region);
        self.display = Some(region);
        log::debug!(
            "[REGION] Initial region {:.3}s..{:.3}s of {:.3}s",
            region.start,
            region.end,
            duration
        );
        Some(region)
    }

    /// Intermediate bounds while the user drags (display only)
    pub fn on_region_changed(&mut self, bounds: RegionBounds) -> Option<Region> {
        let region = self.accept(bounds)?;
        self.display = Some(region);
        Some(region)
    }

    /// Final bounds once a drag gesture ends; commits the region
    pub fn on_region_update_end(&mut self, bounds: RegionBounds) -> Option<Region> {
        let region = self.accept(bounds)?;
        self.display = Some(region);
        self.committed = Some(region);
        log::debug!(
            "[REGION] Committed {:.3}s..{:.3}s",
            region.start,
            region.end
        );
        Some(region)
    }

    fn accept(&self, bounds: RegionBounds) -> Option<Region> {
        if self.locked {
            log::debug!("[REGION] Locked, ignoring bounds {:?}", bounds);
            return None;
        }
        let duration = self.duration?;
        Some(Region::clamped(bounds, duration))
    }

    /// Freeze the region (submission in flight)
    ///
    /// A drag in progress is abandoned: the display falls back to the
    /// committed region, which is returned when it differs from what was
    /// shown so the handle can be moved back.
    pub fn lock(&mut self) -> Option<Region> {
        self.locked = true;
        let committed = self.committed?;
        if self.display == Some(committed) {
            return None;
        }
        log::debug!(
            "[REGION] Drag abandoned, back to {:.3}s..{:.3}s",
            committed.start,
            committed.end
        );
        self.display = Some(committed);
        Some(committed)
    }

    /// Allow region updates again
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn committed_region(&self) -> Option<Region> {
        self.committed
    }

    pub fn display_region(&self) -> Option<Region> {
        self.display
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Forget the clip and its region
    pub fn reset(&mut self) {
        self.duration = None;
        self.committed = None;
        self.display = None;
        self.locked = false;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
