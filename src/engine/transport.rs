//! Playback Synchronizer
//!
//! Keeps playback confined to the selected region and tracks where the
//! time cursor sits over the waveform.
//!
//! The synchronizer never talks to the provider directly: each transition
//! returns the `ProviderCommand` the session must forward, so the state
//! machine can be exercised without a provider.

use std::fmt;

use serde::Serialize;

use crate::engine::provider::ProviderCommand;
use crate::engine::region::Region;

/// Default width of the waveform container in pixels
pub const DEFAULT_CONTAINER_WIDTH_PX: f64 = 800.0;

/// Transport states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TransportState {
    /// Nothing is playing (default state)
    #[default]
    Stopped,
    /// The region is playing
    Playing,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Stopped => write!(f, "Stopped"),
            TransportState::Playing => write!(f, "Playing"),
        }
    }
}

/// Snapshot of the playback state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time: f64,
}

/// Time cursor overlay position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cursor {
    /// Playback time in seconds
    pub time: f64,
    /// Horizontal offset inside the waveform container
    pub x_px: f64,
    /// `M:SS` label
    pub label: String,
}

impl Cursor {
    /// Place the cursor for `time` over a clip of `duration` seconds
    pub fn at(time: f64, duration: f64, container_width_px: f64) -> Self {
        let x_px = if duration > 0.0 && duration.is_finite() {
            ((time / duration) * container_width_px).clamp(0.0, container_width_px)
        } else {
            0.0
        };
        Self {
            time,
            x_px,
            label: format_time(time),
        }
    }
}

/// Outcome of a time-advance tick while playing
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub cursor: Cursor,
    /// Set when the tick crossed the region end and playback stopped
    pub command: Option<ProviderCommand>,
}

impl Tick {
    pub fn stopped(&self) -> bool {
        self.command.is_some()
    }
}

/// Format seconds as `M:SS`
///
/// # Example
/// ```
/// use gelang::engine::format_time;
/// assert_eq!(format_time(125.7), "2:05");
/// assert_eq!(format_time(0.0), "0:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    let t = if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    };
    let minutes = (t / 60.0).floor() as u64;
    let secs = (t % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

/// Region-bound playback state machine
#[derive(Debug, Clone)]
pub struct PlaybackSynchronizer {
    state: TransportState,

    /// Last known playback time in seconds
    current_time: f64,

    /// Width used for cursor placement
    container_width_px: f64,
}

impl Default for PlaybackSynchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_WIDTH_PX)
    }
}

impl PlaybackSynchronizer {
    pub fn new(container_width_px: f64) -> Self {
        Self {
            state: TransportState::Stopped,
            current_time: 0.0,
            container_width_px,
        }
    }

    // ========================================================================
    // Transport Controls
    // ========================================================================

    /// Start playing the region from its start
    ///
    /// State transition: Stopped -> Playing. Calling `play` while already
    /// playing restarts from the region start.
    ///
    /// # Example
    /// ```
    /// use gelang::engine::{PlaybackSynchronizer, Region, RegionBounds, ProviderCommand};
    /// let region = Region::clamped(RegionBounds::new(10.0, 25.0), 42.0);
    /// let mut sync = PlaybackSynchronizer::default();
    /// let command = sync.play(&region);
    /// assert!(sync.is_playing());
    /// assert_eq!(command, ProviderCommand::Play { from: 10.0, to: Some(25.0) });
    /// ```
    pub fn play(&mut self, region: &Region) -> ProviderCommand {
        self.state = TransportState::Playing;
        self.current_time = region.start();
        log::debug!(
            "[TRANSPORT] Play region {:.3}s..{:.3}s",
            region.start(),
            region.end()
        );
        ProviderCommand::Play {
            from: region.start(),
            to: Some(region.end()),
        }
    }

    /// Pause playback
    ///
    /// State transition: Playing -> Stopped. Returns `None` when already
    /// stopped.
    pub fn pause(&mut self) -> Option<ProviderCommand> {
        match self.state {
            TransportState::Playing => {
                self.state = TransportState::Stopped;
                log::debug!("[TRANSPORT] Paused at {:.3}s", self.current_time);
                Some(ProviderCommand::Pause)
            }
            TransportState::Stopped => {
                log::debug!("[TRANSPORT] Already stopped");
                None
            }
        }
    }

    /// Play/pause button
    pub fn toggle(&mut self, region: &Region) -> Option<ProviderCommand> {
        match self.state {
            TransportState::Playing => self.pause(),
            TransportState::Stopped => Some(self.play(region)),
        }
    }

    // ========================================================================
    // Provider Events
    // ========================================================================

    /// Provider reported playback time `time`
    ///
    /// Ignored while stopped. While playing the cursor is recomputed and,
    /// once `time` passes the region end (or the clip end), playback stops.
    pub fn on_time_advance(&mut self, time: f64, region: &Region, duration: f64) -> Option<Tick> {
        if self.state != TransportState::Playing {
            return None;
        }

        self.current_time = time;
        let cursor = Cursor::at(time, duration, self.container_width_px);

        let command = if time > region.end() || time >= duration {
            self.state = TransportState::Stopped;
            log::debug!(
                "[TRANSPORT] Auto-stop at {:.3}s (region end {:.3}s)",
                time,
                region.end()
            );
            Some(ProviderCommand::Pause)
        } else {
            None
        };

        Some(Tick { cursor, command })
    }

    /// A drag gesture settled on `region`
    ///
    /// Always ends up Playing from the new region start, whether or not
    /// playback was running before the drag.
    pub fn on_region_settled(&mut self, region: &Region) -> ProviderCommand {
        if self.state == TransportState::Playing {
            log::debug!("[TRANSPORT] Restarting on settled region");
        }
        self.play(region)
    }

    /// Forget all playback state (source swapped or cleared)
    pub fn reset(&mut self) {
        self.state = TransportState::Stopped;
        self.current_time = 0.0;
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState {
            is_playing: self.is_playing(),
            current_time: self.current_time,
        }
    }

    pub fn container_width_px(&self) -> f64 {
        self.container_width_px
    }

    pub fn set_container_width_px(&mut self, width: f64) {
        self.container_width_px = width.max(0.0);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
