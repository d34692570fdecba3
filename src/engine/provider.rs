//! Waveform provider seam
//!
//! A provider renders the waveform of a loaded clip, owns the draggable
//! region handle and plays audio. It reports what happens as typed
//! `ProviderEvent`s, queued in emission order and drained by the session.
//!
//! `WavProvider` is the headless implementation used by the CLI: it reads
//! the clip duration from a WAV header and emulates playback ticks and
//! region drags.

use std::collections::VecDeque;
use std::fmt;

use crate::engine::io::probe_wav;
use crate::engine::region::{Region, RegionBounds};
use crate::engine::source::AudioSource;
use crate::error::{GelangError, Result};

/// MIME types `WavProvider` can decode
pub const WAV_MIME_TYPES: &[&str] = &["audio/wav", "audio/x-wav", "audio/wave", "audio/vnd.wave"];

/// Identity of one provider instance within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(pub u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}

/// Events a provider emits
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProviderEvent {
    /// Waveform loaded; clip duration in seconds
    Ready { duration: f64 },
    /// Region moved or resized (continuous during a drag)
    RegionChanged(RegionBounds),
    /// Drag gesture released
    RegionUpdateEnd(RegionBounds),
    /// Periodic playback position
    TimeAdvance { current_time: f64 },
}

/// Commands the session forwards to a provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProviderCommand {
    Play { from: f64, to: Option<f64> },
    Pause,
}

/// Interface of a waveform rendering/interaction backend
pub trait WaveformProvider {
    /// Start loading a clip; emits `Ready` once the duration is known
    fn load(&mut self, source: &AudioSource) -> Result<()>;

    /// Play from `from`, optionally stopping at `to`
    fn play(&mut self, from: f64, to: Option<f64>);

    fn pause(&mut self);

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Clip duration, once loaded
    fn duration(&self) -> Option<f64>;

    /// Enable or disable dragging/resizing of the region handle
    fn set_region_draggable(&mut self, draggable: bool);

    /// Move the region handle to `region` without emitting region events
    fn set_region(&mut self, region: Region);

    /// Drain queued events in emission order
    fn poll_events(&mut self) -> Vec<ProviderEvent>;

    /// Release the instance; no events may be observed afterwards
    fn destroy(&mut self);

    /// Forward a synchronizer command
    fn execute(&mut self, command: ProviderCommand) {
        match command {
            ProviderCommand::Play { from, to } => self.play(from, to),
            ProviderCommand::Pause => self.pause(),
        }
    }
}

/// Headless provider backed by a WAV clip
#[derive(Debug, Default)]
pub struct WavProvider {
    duration: Option<f64>,
    position: f64,
    playing: bool,
    stop_at: Option<f64>,
    region: Option<Region>,
    draggable: bool,
    destroyed: bool,
    queue: VecDeque<ProviderEvent>,
}

impl WavProvider {
    pub fn new() -> Self {
        Self {
            draggable: true,
            ..Self::default()
        }
    }

    /// Advance the playhead by `seconds` of wall-clock playback
    ///
    /// Emits one `TimeAdvance`. Playback stops by itself once it passes the
    /// requested stop time or reaches the end of the clip.
    pub fn advance(&mut self, seconds: f64) {
        if !self.playing || self.destroyed {
            return;
        }
        let Some(duration) = self.duration else {
            return;
        };

        self.position = (self.position + seconds.max(0.0)).min(duration);
        self.queue.push_back(ProviderEvent::TimeAdvance {
            current_time: self.position,
        });

        let past_stop = self.stop_at.map_or(false, |end| self.position > end);
        if past_stop || self.position >= duration {
            self.playing = false;
        }
    }

    /// Emulate the user dragging the region handle to `bounds` and releasing it
    ///
    /// Returns `false` (and emits nothing) while dragging is disabled.
    pub fn drag_region(&mut self, bounds: RegionBounds) -> bool {
        if !self.draggable || self.destroyed || self.duration.is_none() {
            log::debug!("[WAV] Region drag rejected");
            return false;
        }
        self.queue.push_back(ProviderEvent::RegionChanged(bounds));
        self.queue.push_back(ProviderEvent::RegionUpdateEnd(bounds));
        true
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_region_draggable(&self) -> bool {
        self.draggable
    }

    /// Where the region handle was last placed by the session
    pub fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl WaveformProvider for WavProvider {
    fn load(&mut self, source: &AudioSource) -> Result<()> {
        if !WAV_MIME_TYPES.contains(&source.mime_type()) {
            return Err(GelangError::UnsupportedFormat {
                format: source.mime_type().to_string(),
            });
        }
        let info = probe_wav(source.bytes())?;
        log::debug!(
            "[WAV] Loaded '{}': {} Hz, {} ch, {:.3}s",
            source.name(),
            info.sample_rate,
            info.channels,
            info.duration_secs
        );
        self.duration = Some(info.duration_secs);
        self.region = None;
        self.position = 0.0;
        self.playing = false;
        self.queue.push_back(ProviderEvent::Ready {
            duration: info.duration_secs,
        });
        Ok(())
    }

    fn play(&mut self, from: f64, to: Option<f64>) {
        if self.destroyed {
            return;
        }
        let duration = self.duration.unwrap_or(0.0);
        self.position = from.clamp(0.0, duration);
        self.stop_at = to;
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_region_draggable(&mut self, draggable: bool) {
        self.draggable = draggable;
    }

    fn set_region(&mut self, region: Region) {
        log::debug!(
            "[WAV] Region handle moved to {:.3}s..{:.3}s",
            region.start(),
            region.end()
        );
        self.region = Some(region);
    }

    fn poll_events(&mut self) -> Vec<ProviderEvent> {
        if self.destroyed {
            return Vec::new();
        }
        self.queue.drain(..).collect()
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.playing = false;
        self.queue.clear();
    }
}
