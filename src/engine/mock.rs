//! Scripted provider for testing
//!
//! Does no rendering or playback. Tests emit whatever events they need and
//! inspect the journal of calls the session made on the provider. The
//! journal handle stays readable after the provider has been dropped.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::engine::provider::{ProviderEvent, WaveformProvider};
use crate::engine::region::Region;
use crate::engine::source::AudioSource;
use crate::error::Result;

/// A call the session made on a provider
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Load { name: String },
    Play { from: f64, to: Option<f64> },
    Pause,
    SetRegionDraggable(bool),
    SetRegion { start: f64, end: f64 },
    Destroy,
}

/// Provider that replays scripted events
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    duration: Option<f64>,
    position: f64,
    queue: VecDeque<ProviderEvent>,
    journal: Rc<RefCell<Vec<ProviderCall>>>,
    destroyed: bool,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that reports `Ready { duration }` as soon as it is loaded
    pub fn ready_with(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Queue an event as if the underlying widget had emitted it
    pub fn emit(&mut self, event: ProviderEvent) {
        if let ProviderEvent::TimeAdvance { current_time } = event {
            self.position = current_time;
        }
        self.queue.push_back(event);
    }

    /// Shared handle on the call journal
    pub fn journal(&self) -> Rc<RefCell<Vec<ProviderCall>>> {
        Rc::clone(&self.journal)
    }

    fn record(&self, call: ProviderCall) {
        self.journal.borrow_mut().push(call);
    }
}

impl WaveformProvider for ScriptedProvider {
    fn load(&mut self, source: &AudioSource) -> Result<()> {
        self.record(ProviderCall::Load {
            name: source.name().to_string(),
        });
        if let Some(duration) = self.duration {
            self.queue.push_back(ProviderEvent::Ready { duration });
        }
        Ok(())
    }

    fn play(&mut self, from: f64, to: Option<f64>) {
        self.position = from;
        self.record(ProviderCall::Play { from, to });
    }

    fn pause(&mut self) {
        self.record(ProviderCall::Pause);
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_region_draggable(&mut self, draggable: bool) {
        self.record(ProviderCall::SetRegionDraggable(draggable));
    }

    fn set_region(&mut self, region: Region) {
        self.record(ProviderCall::SetRegion {
            start: region.start(),
            end: region.end(),
        });
    }

    fn poll_events(&mut self) -> Vec<ProviderEvent> {
        if self.destroyed {
            return Vec::new();
        }
        self.queue.drain(..).collect()
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.queue.clear();
        self.record(ProviderCall::Destroy);
    }
}
