//! Classification session
//!
//! A `Session` owns everything tied to the loaded clip: the audio source,
//! the provider instance, the region controller, the playback synchronizer
//! and the last classification result. Provider events are dispatched one
//! at a time, in the order the provider emitted them.
//!
//! Swapping or clearing the clip destroys the provider before anything else
//! happens. Events that still reach the session for a released provider are
//! dropped by `ProviderId`.

use crate::classify::{
    interpret, ClassificationResult, ClassificationTransport, PredictRequest, RawResponse,
    RequestBuilder, SubmissionTicket,
};
use crate::config::Settings;
use crate::engine::{
    format_time, AudioSource, Cursor, PlaybackState, PlaybackSynchronizer, ProviderCommand,
    ProviderEvent, ProviderId, Region, RegionController, WaveformProvider,
};
use crate::error::Result;

/// What changed while handling an event or user action
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    /// Initial region created after the clip loaded
    RegionReady(Region),
    /// Region moved during a drag (display only)
    RegionDisplayed(Region),
    /// Drag settled; the region to classify changed
    RegionCommitted(Region),
    PlaybackStarted { from: f64 },
    PlaybackStopped { at: f64 },
    CursorMoved(Cursor),
}

struct LoadedProvider<P> {
    id: ProviderId,
    instance: P,
}

/// Single owner of the loaded clip and everything derived from it
pub struct Session<P: WaveformProvider> {
    autoplay_on_ready: bool,
    source: Option<AudioSource>,
    provider: Option<LoadedProvider<P>>,
    next_provider_id: u64,
    regions: RegionController,
    playback: PlaybackSynchronizer,
    requests: RequestBuilder,
    result: Option<ClassificationResult>,
}

impl<P: WaveformProvider> Session<P> {
    pub fn new(settings: &Settings) -> Self {
        Self {
            autoplay_on_ready: settings.autoplay_on_ready,
            source: None,
            provider: None,
            next_provider_id: 0,
            regions: RegionController::new(settings.default_region_secs),
            playback: PlaybackSynchronizer::new(settings.container_width_px),
            requests: RequestBuilder::new(),
            result: None,
        }
    }

    // ========================================================================
    // Source Lifecycle
    // ========================================================================

    /// Replace the current clip with `source`, rendered by `provider`
    ///
    /// The previous provider is destroyed and all state derived from the
    /// previous clip is discarded before the new provider starts loading.
    /// If loading fails the new provider is destroyed too and the session
    /// is left empty.
    pub fn load_source(&mut self, source: AudioSource, mut provider: P) -> Result<ProviderId> {
        self.release();

        if let Err(e) = provider.load(&source) {
            log::warn!("[SESSION] Failed to load '{}': {}", source.name(), e);
            provider.destroy();
            return Err(e);
        }

        self.next_provider_id += 1;
        let id = ProviderId(self.next_provider_id);
        log::info!("[SESSION] Loaded '{}' with {}", source.name(), id);

        self.source = Some(source);
        self.provider = Some(LoadedProvider {
            id,
            instance: provider,
        });
        Ok(id)
    }

    /// Drop the clip, its provider, region, playback state and result
    pub fn clear(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut loaded) = self.provider.take() {
            loaded.instance.destroy();
            log::debug!("[SESSION] Released {}", loaded.id);
        }
        self.source = None;
        self.regions.reset();
        self.playback.reset();
        self.requests.abandon();
        self.result = None;
    }

    // ========================================================================
    // Event Dispatch
    // ========================================================================

    /// Drain the current provider's queue and handle each event in order
    pub fn pump(&mut self) -> Vec<SessionNotice> {
        let Some(loaded) = self.provider.as_mut() else {
            return Vec::new();
        };
        let id = loaded.id;
        let events = loaded.instance.poll_events();

        let mut notices = Vec::new();
        for event in events {
            notices.extend(self.dispatch(id, event));
        }
        notices
    }

    /// Handle one event from provider `id`
    ///
    /// Events from a provider that is no longer current are dropped.
    pub fn dispatch(&mut self, id: ProviderId, event: ProviderEvent) -> Vec<SessionNotice> {
        if self.provider_id() != Some(id) {
            log::debug!("[SESSION] Dropping {:?} from released {}", event, id);
            return Vec::new();
        }

        let mut notices = Vec::new();
        match event {
            ProviderEvent::Ready { duration } => {
                self.playback.reset();
                if let Some(region) = self.regions.on_provider_ready(duration) {
                    notices.push(SessionNotice::RegionReady(region));
                    if self.autoplay_on_ready {
                        let command = self.playback.play(&region);
                        self.execute(command, &mut notices);
                    }
                }
            }
            ProviderEvent::RegionChanged(bounds) => {
                if let Some(region) = self.regions.on_region_changed(bounds) {
                    notices.push(SessionNotice::RegionDisplayed(region));
                }
            }
            ProviderEvent::RegionUpdateEnd(bounds) => {
                if let Some(region) = self.regions.on_region_update_end(bounds) {
                    notices.push(SessionNotice::RegionCommitted(region));
                    let command = self.playback.on_region_settled(&region);
                    self.execute(command, &mut notices);
                }
            }
            ProviderEvent::TimeAdvance { current_time } => {
                let (Some(region), Some(duration)) =
                    (self.regions.committed_region(), self.regions.duration())
                else {
                    return notices;
                };
                if let Some(tick) = self.playback.on_time_advance(current_time, &region, duration) {
                    notices.push(SessionNotice::CursorMoved(tick.cursor));
                    if let Some(command) = tick.command {
                        self.execute(command, &mut notices);
                    }
                }
            }
        }
        notices
    }

    fn execute(&mut self, command: ProviderCommand, notices: &mut Vec<SessionNotice>) {
        if let Some(loaded) = self.provider.as_mut() {
            loaded.instance.execute(command);
        }
        notices.push(match command {
            ProviderCommand::Play { from, .. } => SessionNotice::PlaybackStarted { from },
            ProviderCommand::Pause => SessionNotice::PlaybackStopped {
                at: self.playback.current_time(),
            },
        });
    }

    // ========================================================================
    // User Actions
    // ========================================================================

    /// Play/pause button; does nothing without a region
    pub fn toggle_playback(&mut self) -> Vec<SessionNotice> {
        let mut notices = Vec::new();
        let Some(region) = self.regions.committed_region() else {
            return notices;
        };
        if let Some(command) = self.playback.toggle(&region) {
            self.execute(command, &mut notices);
        }
        notices
    }

    /// Start classifying the committed region
    ///
    /// Returns `Ok(None)` without any side effect when no clip or region
    /// exists. Otherwise region dragging is disabled and the previous result
    /// cleared until `finish_submission` is called with the request ticket.
    ///
    /// # Errors
    /// * `SubmissionInFlight` - If a submission has not finished yet
    pub fn begin_submission(&mut self) -> Result<Option<PredictRequest>> {
        let request = self
            .requests
            .begin(self.source.as_ref(), self.regions.committed_region())?;

        if let Some(request) = &request {
            let restored = self.regions.lock();
            if let Some(loaded) = self.provider.as_mut() {
                if let Some(region) = restored {
                    loaded.instance.set_region(region);
                }
                loaded.instance.set_region_draggable(false);
            }
            self.result = None;
            log::info!(
                "[SESSION] Classifying '{}' {}..{}",
                request.file_name(),
                format_time(request.region().start()),
                format_time(request.region().end())
            );
        }
        Ok(request)
    }

    /// Complete the submission identified by `ticket`
    ///
    /// Whatever the outcome, region dragging is re-enabled and the loading
    /// state cleared. Returns `None` when `ticket` belongs to a submission
    /// that was abandoned by clearing or swapping the clip.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<RawResponse>,
    ) -> Option<&ClassificationResult> {
        if !self.requests.finish(ticket) {
            log::debug!("[SESSION] Discarding response for abandoned submission");
            return None;
        }

        self.regions.unlock();
        if let Some(loaded) = self.provider.as_mut() {
            loaded.instance.set_region_draggable(true);
        }

        let result = interpret(outcome);
        Some(&*self.result.insert(result))
    }

    /// Build, send and finish a submission through `transport`
    ///
    /// Returns `Ok(None)` (and never calls the transport) when there is
    /// nothing to classify.
    pub fn submit<T>(&mut self, transport: &T) -> Result<Option<&ClassificationResult>>
    where
        T: ClassificationTransport + ?Sized,
    {
        let Some(request) = self.begin_submission()? else {
            return Ok(None);
        };
        let outcome = transport.send(&request);
        Ok(self.finish_submission(request.ticket(), outcome))
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    pub fn source(&self) -> Option<&AudioSource> {
        self.source.as_ref()
    }

    /// Committed region (what gets classified)
    pub fn region(&self) -> Option<Region> {
        self.regions.committed_region()
    }

    /// Region as currently shown, including drag updates
    pub fn display_region(&self) -> Option<Region> {
        self.regions.display_region()
    }

    /// `M:SS` labels for the displayed region start and end
    pub fn region_labels(&self) -> Option<(String, String)> {
        self.display_region()
            .map(|r| (format_time(r.start()), format_time(r.end())))
    }

    pub fn duration(&self) -> Option<f64> {
        self.regions.duration()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.playback_state()
    }

    /// A submission is in flight
    pub fn is_loading(&self) -> bool {
        self.requests.is_in_flight()
    }

    pub fn is_region_draggable(&self) -> bool {
        self.regions.committed_region().is_some() && !self.regions.is_locked()
    }

    /// Classify button state
    pub fn can_submit(&self) -> bool {
        self.source.is_some() && !self.is_loading()
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        self.result.as_ref()
    }

    pub fn provider_id(&self) -> Option<ProviderId> {
        self.provider.as_ref().map(|loaded| loaded.id)
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref().map(|loaded| &loaded.instance)
    }

    pub fn provider_mut(&mut self) -> Option<&mut P> {
        self.provider.as_mut().map(|loaded| &mut loaded.instance)
    }

    pub fn set_container_width_px(&mut self, width: f64) {
        self.playback.set_container_width_px(width);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::REQUEST_FAILED_MESSAGE;
    use crate::engine::{ProviderCall, RegionBounds, ScriptedProvider};
    use crate::error::GelangError;
    use pretty_assertions::assert_eq;

    fn clip(name: &str) -> AudioSource {
        AudioSource::intake(name, "audio/wav", vec![0u8; 32]).unwrap()
    }

    fn quiet_settings() -> Settings {
        Settings {
            autoplay_on_ready: false,
            ..Settings::default()
        }
    }

    fn loaded(duration: f64, settings: &Settings) -> Session<ScriptedProvider> {
        let mut session = Session::new(settings);
        session
            .load_source(clip("clip.wav"), ScriptedProvider::ready_with(duration))
            .unwrap();
        session.pump();
        session
    }

    // ------------------------------------------------------------------------
    // Ready
    // ------------------------------------------------------------------------

    #[test]
    fn test_ready_creates_region_and_autoplays() {
        let mut session = Session::new(&Settings::default());
        session
            .load_source(clip("clip.wav"), ScriptedProvider::ready_with(42.0))
            .unwrap();

        let notices = session.pump();
        let region = session.region().unwrap();
        assert_eq!((region.start(), region.end()), (0.0, 30.0));
        assert_eq!(
            notices,
            vec![
                SessionNotice::RegionReady(region),
                SessionNotice::PlaybackStarted { from: 0.0 },
            ]
        );
        assert!(session.playback_state().is_playing);
        assert_eq!(session.region_labels(), Some(("0:00".to_string(), "0:30".to_string())));
    }

    #[test]
    fn test_ready_without_autoplay() {
        let session = loaded(42.0, &quiet_settings());
        assert!(session.region().is_some());
        assert!(!session.playback_state().is_playing);
    }

    #[test]
    fn test_zero_duration_creates_no_region() {
        let session = loaded(0.0, &Settings::default());
        assert!(session.region().is_none());
        assert!(!session.is_region_draggable());
    }

    // ------------------------------------------------------------------------
    // Drag
    // ------------------------------------------------------------------------

    #[test]
    fn test_drag_then_settle() {
        let mut session = loaded(42.0, &quiet_settings());
        let provider = session.provider_mut().unwrap();
        provider.emit(ProviderEvent::RegionChanged(RegionBounds::new(8.0, 20.0)));
        provider.emit(ProviderEvent::RegionChanged(RegionBounds::new(10.0, 25.0)));

        session.pump();
        assert_eq!(session.display_region().unwrap().start(), 10.0);
        assert_eq!(session.region().unwrap().start(), 0.0);

        session
            .provider_mut()
            .unwrap()
            .emit(ProviderEvent::RegionUpdateEnd(RegionBounds::new(10.0, 25.0)));
        let notices = session.pump();
        assert!(matches!(notices[0], SessionNotice::RegionCommitted(_)));
        assert_eq!(session.region().unwrap().end(), 25.0);
    }

    #[test]
    fn test_settle_while_playing_restarts_from_new_start() {
        let mut session = loaded(42.0, &Settings::default());
        let journal = session.provider().unwrap().journal();

        session
            .provider_mut()
            .unwrap()
            .emit(ProviderEvent::RegionUpdateEnd(RegionBounds::new(10.0, 25.0)));
        session.pump();

        assert!(session.playback_state().is_playing);
        assert_eq!(
            journal.borrow().last(),
            Some(&ProviderCall::Play {
                from: 10.0,
                to: Some(25.0)
            })
        );
    }

    #[test]
    fn test_settle_while_stopped_plays_new_region() {
        let mut session = loaded(42.0, &quiet_settings());
        let journal = session.provider().unwrap().journal();
        assert!(!session.playback_state().is_playing);

        session
            .provider_mut()
            .unwrap()
            .emit(ProviderEvent::RegionUpdateEnd(RegionBounds::new(10.0, 25.0)));
        let notices = session.pump();

        assert_eq!(notices.last(), Some(&SessionNotice::PlaybackStarted { from: 10.0 }));
        assert!(session.playback_state().is_playing);
        assert_eq!(
            journal.borrow().last(),
            Some(&ProviderCall::Play {
                from: 10.0,
                to: Some(25.0)
            })
        );
    }

    // ------------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------------

    #[test]
    fn test_time_advance_auto_stops_past_region_end() {
        let mut session = loaded(42.0, &Settings::default());
        let journal = session.provider().unwrap().journal();

        let provider = session.provider_mut().unwrap();
        provider.emit(ProviderEvent::TimeAdvance { current_time: 29.9 });
        provider.emit(ProviderEvent::TimeAdvance { current_time: 30.0 });
        provider.emit(ProviderEvent::TimeAdvance { current_time: 30.1 });
        let notices = session.pump();

        assert!(!session.playback_state().is_playing);
        assert_eq!(
            notices.last(),
            Some(&SessionNotice::PlaybackStopped { at: 30.1 })
        );
        assert_eq!(journal.borrow().last(), Some(&ProviderCall::Pause));
        let cursors = notices
            .iter()
            .filter(|n| matches!(n, SessionNotice::CursorMoved(_)))
            .count();
        assert_eq!(cursors, 3);
    }

    #[test]
    fn test_toggle_playback() {
        let mut session = loaded(42.0, &quiet_settings());
        let notices = session.toggle_playback();
        assert_eq!(notices, vec![SessionNotice::PlaybackStarted { from: 0.0 }]);
        let notices = session.toggle_playback();
        assert_eq!(notices, vec![SessionNotice::PlaybackStopped { at: 0.0 }]);
    }

    #[test]
    fn test_toggle_without_region_does_nothing() {
        let mut session: Session<ScriptedProvider> = Session::new(&Settings::default());
        assert!(session.toggle_playback().is_empty());
    }

    // ------------------------------------------------------------------------
    // Source Swap
    // ------------------------------------------------------------------------

    #[test]
    fn test_swap_destroys_previous_provider_first() {
        let mut session = loaded(42.0, &Settings::default());
        let old_id = session.provider_id().unwrap();
        let old_journal = session.provider().unwrap().journal();

        let new_id = session
            .load_source(clip("next.wav"), ScriptedProvider::ready_with(12.0))
            .unwrap();

        assert_ne!(old_id, new_id);
        assert_eq!(old_journal.borrow().last(), Some(&ProviderCall::Destroy));
        assert!(session.region().is_none());
        assert!(!session.playback_state().is_playing);

        // Late callback from the released instance
        let notices = session.dispatch(old_id, ProviderEvent::Ready { duration: 99.0 });
        assert!(notices.is_empty());
        assert!(session.region().is_none());

        session.pump();
        assert_eq!(session.region().unwrap().end(), 12.0);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut session = loaded(42.0, &Settings::default());
        session.clear();

        assert!(session.source().is_none());
        assert!(session.region().is_none());
        assert!(session.provider_id().is_none());
        assert!(session.result().is_none());
        assert!(!session.playback_state().is_playing);
        assert!(session.pump().is_empty());
    }

    #[test]
    fn test_failed_load_leaves_session_empty() {
        struct Broken;
        impl WaveformProvider for Broken {
            fn load(&mut self, _source: &AudioSource) -> Result<()> {
                Err(GelangError::UnsupportedFormat {
                    format: "mp3".to_string(),
                })
            }
            fn play(&mut self, _from: f64, _to: Option<f64>) {}
            fn pause(&mut self) {}
            fn current_time(&self) -> f64 {
                0.0
            }
            fn duration(&self) -> Option<f64> {
                None
            }
            fn set_region_draggable(&mut self, _draggable: bool) {}
            fn set_region(&mut self, _region: Region) {}
            fn poll_events(&mut self) -> Vec<ProviderEvent> {
                Vec::new()
            }
            fn destroy(&mut self) {}
        }

        let mut session = Session::new(&Settings::default());
        assert!(session.load_source(clip("clip.mp3"), Broken).is_err());
        assert!(session.source().is_none());
        assert!(session.provider_id().is_none());
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    #[test]
    fn test_submission_locks_region_until_finished() {
        let mut session = loaded(42.0, &quiet_settings());
        let journal = session.provider().unwrap().journal();

        let request = session.begin_submission().unwrap().unwrap();
        assert!(session.is_loading());
        assert!(!session.is_region_draggable());
        assert!(!session.can_submit());
        assert_eq!(
            journal.borrow().last(),
            Some(&ProviderCall::SetRegionDraggable(false))
        );

        // Drags are ignored mid-request
        session
            .provider_mut()
            .unwrap()
            .emit(ProviderEvent::RegionUpdateEnd(RegionBounds::new(5.0, 6.0)));
        assert!(session.pump().is_empty());
        assert_eq!(session.region().unwrap().start(), 0.0);

        let err = session.begin_submission().unwrap_err();
        assert!(matches!(err, GelangError::SubmissionInFlight));

        let result = session
            .finish_submission(
                request.ticket(),
                Err(GelangError::Transport {
                    message: "reset by peer".to_string(),
                }),
            )
            .unwrap();
        assert_eq!(result.message(), Some(REQUEST_FAILED_MESSAGE));
        assert!(!session.is_loading());
        assert!(session.is_region_draggable());
        assert_eq!(
            journal.borrow().last(),
            Some(&ProviderCall::SetRegionDraggable(true))
        );
    }

    #[test]
    fn test_submit_mid_drag_keeps_labels_on_submitted_region() {
        let mut session = loaded(42.0, &quiet_settings());
        let journal = session.provider().unwrap().journal();

        session
            .provider_mut()
            .unwrap()
            .emit(ProviderEvent::RegionChanged(RegionBounds::new(10.0, 25.0)));
        session.pump();
        assert_eq!(session.region_labels(), Some(("0:10".to_string(), "0:25".to_string())));

        let request = session.begin_submission().unwrap().unwrap();
        assert_eq!((request.start_text(), request.end_text()), ("0".to_string(), "30".to_string()));
        assert!(journal.borrow().contains(&ProviderCall::SetRegion {
            start: 0.0,
            end: 30.0
        }));
        assert_eq!(session.display_region(), session.region());

        // Release of the abandoned drag arrives mid-request
        session
            .provider_mut()
            .unwrap()
            .emit(ProviderEvent::RegionUpdateEnd(RegionBounds::new(10.0, 25.0)));
        assert!(session.pump().is_empty());

        session.finish_submission(
            request.ticket(),
            Err(GelangError::Transport {
                message: "timeout".to_string(),
            }),
        );
        assert_eq!(session.display_region(), session.region());
        assert_eq!(session.region_labels(), Some(("0:00".to_string(), "0:30".to_string())));

        let next = session.begin_submission().unwrap().unwrap();
        assert_eq!((next.start_text(), next.end_text()), ("0".to_string(), "30".to_string()));
    }

    #[test]
    fn test_response_after_clear_is_discarded() {
        let mut session = loaded(42.0, &quiet_settings());
        let request = session.begin_submission().unwrap().unwrap();
        session.clear();

        let outcome = Ok(RawResponse {
            status: 200,
            body: r#"{"success": false, "error": "late"}"#.to_string(),
        });
        assert!(session.finish_submission(request.ticket(), outcome).is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_begin_without_clip_is_no_op() {
        let mut session: Session<ScriptedProvider> = Session::new(&Settings::default());
        assert!(session.begin_submission().unwrap().is_none());
        assert!(!session.is_loading());
    }
}
