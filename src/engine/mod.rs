//! Audio Engine Module
//!
//! Everything between a file on disk and a committed region:
//! - Audio intake and WAV probing
//! - Waveform provider seam (headless and scripted implementations)
//! - Region controller
//! - Playback synchronizer state machine

pub mod io;
pub mod mock;
pub mod provider;
pub mod region;
pub mod source;
pub mod transport;

pub use io::{generate_test_clip, probe_wav, WavInfo};
pub use mock::{ProviderCall, ScriptedProvider};
pub use provider::{ProviderCommand, ProviderEvent, ProviderId, WaveformProvider, WavProvider};
pub use region::{Region, RegionBounds, RegionController, DEFAULT_REGION_SECS, REGION_EPSILON};
pub use source::AudioSource;
pub use transport::{format_time, Cursor, PlaybackState, PlaybackSynchronizer, TransportState};
