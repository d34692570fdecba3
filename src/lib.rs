//! Gelang - Audio Region Genre Classifier
//!
//! Gelang lets a user load an audio clip, trim it to a time region and send
//! that region to a remote genre-classification service.
//!
//! # Architecture
//!
//! - `engine`: audio intake, the waveform provider seam, region controller
//!   and playback synchronizer
//! - `classify`: request building, HTTP transport and response model
//! - `present`: rendering of classification results
//! - `session`: the single owned object tying the pieces together

pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod present;
pub mod session;

pub use config::Settings;
pub use error::{GelangError, Result};
pub use session::{Session, SessionNotice};
