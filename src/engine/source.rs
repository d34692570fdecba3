//! Audio intake
//!
//! An `AudioSource` is the clip the user picked: its bytes, name, MIME type
//! and a display URL. Anything that is not `audio/*` is turned away at
//! intake without touching the session.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{GelangError, Result};

/// Extension to MIME type table for path intake
const AUDIO_EXTENSIONS: &[(&str, &str)] = &[
    ("wav", "audio/wav"),
    ("wave", "audio/wav"),
    ("mp3", "audio/mpeg"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("webm", "audio/webm"),
];

/// Guess the MIME type of a file from its extension
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    AUDIO_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// A user-selected audio clip held in memory
#[derive(Clone)]
pub struct AudioSource {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
    url: String,
}

impl AudioSource {
    /// Accept a clip if its MIME type is `audio/*`
    ///
    /// Returns `None` for anything else; invalid files are ignored rather
    /// than reported.
    ///
    /// # Example
    /// ```
    /// use gelang::engine::AudioSource;
    /// assert!(AudioSource::intake("a.wav", "audio/wav", vec![0u8; 4]).is_some());
    /// assert!(AudioSource::intake("a.txt", "text/plain", vec![0u8; 4]).is_none());
    /// ```
    pub fn intake(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Option<Self> {
        let name = name.into();
        let mime_type = mime_type.into();
        if !mime_type.starts_with("audio") {
            log::debug!("[INTAKE] Ignoring '{}' ({})", name, mime_type);
            return None;
        }

        Some(Self {
            url: format!("blob:gelang/{}", Uuid::new_v4()),
            name,
            mime_type,
            bytes: bytes.into(),
        })
    }

    /// Read a clip from disk, inferring its MIME type from the extension
    ///
    /// Returns `Ok(None)` for files that are not audio.
    ///
    /// # Errors
    /// * `FileNotFound` - If the file does not exist
    /// * `Io` - If the file cannot be read
    pub fn open(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Err(GelangError::FileNotFound {
                path: path.display().to_string(),
                source: None,
            });
        }

        let Some(mime_type) = mime_from_extension(path) else {
            log::debug!("[INTAKE] Unknown audio type for {}", path.display());
            return Ok(None);
        };

        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::intake(name, mime_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle on the clip bytes
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Display URL, unique per intake
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSource")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .field("url", &self.url)
            .finish()
    }
}
