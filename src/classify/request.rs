//! Classification request builder
//!
//! Packages the loaded clip and its committed region into the multipart
//! fields the `/predict` endpoint expects, and guarantees that at most one
//! request is in flight per session.

use std::sync::Arc;

use crate::engine::{AudioSource, Region};
use crate::error::{GelangError, Result};

/// Identifies one submission between `begin` and `finish`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

/// A fully formed `/predict` request
#[derive(Debug, Clone)]
pub struct PredictRequest {
    ticket: SubmissionTicket,
    file_name: String,
    mime_type: String,
    file: Arc<[u8]>,
    region: Region,
}

impl PredictRequest {
    pub fn ticket(&self) -> SubmissionTicket {
        self.ticket
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Contents of the `file` part
    pub fn file_bytes(&self) -> &[u8] {
        &self.file
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// The `start` text field
    pub fn start_text(&self) -> String {
        self.region.start().to_string()
    }

    /// The `end` text field
    pub fn end_text(&self) -> String {
        self.region.end().to_string()
    }

    /// Text fields in submission order
    pub fn text_fields(&self) -> [(&'static str, String); 2] {
        [("start", self.start_text()), ("end", self.end_text())]
    }
}

/// Builds requests and enforces the single in-flight submission
#[derive(Debug, Default)]
pub struct RequestBuilder {
    in_flight: Option<SubmissionTicket>,
    next_ticket: u64,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a submission
    ///
    /// Returns `Ok(None)` when the clip or region is missing; nothing is
    /// marked in flight and no request must be sent.
    ///
    /// # Errors
    /// * `SubmissionInFlight` - If a previous submission has not finished
    pub fn begin(
        &mut self,
        source: Option<&AudioSource>,
        region: Option<Region>,
    ) -> Result<Option<PredictRequest>> {
        if self.in_flight.is_some() {
            return Err(GelangError::SubmissionInFlight);
        }
        let (Some(source), Some(region)) = (source, region) else {
            log::debug!("[REQUEST] Missing clip or region, nothing to submit");
            return Ok(None);
        };

        self.next_ticket += 1;
        let ticket = SubmissionTicket(self.next_ticket);
        self.in_flight = Some(ticket);

        Ok(Some(PredictRequest {
            ticket,
            file_name: source.name().to_string(),
            mime_type: source.mime_type().to_string(),
            file: source.shared_bytes(),
            region,
        }))
    }

    /// Finish the submission identified by `ticket`
    ///
    /// Returns `false` for a ticket that is not the one in flight (for
    /// example after the session was cleared mid-request).
    pub fn finish(&mut self, ticket: SubmissionTicket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Drop any in-flight submission
    pub fn abandon(&mut self) {
        self.in_flight = None;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RegionBounds;
    use pretty_assertions::assert_eq;

    fn source() -> AudioSource {
        AudioSource::intake("clip.wav", "audio/wav", vec![7u8; 16]).unwrap()
    }

    fn region() -> Region {
        Region::clamped(RegionBounds::new(10.0, 25.5), 42.0)
    }

    #[test]
    fn test_builds_multipart_fields() {
        let mut builder = RequestBuilder::new();
        let request = builder.begin(Some(&source()), Some(region())).unwrap().unwrap();

        assert_eq!(request.file_name(), "clip.wav");
        assert_eq!(request.mime_type(), "audio/wav");
        assert_eq!(request.file_bytes(), &[7u8; 16][..]);
        assert_eq!(
            request.text_fields(),
            [("start", "10".to_string()), ("end", "25.5".to_string())]
        );
    }

    #[test]
    fn test_missing_parts_are_a_no_op() {
        let mut builder = RequestBuilder::new();
        assert!(builder.begin(None, Some(region())).unwrap().is_none());
        assert!(builder.begin(Some(&source()), None).unwrap().is_none());
        assert!(!builder.is_in_flight());
    }

    #[test]
    fn test_second_submission_rejected_while_in_flight() {
        let mut builder = RequestBuilder::new();
        let request = builder.begin(Some(&source()), Some(region())).unwrap().unwrap();

        let err = builder.begin(Some(&source()), Some(region())).unwrap_err();
        assert!(matches!(err, GelangError::SubmissionInFlight));

        assert!(builder.finish(request.ticket()));
        assert!(builder.begin(Some(&source()), Some(region())).unwrap().is_some());
    }

    #[test]
    fn test_stale_ticket_does_not_finish() {
        let mut builder = RequestBuilder::new();
        let old = builder.begin(Some(&source()), Some(region())).unwrap().unwrap();
        builder.abandon();
        let current = builder.begin(Some(&source()), Some(region())).unwrap().unwrap();

        assert!(!builder.finish(old.ticket()));
        assert!(builder.is_in_flight());
        assert!(builder.finish(current.ticket()));
    }
}
