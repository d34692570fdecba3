//! Genre classification requests
//!
//! This module provides:
//! - `RequestBuilder` packaging a clip and its region into a `PredictRequest`
//! - `ClassificationTransport` trait with the `HttpClassifier` implementation
//! - `ClassificationResult`, interpreted from the server response

mod client;
mod request;
mod response;

pub use client::{ClassificationTransport, HttpClassifier, RawResponse};
pub use request::{PredictRequest, RequestBuilder, SubmissionTicket};
pub use response::{
    interpret, ClassificationResult, FailureKind, GenreScore, Prediction, TopPrediction,
    REQUEST_FAILED_MESSAGE, SERVER_FAILED_MESSAGE,
};
