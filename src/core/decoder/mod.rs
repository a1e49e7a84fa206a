//! Response decoding for both GeoReport v2 wire formats.
//!
//! [`JsonDecoder`] and [`XmlDecoder`] implement the same [`FormatDecoder`]
//! contract and must produce identical records from equivalent documents.
//! A decoder only reports whether it could extract the requested shape;
//! telling a protocol error apart from garbage is the caller's job.

pub mod json;
pub mod lenient;
pub mod xml;

pub use json::JsonDecoder;
pub use xml::XmlDecoder;

use crate::domain::model::{
    Format, GeoReportV2Error, PostServiceRequestResponse, Service, ServiceDefinition,
    ServiceDiscovery, ServiceRequest, ServiceRequestIdResponse,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(String),

    #[error("unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    #[error("document does not match the expected shape: {0}")]
    InvalidShape(String),

    #[error("{0} decoding is not supported")]
    Unsupported(&'static str),
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

pub trait FormatDecoder: Send + Sync {
    fn format(&self) -> Format;

    fn decode_services(&self, body: &str) -> DecodeResult<Vec<Service>>;

    fn decode_service_definition(&self, body: &str) -> DecodeResult<ServiceDefinition>;

    fn decode_service_request_ids(&self, body: &str) -> DecodeResult<Vec<ServiceRequestIdResponse>>;

    fn decode_service_requests(&self, body: &str) -> DecodeResult<Vec<ServiceRequest>>;

    fn decode_post_service_request_responses(
        &self,
        body: &str,
    ) -> DecodeResult<Vec<PostServiceRequestResponse>>;

    fn decode_errors(&self, body: &str) -> DecodeResult<Vec<GeoReportV2Error>>;

    /// Service discovery documents are not decoded. The body is never inspected.
    fn decode_service_discovery(&self, _body: &str) -> DecodeResult<ServiceDiscovery> {
        Err(DecodeError::Unsupported("service discovery"))
    }
}

/// Returns the decoder matching `format`.
pub fn decoder_for(format: Format) -> Box<dyn FormatDecoder> {
    match format {
        Format::Json => Box::new(JsonDecoder),
        Format::Xml => Box::new(XmlDecoder),
    }
}

/// POST responses have no required field, so a record that identifies nothing
/// (an error envelope, for instance) is rejected here.
pub(crate) fn require_identified(
    responses: Vec<PostServiceRequestResponse>,
) -> DecodeResult<Vec<PostServiceRequestResponse>> {
    if responses.iter().all(PostServiceRequestResponse::is_identified) {
        Ok(responses)
    } else {
        Err(DecodeError::InvalidShape(
            "POST response without service_request_id or token".to_string(),
        ))
    }
}
