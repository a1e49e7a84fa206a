use super::{require_identified, DecodeResult, FormatDecoder};
use crate::domain::model::{
    Format, GeoReportV2Error, PostServiceRequestResponse, Service, ServiceDefinition,
    ServiceRequest, ServiceRequestIdResponse,
};

/// Decoder for `.json` endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl FormatDecoder for JsonDecoder {
    fn format(&self) -> Format {
        Format::Json
    }

    fn decode_services(&self, body: &str) -> DecodeResult<Vec<Service>> {
        Ok(serde_json::from_str(body)?)
    }

    fn decode_service_definition(&self, body: &str) -> DecodeResult<ServiceDefinition> {
        Ok(serde_json::from_str(body)?)
    }

    fn decode_service_request_ids(&self, body: &str) -> DecodeResult<Vec<ServiceRequestIdResponse>> {
        Ok(serde_json::from_str(body)?)
    }

    fn decode_service_requests(&self, body: &str) -> DecodeResult<Vec<ServiceRequest>> {
        Ok(serde_json::from_str(body)?)
    }

    fn decode_post_service_request_responses(
        &self,
        body: &str,
    ) -> DecodeResult<Vec<PostServiceRequestResponse>> {
        require_identified(serde_json::from_str(body)?)
    }

    fn decode_errors(&self, body: &str) -> DecodeResult<Vec<GeoReportV2Error>> {
        Ok(serde_json::from_str(body)?)
    }
}
