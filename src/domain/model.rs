//! GeoReport v2 records shared by both wire formats.

use crate::core::decoder::lenient;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Wire format used for URL suffixes and response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Xml,
    #[default]
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(Format::Xml),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format '{}', expected xml or json", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    #[default]
    Production,
    Test,
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointType::Production => f.write_str("PRODUCTION"),
            EndpointType::Test => f.write_str("TEST"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Realtime,
    Batch,
    Blackbox,
}

/// A reportable issue category. Identity is `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "service_code", deserialize_with = "lenient::required_string")]
    pub code: String,
    #[serde(rename = "service_name", default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub metadata: bool,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(default, deserialize_with = "lenient::keywords")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    #[serde(deserialize_with = "lenient::required_string")]
    pub service_code: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    String,
    Number,
    Datetime,
    Text,
    #[serde(alias = "singlevalue")]
    Singlevaluelist,
    Multivaluelist,
}

impl Datatype {
    pub fn is_list(self) -> bool {
        matches!(self, Datatype::Singlevaluelist | Datatype::Multivaluelist)
    }
}

/// One custom input field of a service definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(deserialize_with = "lenient::required_string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub variable: bool,
    pub datatype: Datatype,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub required: bool,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub datatype_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub order: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    /// Only populated for list datatypes.
    #[serde(default, deserialize_with = "lenient::list")]
    pub values: Vec<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    #[serde(deserialize_with = "lenient::required_string")]
    pub key: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Closed,
}

/// A citizen report tracked through its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    #[serde(deserialize_with = "lenient::required_string")]
    pub service_request_id: String,
    pub status: Status,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub status_notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub service_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub service_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub agency_responsible: String,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub service_notice: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub requested_datetime: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub updated_datetime: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub expected_datetime: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub address_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub zipcode: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub long: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub media_url: Option<String>,
    /// Free-form extension fields, keyed by attribute name.
    #[serde(default, deserialize_with = "lenient::string_map")]
    pub extended_attributes: BTreeMap<String, String>,
}

/// Correlates an asynchronously issued token with its service request id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequestIdResponse {
    #[serde(deserialize_with = "lenient::required_string")]
    pub token: String,
    #[serde(deserialize_with = "lenient::required_string")]
    pub service_request_id: String,
}

/// Response to POST Service Request.
///
/// Synchronous endpoints answer with `service_request_id` (and maybe a
/// notice and account id), token based endpoints answer with `token` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostServiceRequestResponse {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub service_request_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub service_notice: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub token: Option<String>,
}

impl PostServiceRequestResponse {
    /// A response must identify the request somehow, either directly or via a token.
    pub fn is_identified(&self) -> bool {
        self.service_request_id.is_some() || self.token.is_some()
    }
}

/// The protocol's own error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoReportV2Error {
    #[serde(deserialize_with = "lenient::required_integer")]
    pub code: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
}

/// Service discovery document. Decoding it is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDiscovery {
    pub changeset: Option<String>,
    pub contact: Option<String>,
    pub key_service: Option<String>,
}

/// Fields sent with POST Service Request.
///
/// Which location field is mandatory depends on the endpoint; nothing is
/// checked client side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostServiceRequestData {
    pub service_code: String,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub address_string: Option<String>,
    pub address_id: Option<String>,
    pub email: Option<String>,
    pub device_id: Option<String>,
    pub account_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    /// Custom attribute answers keyed by attribute code.
    pub attributes: BTreeMap<String, AttributeAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeAnswer {
    Single(String),
    Multiple(Vec<String>),
}
