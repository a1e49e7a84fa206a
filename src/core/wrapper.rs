//! Entry point of the library: one method per GeoReport v2 operation.
//!
//! Every call runs the same three stages:
//!
//! 1. build the URL; a malformed endpoint fails here and nothing is sent;
//! 2. send it through the [`Transport`]; I/O failures stop here;
//! 3. decode the body with the active format. When that fails the same body
//!    is read as an error envelope, giving either a protocol error or a
//!    parsing failure.

use crate::adapters::http::HttpTransport;
use crate::config::{EndpointConfig, HttpConfig, Open311Config};
use crate::core::decoder::{decoder_for, DecodeError, DecodeResult, FormatDecoder};
use crate::core::error_interpreter;
use crate::core::url_builder::{post_service_request_form, UrlBuilder};
use crate::domain::model::{
    Format, PostServiceRequestData, PostServiceRequestResponse, Service, ServiceDefinition,
    ServiceRequest, ServiceRequestIdResponse,
};
use crate::domain::ports::Transport;
use crate::utils::error::{Open311Error, Result};
use std::collections::BTreeMap;
use url::Url;

enum Request<'a> {
    Get,
    Post(&'a [(String, String)]),
}

/// GeoReport v2 client bound to one endpoint.
///
/// Format, jurisdiction and API key can be changed between calls through the
/// setters. They take `&mut self`, so they can never overlap a call in flight
/// on the same instance.
pub struct Open311Wrapper<T: Transport> {
    settings: EndpointConfig,
    url_builder: UrlBuilder,
    decoder: Box<dyn FormatDecoder>,
    transport: T,
}

impl Open311Wrapper<HttpTransport> {
    /// Builds a reqwest-backed wrapper from a loaded config file.
    pub fn from_config(config: Open311Config) -> Result<Self> {
        let transport = HttpTransport::from_config(&config.http)?;
        Ok(Self::new(config.endpoint, transport))
    }

    /// Reqwest-backed wrapper with the default HTTP settings.
    pub fn http(settings: EndpointConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(&HttpConfig::default())?;
        Ok(Self::new(settings, transport))
    }
}

impl<T: Transport> Open311Wrapper<T> {
    pub fn new(settings: EndpointConfig, transport: T) -> Self {
        let url_builder = UrlBuilder::new(settings.url.clone(), settings.format);
        let decoder = decoder_for(settings.format);
        Self {
            settings,
            url_builder,
            decoder,
            transport,
        }
    }

    pub fn settings(&self) -> &EndpointConfig {
        &self.settings
    }

    pub fn format(&self) -> Format {
        self.settings.format
    }

    /// `"<endpoint> - <TYPE>"`, e.g. `"https://city.gov/open311 - PRODUCTION"`.
    pub fn wrapper_info(&self) -> String {
        format!("{} - {}", self.settings.url, self.settings.endpoint_type)
    }

    /// Switches the wire format. URL suffix and decoder always change together.
    pub fn set_format(&mut self, format: Format) {
        self.settings.format = format;
        self.url_builder = UrlBuilder::new(self.settings.url.clone(), format);
        self.decoder = decoder_for(format);
    }

    pub fn set_jurisdiction_id(&mut self, jurisdiction_id: Option<String>) {
        self.settings.jurisdiction_id = jurisdiction_id;
    }

    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.settings.api_key = api_key;
    }

    fn jurisdiction_id(&self) -> Option<&str> {
        self.settings.jurisdiction_id.as_deref()
    }

    /// GET Service List
    pub async fn get_service_list(&self) -> Result<Vec<Service>> {
        let url = self.url_builder.service_list(self.jurisdiction_id());
        self.execute("service list", url, Request::Get, |decoder, body| {
            decoder.decode_services(body)
        })
        .await
    }

    /// GET Service Definition
    pub async fn get_service_definition(&self, service_code: &str) -> Result<ServiceDefinition> {
        let url = self
            .url_builder
            .service_definition(self.jurisdiction_id(), service_code);
        self.execute("service definition", url, Request::Get, |decoder, body| {
            decoder.decode_service_definition(body)
        })
        .await
    }

    /// GET service_request_id from a token, for endpoints that answer POSTs with a token.
    pub async fn get_service_request_id_from_token(
        &self,
        token: &str,
    ) -> Result<Vec<ServiceRequestIdResponse>> {
        let url = self
            .url_builder
            .service_request_id_from_token(self.jurisdiction_id(), token);
        self.execute("service request id", url, Request::Get, |decoder, body| {
            decoder.decode_service_request_ids(body)
        })
        .await
    }

    /// GET Service Requests, filtered by any optional protocol argument.
    pub async fn get_service_requests(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<Vec<ServiceRequest>> {
        let url = self
            .url_builder
            .service_requests(self.jurisdiction_id(), filters);
        self.execute("service requests", url, Request::Get, |decoder, body| {
            decoder.decode_service_requests(body)
        })
        .await
    }

    /// GET Service Request. Servers answer with a list holding the one request.
    pub async fn get_service_request(&self, service_request_id: &str) -> Result<Vec<ServiceRequest>> {
        let url = self
            .url_builder
            .service_request(self.jurisdiction_id(), service_request_id);
        self.execute("service request", url, Request::Get, |decoder, body| {
            decoder.decode_service_requests(body)
        })
        .await
    }

    /// POST Service Request
    pub async fn post_service_request(
        &self,
        data: &PostServiceRequestData,
    ) -> Result<Vec<PostServiceRequestResponse>> {
        let url = self.url_builder.post_service_request();
        let form = post_service_request_form(
            self.jurisdiction_id(),
            self.settings.api_key.as_deref(),
            data,
        );
        self.execute("POST service request", url, Request::Post(&form), |decoder, body| {
            decoder.decode_post_service_request_responses(body)
        })
        .await
    }

    async fn execute<R, F>(
        &self,
        expected: &'static str,
        url: Result<Url>,
        request: Request<'_>,
        decode: F,
    ) -> Result<R>
    where
        F: FnOnce(&dyn FormatDecoder, &str) -> DecodeResult<R>,
    {
        let url = url?;

        let body = match request {
            Request::Get => {
                tracing::debug!("GET {} ({})", url, expected);
                self.transport.get(&url).await?
            }
            Request::Post(form) => {
                tracing::debug!("POST {} ({}, {} form fields)", url, expected, form.len());
                self.transport.post(&url, form).await?
            }
        };
        tracing::debug!("Received {} bytes for {}", body.len(), expected);

        let decoded = decode(self.decoder.as_ref(), &body);
        self.classify(expected, &body, decoded)
    }

    fn classify<R>(&self, expected: &'static str, body: &str, decoded: DecodeResult<R>) -> Result<R> {
        match decoded {
            Ok(records) => Ok(records),
            Err(DecodeError::Unsupported(operation)) => {
                Err(Open311Error::UnsupportedOperation(operation))
            }
            Err(cause) => Err(error_interpreter::interpret(
                self.decoder.as_ref(),
                body,
                expected,
                cause,
            )),
        }
    }
}
