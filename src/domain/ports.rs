use crate::utils::error::TransportError;
use async_trait::async_trait;
use url::Url;

/// HTTP collaborator used by the wrapper.
///
/// Implementations return the response body whatever the status code; the
/// wrapper decides from the body alone whether the call succeeded.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<String, TransportError>;

    async fn post(&self, url: &Url, form: &[(String, String)]) -> Result<String, TransportError>;
}
