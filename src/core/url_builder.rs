//! Request URLs for each GeoReport v2 operation.

use crate::domain::model::{AttributeAnswer, Format, PostServiceRequestData};
use crate::utils::error::{Open311Error, Result};
use std::collections::BTreeMap;
use url::Url;

/// Builds request URLs for one (endpoint, format) pair.
///
/// The endpoint is parsed on every call so that a malformed endpoint is
/// reported by the operation that tried to use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    endpoint: String,
    format: Format,
}

impl UrlBuilder {
    pub fn new(endpoint: impl Into<String>, format: Format) -> Self {
        Self {
            endpoint: endpoint.into(),
            format,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// `GET services.<fmt>`
    pub fn service_list(&self, jurisdiction_id: Option<&str>) -> Result<Url> {
        self.build(&[], "services", jurisdiction_id, &BTreeMap::new())
    }

    /// `GET services/<service_code>.<fmt>`
    pub fn service_definition(
        &self,
        jurisdiction_id: Option<&str>,
        service_code: &str,
    ) -> Result<Url> {
        self.build(&["services"], service_code, jurisdiction_id, &BTreeMap::new())
    }

    /// `GET tokens/<token>.<fmt>`
    pub fn service_request_id_from_token(
        &self,
        jurisdiction_id: Option<&str>,
        token: &str,
    ) -> Result<Url> {
        self.build(&["tokens"], token, jurisdiction_id, &BTreeMap::new())
    }

    /// `GET requests.<fmt>` with optional filters such as `service_code`,
    /// `start_date`, `end_date` or `status`. Empty values are left out.
    pub fn service_requests(
        &self,
        jurisdiction_id: Option<&str>,
        filters: &BTreeMap<String, String>,
    ) -> Result<Url> {
        self.build(&[], "requests", jurisdiction_id, filters)
    }

    /// `GET requests/<service_request_id>.<fmt>`
    pub fn service_request(
        &self,
        jurisdiction_id: Option<&str>,
        service_request_id: &str,
    ) -> Result<Url> {
        self.build(&["requests"], service_request_id, jurisdiction_id, &BTreeMap::new())
    }

    /// `POST requests.<fmt>`; every parameter travels in the form body.
    pub fn post_service_request(&self) -> Result<Url> {
        self.build(&[], "requests", None, &BTreeMap::new())
    }

    fn base(&self) -> Result<Url> {
        Url::parse(&self.endpoint).map_err(|e| Open311Error::UrlBuilder {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }

    fn build(
        &self,
        parents: &[&str],
        resource: &str,
        jurisdiction_id: Option<&str>,
        query: &BTreeMap<String, String>,
    ) -> Result<Url> {
        let mut url = self.base()?;
        let file = format!("{}.{}", resource, self.format.extension());

        url.path_segments_mut()
            .map_err(|_| Open311Error::UrlBuilder {
                endpoint: self.endpoint.clone(),
                reason: "endpoint cannot be used as a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(parents)
            .push(&file);

        let mut pairs: Vec<(&str, &str)> = Vec::new();
        if let Some(jurisdiction_id) = jurisdiction_id.filter(|j| !j.is_empty()) {
            pairs.push(("jurisdiction_id", jurisdiction_id));
        }
        pairs.extend(
            query
                .iter()
                .filter(|(key, value)| key.as_str() != "jurisdiction_id" && !value.is_empty())
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );

        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }
}

/// Form body of a POST Service Request.
///
/// Custom attributes are encoded as `attribute[CODE]`, or `attribute[CODE][]`
/// once per value for multi value lists.
pub fn post_service_request_form(
    jurisdiction_id: Option<&str>,
    api_key: Option<&str>,
    data: &PostServiceRequestData,
) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            form.push((key.to_string(), value));
        }
    };

    push("jurisdiction_id", jurisdiction_id.map(str::to_string));
    push("api_key", api_key.map(str::to_string));
    push("service_code", Some(data.service_code.clone()));
    push("lat", data.lat.map(|v| v.to_string()));
    push("long", data.long.map(|v| v.to_string()));
    push("address_string", data.address_string.clone());
    push("address_id", data.address_id.clone());
    push("email", data.email.clone());
    push("device_id", data.device_id.clone());
    push("account_id", data.account_id.clone());
    push("first_name", data.first_name.clone());
    push("last_name", data.last_name.clone());
    push("phone", data.phone.clone());
    push("description", data.description.clone());
    push("media_url", data.media_url.clone());

    for (code, answer) in &data.attributes {
        match answer {
            AttributeAnswer::Single(value) => {
                push(&format!("attribute[{}]", code), Some(value.clone()));
            }
            AttributeAnswer::Multiple(values) => {
                for value in values {
                    push(&format!("attribute[{}][]", code), Some(value.clone()));
                }
            }
        }
    }

    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;

    #[test]
    fn test_service_list_url() {
        let builder = UrlBuilder::new("http://fakeurl", Format::Json);
        let url = builder.service_list(Some("nyc.gov")).unwrap();
        assert_eq!(url.as_str(), "http://fakeurl/services.json?jurisdiction_id=nyc.gov");
    }

    #[test]
    fn test_xml_extension_and_path_parameters() {
        let builder = UrlBuilder::new("http://fakeurl", Format::Xml);

        assert_eq!(
            builder.service_definition(Some("nyc.gov"), "001").unwrap().as_str(),
            "http://fakeurl/services/001.xml?jurisdiction_id=nyc.gov"
        );
        assert_eq!(
            builder
                .service_request_id_from_token(Some("nyc.gov"), "222")
                .unwrap()
                .as_str(),
            "http://fakeurl/tokens/222.xml?jurisdiction_id=nyc.gov"
        );
        assert_eq!(
            builder.service_request(Some("nyc.gov"), "638344").unwrap().as_str(),
            "http://fakeurl/requests/638344.xml?jurisdiction_id=nyc.gov"
        );
    }

    #[test]
    fn test_endpoint_prefix_is_kept() {
        let builder = UrlBuilder::new("https://city.gov/open311/v2/", Format::Json);
        assert_eq!(
            builder.service_list(None).unwrap().as_str(),
            "https://city.gov/open311/v2/services.json"
        );
    }

    #[test]
    fn test_empty_filters_only_add_jurisdiction() {
        let builder = UrlBuilder::new("http://fakeurl", Format::Json);
        let url = builder.service_requests(Some("nyc.gov"), &BTreeMap::new()).unwrap();
        assert_eq!(url.as_str(), "http://fakeurl/requests.json?jurisdiction_id=nyc.gov");
    }

    #[test]
    fn test_filters_are_sorted_encoded_and_empty_ones_dropped() {
        let builder = UrlBuilder::new("http://fakeurl", Format::Json);
        let mut filters = BTreeMap::new();
        filters.insert("status".to_string(), "open".to_string());
        filters.insert("service_code".to_string(), "".to_string());
        filters.insert("start_date".to_string(), "2010-05-24T00:00:00Z".to_string());

        let url = builder.service_requests(Some("city of x"), &filters).unwrap();
        assert_eq!(
            url.as_str(),
            "http://fakeurl/requests.json?jurisdiction_id=city+of+x&start_date=2010-05-24T00%3A00%3A00Z&status=open"
        );
    }

    #[test]
    fn test_path_parameters_are_escaped() {
        let builder = UrlBuilder::new("http://fakeurl", Format::Json);
        let url = builder.service_request(None, "a/b c").unwrap();
        assert_eq!(url.as_str(), "http://fakeurl/requests/a%2Fb%20c.json");
    }

    #[test]
    fn test_malformed_endpoint_is_a_url_builder_error() {
        for endpoint in ["", "not a url", "mailto:someone@city.gov"] {
            let builder = UrlBuilder::new(endpoint, Format::Json);
            let error = builder.service_list(Some("nyc.gov")).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::UrlBuilder);
        }
    }

    #[test]
    fn test_post_form_encodes_attributes() {
        let mut data = PostServiceRequestData {
            service_code: "001".to_string(),
            lat: Some(37.76),
            long: Some(-122.41),
            description: Some("Cans left out".to_string()),
            ..Default::default()
        };
        data.attributes
            .insert("WHISHETN".to_string(), AttributeAnswer::Single("123".to_string()));
        data.attributes.insert(
            "DAYS".to_string(),
            AttributeAnswer::Multiple(vec!["mon".to_string(), "tue".to_string()]),
        );

        let form = post_service_request_form(Some("nyc.gov"), Some("secret"), &data);
        let pairs: Vec<(&str, &str)> = form.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        assert_eq!(
            pairs,
            vec![
                ("jurisdiction_id", "nyc.gov"),
                ("api_key", "secret"),
                ("service_code", "001"),
                ("lat", "37.76"),
                ("long", "-122.41"),
                ("description", "Cans left out"),
                ("attribute[DAYS][]", "mon"),
                ("attribute[DAYS][]", "tue"),
                ("attribute[WHISHETN]", "123"),
            ]
        );
    }
}
