use crate::config::{EndpointConfig, HttpConfig, Open311Config};
use crate::domain::model::Format;
use crate::utils::error::Result;
use crate::utils::validation::{validate_required_field, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "open311")]
#[command(about = "Query an Open311 GeoReport v2 endpoint")]
pub struct CliConfig {
    #[arg(long, short, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Endpoint base URL, overrides the configuration file")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Wire format: xml or json")]
    pub format: Option<Format>,

    #[arg(long)]
    pub jurisdiction: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the services offered by the endpoint
    Services,
    /// Show the custom attributes of one service
    Definition { service_code: String },
    /// Exchange a POST token for the service request id
    Token { token: String },
    /// List service requests, e.g. --filter status=open
    Requests {
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Show one service request
    Request { service_request_id: String },
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

impl CliConfig {
    /// Merges the config file with the flags; flags win.
    pub fn resolve(&self) -> Result<Open311Config> {
        let mut config = match &self.config {
            Some(path) => Open311Config::from_file(path)?,
            None => {
                let endpoint = validate_required_field("endpoint", &self.endpoint)?;
                Open311Config {
                    endpoint: EndpointConfig::new(endpoint.clone(), Format::default()),
                    http: HttpConfig::default(),
                }
            }
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint.url = endpoint.clone();
        }
        if let Some(format) = self.format {
            config.endpoint.format = format;
        }
        if let Some(jurisdiction) = &self.jurisdiction {
            config.endpoint.jurisdiction_id = Some(jurisdiction.clone());
        }
        if let Some(api_key) = &self.api_key {
            config.endpoint.api_key = Some(api_key.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;

    #[test]
    fn test_inline_endpoint() {
        let cli = CliConfig::parse_from([
            "open311",
            "--endpoint",
            "https://city.gov/open311",
            "--format",
            "xml",
            "--jurisdiction",
            "city.gov",
            "services",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.endpoint.url, "https://city.gov/open311");
        assert_eq!(config.endpoint.format, Format::Xml);
        assert_eq!(config.endpoint.jurisdiction_id.as_deref(), Some("city.gov"));
    }

    #[test]
    fn test_missing_endpoint() {
        let cli = CliConfig::parse_from(["open311", "services"]);
        let error = cli.resolve().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_request_filters() {
        let cli = CliConfig::parse_from([
            "open311",
            "--endpoint",
            "https://city.gov",
            "requests",
            "--filter",
            "status=open",
            "--filter",
            "service_code = 001",
        ]);

        match cli.command {
            Command::Requests { filters } => assert_eq!(
                filters,
                vec![
                    ("status".to_string(), "open".to_string()),
                    ("service_code".to_string(), "001".to_string()),
                ]
            ),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_filter_is_rejected() {
        let result = CliConfig::try_parse_from([
            "open311",
            "--endpoint",
            "https://city.gov",
            "requests",
            "--filter",
            "status",
        ]);
        assert!(result.is_err());
    }
}
