pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::http::HttpTransport;
pub use config::{EndpointConfig, HttpConfig, Open311Config};
pub use core::decoder::{decoder_for, DecodeError, FormatDecoder, JsonDecoder, XmlDecoder};
pub use core::url_builder::UrlBuilder;
pub use core::wrapper::Open311Wrapper;
pub use domain::model::*;
pub use domain::ports::Transport;
pub use utils::error::{ErrorKind, Open311Error, Result, TransportError};
