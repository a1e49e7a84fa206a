use crate::core::decoder::{DecodeError, FormatDecoder};
use crate::utils::error::Open311Error;

/// Classifies a body that could not be decoded as `expected`.
///
/// The body is decoded again as a GeoReport v2 error envelope. When that
/// works, the first listed error is surfaced; any further errors in the
/// payload are dropped. Otherwise the outcome is a parsing failure that keeps
/// both decode failures.
pub fn interpret(
    decoder: &dyn FormatDecoder,
    body: &str,
    expected: &'static str,
    cause: DecodeError,
) -> Open311Error {
    match decoder.decode_errors(body) {
        Ok(errors) => match errors.into_iter().next() {
            Some(first) => {
                tracing::warn!(
                    code = first.code,
                    description = %first.description,
                    "Server answered {} request with a GeoReport v2 error",
                    expected
                );
                Open311Error::GeoReportV2(first)
            }
            None => parsing_failure(
                expected,
                cause,
                DecodeError::InvalidShape("error envelope lists no errors".to_string()),
            ),
        },
        Err(envelope) => parsing_failure(expected, cause, envelope),
    }
}

fn parsing_failure(expected: &'static str, cause: DecodeError, envelope: DecodeError) -> Open311Error {
    tracing::debug!(
        "Body is neither {} nor an error envelope: {} / {}",
        expected,
        cause,
        envelope
    );
    Open311Error::DataParsing {
        expected,
        source: cause,
        envelope: Some(envelope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decoder::{JsonDecoder, XmlDecoder};
    use crate::utils::error::ErrorKind;

    fn cause() -> DecodeError {
        DecodeError::InvalidShape("not a service list".to_string())
    }

    #[test]
    fn test_first_error_wins() {
        let body = include_str!("../../tests/fixtures/errors.json");
        let error = interpret(&JsonDecoder, body, "service list", cause());

        let reported = error.geo_report_error().unwrap();
        assert_eq!(reported.code, 500);
        assert_eq!(reported.description, "Internal server error. Please try again later.");
    }

    #[test]
    fn test_xml_error_envelope() {
        let body = include_str!("../../tests/fixtures/errors.xml");
        let error = interpret(&XmlDecoder, body, "service list", cause());
        assert_eq!(error.geo_report_error().map(|e| e.code), Some(500));
    }

    #[test]
    fn test_garbage_is_a_parsing_failure_with_cause_chain() {
        let error = interpret(&JsonDecoder, "<html>502 Bad Gateway</html>", "service list", cause());

        assert_eq!(error.kind(), ErrorKind::DataParsing);
        let source = std::error::Error::source(&error).unwrap();
        assert!(source.to_string().contains("not a service list"));
        match error {
            Open311Error::DataParsing { envelope, .. } => assert!(envelope.is_some()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_error_list_is_a_parsing_failure() {
        let error = interpret(&JsonDecoder, "[]", "service definition", cause());
        assert_eq!(error.kind(), ErrorKind::DataParsing);
    }
}
