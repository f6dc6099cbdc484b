use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// One field-level validation failure, as the API reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: connection refused, timeout, bad JSON.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with its error envelope. `message` is what the
    /// original UI surfaced to the user as a toast.
    #[error("{code}: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
        fields: Vec<FieldError>,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http(e) => e.status(),
            ClientError::Api { status, .. } => Some(*status),
        }
    }

    /// Builds the error for a non-success response, decoding the
    /// `{"error": {code, message, fields}}` envelope when present and
    /// falling back to the raw body otherwise.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: EnvelopeBody,
        }
        #[derive(Deserialize)]
        struct EnvelopeBody {
            code: String,
            message: String,
            #[serde(default)]
            fields: Vec<FieldError>,
        }

        match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) => ClientError::Api {
                status,
                code: envelope.error.code,
                message: envelope.error.message,
                fields: envelope.error.fields,
            },
            Err(_) => ClientError::Api {
                status,
                code: "UNKNOWN".to_string(),
                message: if body.trim().is_empty() {
                    format!("status {}", status.as_u16())
                } else {
                    body.trim().to_string()
                },
                fields: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_is_decoded() {
        let body = r#"{"error":{"code":"CONFLICT","message":"email already in use"}}"#;
        let err = ClientError::from_response(StatusCode::CONFLICT, body);
        match err {
            ClientError::Api {
                status,
                code,
                message,
                fields,
            } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(code, "CONFLICT");
                assert_eq!(message, "email already in use");
                assert!(fields.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_fields_are_kept() {
        let body = r#"{"error":{"code":"VALIDATION_ERROR","message":"Validation failed",
            "fields":[{"field":"email","message":"email must be a valid address"}]}}"#;
        let err = ClientError::from_response(StatusCode::BAD_REQUEST, body);
        match err {
            ClientError::Api { fields, .. } => {
                assert_eq!(fields[0].field, "email");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_envelope_body_falls_back_to_raw_text() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            ClientError::Api { code, message, .. } => {
                assert_eq!(code, "UNKNOWN");
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_body_reports_the_status() {
        let err = ClientError::from_response(StatusCode::SERVICE_UNAVAILABLE, "");
        match err {
            ClientError::Api { message, .. } => assert_eq!(message, "status 503"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
