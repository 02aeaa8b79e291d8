use serde::Deserialize;
use serde_json::Value;

/// A governance (policy engine) veto of the patch.
///
/// Distinguished from generic backend errors so the caller can route it to
/// the governance-evaluation surface instead of a generic error toast.
#[derive(Clone, Debug, PartialEq)]
pub struct GovernanceRejection {
    pub message: String,
    /// Opaque payload for the governance-evaluation UI.
    pub metadata: Value,
}

/// Submission failure kinds.
///
/// Propagation policy: domain-specific kinds get domain-specific handling
/// (governance → governance surface), everything else is generic.
#[derive(Debug)]
pub enum PatchSubmitError {
    /// Backend rejected the patch on policy grounds.
    Governance(GovernanceRejection),
    /// Backend rejected the patch; message extracted from the error payload.
    Backend { status: u16, message: String },
    /// The request never completed (connect, TLS, body decode).
    Transport(reqwest::Error),
    /// The caller cancelled the in-flight submission.
    Cancelled,
    /// `submit` called with an empty instruction queue (already flushed or
    /// reset). No network call was made.
    NothingQueued,
}

impl PatchSubmitError {
    pub fn is_governance(&self) -> bool {
        matches!(self, PatchSubmitError::Governance(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PatchSubmitError::Cancelled)
    }
}

impl std::fmt::Display for PatchSubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchSubmitError::Governance(g) => {
                write!(f, "patch vetoed by governance: {}", g.message)
            }
            PatchSubmitError::Backend { status, message } => {
                write!(f, "patch rejected: status={status} message={message}")
            }
            PatchSubmitError::Transport(e) => write!(f, "patch request failed: {e}"),
            PatchSubmitError::Cancelled => write!(f, "patch submission cancelled"),
            PatchSubmitError::NothingQueued => {
                write!(f, "no instructions queued for submission")
            }
        }
    }
}

impl std::error::Error for PatchSubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatchSubmitError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Error body shape of the patch endpoint.
#[derive(Debug, Deserialize)]
struct PatchErrorBody {
    message: Option<String>,
    #[serde(rename = "governanceMetadata")]
    governance_metadata: Option<Value>,
}

/// Decode a non-2xx response body into the right error kind.
///
/// A body carrying `governanceMetadata` is a governance veto regardless of
/// status code; otherwise the message is extracted from the payload, falling
/// back to the raw body text, then to "unknown".
pub(crate) fn decode_error_body(status: u16, body: &str) -> PatchSubmitError {
    if let Ok(parsed) = serde_json::from_str::<PatchErrorBody>(body) {
        let message = parsed
            .message
            .unwrap_or_else(|| "unknown".to_string());
        if let Some(metadata) = parsed.governance_metadata {
            return PatchSubmitError::Governance(GovernanceRejection { message, metadata });
        }
        return PatchSubmitError::Backend { status, message };
    }

    let trimmed = body.trim();
    PatchSubmitError::Backend {
        status,
        message: if trimmed.is_empty() {
            "unknown".to_string()
        } else {
            trimmed.to_string()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_extracted_from_json_body() {
        let err = decode_error_body(400, r#"{"message":"weights must sum to 100"}"#);
        match err {
            PatchSubmitError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "weights must sum to 100");
            }
            other => panic!("expected Backend, got {other}"),
        }
    }

    #[test]
    fn governance_metadata_is_a_distinguished_kind() {
        let err = decode_error_body(
            400,
            r#"{"message":"vetoed","governanceMetadata":{"policySet":"prod-freeze"}}"#,
        );
        match err {
            PatchSubmitError::Governance(g) => {
                assert_eq!(g.message, "vetoed");
                assert_eq!(g.metadata["policySet"], "prod-freeze");
            }
            other => panic!("expected Governance, got {other}"),
        }
        assert!(decode_error_body(
            400,
            r#"{"message":"vetoed","governanceMetadata":{}}"#
        )
        .is_governance());
    }

    #[test]
    fn non_json_body_falls_back_to_raw_text() {
        let err = decode_error_body(502, "Bad Gateway\n");
        match err {
            PatchSubmitError::Backend { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected Backend, got {other}"),
        }
    }

    #[test]
    fn empty_body_is_unknown() {
        match decode_error_body(500, "") {
            PatchSubmitError::Backend { message, .. } => assert_eq!(message, "unknown"),
            other => panic!("expected Backend, got {other}"),
        }
    }
}
