use thiserror::Error;

/// Failures talking to the console API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON envelope.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// The API answered with a non-success `code`.
    #[error("{}", summarize_rejection(.code, .detail, .errors))]
    Rejected {
        code: String,
        detail: Option<String>,
        errors: Vec<String>,
    },

    #[error("Response is missing field `{0}`")]
    MissingField(&'static str),
}

impl ApiError {
    /// Messages suitable for showing to the user, most specific last.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Rejected { detail, errors, .. } => {
                let mut out = Vec::new();
                if let Some(d) = detail {
                    out.push(d.clone());
                }
                out.extend(errors.iter().cloned());
                if out.is_empty() {
                    out.push(self.to_string());
                }
                out
            }
            other => vec![other.to_string()],
        }
    }
}

fn summarize_rejection(code: &str, detail: &Option<String>, errors: &[String]) -> String {
    let mut msg = format!("API rejected the request ({})", code);
    if let Some(d) = detail {
        msg.push_str(": ");
        msg.push_str(d);
    }
    if !errors.is_empty() {
        msg.push_str(" [");
        msg.push_str(&errors.join("; "));
        msg.push(']');
    }
    msg
}
