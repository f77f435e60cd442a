use serde_json::Value;

use crate::api::ApiError;
use crate::models::ProjectScope;
use crate::utils::{build_query_string, value_to_short_string};

const SUCCESS_CODES: &[&str] = &["OKAY", "CREATED"];

/// Connection details for the console API plus the shared HTTP client.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request and return the raw JSON body.
    /// Transport failures and non-JSON bodies become errors; the envelope
    /// `code` is left for [`unwrap_envelope`] to judge.
    pub async fn call(
        &self,
        scope: &ProjectScope,
        method: &str,
        endpoint: &str,
        body: Option<&Value>,
        params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        tracing::debug!(request = %self.curl_line(scope, method, endpoint, body, params), "API request");

        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = match method {
            "POST" => self.client.post(&url),
            "PUT" => self.client.put(&url),
            "DELETE" => self.client.delete(&url),
            _ => self.client.get(&url),
        };
        if !self.token.is_empty() {
            req = req.header("API-Token", &self.token);
        }
        req = req.header("X-Project-Id", &scope.project_id);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        let payload: Value = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("HTTP {}: {}", status.as_u16(), e)))?;
        tracing::debug!(%status, response = %payload, "API response");
        Ok(payload)
    }

    /// Equivalent curl invocation, with the token redacted.
    fn curl_line(
        &self,
        scope: &ProjectScope,
        method: &str,
        endpoint: &str,
        body: Option<&Value>,
        params: &[(String, String)],
    ) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&build_query_string(params));
        }
        let mut parts = vec![format!("curl -X {} '{}'", method, url)];
        if !self.token.is_empty() {
            parts.push("-H 'API-Token: ***'".into());
        }
        parts.push(format!("-H 'X-Project-Id: {}'", scope.project_id));
        if let Some(b) = body {
            let json = redact_secrets(b).to_string().replace('\'', "'\\''");
            parts.push("-H 'Content-Type: application/json'".into());
            parts.push(format!("-d '{}'", json));
        }
        parts.join(" ")
    }
}

fn redact_secrets(body: &Value) -> Value {
    let mut copy = body.clone();
    if let Some(obj) = copy.as_object_mut() {
        for (key, val) in obj.iter_mut() {
            if key.contains("password") {
                *val = Value::from("***");
            }
        }
    }
    copy
}

/// Split a `{code, data, detail, errors}` envelope into its `data` or a rejection.
pub fn unwrap_envelope(payload: Value) -> Result<Value, ApiError> {
    let code = payload
        .get("code")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();
    if SUCCESS_CODES.contains(&code.as_str()) {
        return Ok(payload.get("data").cloned().unwrap_or(Value::Null));
    }
    let detail = payload
        .get("detail")
        .and_then(|d| d.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Err(ApiError::Rejected {
        code: if code.is_empty() { "UNKNOWN".into() } else { code },
        detail,
        errors: collect_errors(payload.get("errors")),
    })
}

/// Flatten the `errors` member, which may be a list of strings, a list of
/// objects, or an object keyed by field.
fn collect_errors(errors: Option<&Value>) -> Vec<String> {
    let mut out = Vec::new();
    let push_object = |out: &mut Vec<String>, obj: &serde_json::Map<String, Value>| {
        for (k, v) in obj {
            out.push(format!("{}: {}", k, value_to_short_string(v)));
        }
    };
    match errors {
        Some(Value::Array(arr)) => {
            for entry in arr {
                match entry {
                    Value::String(s) => out.push(s.clone()),
                    Value::Object(obj) => push_object(&mut out, obj),
                    other => out.push(value_to_short_string(other)),
                }
            }
        }
        Some(Value::Object(obj)) => push_object(&mut out, obj),
        Some(Value::String(s)) if !s.trim().is_empty() => out.push(s.clone()),
        _ => {}
    }
    out
}
