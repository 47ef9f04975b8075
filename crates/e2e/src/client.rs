//! HTTP driver that executes scenario steps against a running server

use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{redirect, Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::spec::{Expect, Step, Variables};

/// Result of executing one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// What came back from one request, kept for checks and captures.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: u16,
    /// Lowercased header names
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Exchange {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn json(&self) -> Result<Value, String> {
        serde_json::from_str(&self.body).map_err(|e| format!("response body is not JSON: {}", e))
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_ascii_lowercase(), v.to_str().ok()?.to_string())))
        .collect()
}

/// Drives one scenario. Variables live as long as the driver.
pub struct HttpDriver {
    client: Client,
    base_url: String,
    vars: Variables,
}

impl HttpDriver {
    pub fn new(base_url: impl Into<String>) -> E2eResult<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            vars: Variables::new(),
        })
    }

    /// Execute a step. `Err` is reserved for transport problems; failed
    /// checks come back as an unsuccessful `StepResult`.
    pub async fn execute_step(&mut self, step: &Step) -> E2eResult<StepResult> {
        let start = Instant::now();
        let step_name = step.label();

        debug!("Executing step: {}", step_name);

        let outcome = match step {
            Step::Request {
                method,
                path,
                json,
                form,
                headers,
                expect,
                capture,
                ..
            } => {
                self.execute_request(method, path, json.as_ref(), form.as_ref(), headers, expect, capture)
                    .await
            }
            Step::Sleep { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(Ok(()))
            }
            Step::Log { message } => {
                info!("[scenario] {}", self.vars.substitute(message).unwrap_or_else(|_| message.clone()));
                Ok(Ok(()))
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(reason)) => Some(reason),
            Err(E2eError::UnknownVariable(name)) => Some(format!("unknown variable {{{{{}}}}}", name)),
            Err(e) => return Err(e),
        };

        Ok(StepResult {
            success: error.is_none(),
            step_name,
            duration_ms,
            error,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_request(
        &mut self,
        method: &str,
        path: &str,
        json: Option<&Value>,
        form: Option<&BTreeMap<String, String>>,
        headers: &BTreeMap<String, String>,
        expect: &Expect,
        capture: &BTreeMap<String, String>,
    ) -> E2eResult<Result<(), String>> {
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| E2eError::SpecParse(format!("invalid HTTP method: {}", method)))?;
        let url = format!("{}{}", self.base_url, self.vars.substitute(path)?);

        let mut request = self.client.request(method, &url);
        for (name, value) in headers {
            request = request.header(name.as_str(), self.vars.substitute(value)?);
        }
        if let Some(body) = json {
            request = request.json(&self.vars.substitute_value(body)?);
        } else if let Some(fields) = form {
            let fields = fields
                .iter()
                .map(|(k, v)| self.vars.substitute(v).map(|v| (k.clone(), v)))
                .collect::<E2eResult<BTreeMap<_, _>>>()?;
            request = request.form(&fields);
        }

        let response = request.send().await?;
        let exchange = Exchange {
            status: response.status().as_u16(),
            headers: collect_headers(response.headers()),
            body: response.text().await?,
        };
        debug!("{} -> {}", url, exchange.status);

        if let Err(reason) = check_expectations(expect, &exchange, &self.vars)? {
            return Ok(Err(reason));
        }

        for (name, source) in capture {
            match extract_capture(source, &exchange) {
                Ok(value) => {
                    debug!("Captured {} = {}", name, value);
                    self.vars.set(name.clone(), value);
                }
                Err(reason) => return Ok(Err(format!("capture {}: {}", name, reason))),
            }
        }

        Ok(Ok(()))
    }
}

// ============================================================================
// Checks
// ============================================================================

/// Numbers and booleans match their string rendering, so a captured id can
/// be compared against a JSON number.
fn values_match(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::String(_), _) => false,
        (actual, Value::String(expected)) => actual.to_string() == *expected,
        _ => false,
    }
}

/// Apply every check in `expect`. The outer error is for unknown variables,
/// the inner one describes the first mismatch.
pub fn check_expectations(
    expect: &Expect,
    exchange: &Exchange,
    vars: &Variables,
) -> E2eResult<Result<(), String>> {
    if let Some(status) = expect.status {
        if exchange.status != status {
            return Ok(Err(format!(
                "expected status {}, got {}: {}",
                status,
                exchange.status,
                truncate(&exchange.body, 200)
            )));
        }
    }

    if let Some(target) = &expect.redirect_to {
        let target = vars.substitute(target)?;
        if !(300..400).contains(&exchange.status) {
            return Ok(Err(format!("expected a redirect, got status {}", exchange.status)));
        }
        match exchange.header(LOCATION.as_str()) {
            Some(location) if location == target => {}
            Some(location) => {
                return Ok(Err(format!("expected redirect to {}, got {}", target, location)))
            }
            None => return Ok(Err("redirect has no Location header".to_string())),
        }
    }

    for (name, needle) in &expect.header {
        let needle = vars.substitute(needle)?;
        match exchange.header(name) {
            Some(value) if value.contains(&needle) => {}
            Some(value) => {
                return Ok(Err(format!("header {}: expected to contain {:?}, got {:?}", name, needle, value)))
            }
            None => return Ok(Err(format!("header {} missing", name))),
        }
    }

    for needle in &expect.body_contains {
        let needle = vars.substitute(needle)?;
        if !exchange.body.contains(&needle) {
            return Ok(Err(format!("body does not contain {:?}", needle)));
        }
    }

    if !expect.json.is_empty() {
        let body = match exchange.json() {
            Ok(body) => body,
            Err(reason) => return Ok(Err(reason)),
        };
        for (pointer, expected) in &expect.json {
            let expected = vars.substitute_value(expected)?;
            match body.pointer(pointer) {
                Some(actual) if values_match(actual, &expected) => {}
                Some(actual) => {
                    return Ok(Err(format!("{}: expected {}, got {}", pointer, expected, actual)))
                }
                None => return Ok(Err(format!("{}: missing from response", pointer))),
            }
        }
    }

    Ok(Ok(()))
}

/// Resolve a capture source: `/json/pointer` or `header:<name>`.
pub fn extract_capture(source: &str, exchange: &Exchange) -> Result<String, String> {
    if let Some(name) = source.strip_prefix("header:") {
        return exchange
            .header(name.trim())
            .map(str::to_string)
            .ok_or_else(|| format!("header {} missing", name.trim()));
    }

    if source.starts_with('/') {
        let body = exchange.json()?;
        return match body.pointer(source) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => Err(format!("{} missing from response", source)),
            Some(other) => Ok(other.to_string()),
        };
    }

    Err(format!("unsupported capture source {:?}", source))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
