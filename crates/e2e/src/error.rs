//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Server failed to start: {0}")]
    ServerStartup(String),

    #[error("Server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Scenario parse error: {0}")]
    SpecParse(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Unknown variable: {{{{{0}}}}}")]
    UnknownVariable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variable_message() {
        let err = E2eError::UnknownVariable("submission_id".into());
        assert_eq!(err.to_string(), "Unknown variable: {{submission_id}}");
    }
}
