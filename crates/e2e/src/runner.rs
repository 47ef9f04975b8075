//! Scenario runner: owns the server and executes scenarios in sequence

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::client::{HttpDriver, StepResult};
use crate::error::{E2eError, E2eResult};
use crate::server::{ServerConfig, ServerHandle};
use crate::spec::Scenario;

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
}

/// Result of running a batch of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Main E2E scenario runner
pub struct ScenarioRunner {
    server_config: ServerConfig,

    /// Running server handle (if any)
    server: Option<ServerHandle>,

    /// Set when targeting a server started elsewhere
    external_url: Option<String>,

    scenarios_dir: PathBuf,

    /// Output directory for results
    output_dir: PathBuf,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            server_config: config.server,
            server: None,
            external_url: config.base_url,
            scenarios_dir: config.scenarios_dir,
            output_dir: config.output_dir,
        }
    }

    /// Start the server unless one is running or an external URL is set
    pub async fn start_server(&mut self) -> E2eResult<()> {
        if self.server.is_some() || self.external_url.is_some() {
            return Ok(());
        }

        let server = ServerHandle::spawn(self.server_config.clone()).await?;
        self.server = Some(server);
        Ok(())
    }

    pub fn stop_server(&mut self) -> E2eResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop()?;
        }
        Ok(())
    }

    fn base_url(&self) -> E2eResult<String> {
        if let Some(url) = &self.external_url {
            return Ok(url.clone());
        }
        self.server
            .as_ref()
            .map(|s| s.base_url().to_string())
            .ok_or_else(|| E2eError::ServerStartup("server not started".to_string()))
    }

    /// Run all scenarios in the scenarios directory
    pub async fn run_all(&mut self) -> E2eResult<SuiteResult> {
        let scenarios = Scenario::load_all(&self.scenarios_dir)?;
        self.run_scenarios(&scenarios).await
    }

    /// Run scenarios carrying a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<SuiteResult> {
        let scenarios = Scenario::load_all(&self.scenarios_dir)?;
        let filtered: Vec<Scenario> = Scenario::filter_by_tag(&scenarios, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_scenarios(&filtered).await
    }

    /// Run one scenario by name
    pub async fn run_named(&mut self, name: &str) -> E2eResult<SuiteResult> {
        let scenario = Scenario::load_all(&self.scenarios_dir)?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))?;
        self.run_scenarios(std::slice::from_ref(&scenario)).await
    }

    /// Run a list of scenarios in order
    pub async fn run_scenarios(&mut self, scenarios: &[Scenario]) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        self.start_server().await?;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            if scenario.steps.is_empty() {
                skipped += 1;
                info!("- {} (no steps)", scenario.name);
                continue;
            }

            match self.run_scenario(scenario).await {
                Ok(result) => {
                    if result.success {
                        passed += 1;
                        info!("✓ {} ({} ms)", result.name, result.duration_ms);
                    } else {
                        failed += 1;
                        error!(
                            "✗ {} - {}",
                            result.name,
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {} - {}", scenario.name, e);
                    results.push(ScenarioResult {
                        name: scenario.name.clone(),
                        success: false,
                        duration_ms: 0,
                        steps: vec![],
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scenario results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        Ok(SuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        })
    }

    /// Run one scenario with fresh variables, stopping at the first failed step
    pub async fn run_scenario(&mut self, scenario: &Scenario) -> E2eResult<ScenarioResult> {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let mut driver = HttpDriver::new(self.base_url()?)?;
        let mut steps = Vec::new();
        let mut scenario_error = None;

        for step in &scenario.steps {
            let result = driver.execute_step(step).await?;
            if !result.success {
                scenario_error = Some(format!(
                    "{}: {}",
                    result.step_name,
                    result.error.as_deref().unwrap_or("failed")
                ));
                steps.push(result);
                break;
            }
            steps.push(result);
        }

        Ok(ScenarioResult {
            name: scenario.name.clone(),
            success: scenario_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps,
            error: scenario_error,
        })
    }

    /// Write results to `<output_dir>/test-results.json`
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScenarioRunner {
    fn drop(&mut self) {
        let _ = self.stop_server();
    }
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub server: ServerConfig,
    /// Use an already running server instead of spawning one
    pub base_url: Option<String>,
    pub scenarios_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            base_url: None,
            scenarios_dir: PathBuf::from("crates/e2e/scenarios"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScenarioRunner::with_config(RunnerConfig {
            output_dir: dir.path().join("out"),
            ..Default::default()
        });

        let suite = SuiteResult {
            total: 1,
            passed: 0,
            failed: 1,
            skipped: 0,
            duration_ms: 12,
            results: vec![ScenarioResult {
                name: "invalid-email".into(),
                success: false,
                duration_ms: 12,
                steps: vec![StepResult {
                    success: false,
                    step_name: "POST /api/submissions".into(),
                    duration_ms: 10,
                    error: Some("expected status 400, got 201".into()),
                }],
                error: Some("POST /api/submissions: expected status 400, got 201".into()),
            }],
        };

        let path = runner.write_results(&suite).unwrap();
        let written: SuiteResult =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.failed, 1);
        assert!(!written.success());
        assert_eq!(written.results[0].steps[0].step_name, "POST /api/submissions");
    }

    #[tokio::test]
    async fn test_run_named_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = ScenarioRunner::with_config(RunnerConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            scenarios_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        match runner.run_named("nope").await {
            Err(E2eError::ScenarioNotFound(name)) => assert_eq!(name, "nope"),
            other => panic!("unexpected: {:?}", other.map(|r| r.total)),
        }
    }

    #[tokio::test]
    async fn test_empty_scenario_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = ScenarioRunner::with_config(RunnerConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            scenarios_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        let scenario = Scenario::from_yaml("name: empty\nsteps: []\n").unwrap();
        let suite = runner.run_scenarios(&[scenario]).await.unwrap();
        assert_eq!(suite.skipped, 1);
        assert_eq!(suite.passed, 0);
        assert!(suite.success());
    }

    #[tokio::test]
    async fn test_log_only_scenario_passes_without_server_traffic() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = ScenarioRunner::with_config(RunnerConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            scenarios_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        let scenario = Scenario::from_yaml(
            "name: quiet\nsteps:\n  - action: log\n    message: hello\n  - action: sleep\n    ms: 1\n",
        )
        .unwrap();
        let result = runner.run_scenario(&scenario).await.unwrap();
        assert!(result.success);
        assert_eq!(result.steps.len(), 2);
    }
}
