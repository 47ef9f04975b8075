//! MCPBench E2E scenario runner
//!
//! Spawns the `mcpbench-web` binary against a private in-memory database and
//! drives declarative YAML scenarios over plain HTTP:
//!
//! ```text
//! ScenarioRunner
//!   ├── ServerHandle::spawn()      --listen 127.0.0.1:<port> --db :memory: --no-latency
//!   ├── Scenario::load_all(dir)    *.yaml, sorted
//!   └── HttpDriver per scenario
//!         ├── request { method, path, json | form, headers, expect, capture }
//!         ├── sleep { ms }
//!         └── log { message }
//! ```

pub mod client;
pub mod error;
pub mod runner;
pub mod server;
pub mod spec;

pub use error::{E2eError, E2eResult};
pub use runner::{RunnerConfig, ScenarioRunner, SuiteResult};
pub use spec::{Scenario, Step};
