//! Notes E2E Test Framework
//!
//! This crate drives the note data service end to end:
//! - Spawns the notes server as a subprocess, serves one in-process, or
//!   targets a running one
//! - Parses declarative YAML scenario specs
//! - Executes each step through `NoteService` and checks its expectations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  E2E Scenario Runner (Rust)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── start_server() -> ServerHandle                       │
//! │    ├── run_spec(spec: ScenarioSpec) -> TestResult           │
//! │    └── write_results(TestSuiteResult)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioSpec (YAML)                                        │
//! │    ├── name, description, tags, skip                        │
//! │    └── steps: [ScenarioStep]                                │
//! │          ├── list { expect }                                │
//! │          ├── dashboard { expect_names }                     │
//! │          ├── get | find { id, expect_name, expect_missing } │
//! │          ├── add { name, expect_next_id, expect_rejected }  │
//! │          ├── update | delete { id, ... }                    │
//! │          ├── search { term, expect_count, expect_names }    │
//! │          └── messages { expect_contains, expect_failures }  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod harness;
pub mod runner;
pub mod server;
pub mod spec;

pub use error::{E2eError, E2eResult};
pub use runner::ScenarioRunner;
pub use spec::{ScenarioSpec, ScenarioStep};
