//! Scenario runner that drives a NoteService against a live server

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use notes_client::NoteService;
use notes_common::{top_notes, ClientConfig, MessageLog, NewNote, Note, NoteId};
use notes_server::LocalServer;

use crate::error::{E2eError, E2eResult};
use crate::server::{ServerConfig, ServerHandle};
use crate::spec::{ListExpectation, ScenarioSpec, ScenarioStep};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    /// Message log contents at the end of the scenario
    pub messages: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub action: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running a batch of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Where the notes collection under test lives
#[derive(Debug, Clone)]
pub enum ServerTarget {
    /// Spawn the notes-server binary
    Spawn(ServerConfig),
    /// Serve a seeded in-memory store from this process
    InProcess,
    /// Use a server that is already running
    External { notes_url: String },
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub target: ServerTarget,
    pub specs_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Restart the server before every scenario so each one sees the seed data
    pub fresh_server_per_spec: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            target: ServerTarget::Spawn(ServerConfig::default()),
            specs_dir: PathBuf::from("specs"),
            output_dir: PathBuf::from("test-results"),
            fresh_server_per_spec: true,
        }
    }
}

/// Main scenario runner
pub struct ScenarioRunner {
    config: RunnerConfig,

    /// Running server handle (if spawned)
    server: Option<ServerHandle>,

    /// Running in-process server
    local: Option<LocalServer>,
}

impl ScenarioRunner {
    /// Create a new runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            config,
            server: None,
            local: None,
        }
    }

    /// Start the server if the target needs one
    pub async fn start_server(&mut self) -> E2eResult<()> {
        if self.server.is_some() || self.local.is_some() {
            return Ok(());
        }

        match &self.config.target {
            ServerTarget::Spawn(server_config) => {
                self.server = Some(ServerHandle::spawn(server_config.clone()).await?);
            }
            ServerTarget::InProcess => {
                let local = LocalServer::start_seeded()
                    .await
                    .map_err(|e| E2eError::ServerStartup(e.to_string()))?;
                info!("In-process server listening on {}", local.addr());
                self.local = Some(local);
            }
            ServerTarget::External { .. } => {}
        }
        Ok(())
    }

    pub fn stop_server(&mut self) -> E2eResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop()?;
        }
        self.local = None;
        Ok(())
    }

    /// URL of the notes collection under test
    fn notes_url(&self) -> E2eResult<String> {
        if let ServerTarget::External { notes_url } = &self.config.target {
            return Ok(notes_url.clone());
        }
        match (&self.server, &self.local) {
            (Some(server), _) => Ok(server.notes_url()),
            (None, Some(local)) => Ok(local.notes_url()),
            (None, None) => Err(E2eError::ServerStartup("server has not been started".to_string())),
        }
    }

    /// Run all scenarios in the specs directory
    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        let specs = ScenarioSpec::load_all(&self.config.specs_dir)?;
        self.run_specs(&specs).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<TestSuiteResult> {
        let specs = ScenarioSpec::load_all(&self.config.specs_dir)?;
        let filtered: Vec<ScenarioSpec> = ScenarioSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_specs(&filtered).await
    }

    /// Run a specific scenario by name
    pub async fn run_test(&mut self, name: &str) -> E2eResult<TestResult> {
        let specs = ScenarioSpec::load_all(&self.config.specs_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecParse(format!("Scenario not found: {}", name)))?;

        self.start_server().await?;
        self.run_spec(&spec).await
    }

    /// Run a list of scenarios
    pub async fn run_specs(&mut self, specs: &[ScenarioSpec]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        info!("Running {} scenario(s)...", specs.len());

        for spec in specs {
            if spec.skip {
                skipped += 1;
                info!("- {} (skipped)", spec.name);
                continue;
            }

            if self.config.fresh_server_per_spec {
                self.stop_server()?;
            }
            self.start_server().await?;

            let result = match self.run_spec(spec).await {
                Ok(result) => result,
                Err(e) => TestResult {
                    name: spec.name.clone(),
                    success: false,
                    duration_ms: 0,
                    steps: vec![],
                    messages: vec![],
                    error: Some(e.to_string()),
                },
            };

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

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Scenario results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        Ok(TestSuiteResult {
            total: specs.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            started_at,
            results,
        })
    }

    /// Run a single scenario with its own message log. Stops at the first failed step.
    pub async fn run_spec(&self, spec: &ScenarioSpec) -> E2eResult<TestResult> {
        let start = Instant::now();
        debug!("Running scenario: {}", spec.name);

        let config = ClientConfig::with_base_url(self.notes_url()?);
        let service = NoteService::new(&config, MessageLog::new())?;
        let mut state = ScenarioState::default();

        let mut steps = Vec::new();
        let mut scenario_error = None;

        for step in &spec.steps {
            let step_start = Instant::now();
            let outcome = execute_step(&service, &mut state, step).await;
            let duration_ms = step_start.elapsed().as_millis() as u64;

            let error = outcome.err().map(|e| e.to_string());
            let success = error.is_none();
            steps.push(StepResult {
                action: step.action().to_string(),
                success,
                duration_ms,
                error: error.clone(),
            });

            if !success {
                scenario_error = error.map(|e| format!("step {} ({}): {}", steps.len(), step.action(), e));
                break;
            }
        }

        Ok(TestResult {
            name: spec.name.clone(),
            success: scenario_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps,
            messages: service.messages().messages(),
            error: scenario_error,
        })
    }

    /// Write results to a JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("scenario-results.json");
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

/// State carried between the steps of one scenario
#[derive(Debug, Default)]
struct ScenarioState {
    last_count: Option<usize>,
}

fn check(condition: bool, message: impl FnOnce() -> String) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(message()))
    }
}

fn names(notes: &[Note]) -> Vec<String> {
    notes.iter().map(|n| n.name.clone()).collect()
}

async fn execute_step(
    service: &NoteService,
    state: &mut ScenarioState,
    step: &ScenarioStep,
) -> E2eResult<()> {
    match step {
        ScenarioStep::List { expect } => {
            let notes = service.list().await;
            let previous = state.last_count.replace(notes.len());
            check_list(&notes, previous, expect)
        }

        ScenarioStep::Dashboard { expect_names } => {
            let notes = service.list().await;
            let top = top_notes(&notes);
            match expect_names {
                Some(expected) => check(&names(top) == expected, || {
                    format!("dashboard shows {:?}, expected {:?}", names(top), expected)
                }),
                None => Ok(()),
            }
        }

        ScenarioStep::Get {
            id,
            expect_name,
            expect_missing,
        } => {
            let note = service.get(*id).await;
            check_lookup(*id, note, expect_name.as_deref(), *expect_missing)
        }

        ScenarioStep::Find {
            id,
            expect_name,
            expect_missing,
        } => {
            let note = service.get_lenient(*id).await;
            check_lookup(*id, note, expect_name.as_deref(), *expect_missing)
        }

        ScenarioStep::Add {
            name,
            expect_next_id,
            expect_rejected,
        } => {
            let next_id = if *expect_next_id {
                let max_id = service.list().await.iter().map(|n| n.id).max();
                max_id.map(|id| id + 1)
            } else {
                None
            };

            let created = service.create(&NewNote::new(name.as_str())).await;
            match (created, *expect_rejected) {
                (None, true) => Ok(()),
                (Some(note), true) => Err(E2eError::AssertionFailed(format!(
                    "expected '{}' to be rejected, got id {}",
                    name, note.id
                ))),
                (None, false) => Err(E2eError::AssertionFailed(format!("'{}' was not added", name))),
                (Some(note), false) => {
                    check(&note.name == name, || {
                        format!("created note is named '{}', expected '{}'", note.name, name)
                    })?;
                    match next_id {
                        Some(expected) => check(note.id == expected, || {
                            format!("created note has id {}, expected {}", note.id, expected)
                        }),
                        None => Ok(()),
                    }
                }
            }
        }

        ScenarioStep::Update {
            id,
            name,
            expect_rejected,
        } => {
            let ack = service.update(&Note::new(*id, name.as_str())).await;
            check(ack.is_none() == *expect_rejected, || {
                format!("update of note {} acknowledged={}", id, ack.is_some())
            })
        }

        ScenarioStep::Delete { id, expect_rejected } => {
            let ack = service.delete(*id).await;
            check(ack.is_none() == *expect_rejected, || {
                format!("delete of note {} acknowledged={}", id, ack.is_some())
            })
        }

        ScenarioStep::Search {
            term,
            expect_count,
            expect_names,
        } => {
            let notes = service.search(term).await;
            if let Some(count) = expect_count {
                check(notes.len() == *count, || {
                    format!("search \"{}\" found {}, expected {}", term, notes.len(), count)
                })?;
            }
            match expect_names {
                Some(expected) => check(&names(&notes) == expected, || {
                    format!("search \"{}\" found {:?}, expected {:?}", term, names(&notes), expected)
                }),
                None => Ok(()),
            }
        }

        ScenarioStep::Messages {
            expect_contains,
            expect_failures,
        } => {
            let messages = service.messages().messages();
            for expected in expect_contains {
                check(messages.iter().any(|m| m.contains(expected.as_str())), || {
                    format!("no message contains \"{}\"", expected)
                })?;
            }
            if let Some(count) = expect_failures {
                let failures = messages.iter().filter(|m| m.contains(" failed: ")).count();
                check(failures == *count, || {
                    format!("{} failure message(s), expected {}", failures, count)
                })?;
            }
            Ok(())
        }

        ScenarioStep::Log { message } => {
            info!("[scenario] {}", message);
            Ok(())
        }
    }
}

fn check_list(notes: &[Note], previous: Option<usize>, expect: &ListExpectation) -> E2eResult<()> {
    if let Some(count) = expect.count {
        check(notes.len() == count, || {
            format!("list has {} notes, expected {}", notes.len(), count)
        })?;
    }

    if let Some(delta) = expect.count_delta {
        let previous = previous.ok_or_else(|| {
            E2eError::AssertionFailed("count_delta needs an earlier list step".to_string())
        })?;
        let actual = notes.len() as i64 - previous as i64;
        check(actual == delta, || {
            format!("list changed by {}, expected {}", actual, delta)
        })?;
    }

    for wanted in &expect.contains {
        let found = notes.iter().any(|n| {
            wanted.id.map_or(true, |id| n.id == id)
                && wanted.name.as_deref().map_or(true, |name| n.name == name)
        });
        check(found, || format!("list does not contain {:?}", wanted))?;
    }

    for id in &expect.absent_ids {
        check(notes.iter().all(|n| n.id != *id), || {
            format!("list still contains note {}", id)
        })?;
    }

    Ok(())
}

fn check_lookup(
    id: NoteId,
    note: Option<Note>,
    expect_name: Option<&str>,
    expect_missing: bool,
) -> E2eResult<()> {
    match (note, expect_missing) {
        (None, true) => Ok(()),
        (Some(note), true) => Err(E2eError::AssertionFailed(format!(
            "expected note {} to be missing, found '{}'",
            id, note.name
        ))),
        (None, false) => Err(E2eError::AssertionFailed(format!("note {} not found", id))),
        (Some(note), false) => {
            check(note.id == id, || format!("asked for note {}, got {}", id, note.id))?;
            match expect_name {
                Some(name) => check(note.name == name, || {
                    format!("note {} is named '{}', expected '{}'", id, note.name, name)
                }),
                None => Ok(()),
            }
        }
    }
}
