//! Bundled scenarios run against an in-process server

use std::path::PathBuf;

use test_case::test_case;

use notes_e2e::runner::{RunnerConfig, ServerTarget};
use notes_e2e::{ScenarioRunner, ScenarioSpec};
use notes_server::LocalServer;

fn specs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("specs")
}

fn load(name: &str) -> ScenarioSpec {
    ScenarioSpec::load_all(&specs_dir())
        .unwrap()
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no bundled scenario named {name}"))
}

#[test_case("dashboard" ; "dashboard slice")]
#[test_case("magneta-lifecycle" ; "rename delete and re-add")]
#[test_case("search-narrows" ; "search narrows")]
#[test_case("failures-degrade" ; "failures degrade")]
#[tokio::test]
async fn bundled_scenario_passes(name: &str) {
    let server = LocalServer::start_seeded().await.unwrap();
    let runner = ScenarioRunner::with_config(RunnerConfig {
        target: ServerTarget::External {
            notes_url: server.notes_url(),
        },
        ..Default::default()
    });

    let result = runner.run_spec(&load(name)).await.unwrap();
    assert!(result.success, "{}: {:?}", name, result.error);
    assert!(result.steps.iter().all(|s| s.success));
    assert!(!result.messages.is_empty());
}

#[tokio::test]
async fn failing_step_stops_the_scenario() {
    let server = LocalServer::start_seeded().await.unwrap();
    let runner = ScenarioRunner::with_config(RunnerConfig {
        target: ServerTarget::External {
            notes_url: server.notes_url(),
        },
        ..Default::default()
    });

    let spec = ScenarioSpec::from_yaml(
        r#"
name: wrong-count
steps:
  - action: list
    expect:
      count: 3
  - action: delete
    id: 15
"#,
    )
    .unwrap();

    let result = runner.run_spec(&spec).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.steps.len(), 1);
    assert!(result.error.unwrap().contains("list has 10 notes, expected 3"));

    // the delete never ran, so Magneta is still on the dashboard
    let check = runner.run_spec(&load("dashboard")).await.unwrap();
    assert!(check.success);
}

#[tokio::test]
async fn run_all_restarts_between_scenarios() {
    let output = tempfile::tempdir().unwrap();
    let mut runner = ScenarioRunner::with_config(RunnerConfig {
        target: ServerTarget::InProcess,
        specs_dir: specs_dir(),
        output_dir: output.path().to_path_buf(),
        fresh_server_per_spec: true,
    });

    let results = runner.run_all().await.unwrap();
    assert_eq!(results.total, 4);
    assert_eq!(results.passed, 4, "{:?}", results.results);
    assert!(results.success());

    let path = runner.write_results(&results).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written["passed"], 4);
    assert_eq!(written["results"].as_array().unwrap().len(), 4);
}

#[test_case("smoke", 2 ; "smoke tag")]
#[test_case("crud", 2 ; "crud tag")]
#[test_case("read", 2 ; "read tag")]
#[test_case("nothing", 0 ; "unknown tag")]
#[tokio::test]
async fn run_tagged_selects_scenarios(tag: &str, expected: usize) {
    let mut runner = ScenarioRunner::with_config(RunnerConfig {
        target: ServerTarget::InProcess,
        specs_dir: specs_dir(),
        ..Default::default()
    });

    let results = runner.run_tagged(tag).await.unwrap();
    assert_eq!(results.total, expected);
    assert_eq!(results.passed, expected);
}

#[tokio::test]
async fn skipped_scenarios_are_counted() {
    let mut runner = ScenarioRunner::with_config(RunnerConfig {
        target: ServerTarget::InProcess,
        ..Default::default()
    });

    let spec = ScenarioSpec::from_yaml(
        "name: later\nskip: true\nsteps:\n  - action: log\n    message: not yet\n",
    )
    .unwrap();
    let results = runner.run_specs(&[spec]).await.unwrap();
    assert_eq!(results.total, 1);
    assert_eq!(results.skipped, 1);
    assert_eq!(results.passed, 0);
}
