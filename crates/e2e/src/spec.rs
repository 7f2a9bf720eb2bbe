//! Declarative YAML scenario files

use serde::{Deserialize, Serialize};
use std::path::Path;

use notes_common::NoteId;

use crate::error::{E2eError, E2eResult};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Report the scenario as skipped instead of running it
    #[serde(default)]
    pub skip: bool,

    /// Steps to execute in order
    pub steps: Vec<ScenarioStep>,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Fetch the whole collection
    List {
        #[serde(default)]
        expect: ListExpectation,
    },

    /// Fetch the collection and look at the dashboard slice
    Dashboard {
        #[serde(default)]
        expect_names: Option<Vec<String>>,
    },

    /// Fetch one note by id
    Get {
        id: NoteId,
        #[serde(default)]
        expect_name: Option<String>,
        #[serde(default)]
        expect_missing: bool,
    },

    /// Fetch one note through the id filter
    Find {
        id: NoteId,
        #[serde(default)]
        expect_name: Option<String>,
        #[serde(default)]
        expect_missing: bool,
    },

    /// Create a note
    Add {
        name: String,
        /// The new id must be one past the largest id before the call
        #[serde(default)]
        expect_next_id: bool,
        #[serde(default)]
        expect_rejected: bool,
    },

    /// Rename a note
    Update {
        id: NoteId,
        name: String,
        #[serde(default)]
        expect_rejected: bool,
    },

    /// Delete a note
    Delete {
        id: NoteId,
        #[serde(default)]
        expect_rejected: bool,
    },

    /// Search by name fragment
    Search {
        term: String,
        #[serde(default)]
        expect_count: Option<usize>,
        #[serde(default)]
        expect_names: Option<Vec<String>>,
    },

    /// Inspect the message log
    Messages {
        #[serde(default)]
        expect_contains: Vec<String>,
        #[serde(default)]
        expect_failures: Option<usize>,
    },

    /// Log a message (for debugging)
    Log { message: String },
}

impl ScenarioStep {
    /// Action name as written in YAML
    pub fn action(&self) -> &'static str {
        match self {
            ScenarioStep::List { .. } => "list",
            ScenarioStep::Dashboard { .. } => "dashboard",
            ScenarioStep::Get { .. } => "get",
            ScenarioStep::Find { .. } => "find",
            ScenarioStep::Add { .. } => "add",
            ScenarioStep::Update { .. } => "update",
            ScenarioStep::Delete { .. } => "delete",
            ScenarioStep::Search { .. } => "search",
            ScenarioStep::Messages { .. } => "messages",
            ScenarioStep::Log { .. } => "log",
        }
    }
}

/// Expectations on a fetched collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListExpectation {
    #[serde(default)]
    pub count: Option<usize>,

    /// Change in length since the previous `list` step
    #[serde(default)]
    pub count_delta: Option<i64>,

    #[serde(default)]
    pub contains: Vec<NoteExpectation>,

    #[serde(default)]
    pub absent_ids: Vec<NoteId>,
}

/// A note that must be present. Unset fields match anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteExpectation {
    #[serde(default)]
    pub id: Option<NoteId>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ScenarioSpec {
    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        if spec.steps.is_empty() {
            return Err(E2eError::SpecParse(format!("scenario '{}' has no steps", spec.name)));
        }
        Ok(spec)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, ordered by file name
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            specs.push(spec);
        }

        Ok(specs)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }
}
