//! Batch plan configuration from YAML

use crate::core::Task;
use crate::execution::SchedulingStrategy;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Top-level batch plan loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Plan name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Concurrency limit; absent or 0 means unbounded
    #[serde(default)]
    pub limit: Option<usize>,

    /// Tasks, in input order
    pub tasks: Vec<TaskConfig>,
}

/// A simulated task as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Unique task name
    pub name: String,

    /// How long the task takes to settle
    #[serde(default)]
    pub latency_ms: u64,

    /// If set, the task fails with this message after its latency
    #[serde(default)]
    pub fail: Option<String>,
}

/// What a simulated task reports when it succeeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    pub name: String,
    pub latency_ms: u64,
}

impl BatchConfig {
    /// Load a plan from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a plan from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: BatchConfig =
            serde_yaml::from_str(yaml).context("Failed to parse plan YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the plan
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Plan name must not be empty");
        }

        if self.tasks.is_empty() {
            bail!("Plan '{}' has no tasks", self.name);
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if task.name.trim().is_empty() {
                bail!("Task names must not be empty");
            }
            if !seen.insert(task.name.as_str()) {
                bail!("Duplicate task name: {}", task.name);
            }
        }

        Ok(())
    }

    /// Scheduling strategy for the plan, optionally overridden
    pub fn strategy(&self, limit_override: Option<usize>) -> SchedulingStrategy {
        SchedulingStrategy::from_limit(limit_override.or(self.limit).unwrap_or(0))
    }

    /// Build the runnable tasks, in plan order
    pub fn to_tasks(&self) -> Vec<Task<TaskReport, String>> {
        self.tasks.iter().map(TaskConfig::to_task).collect()
    }
}

impl TaskConfig {
    /// Build a task that sleeps for its latency, then settles
    pub fn to_task(&self) -> Task<TaskReport, String> {
        let report = TaskReport {
            name: self.name.clone(),
            latency_ms: self.latency_ms,
        };
        let fail = self.fail.clone();
        Task::new(async move {
            tokio::time::sleep(Duration::from_millis(report.latency_ms)).await;
            match fail {
                Some(message) => Err(format!("{}: {}", report.name, message)),
                None => Ok(report),
            }
        })
    }
}
