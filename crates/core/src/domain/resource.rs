use std::collections::{BTreeMap, BTreeSet};

/// Resource name to raw status, as returned by a single status query.
pub type ResourceStatuses = BTreeMap<String, String>;

const RUNNING: &str = "running";
const ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    Running,
    Errored,
    Transitional(String),
}

impl ResourceState {
    pub fn classify(status: &str) -> Self {
        if status.eq_ignore_ascii_case(RUNNING) {
            Self::Running
        } else if status.eq_ignore_ascii_case(ERROR) {
            Self::Errored
        } else {
            Self::Transitional(status.to_string())
        }
    }
}

/// Outcome of one pass over a status mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Failed { errored: BTreeSet<String> },
    Pending { waiting: Vec<String> },
}

impl Readiness {
    /// Any errored resource fails the pass; otherwise all running is ready;
    /// otherwise the pass is still pending. An empty mapping is ready.
    pub fn evaluate(statuses: &ResourceStatuses) -> Self {
        let mut errored = BTreeSet::new();
        let mut waiting = Vec::new();

        for (name, status) in statuses {
            match ResourceState::classify(status) {
                ResourceState::Running => {}
                ResourceState::Errored => {
                    errored.insert(name.clone());
                }
                ResourceState::Transitional(_) => waiting.push(name.clone()),
            }
        }

        if !errored.is_empty() {
            Self::Failed { errored }
        } else if waiting.is_empty() {
            Self::Ready
        } else {
            Self::Pending { waiting }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}
