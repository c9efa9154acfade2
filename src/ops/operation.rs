//! The reversible operation contract.
//!
//! An operation is a named, argument-driven file system mutation that can be
//! undone later, possibly by another process. Everything `undo` needs is kept
//! in the operation's [`PersistedState`], which the caller stores verbatim
//! between the two calls.
//!
//! ## Lifecycle
//!
//! 1. **Construct** from a name and an ordered argument list
//! 2. **Backup**: hook run before `perform`
//! 3. **Perform**: validate arguments, mutate, record what was created
//! 4. **Undo**: reverse exactly what was recorded, then clear the state
//!
//! `test` is a side-effect-free check that may run at any time.

use crate::error::OperationError;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Result of an operation phase.
pub type OpResult<T = ()> = std::result::Result<T, OperationError>;

/// Receives every path an operation creates or removes.
pub trait Progress {
    fn touched(&mut self, path: &Path);
}

impl<F> Progress for F
where
    F: FnMut(&Path),
{
    fn touched(&mut self, path: &Path) {
        self(path)
    }
}

/// Discards progress notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn touched(&mut self, _path: &Path) {}
}

/// String-keyed values an operation keeps between `perform` and `undo`.
///
/// Serializes as a plain JSON object so it can be stored and restored
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedState(BTreeMap<String, Value>);

impl PersistedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if no value carries information: every entry is null,
    /// an empty string, an empty list or an empty object.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|value| match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reads `key` as a list of paths. Missing keys read as empty.
    pub fn paths(&self, key: &str) -> Vec<PathBuf> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item.as_str() {
                    Some(s) => Some(PathBuf::from(s)),
                    None => {
                        log::warn!("Ignoring non-string entry in '{}': {}", key, item);
                        None
                    }
                })
                .collect(),
            Some(Value::String(s)) => vec![PathBuf::from(s)],
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                log::warn!("Expected a path list in '{}', found {}", key, other);
                Vec::new()
            }
        }
    }

    /// Stores `paths` under `key` as a list of strings, in order.
    pub fn set_paths(&mut self, key: impl Into<String>, paths: &[PathBuf]) {
        let items = paths
            .iter()
            .map(|p| Value::String(p.to_string_lossy().into_owned()))
            .collect();
        self.0.insert(key.into(), Value::Array(items));
    }
}

/// A reversible file system operation.
///
/// Operations run strictly one at a time; an instance is never shared
/// between concurrent calls.
pub trait Operation: fmt::Debug + Send {
    /// Stable name used to look the operation up in a registry.
    fn name(&self) -> &'static str;

    /// Arguments the operation was constructed with.
    fn arguments(&self) -> &[String];

    fn state(&self) -> &PersistedState;

    fn state_mut(&mut self) -> &mut PersistedState;

    /// Error from the most recent failed phase. Cleared by a successful one.
    fn last_error(&self) -> Option<&OperationError>;

    /// Called before [`perform`](Operation::perform). Overwritten content is
    /// not snapshotted, so the built-in operations do nothing here.
    fn backup(&mut self) {}

    /// Validates the arguments, then applies the mutation.
    ///
    /// Invalid arguments fail with [`OperationError::InvalidArguments`]
    /// before anything on disk changes. A failure part-way through leaves the
    /// state describing what was already created, so a later
    /// [`undo`](Operation::undo) cleans it up.
    fn perform(&mut self, progress: &mut dyn Progress) -> OpResult;

    /// Reverses whatever the persisted state records, then clears it.
    ///
    /// With an empty state this succeeds without touching the disk.
    fn undo(&mut self, progress: &mut dyn Progress) -> OpResult;

    /// Side-effect-free check.
    fn test(&self) -> bool {
        true
    }

    /// Fresh instance of the same kind: no arguments, no state.
    fn clone_fresh(&self) -> Box<dyn Operation>;
}

/// Stores the outcome of a phase in `slot` and hands it back.
pub(crate) fn track(slot: &mut Option<OperationError>, result: OpResult) -> OpResult {
    *slot = result.as_ref().err().cloned();
    result
}

/// Builds the message used for an argument count mismatch.
pub(crate) fn argument_count_error(name: &str, given: usize, expected: &str) -> OperationError {
    OperationError::InvalidArguments(format!(
        "Invalid arguments in {}: {} arguments given, expected: {}",
        name, given, expected
    ))
}
