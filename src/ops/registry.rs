//! Name → constructor lookup for operations, and the record format used to
//! bring an operation back for undo.

use crate::config::OperationConfig;
use crate::error::{Error, Result};
use crate::ops::copy_directory::CopyDirectory;
use crate::ops::create_shortcut::CreateShortcut;
use crate::ops::operation::{Operation, PersistedState};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

type Constructor = Box<dyn Fn(Vec<String>, &OperationConfig) -> Box<dyn Operation> + Send + Sync>;

/// Snapshot of an operation: what it is, what it was given, what it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub name: String,
    pub arguments: Vec<String>,
    #[serde(default)]
    pub values: PersistedState,
}

impl OperationRecord {
    pub fn from_operation(op: &dyn Operation) -> Self {
        Self {
            name: op.name().to_string(),
            arguments: op.arguments().to_vec(),
            values: op.state().clone(),
        }
    }
}

/// Creates operations by name.
///
/// [`OperationRegistry::new`] knows `CopyDirectory` and `CreateShortcut`.
/// Every operation it creates is configured from the registry's
/// [`OperationConfig`].
pub struct OperationRegistry {
    config: OperationConfig,
    constructors: BTreeMap<&'static str, Constructor>,
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("config", &self.config)
            .field("operations", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::with_config(OperationConfig::default())
    }

    pub fn with_config(config: OperationConfig) -> Self {
        let mut registry = Self {
            config,
            constructors: BTreeMap::new(),
        };
        registry.register(CopyDirectory::NAME, |args, _| {
            Box::new(CopyDirectory::new(args))
        });
        registry.register(CreateShortcut::NAME, |args, config| {
            Box::new(CreateShortcut::new(args).with_prune_policy(config.prune.clone()))
        });
        registry
    }

    pub fn config(&self) -> &OperationConfig {
        &self.config
    }

    /// Registers `constructor` under `name`, replacing any earlier entry.
    pub fn register<F>(&mut self, name: &'static str, constructor: F)
    where
        F: Fn(Vec<String>, &OperationConfig) -> Box<dyn Operation> + Send + Sync + 'static,
    {
        if self.constructors.insert(name, Box::new(constructor)).is_some() {
            log::debug!("Replaced operation constructor for '{}'", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered operation names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    /// Creates an unperformed operation.
    pub fn create(&self, name: &str, arguments: Vec<String>) -> Result<Box<dyn Operation>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_string()))?;
        Ok(constructor(arguments, &self.config))
    }

    /// Rebuilds an operation from `record`, persisted state included, ready
    /// for [`Operation::undo`].
    pub fn restore(&self, record: &OperationRecord) -> Result<Box<dyn Operation>> {
        let mut op = self.create(&record.name, record.arguments.clone())?;
        *op.state_mut() = record.values.clone();
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrunePolicy;
    use crate::ops::copy_directory::FILES_KEY;
    use std::path::PathBuf;

    #[test]
    fn test_builtin_names() {
        let registry = OperationRegistry::new();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["CopyDirectory", "CreateShortcut"]
        );
    }

    #[test]
    fn test_unknown_operation() {
        let registry = OperationRegistry::new();
        let err = registry.create("Extract", vec![]).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(name) if name == "Extract"));
    }

    #[test]
    fn test_restore_carries_state() {
        let registry = OperationRegistry::new();
        let mut values = PersistedState::new();
        values.set_paths(FILES_KEY, &[PathBuf::from("/opt/app/readme.txt")]);
        let record = OperationRecord {
            name: "CopyDirectory".to_string(),
            arguments: vec!["/src".to_string(), "/opt/app".to_string()],
            values,
        };

        let op = registry.restore(&record).unwrap();

        assert_eq!(op.arguments(), record.arguments.as_slice());
        assert_eq!(OperationRecord::from_operation(op.as_ref()), record);
    }

    #[test]
    fn test_record_json_shape() {
        let json = r#"{"name":"CreateShortcut","arguments":["/bin/app","/tmp/App.lnk"]}"#;
        let record: OperationRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.name, "CreateShortcut");
        assert!(record.values.is_empty());
    }

    #[test]
    fn test_register_custom_operation() {
        let mut registry =
            OperationRegistry::with_config(OperationConfig::default().with_prune(PrunePolicy::Disabled));
        registry.register("Mirror", |args, _| Box::new(CopyDirectory::new(args)));

        assert!(registry.contains("Mirror"));
        assert_eq!(registry.config().prune, PrunePolicy::Disabled);
        let op = registry.create("Mirror", vec![]).unwrap();
        assert_eq!(op.name(), CopyDirectory::NAME);
    }
}
