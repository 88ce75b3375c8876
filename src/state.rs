//! Persistence of the announced components, to retract the ones that disappear.

use crate::model::{DiscoveryDocument, Platform};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state file I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file format: {0}")]
    Json(#[from] serde_json::Error),
}

/// The components of the last successful announcement, by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComponentSnapshot {
    #[serde(default)]
    pub components: BTreeMap<String, Platform>,
}

impl ComponentSnapshot {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl From<&DiscoveryDocument> for ComponentSnapshot {
    fn from(document: &DiscoveryDocument) -> Self {
        Self {
            components: document.platforms(),
        }
    }
}

impl<const N: usize> From<[(&str, Platform); N]> for ComponentSnapshot {
    fn from(value: [(&str, Platform); N]) -> Self {
        Self {
            components: value
                .into_iter()
                .map(|(id, platform)| (id.to_string(), platform))
                .collect(),
        }
    }
}

/// Tracks announced components in a state file.
#[derive(Clone, Debug)]
pub struct StateTracker {
    path: PathBuf,
}

impl StateTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the previous snapshot. A missing or unreadable file is an empty snapshot.
    pub async fn load(&self) -> ComponentSnapshot {
        match self.read().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => ComponentSnapshot::default(),
            Err(err) => {
                log::warn!("Could not read state file {}: {err}", self.path.display());
                ComponentSnapshot::default()
            }
        }
    }

    /// Components announced previously, but missing from `current`.
    pub async fn reconcile(&self, current: &ComponentSnapshot) -> ComponentSnapshot {
        let mut previous = self.load().await;
        previous
            .components
            .retain(|id, _| !current.components.contains_key(id));
        previous
    }

    /// Replace the stored snapshot with `current`. Failures are only logged.
    pub async fn persist(&self, current: &ComponentSnapshot) {
        if let Err(err) = self.write(current).await {
            log::warn!("Could not write state file {}: {err}", self.path.display());
        }
    }

    async fn read(&self) -> Result<Option<ComponentSnapshot>, StateError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    async fn write(&self, current: &ComponentSnapshot) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(current)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_reconcile() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = StateTracker::new(dir.path().join("state.json"));

        let previous = ComponentSnapshot::from([
            ("a", Platform::Sensor),
            ("b", Platform::Sensor),
            ("c", Platform::BinarySensor),
        ]);
        tracker.persist(&previous).await;

        let current = ComponentSnapshot::from([("a", Platform::Sensor), ("d", Platform::Sensor)]);
        let removed = tracker.reconcile(&current).await;
        assert_eq!(
            removed,
            ComponentSnapshot::from([("b", Platform::Sensor), ("c", Platform::BinarySensor)])
        );

        tracker.persist(&current).await;
        assert_eq!(tracker.load().await, current);
        assert!(tracker.reconcile(&current).await.is_empty());
    }

    #[tokio::test]
    async fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let tracker = StateTracker::new(&path);

        let current = ComponentSnapshot::from([
            ("cpu_usage", Platform::Sensor),
            ("service_sshd", Platform::BinarySensor),
        ]);
        tracker.persist(&current).await;

        let content: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            content,
            json!({
                "components": {
                    "cpu_usage": "sensor",
                    "service_sshd": "binary_sensor",
                }
            })
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = StateTracker::new(dir.path().join("missing.json"));

        let current = ComponentSnapshot::from([("a", Platform::Sensor)]);
        assert!(tracker.load().await.is_empty());
        assert!(tracker.reconcile(&current).await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let tracker = StateTracker::new(&path);
        let current = ComponentSnapshot::from([("a", Platform::Sensor)]);
        assert!(tracker.reconcile(&current).await.is_empty());

        // the next persist replaces the corrupt content
        tracker.persist(&current).await;
        assert_eq!(tracker.load().await, current);
    }

    #[tokio::test]
    async fn test_unknown_platform_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"components": {"a": "light"}}"#).unwrap();

        assert!(StateTracker::new(&path).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("var/lib/system2mqtt/state.json");
        let tracker = StateTracker::new(&path);

        let current = ComponentSnapshot::from([("a", Platform::Sensor)]);
        tracker.persist(&current).await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        // parent "directory" is a regular file
        let tracker = StateTracker::new(blocker.join("state.json"));
        let current = ComponentSnapshot::from([("a", Platform::Sensor)]);
        tracker.persist(&current).await;
        assert!(tracker.load().await.is_empty());
    }
}
