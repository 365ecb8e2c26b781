//! Snapshot file persistence.
//!
//! The file holds the same twelve-record array as a console export, so an
//! exported file can be dropped in as the daemon's snapshot and vice versa.
//! The waiting list is not part of the snapshot.

use std::path::Path;

use tracing::{info, warn};

use cruise_core::ShipError;
use cruise_protocol::snapshot;

use crate::registry::{RegistryError, RegistryHandle};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to access snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot {path} rejected: {source}")]
    Invalid {
        path: String,
        #[source]
        source: ShipError,
    },

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Loads a snapshot file into the registry through the normal bulk-load path.
///
/// Returns `Ok(false)` when the file does not exist.
///
/// # Errors
///
/// - `PersistenceError::Io` if the file exists but cannot be read
/// - `PersistenceError::Invalid` if the contents fail import; cabins are unchanged
/// - `PersistenceError::Registry` if the actor is gone
pub async fn restore(registry: &RegistryHandle, path: &Path) -> Result<bool, PersistenceError> {
    if !path.exists() {
        info!(path = %path.display(), "No snapshot file, starting with an empty ship");
        return Ok(false);
    }

    let shown = path.display().to_string();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PersistenceError::Io {
            path: shown.clone(),
            source,
        })?;

    let cabins = snapshot::import_str(&text).map_err(|source| PersistenceError::Invalid {
        path: shown.clone(),
        source,
    })?;
    let occupied = cabins.iter().filter(|c| c.is_occupied()).count();

    registry.load_snapshot(cabins).await.map_err(|e| match e {
        RegistryError::Ship(source) => PersistenceError::Invalid {
            path: shown.clone(),
            source,
        },
        other => PersistenceError::Registry(other),
    })?;

    info!(path = %shown, occupied, "Snapshot restored");
    Ok(true)
}

/// Writes the current cabins as pretty JSON.
///
/// The file is written beside the target and renamed over it, so a crash
/// mid-write never leaves a truncated snapshot.
///
/// # Errors
///
/// `PersistenceError::Io` on any filesystem failure, or
/// `PersistenceError::Registry` if the actor is gone.
pub async fn save(registry: &RegistryHandle, path: &Path) -> Result<(), PersistenceError> {
    let cabins = registry.get_all_cabins().await?;
    let records = cruise_protocol::wire::cabin_records(&cabins);
    let json = serde_json::to_string_pretty(&records)?;

    let shown = path.display().to_string();
    let io_err = |source| PersistenceError::Io {
        path: shown.clone(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        warn!(path = %shown, error = %e, "Failed to move snapshot into place");
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }

    info!(path = %shown, "Snapshot saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::spawn_registry;
    use cruise_core::{Passenger, PassengerType};

    #[tokio::test]
    async fn test_save_then_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("cabins.json");

        let first = spawn_registry();
        first
            .assign_passengers(
                6,
                "Lee Party".to_string(),
                vec![Passenger::new("Kim", "Lee", PassengerType::Adult)],
            )
            .await
            .unwrap();
        save(&first, &path).await.unwrap();

        let second = spawn_registry();
        assert!(restore(&second, &path).await.unwrap());
        assert_eq!(
            second.get_all_cabins().await.unwrap(),
            first.get_all_cabins().await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_restore_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let registry = spawn_registry();
        assert!(!restore(&registry, &dir.path().join("none.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_restore_invalid_file_leaves_ship_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cabins.json");
        std::fs::write(&path, "[]").unwrap();

        let registry = spawn_registry();
        let err = restore(&registry, &path).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Invalid { .. }));
        assert!(registry
            .get_all_cabins()
            .await
            .unwrap()
            .iter()
            .all(|c| !c.is_occupied()));
    }
}
