//! End-to-end sync-and-load scenarios against an in-memory remote.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use packsync_core::{digest, ArtifactName, LocalArtifact};
use packsync_loader::{LoadError, LoadedModule, ModuleHandle, ModuleLoader};
use packsync_sync::pipeline::{self, SyncStatus, UpdateTrigger};
use packsync_sync::{update_all, ArtifactDir, BackupStore, SyncEngine, SyncError};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Records every artifact it is asked to load.
#[derive(Default)]
struct RecordingLoader {
    loaded: Vec<(String, Vec<u8>)>,
}

impl ModuleLoader for RecordingLoader {
    fn load(&mut self, artifact: &LocalArtifact) -> Result<LoadedModule, LoadError> {
        let bytes = fs::read(&artifact.path).map_err(|source| LoadError::Io {
            path: artifact.path.clone(),
            source,
        })?;
        let module = LoadedModule {
            handle: ModuleHandle(self.loaded.len()),
            name: artifact.name.clone(),
            path: artifact.path.clone(),
            digest: digest(&bytes),
        };
        self.loaded.push((artifact.name.to_string(), bytes));
        Ok(module)
    }

    fn resident(&self) -> usize {
        self.loaded.len()
    }
}

fn remote(
    entries: &[(&'static str, &'static [u8])],
) -> impl Fn(&ArtifactName) -> Result<Vec<u8>, SyncError> + 'static {
    let map: HashMap<&'static str, &'static [u8]> = entries.iter().copied().collect();
    move |name: &ArtifactName| {
        map.get(name.as_str())
            .map(|b| b.to_vec())
            .ok_or_else(|| SyncError::Network {
                name: name.to_string(),
                url: format!("test://{name}"),
                reason: "HTTP 404 Not Found".into(),
            })
    }
}

fn seed(dir: &Path, files: &[(&str, &[u8])]) {
    fs::create_dir_all(dir).expect("create mods dir");
    for (file, bytes) in files {
        fs::write(dir.join(file), bytes).expect("seed artifact");
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn stale_artifact_is_backed_up_replaced_and_loaded() {
    let tmp = TempDir::new().expect("tmp");
    let mods = tmp.path().join("mods");
    let backups = tmp.path().join("mods_backup");
    seed(&mods, &[("alpha.art", b"v1"), ("beta.art", b"same")]);

    let engine = SyncEngine::new(
        remote(&[("alpha", b"v2"), ("beta", b"same")]),
        BackupStore::new(&backups),
    );
    let mut loader = RecordingLoader::default();
    let summary = pipeline::run(&engine, &ArtifactDir::new(&mods, "art"), &mut loader);

    assert_eq!(fs::read(mods.join("alpha.art")).unwrap(), b"v2");
    assert_eq!(fs::read(backups.join("alpha.art")).unwrap(), b"v1");
    assert_eq!(fs::read(mods.join("beta.art")).unwrap(), b"same");
    assert!(!backups.join("beta.art").exists());

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.load_attempts(), 2);
    assert_eq!(summary.batch_passes, 1);
    assert_eq!(
        summary.items[0].sync,
        SyncStatus::Updated {
            trigger: UpdateTrigger::Inline
        }
    );

    // The loader sees the replaced bytes, never the stale ones.
    assert_eq!(loader.loaded[0], ("alpha".to_string(), b"v2".to_vec()));
    assert_eq!(loader.loaded[1], ("beta".to_string(), b"same".to_vec()));
}

#[test]
fn batch_pass_refreshes_later_artifacts_before_they_load() {
    let tmp = TempDir::new().expect("tmp");
    let mods = tmp.path().join("mods");
    seed(&mods, &[("alpha.art", b"a1"), ("beta.art", b"b1")]);

    let engine = SyncEngine::new(
        remote(&[("alpha", b"a2"), ("beta", b"b2")]),
        BackupStore::new(tmp.path().join("mods_backup")),
    );
    let mut loader = RecordingLoader::default();
    let summary = pipeline::run(&engine, &ArtifactDir::new(&mods, "art"), &mut loader);

    assert_eq!(summary.updated, 2);
    assert_eq!(summary.batch_passes, 1);
    assert_eq!(
        summary.items[1].sync,
        SyncStatus::Updated {
            trigger: UpdateTrigger::Batch
        }
    );
    assert_eq!(loader.loaded[1].1, b"b2");
}

#[test]
fn second_update_pass_is_a_no_op() {
    let tmp = TempDir::new().expect("tmp");
    let mods = tmp.path().join("mods");
    let backups = tmp.path().join("mods_backup");
    seed(&mods, &[("alpha.art", b"v1")]);

    let engine = SyncEngine::new(remote(&[("alpha", b"v2")]), BackupStore::new(&backups));
    let dir = ArtifactDir::new(&mods, "art");

    let first = update_all(&engine, &dir).expect("first pass");
    assert_eq!(first.updated_count(), 1);
    let backup_mtime = fs::metadata(backups.join("alpha.art"))
        .and_then(|m| m.modified())
        .expect("backup exists");

    let second = update_all(&engine, &dir).expect("second pass");
    assert_eq!(second.updated_count(), 0);
    assert_eq!(second.unchanged_count(), 1);
    assert_eq!(fs::read(backups.join("alpha.art")).unwrap(), b"v1");
    assert_eq!(
        fs::metadata(backups.join("alpha.art"))
            .and_then(|m| m.modified())
            .unwrap(),
        backup_mtime
    );
}

#[test]
fn unreachable_artifact_is_left_alone_and_still_loaded() {
    let tmp = TempDir::new().expect("tmp");
    let mods = tmp.path().join("mods");
    let backups = tmp.path().join("mods_backup");
    seed(&mods, &[("alpha.art", b"v1"), ("beta.art", b"old")]);

    let engine = SyncEngine::new(remote(&[("beta", b"new")]), BackupStore::new(&backups));
    let mut loader = RecordingLoader::default();
    let summary = pipeline::run(&engine, &ArtifactDir::new(&mods, "art"), &mut loader);

    assert_eq!(fs::read(mods.join("alpha.art")).unwrap(), b"v1");
    assert!(!backups.join("alpha.art").exists());
    assert_eq!(fs::read(mods.join("beta.art")).unwrap(), b"new");
    assert_eq!(summary.sync_failed, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.loaded, 2);
}
