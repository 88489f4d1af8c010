//! Native shared-library loader backed by `libloading`.

use packsync_core::{digest, LoaderSettings, LocalArtifact};
use libloading::Library;

use crate::error::{io_err, LoadError};
use crate::{LoadedModule, ModuleHandle, ModuleLoader};

/// Loads artifacts with the platform's dynamic linker (`dlopen` /
/// `LoadLibraryW`). Libraries are kept open for as long as the loader lives.
pub struct DylibLoader {
    settings: LoaderSettings,
    resident: Vec<Library>,
}

impl DylibLoader {
    pub fn new(settings: LoaderSettings) -> Self {
        Self {
            settings,
            resident: Vec::new(),
        }
    }
}

impl ModuleLoader for DylibLoader {
    fn load(&mut self, artifact: &LocalArtifact) -> Result<LoadedModule, LoadError> {
        let path = &artifact.path;
        let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
        let digest = digest(&bytes);

        // SAFETY: loading a library runs its initialisers. The artifact was
        // either already present locally or just passed digest comparison
        // (and the authenticity gate, when configured) in the sync engine.
        let library = unsafe { Library::new(path) }.map_err(|e| LoadError::Open {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(symbol) = self.settings.entry_symbol.as_deref() {
            // SAFETY: the symbol is only resolved, never called.
            let found = unsafe { library.get::<unsafe extern "C" fn()>(symbol.as_bytes()) };
            if found.is_err() {
                return Err(LoadError::MissingSymbol {
                    path: path.clone(),
                    symbol: symbol.to_string(),
                });
            }
        }

        let handle = ModuleHandle(self.resident.len());
        self.resident.push(library);
        tracing::info!("loaded module: {} ({})", artifact.name, digest.short());
        Ok(LoadedModule {
            handle,
            name: artifact.name.clone(),
            path: path.clone(),
            digest,
        })
    }

    fn resident(&self) -> usize {
        self.resident.len()
    }
}
