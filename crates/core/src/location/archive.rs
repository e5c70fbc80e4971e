//! Zip archive root with a lazily opened, cached handle.
//!
//! The handle is opened on the first request and kept until [`release`]
//! (called when the owning loader closes). A missing archive file is not an
//! error and is not remembered: the next request tries to open it again.
//! Once released, every request fails with an `io::Error`.
//!
//! [`release`]: LocationStorage::release

use lodestar_api::models::naming::is_safe_resource_path;
use lodestar_api::{CodeSigner, LocationKind, LocationStorage, Manifest, Resource};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use url::Url;
use zip::ZipArchive;
use zip::result::ZipError;

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 1 << 20;

enum ArchiveState {
    Unopened,
    Open(Box<OpenArchive>),
    Released,
}

/// Signature file (`META-INF/<SIGNER>.SF`) and the entries it covers.
struct Signature {
    signer: CodeSigner,
    entries: HashSet<String>,
}

struct OpenArchive {
    zip: ZipArchive<File>,
    manifest: Option<Arc<Manifest>>,
    signatures: Vec<Signature>,
}

fn invalid_data(err: impl ToString) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err.to_string())
}

fn zip_error(err: ZipError) -> io::Error {
    match err {
        ZipError::Io(e) => e,
        other => invalid_data(other),
    }
}

fn read_entry(zip: &mut ZipArchive<File>, name: &str) -> io::Result<Option<Vec<u8>>> {
    match zip.by_name(name) {
        Ok(mut entry) => {
            if entry.is_dir() {
                return Ok(None);
            }
            let mut bytes = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
            entry.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(zip_error(e)),
    }
}

fn read_manifest(zip: &mut ZipArchive<File>, name: &str) -> io::Result<Option<Manifest>> {
    let Some(bytes) = read_entry(zip, name)? else {
        return Ok(None);
    };
    let text = String::from_utf8_lossy(&bytes);
    Manifest::parse(&text)
        .map(Some)
        .map_err(|e| invalid_data(format!("{}: {}", name, e)))
}

fn is_signature_file(name: &str) -> bool {
    name.strip_prefix("META-INF/")
        .is_some_and(|rest| !rest.contains('/') && rest.ends_with(".SF"))
}

impl OpenArchive {
    fn open(path: &Path) -> io::Result<Option<Self>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let mut zip = ZipArchive::new(file).map_err(zip_error)?;
        let manifest = read_manifest(&mut zip, MANIFEST_PATH)?.map(Arc::new);

        let signature_files: Vec<String> = zip
            .file_names()
            .filter(|name| is_signature_file(name))
            .map(String::from)
            .collect();
        let mut signatures = Vec::with_capacity(signature_files.len());
        for name in signature_files {
            let Some(sf) = read_manifest(&mut zip, &name)? else {
                continue;
            };
            let signer = name
                .trim_start_matches("META-INF/")
                .trim_end_matches(".SF")
                .to_string();
            signatures.push(Signature {
                signer: CodeSigner::new(signer),
                entries: sf.entry_names().map(String::from).collect(),
            });
        }

        Ok(Some(Self {
            zip,
            manifest,
            signatures,
        }))
    }

    fn signers_for(&self, path: &str) -> Vec<CodeSigner> {
        self.signatures
            .iter()
            .filter(|sig| sig.entries.contains(path))
            .map(|sig| sig.signer.clone())
            .collect()
    }
}

pub struct ArchiveStorage {
    path: PathBuf,
    root: Url,
    state: Mutex<ArchiveState>,
}

impl ArchiveStorage {
    pub fn new(path: PathBuf, root: Url) -> Self {
        Self {
            path,
            root,
            state: Mutex::new(ArchiveState::Unopened),
        }
    }

    /// Whether a handle is currently cached.
    pub fn is_open(&self) -> bool {
        matches!(*self.lock(), ArchiveState::Open(_))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ArchiveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the open archive, opening it first if needed.
    ///
    /// `Ok(None)` when the archive file does not exist (yet).
    fn with_archive<T>(
        &self,
        f: impl FnOnce(&mut OpenArchive) -> io::Result<T>,
    ) -> io::Result<Option<T>> {
        let mut state = self.lock();
        if matches!(*state, ArchiveState::Unopened) {
            match OpenArchive::open(&self.path)? {
                Some(open) => {
                    debug!("Opened archive {}", self.root);
                    *state = ArchiveState::Open(Box::new(open));
                }
                None => return Ok(None),
            }
        }
        match &mut *state {
            ArchiveState::Open(archive) => f(&mut **archive).map(Some),
            ArchiveState::Released => Err(io::Error::other(format!(
                "archive handle released: {}",
                self.root
            ))),
            ArchiveState::Unopened => Ok(None),
        }
    }
}

impl LocationStorage for ArchiveStorage {
    fn root(&self) -> &Url {
        &self.root
    }

    fn kind(&self) -> LocationKind {
        LocationKind::Archive
    }

    fn probe(&self, path: &str) -> io::Result<Option<Resource>> {
        if !is_safe_resource_path(path) {
            return Ok(None);
        }
        let found = self.with_archive(|archive| {
            let Some(bytes) = read_entry(&mut archive.zip, path)? else {
                return Ok(None);
            };
            Ok(Some(
                Resource::new(path, bytes, self.root.clone())
                    .with_manifest(archive.manifest.clone())
                    .with_signers(archive.signers_for(path)),
            ))
        })?;
        Ok(found.flatten())
    }

    fn open_stream(&self, path: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
        if !is_safe_resource_path(path) {
            return Ok(None);
        }
        // Entries borrow the archive, so the stream owns a copy of the bytes.
        let bytes = self.with_archive(|archive| read_entry(&mut archive.zip, path))?;
        Ok(bytes
            .flatten()
            .map(|bytes| Box::new(Cursor::new(bytes)) as Box<dyn Read + Send>))
    }

    fn contains(&self, path: &str) -> io::Result<bool> {
        if !is_safe_resource_path(path) {
            return Ok(false);
        }
        let found = self.with_archive(|archive| {
            Ok(archive
                .zip
                .file_names()
                .any(|name| name == path && !name.ends_with('/')))
        })?;
        Ok(found.unwrap_or(false))
    }

    fn release(&self) -> io::Result<()> {
        let previous = std::mem::replace(&mut *self.lock(), ArchiveState::Released);
        if matches!(previous, ArchiveState::Open(_)) {
            debug!("Released archive {}", self.root);
        }
        Ok(())
    }
}
