use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use fd_lock::{RwLock, RwLockWriteGuard};
use tokio::sync::oneshot;

use crate::{Error, Result};

const LOCK_SUFFIX: &str = ".lock";

/// Advisory lock file serializing provisioners of the same destination.
///
/// The file lives next to the destination (`<dest>.lock`) so the
/// destination itself only ever holds archive contents.
pub struct LockFile {
    path: PathBuf,
    lock: RwLock<File>,
}

/// Held exclusive lock. Released on drop.
pub struct LockGuard<'a> {
    _guard: RwLockWriteGuard<'a, File>,
    path:   &'a Path,
}

impl LockGuard<'_> {
    pub fn path(&self) -> &Path { self.path }
}

/// Exclusive lock held by a blocking-pool thread on behalf of async code.
///
/// Dropping the guard wakes that thread, which then releases the lock.
#[derive(Debug)]
pub struct OwnedLockGuard {
    path:     PathBuf,
    _release: mpsc::Sender<()>,
}

impl OwnedLockGuard {
    pub fn path(&self) -> &Path { &self.path }
}

impl LockFile {
    /// Open (creating if needed) the lock file belonging to `destination`.
    pub fn for_destination(destination: &Path) -> Result<Self> {
        Self::open(lock_path_for(destination)?)
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| Error::Lock {
                path: path.clone(),
                source,
            })?;
        }

        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| Error::Lock {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            lock: RwLock::new(file),
        })
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Block until the exclusive lock is held.
    pub fn acquire(&mut self) -> Result<LockGuard<'_>> {
        let Self { path, lock } = self;
        let guard = lock.write().map_err(|source| Error::Lock {
            path: path.clone(),
            source,
        })?;
        Ok(LockGuard {
            _guard: guard,
            path:   path.as_path(),
        })
    }

    /// Wait for the exclusive lock without blocking the async runtime.
    ///
    /// The blocking `flock` runs on tokio's blocking pool. That thread keeps
    /// the lock until the returned guard is dropped, so other tasks on the
    /// same runtime keep making progress while this one waits.
    pub async fn acquire_owned(self) -> Result<OwnedLockGuard> {
        let path = self.path.clone();
        let (acquired_tx, acquired_rx) = oneshot::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        tokio::task::spawn_blocking(move || {
            let mut lock = self;
            match lock.acquire() {
                Ok(_guard) => {
                    if acquired_tx.send(Ok(())).is_ok() {
                        // Returns once the owned guard's sender is dropped.
                        let _ = release_rx.recv();
                    }
                }
                Err(e) => {
                    let _ = acquired_tx.send(Err(e));
                }
            }
        });

        acquired_rx.await.map_err(|_| Error::Lock {
            path:   path.clone(),
            source: io::Error::other("lock task ended before acquiring"),
        })??;

        Ok(OwnedLockGuard {
            path,
            _release: release_tx,
        })
    }

    /// Take the lock only if nobody else holds it.
    pub fn try_acquire(&mut self) -> Result<Option<LockGuard<'_>>> {
        let Self { path, lock } = self;
        match lock.try_write() {
            Ok(guard) => Ok(Some(LockGuard {
                _guard: guard,
                path:   path.as_path(),
            })),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(source) => Err(Error::Lock {
                path: path.clone(),
                source,
            }),
        }
    }
}

/// `<parent>/<name>.lock` for a destination `<parent>/<name>`.
pub fn lock_path_for(destination: &Path) -> Result<PathBuf> {
    let name = destination.file_name().ok_or_else(|| Error::Lock {
        path:   destination.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination has no final path component to name a lock file after; disable locking to provision it",
        ),
    })?;

    let mut lock_name = name.to_os_string();
    lock_name.push(LOCK_SUFFIX);
    Ok(destination.with_file_name(lock_name))
}
