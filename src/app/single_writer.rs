//! Process-level advisory lock on the SQLite file.
//!
//! Membership writes rely on SQLite's own locking for atomicity; this keeps a
//! second server process from pointing at the same database file at all.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::mpsc;
use std::thread;

use sqlx::sqlite::SqliteConnectOptions;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("DATABASE_URL: {0}")]
    Url(#[from] sqlx::Error),
    #[error("lock file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("another {} process is already using {}; stop it first or use a different DATABASE_URL", crate::app::APP_NAME, .0.display())]
    Held(PathBuf),
    #[error("lock thread exited without reporting")]
    Thread,
}

/// Lock file path next to the database file, or None for in-memory databases.
fn lock_path(url: &str) -> Result<Option<PathBuf>, LockError> {
    if url.contains(":memory:") {
        return Ok(None);
    }
    let db_file = SqliteConnectOptions::from_str(url)?.get_filename().to_path_buf();
    if db_file.as_os_str().is_empty() {
        return Ok(None);
    }
    let name = db_file
        .file_name()
        .map(|n| format!("{}.lock", n.to_string_lossy()))
        .unwrap_or_else(|| "db.lock".into());
    Ok(Some(db_file.parent().unwrap_or_else(|| Path::new("")).join(name)))
}

/// Take the lock for the database at `url`. Held until the guard is dropped.
pub fn acquire(url: &str) -> Result<Option<SingleWriterGuard>, LockError> {
    let Some(path) = lock_path(url)? else {
        return Ok(None);
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .map_err(|source| LockError::Io { path: path.clone(), source })?;

    // fd-lock guards borrow the lock, so a dedicated thread owns both until release.
    let (result_tx, result_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let held_path = path.clone();
    let join = thread::spawn(move || {
        let mut lock = fd_lock::RwLock::new(file);
        match lock.try_write() {
            Ok(_guard) => {
                let _ = result_tx.send(Ok(()));
                let _ = release_rx.recv();
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                let _ = result_tx.send(Err(LockError::Held(held_path)));
            }
            Err(source) => {
                let _ = result_tx.send(Err(LockError::Io { path: held_path, source }));
            }
        };
    });

    result_rx.recv().map_err(|_| LockError::Thread)??;
    tracing::debug!(lock = %path.display(), "single-writer lock acquired");
    Ok(Some(SingleWriterGuard { release_tx, join: Some(join) }))
}

pub struct SingleWriterGuard {
    release_tx: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl Drop for SingleWriterGuard {
    fn drop(&mut self) {
        let _ = self.release_tx.send(());
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}
