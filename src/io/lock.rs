use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Name of the lock file inside `.taskdeck/`
pub const LOCK_FILE: &str = ".lock";

/// How long writers wait for another `td` process before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Exclusive advisory lock on the board directory.
///
/// Held for the read-modify-write of `board.json`. The flock is released when
/// the guard is dropped; the lock file itself is left in place so that a
/// waiting process never locks an unlinked inode.
#[derive(Debug)]
pub struct BoardLock {
    _file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timed out waiting for {path}: another td process is writing")]
    Timeout { path: PathBuf },
}

impl BoardLock {
    /// Lock `board_dir/.lock`, polling until `timeout` elapses.
    pub fn acquire(board_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = board_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let start = Instant::now();
        while !try_flock(&file) {
            if start.elapsed() >= timeout {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        Ok(BoardLock { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn try_flock(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    // SAFETY: the fd is owned by `file` and stays open for the call
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> bool {
    true
}
