//! Mutual exclusion for the claim protocol.
//!
//! A [`WorkerLock`] is constructed by the caller and passed into the
//! tracker, so one lock can be deliberately shared by several trackers
//! when cross-component coordination needs it. Acquisition hands back an
//! RAII [`LockGuard`]; release happens on every exit path when the guard
//! drops.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{CoordError, CoordResult};

/// Bounded wait for the cross-process variant. An unbounded wait would
/// stall every worker behind a holder that is merely wedged rather than
/// dead.
pub const DEFAULT_FILE_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

const FILE_LOCK_RETRY_DELAY: Duration = Duration::from_millis(25);

/// An exclusive lock shared by every worker coordinating on one claim
/// history.
///
/// Two variants behind one `acquire` surface:
///
/// - [`in_process`](WorkerLock::in_process): a reentrant mutex; clones
///   share the same underlying lock. Valid when all workers are threads
///   of this process.
/// - [`file`](WorkerLock::file): an advisory `flock(2)` on a lock file
///   visible to every cooperating process. The kernel releases the lock
///   when the holder's descriptor closes, including when the holding
///   process dies, so a crashed holder cannot stall the cluster forever.
#[derive(Clone)]
pub struct WorkerLock {
    kind: LockKind,
}

#[derive(Clone)]
enum LockKind {
    InProcess(Arc<ReentrantMutex<()>>),
    File { path: PathBuf, timeout: Duration },
}

impl WorkerLock {
    /// A reentrant in-process lock. Reentrancy matters because a claim's
    /// critical section may nest further acquisitions of the same lock.
    pub fn in_process() -> Self {
        Self {
            kind: LockKind::InProcess(Arc::new(ReentrantMutex::new(()))),
        }
    }

    /// A cross-process advisory lock on `path`, with the default bounded
    /// wait.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::file_with_timeout(path, DEFAULT_FILE_LOCK_TIMEOUT)
    }

    pub fn file_with_timeout(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            kind: LockKind::File {
                path: path.into(),
                timeout,
            },
        }
    }

    /// Block until exclusive ownership is obtained.
    ///
    /// The file variant polls non-blocking `flock` attempts until its
    /// deadline and fails with [`CoordError::Unavailable`] when the
    /// deadline passes.
    pub fn acquire(&self) -> CoordResult<LockGuard<'_>> {
        match &self.kind {
            LockKind::InProcess(mutex) => Ok(LockGuard {
                _kind: GuardKind::InProcess(mutex.lock()),
            }),
            LockKind::File { path, timeout } => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .open(path)
                    .map_err(|e| {
                        CoordError::unavailable(format!("open lock file '{}': {}", path.display(), e))
                    })?;

                let deadline = Instant::now() + *timeout;
                loop {
                    if try_flock_exclusive(&file)? {
                        return Ok(LockGuard {
                            _kind: GuardKind::File(FileLockGuard { _file: file }),
                        });
                    }
                    if Instant::now() >= deadline {
                        return Err(CoordError::unavailable(format!(
                            "lock '{}' still held by another process after {:?}",
                            path.display(),
                            timeout
                        )));
                    }
                    thread::sleep(FILE_LOCK_RETRY_DELAY);
                }
            }
        }
    }
}

/// Held lock. Dropping it releases on every exit path.
pub struct LockGuard<'a> {
    _kind: GuardKind<'a>,
}

enum GuardKind<'a> {
    InProcess(ReentrantMutexGuard<'a, ()>),
    File(FileLockGuard),
}

/// Closing the descriptor releases the flock; Drop is implicit.
struct FileLockGuard {
    _file: File,
}

#[cfg(unix)]
fn try_flock_exclusive(file: &File) -> CoordResult<bool> {
    use std::os::unix::io::AsRawFd;

    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    if err.kind() == std::io::ErrorKind::WouldBlock {
        Ok(false)
    } else {
        Err(CoordError::unavailable(format!(
            "flock(LOCK_EX|LOCK_NB): {}",
            err
        )))
    }
}

#[cfg(not(unix))]
fn try_flock_exclusive(_file: &File) -> CoordResult<bool> {
    Err(CoordError::unavailable(
        "cross-process file locks require a unix host",
    ))
}
