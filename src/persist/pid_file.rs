//! Process id file.
//!
//! # Responsibilities
//! - Record the daemon's pid durably at startup
//! - Read a previously recorded pid back
//! - Probe whether the recorded process is still alive (singleton check)
//!
//! # Format
//! ASCII decimal pid followed by a single NUL byte, mode 0600.
//!
//! # Design Decisions
//! - Any failure while writing is `PersistError::Fatal`; the caller tears the
//!   daemon down instead of running without a discoverable pid
//! - Parsing is best effort: unparsable content reads as pid 0

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use crate::observability::metrics;
use crate::persist::error::{PersistError, PersistResult};

/// Upper bound on bytes read from a pid file.
pub const PID_BUF_SIZE: usize = 128;

/// Liveness of the process named by a pid file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidState {
    /// No pid file, or it holds no valid pid.
    NotRunning,
    /// The recorded process exists.
    Running(u32),
    /// The recorded process is gone.
    Stale(u32),
}

/// Read the pid stored at `path`.
///
/// Returns 0 when the content is not a number; callers must treat 0 as
/// "no valid pid".
pub fn read_pid_file(path: &Path) -> PersistResult<u32> {
    let file = File::open(path).map_err(|e| PersistError::open(path, e))?;

    let mut buf = Vec::with_capacity(PID_BUF_SIZE);
    let len = file
        .take(PID_BUF_SIZE as u64)
        .read_to_end(&mut buf)
        .map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Could not read pid file");
            PersistError::io("read", path, e)
        })?;

    if len == 0 {
        tracing::error!(path = %path.display(), "EOF detected while reading pid file");
        return Err(PersistError::io(
            "read",
            path,
            io::Error::new(io::ErrorKind::UnexpectedEof, "pid file is empty"),
        ));
    }

    Ok(parse_pid(&buf))
}

/// Write the current process id to `path` and flush it to disk.
///
/// Every failure is fatal for the daemon.
pub fn write_pid_file(path: &Path) -> PersistResult<u32> {
    let pid = std::process::id();
    let result = write_pid(path, pid);
    metrics::record_pid_write(result.is_ok());

    match result {
        Ok(()) => {
            tracing::info!(pid, path = %path.display(), "Wrote pid file");
            Ok(pid)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Could not write pid file");
            Err(e)
        }
    }
}

fn write_pid(path: &Path, pid: u32) -> PersistResult<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| PersistError::fatal("open", path, e))?;

    let content = format!("{}\0", pid);
    file.write_all(content.as_bytes())
        .map_err(|e| PersistError::fatal("write", path, e))?;
    file.sync_all()
        .map_err(|e| PersistError::fatal("fsync", path, e))?;

    close(file).map_err(|e| PersistError::fatal("close", path, e))
}

/// Close the handle and report the result, which `Drop` would swallow.
#[cfg(unix)]
fn close(file: File) -> io::Result<()> {
    use std::os::unix::io::IntoRawFd;
    nix::unistd::close(file.into_raw_fd()).map_err(io::Error::from)
}

#[cfg(not(unix))]
fn close(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

/// Remove the pid file. Returns false if there was nothing to remove.
pub fn remove_pid_file(path: &Path) -> PersistResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Removed pid file");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Could not remove pid file");
            Err(PersistError::io("remove", path, e))
        }
    }
}

/// Check whether the process recorded at `path` is alive.
pub fn check_running(path: &Path) -> PersistResult<PidState> {
    let pid = match read_pid_file(path) {
        Ok(pid) => pid,
        Err(e) if e.is_not_found() => return Ok(PidState::NotRunning),
        Err(e) => return Err(e),
    };

    if pid == 0 {
        return Ok(PidState::NotRunning);
    }

    if is_process_running(pid) {
        Ok(PidState::Running(pid))
    } else {
        Ok(PidState::Stale(pid))
    }
}

/// Probe a pid with signal 0.
#[cfg(unix)]
pub fn is_process_running(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };

    // EPERM: the process exists but belongs to someone else.
    match kill(Pid::from_raw(raw), None) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn is_process_running(_pid: u32) -> bool {
    false
}

/// Best-effort decimal parse with C `atoi` leniency.
///
/// Skips leading whitespace, accepts an optional sign and stops at the first
/// non-digit. Garbage, negative and out-of-range values yield 0.
pub fn parse_pid(buf: &[u8]) -> u32 {
    let mut bytes = buf.iter().copied().skip_while(|b| b.is_ascii_whitespace()).peekable();

    match bytes.peek() {
        Some(b'-') => return 0,
        Some(b'+') => {
            bytes.next();
        }
        _ => {}
    }

    let mut value: i32 = 0;
    for b in bytes.take_while(u8::is_ascii_digit) {
        value = match value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i32::from(b - b'0')))
        {
            Some(v) => v,
            None => return 0,
        };
    }

    u32::try_from(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid(b"4242\0"), 4242);
        assert_eq!(parse_pid(b"  17\n"), 17);
        assert_eq!(parse_pid(b"+9"), 9);
        assert_eq!(parse_pid(b"123abc"), 123);
        assert_eq!(parse_pid(b"abc"), 0);
        assert_eq!(parse_pid(b"-12"), 0);
        assert_eq!(parse_pid(b""), 0);
        assert_eq!(parse_pid(b"99999999999"), 0);
    }

    #[test]
    fn test_pid_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.pid");

        let written = write_pid_file(&path).unwrap();
        assert_eq!(written, std::process::id());
        assert_eq!(read_pid_file(&path).unwrap(), written);

        let raw = fs::read(&path).unwrap();
        assert_eq!(raw.last(), Some(&0u8));
    }

    #[test]
    fn test_write_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.pid");
        fs::write(&path, "12345678901234567890").unwrap();

        write_pid_file(&path).unwrap();
        let expected = format!("{}\0", std::process::id());
        assert_eq!(fs::read(&path).unwrap(), expected.as_bytes());
    }

    #[cfg(unix)]
    #[test]
    fn test_pid_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.pid");
        write_pid_file(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_write_into_missing_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/pool.pid");

        let err = write_pid_file(&path).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, PersistError::Fatal { op: "open", .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_failure_is_fatal() {
        // Every write to /dev/full fails with ENOSPC.
        let err = write_pid_file(Path::new("/dev/full")).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, PersistError::Fatal { op: "write", .. }));
    }

    #[test]
    fn test_read_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.pid");
        assert!(read_pid_file(&path).unwrap_err().is_not_found());

        fs::write(&path, b"").unwrap();
        let err = read_pid_file(&path).unwrap_err();
        assert!(matches!(err, PersistError::Io { op: "read", .. }));

        fs::write(&path, b"garbage").unwrap();
        assert_eq!(read_pid_file(&path).unwrap(), 0);
    }

    #[test]
    fn test_remove_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.pid");
        write_pid_file(&path).unwrap();

        assert!(remove_pid_file(&path).unwrap());
        assert!(!remove_pid_file(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_check_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.pid");
        assert_eq!(check_running(&path).unwrap(), PidState::NotRunning);

        fs::write(&path, b"not a pid\0").unwrap();
        assert_eq!(check_running(&path).unwrap(), PidState::NotRunning);

        let pid = write_pid_file(&path).unwrap();
        assert_eq!(check_running(&path).unwrap(), PidState::Running(pid));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_running_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.pid");

        let mut child = std::process::Command::new("true").spawn().unwrap();
        let child_pid = child.id();
        child.wait().unwrap();

        fs::write(&path, format!("{}\0", child_pid)).unwrap();
        assert_eq!(check_running(&path).unwrap(), PidState::Stale(child_pid));
    }
}
