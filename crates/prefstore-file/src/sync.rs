//! Platform durable flush
//!
//! `flush_to_disk` maps to the strongest sync primitive each platform
//! offers. Plain `fsync` is not enough everywhere: on Apple platforms it
//! only reaches the drive's volatile write cache, so F_FULLFSYNC is
//! required for data to survive power loss.

use std::fs::File;
use std::io;

/// Block until the file's data is on persistent storage.
///
/// - Linux: `fdatasync()` — file data without metadata, cheaper than fsync
///   and sufficient for an append-only journal
/// - macOS/iOS: `fcntl(F_FULLFSYNC)` — bypasses the drive write cache
/// - Windows: `FlushFileBuffers()`
/// - elsewhere: `File::sync_data()`
///
/// May block for milliseconds under heavy I/O; callers must not hold the
/// RAM table lock across this call.
pub fn flush_to_disk(file: &File) -> io::Result<()> {
    #[cfg(target_os = "linux")]
    {
        use std::os::unix::io::AsRawFd;
        // SAFETY: fdatasync operates on the raw fd of a live File borrow,
        // which is guaranteed to be an open descriptor.
        let rc = unsafe { libc::fdatasync(file.as_raw_fd()) };
        if rc == 0 { Ok(()) } else { Err(io::Error::last_os_error()) }
    }

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    {
        use std::os::unix::io::AsRawFd;
        // SAFETY: fcntl(F_FULLFSYNC) operates on the raw fd of a live File
        // borrow, which is guaranteed to be an open descriptor.
        let rc = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_FULLFSYNC) };
        if rc == 0 { Ok(()) } else { Err(io::Error::last_os_error()) }
    }

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::io::AsRawHandle;
        use winapi::um::fileapi::FlushFileBuffers;
        // SAFETY: FlushFileBuffers operates on the raw handle of a live
        // File borrow.
        let rc = unsafe { FlushFileBuffers(file.as_raw_handle() as *mut _) };
        if rc != 0 { Ok(()) } else { Err(io::Error::last_os_error()) }
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "ios",
        target_os = "windows"
    )))]
    {
        file.sync_data()
    }
}
