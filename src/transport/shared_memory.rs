//! Cross-process shared-memory window.
//!
//! The producer owns a named, file-backed mapping of [`MAPPING_SIZE`] bytes;
//! the first [`RECORD_SIZE`](crate::types::RECORD_SIZE) bytes are the packed
//! record of the latest published frame. Writes and reads hold the
//! cross-process lock [`MUTEX_NAME`], so a reader observes either the
//! previous or the next complete record, never a torn one.
//!
//! On Unix the lock is an advisory `flock` on a sentinel file next to the
//! mapping; on Windows it is a named kernel mutex. The mapping itself is a
//! file in the system temp directory under the well-known name, which both
//! processes resolve independently.

use memmap2::MmapMut;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::{debug, trace};

use crate::types::RECORD_SIZE;
use crate::{RelayError, Result};

/// Well-known name of the shared mapping.
pub const MAPPING_NAME: &str = "GenericTelemetryProviderFiltered";
/// Well-known name of the cross-process lock.
pub const MUTEX_NAME: &str = "GenericTelemetryProviderMutex";
/// Size of the mapped region in bytes.
pub const MAPPING_SIZE: usize = 10_000;

fn mapping_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

/// A mapped view of the shared telemetry window.
pub struct SharedMemoryLink {
    mmap: MmapMut,
    lock: FrameLock,
    path: PathBuf,
    /// Creator unlinks the mapping on drop so a dead producer reads as absent.
    owner: bool,
}

impl SharedMemoryLink {
    /// Create (or recreate) the mapping under the well-known name. Producer
    /// side.
    pub fn create() -> Result<Self> {
        Self::create_named(MAPPING_NAME, MUTEX_NAME)
    }

    /// Open the well-known mapping some producer already created. Consumer
    /// side.
    ///
    /// Absence is the normal cold-start condition and comes back as a
    /// retryable [`RelayError::MappingUnavailable`].
    pub fn open_existing() -> Result<Self> {
        Self::open_existing_named(MAPPING_NAME, MUTEX_NAME)
    }

    /// Create a mapping under an explicit name pair.
    pub fn create_named(mapping_name: &str, lock_name: &str) -> Result<Self> {
        let path = mapping_path(mapping_name);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| RelayError::shared_memory(format!("create {}", path.display()), e))?;
        file.set_len(MAPPING_SIZE as u64)
            .map_err(|e| RelayError::shared_memory("size mapping", e))?;

        let mmap = unsafe { MmapMut::map_mut(&file) }
            .map_err(|e| RelayError::shared_memory("map region", e))?;

        let lock = FrameLock::create(lock_name)?;
        debug!(path = %path.display(), size = MAPPING_SIZE, "Created shared telemetry mapping");

        Ok(Self { mmap, lock, path, owner: true })
    }

    /// Open an existing mapping under an explicit name pair.
    pub fn open_existing_named(mapping_name: &str, lock_name: &str) -> Result<Self> {
        let path = mapping_path(mapping_name);
        let file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RelayError::MappingUnavailable {
                    name: mapping_name.to_string(),
                    source: Some(e),
                });
            }
            Err(e) => {
                return Err(RelayError::shared_memory(format!("open {}", path.display()), e))
            }
        };

        let len = file
            .metadata()
            .map_err(|e| RelayError::shared_memory("stat mapping", e))?
            .len() as usize;
        if len < RECORD_SIZE {
            // A short file means the producer is mid-create; treat it like
            // absence and let the caller retry.
            return Err(RelayError::mapping_unavailable(mapping_name));
        }

        let mmap = unsafe { MmapMut::map_mut(&file) }
            .map_err(|e| RelayError::shared_memory("map region", e))?;

        let lock = FrameLock::open(lock_name)?;
        debug!(path = %path.display(), "Opened shared telemetry mapping");

        Ok(Self { mmap, lock, path, owner: false })
    }

    /// Write one packed record at offset 0 under the cross-process lock.
    pub fn write_record(&mut self, bytes: &[u8; RECORD_SIZE]) -> Result<()> {
        let _guard = self.lock.acquire()?;
        self.mmap[..RECORD_SIZE].copy_from_slice(bytes);
        trace!(bytes = RECORD_SIZE, "Wrote record to shared mapping");
        Ok(())
    }

    /// Read one packed record from offset 0 under the cross-process lock.
    pub fn read_record(&self) -> Result<[u8; RECORD_SIZE]> {
        let _guard = self.lock.acquire()?;
        let mut out = [0u8; RECORD_SIZE];
        out.copy_from_slice(&self.mmap[..RECORD_SIZE]);
        Ok(out)
    }
}

impl Drop for SharedMemoryLink {
    fn drop(&mut self) {
        if self.owner {
            let _ = std::fs::remove_file(&self.path);
            debug!(path = %self.path.display(), "Removed shared telemetry mapping");
        }
    }
}

impl std::fmt::Debug for SharedMemoryLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMemoryLink")
            .field("path", &self.path)
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(unix)]
use unix_lock::FrameLock;
#[cfg(windows)]
use windows_lock::FrameLock;
#[cfg(not(any(unix, windows)))]
use fallback_lock::FrameLock;

#[cfg(unix)]
mod unix_lock {
    use std::fs::{File, OpenOptions};
    use std::os::unix::io::AsRawFd;

    use crate::{RelayError, Result};

    /// Advisory whole-file lock standing in for the named mutex.
    pub struct FrameLock {
        file: File,
    }

    impl FrameLock {
        pub fn create(name: &str) -> Result<Self> {
            Self::open(name)
        }

        pub fn open(name: &str) -> Result<Self> {
            let path = std::env::temp_dir().join(name);
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)
                .map_err(|e| {
                    RelayError::shared_memory(format!("open lock {}", path.display()), e)
                })?;
            Ok(Self { file })
        }

        pub fn acquire(&self) -> Result<FrameLockGuard<'_>> {
            let rc = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_EX) };
            if rc != 0 {
                return Err(RelayError::shared_memory(
                    "acquire frame lock",
                    std::io::Error::last_os_error(),
                ));
            }
            Ok(FrameLockGuard { lock: self })
        }
    }

    /// Holds the lock until dropped.
    pub struct FrameLockGuard<'a> {
        lock: &'a FrameLock,
    }

    impl Drop for FrameLockGuard<'_> {
        fn drop(&mut self) {
            unsafe {
                libc::flock(self.lock.file.as_raw_fd(), libc::LOCK_UN);
            }
        }
    }
}

#[cfg(windows)]
mod windows_lock {
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
    use windows::Win32::System::Threading::{
        CreateMutexW, OpenMutexW, ReleaseMutex, WaitForSingleObject, INFINITE,
        SYNCHRONIZATION_ACCESS_RIGHTS,
    };

    use crate::{RelayError, Result};

    /// Named kernel mutex guarding the shared window.
    pub struct FrameLock {
        handle: HANDLE,
    }

    impl FrameLock {
        pub fn create(name: &str) -> Result<Self> {
            let handle = unsafe {
                let wide = wide_string(name);
                CreateMutexW(None, false, PCWSTR::from_raw(wide.as_ptr()))
            }
            .map_err(|e| {
                RelayError::shared_memory("CreateMutexW", std::io::Error::other(e.message()))
            })?;
            Ok(Self { handle })
        }

        pub fn open(name: &str) -> Result<Self> {
            let handle = unsafe {
                let wide = wide_string(name);
                // SYNCHRONIZE | MUTEX_MODIFY_STATE
                OpenMutexW(
                    SYNCHRONIZATION_ACCESS_RIGHTS(0x0010_0001),
                    false,
                    PCWSTR::from_raw(wide.as_ptr()),
                )
            }
            .map_err(|e| {
                RelayError::shared_memory("OpenMutexW", std::io::Error::other(e.message()))
            })?;
            Ok(Self { handle })
        }

        pub fn acquire(&self) -> Result<FrameLockGuard<'_>> {
            let wait = unsafe { WaitForSingleObject(self.handle, INFINITE) };
            if wait != WAIT_OBJECT_0 {
                return Err(RelayError::shared_memory(
                    "WaitForSingleObject",
                    std::io::Error::other("mutex wait failed"),
                ));
            }
            Ok(FrameLockGuard { lock: self })
        }
    }

    impl Drop for FrameLock {
        fn drop(&mut self) {
            unsafe {
                let _ = CloseHandle(self.handle);
            }
        }
    }

    // SAFETY: the handle is a kernel object usable from any thread.
    unsafe impl Send for FrameLock {}
    unsafe impl Sync for FrameLock {}

    pub struct FrameLockGuard<'a> {
        lock: &'a FrameLock,
    }

    impl Drop for FrameLockGuard<'_> {
        fn drop(&mut self) {
            unsafe {
                let _ = ReleaseMutex(self.lock.handle);
            }
        }
    }

    fn wide_string(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }
}

#[cfg(not(any(unix, windows)))]
mod fallback_lock {
    use crate::{RelayError, Result};

    /// Stub for targets without a cross-process lock primitive; the UDP
    /// transport is the supported path there.
    pub struct FrameLock;

    impl FrameLock {
        pub fn create(_name: &str) -> Result<Self> {
            Err(RelayError::unsupported_platform("Shared-memory transport", "Unix or Windows"))
        }

        pub fn open(_name: &str) -> Result<Self> {
            Err(RelayError::unsupported_platform("Shared-memory transport", "Unix or Windows"))
        }

        pub fn acquire(&self) -> Result<FrameLockGuard<'_>> {
            Err(RelayError::unsupported_platform("Shared-memory transport", "Unix or Windows"))
        }
    }

    pub struct FrameLockGuard<'a> {
        _lock: &'a FrameLock,
    }
}
