use std::fs::File;
use std::io;
use std::mem::size_of;
use std::path::Path;

use memmap2::MmapMut;

use crate::error::Result;

/// A zero-initialised block of f64 values that outlives process isolation.
///
/// The region is backed by an unlinked temporary file mapped `MAP_SHARED`.
/// A child created with `fork` inherits the same mapping, so whatever the
/// child writes is visible to the parent once the child has exited. Ordinary
/// heap memory would instead be copied-on-write and the parent would never
/// see the result.
///
/// On Linux the file is placed on tmpfs (`/dev/shm`) with its pages
/// reserved up front, so timed runs never wait on disk writeback. When tmpfs
/// is missing or too small the default temp dir is used, and dirty pages of
/// a disk-backed file may then be flushed while a benchmark runs.
pub struct SharedRegion {
    /// Shared read/write mapping of `file`.
    map: MmapMut,
    /// Number of f64 elements in the mapping.
    len: usize,
    /// Kept open for the lifetime of the mapping.
    _file: File,
}

impl SharedRegion {
    /// Map a new shared region holding `len` f64 values, all 0.0.
    ///
    /// # Errors
    /// Returns `SharedMap` if the byte size overflows or the backing file
    /// cannot be created, resized, or mapped.
    pub fn new(len: usize) -> Result<SharedRegion> {
        let bytes = len.checked_mul(size_of::<f64>()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::OutOfMemory,
                format!("{len} f64 elements overflow the address space"),
            )
        })?;

        let file = backing_file(TMPFS_DIRS, bytes as u64)?;
        let map = unsafe { MmapMut::map_mut(&file)? };

        Ok(SharedRegion {
            map,
            len,
            _file: file,
        })
    }

    /// Number of f64 elements in the region.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the region holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        // SAFETY: the mapping is page aligned and exactly `len * 8` bytes long,
        // and every bit pattern is a valid f64.
        unsafe { std::slice::from_raw_parts(self.map.as_ptr().cast::<f64>(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        // SAFETY: as in `as_slice`; `&mut self` guarantees exclusive access
        // within this address space.
        unsafe { std::slice::from_raw_parts_mut(self.map.as_mut_ptr().cast::<f64>(), self.len) }
    }
}

/// Memory-backed directories tried before the default temp dir.
#[cfg(target_os = "linux")]
const TMPFS_DIRS: &[&str] = &["/dev/shm"];
#[cfg(not(target_os = "linux"))]
const TMPFS_DIRS: &[&str] = &[];

/// Create an unlinked file of `bytes` zero bytes, preferring `dirs` in order.
///
/// A file in one of `dirs` must have all its blocks reserved; if that fails
/// the next candidate is tried. The last resort is a sparse file in the
/// default temp dir.
fn backing_file<P: AsRef<Path>>(dirs: &[P], bytes: u64) -> io::Result<File> {
    for dir in dirs {
        let Ok(file) = tempfile::tempfile_in(dir) else {
            continue;
        };
        if reserve(&file, bytes).is_ok() {
            return Ok(file);
        }
    }

    let file = tempfile::tempfile()?;
    // A freshly extended file reads back as zero bytes, i.e. 0.0f64.
    file.set_len(bytes)?;
    Ok(file)
}

/// Allocate every block of `file` up to `bytes`, failing with `ENOSPC`
/// rather than faulting later on first write.
#[cfg(target_os = "linux")]
fn reserve(file: &File, bytes: u64) -> io::Result<()> {
    use std::os::fd::AsRawFd;

    let len = libc::off_t::try_from(bytes)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "file size exceeds off_t"))?;
    match unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, len) } {
        0 => Ok(()),
        rc => Err(io::Error::from_raw_os_error(rc)),
    }
}

#[cfg(not(target_os = "linux"))]
fn reserve(_file: &File, _bytes: u64) -> io::Result<()> {
    Err(io::ErrorKind::Unsupported.into())
}

impl std::fmt::Debug for SharedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegion").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatrixError;

    #[test]
    fn test_new_is_zeroed() {
        let r = SharedRegion::new(16).unwrap();
        assert_eq!(r.len(), 16);
        assert!(!r.is_empty());
        assert!(r.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_write_read_back() {
        let mut r = SharedRegion::new(4).unwrap();
        r.as_mut_slice().copy_from_slice(&[1.5, -2.0, 3.25, 0.0]);
        assert_eq!(r.as_slice(), &[1.5, -2.0, 3.25, 0.0]);
    }

    #[test]
    fn test_aligned_for_f64() {
        let r = SharedRegion::new(3).unwrap();
        assert_eq!(r.as_slice().as_ptr() as usize % std::mem::align_of::<f64>(), 0);
    }

    #[test]
    fn test_byte_overflow() {
        assert!(matches!(
            SharedRegion::new(usize::MAX),
            Err(MatrixError::SharedMap(_))
        ));
    }

    #[test]
    fn test_backing_file_falls_back_to_temp_dir() {
        let file = backing_file(&["/nonexistent/matbench"], 4096).unwrap();
        assert_eq!(file.metadata().unwrap().len(), 4096);
    }

    #[test]
    fn test_backing_file_in_candidate_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = backing_file(&[dir.path()], 8 * 10).unwrap();
        assert_eq!(file.metadata().unwrap().len(), 80);
    }
}
