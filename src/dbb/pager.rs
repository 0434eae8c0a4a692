//! Fixed-stride record paging over a DBB file.
//!
//! Every slot in a DBB file is `8 + max_size` bytes, where `max_size` is the
//! largest payload the file was created for. The client encodes `max_size`
//! as the trailing number of the file name (`chatmsg256.dbb`,
//! `user4096.dbb`), so the stride can usually be inferred.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::record::{FieldMap, decode_record};
use crate::error::{DbbError, Result};

/// Bytes of slot overhead on top of the maximum payload size.
pub const SLOT_OVERHEAD: u64 = 8;

/// Extracts the maximum payload size encoded in a DBB file name.
///
/// Scans the file name from the right for the last run of decimal digits.
///
/// # Example
///
/// ```rust
/// use dbbdump::dbb::pager::max_size_from_file_name;
/// use std::path::Path;
///
/// assert_eq!(max_size_from_file_name(Path::new("/home/u/.Skype/me/chatmsg256.dbb")), Some(256));
/// assert_eq!(max_size_from_file_name(Path::new("chatmsg.dbb")), None);
/// ```
pub fn max_size_from_file_name(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?.as_bytes();
    let end = name.iter().rposition(u8::is_ascii_digit)? + 1;
    let start = name[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    std::str::from_utf8(&name[start..end]).ok()?.parse().ok()
}

/// Random and sequential access to the raw slots of one DBB file.
///
/// The file handle is owned by the pager and released when it is dropped.
///
/// # Example
///
/// ```rust,no_run
/// use dbbdump::dbb::RecordPager;
///
/// let pager = RecordPager::open("chatmsg256.dbb")?;
/// println!("{} slots of {} bytes", pager.record_count(), pager.stride());
///
/// for fields in pager.records() {
///     let fields = fields?;
///     println!("record {:?}", fields.get(&-1));
/// }
/// # Ok::<(), dbbdump::DbbError>(())
/// ```
#[derive(Debug)]
pub struct RecordPager {
    path: PathBuf,
    file: File,
    stride: u64,
    file_len: u64,
}

impl RecordPager {
    /// Opens `path`, inferring the stride from its file name.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_max_size(path, None)
    }

    /// Opens `path` with an explicit maximum payload size.
    ///
    /// `None` infers the size from the file name.
    pub fn open_with_max_size(path: impl AsRef<Path>, max_size: Option<u64>) -> Result<Self> {
        let path = path.as_ref();
        let max_size = match max_size {
            Some(size) => size,
            None => max_size_from_file_name(path).ok_or_else(|| {
                DbbError::config(path, "no trailing digits in file name to infer record size")
            })?,
        };
        let stride = max_size
            .checked_add(SLOT_OVERHEAD)
            .ok_or_else(|| DbbError::config(path, format!("record size {max_size} is too large")))?;

        let file = File::open(path).map_err(|e| DbbError::open(path, e))?;
        let file_len = file.metadata().map_err(|e| DbbError::open(path, e))?.len();
        debug!(path = %path.display(), stride, file_len, "opened dbb file");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            stride,
            file_len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes per record slot.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Number of slots, counting a short trailing slot.
    pub fn record_count(&self) -> u64 {
        self.file_len.div_ceil(self.stride)
    }

    /// Reads the raw slot at `index`.
    pub fn read_at(&self, index: u64) -> Result<Vec<u8>> {
        let count = self.record_count();
        if index >= count {
            return Err(DbbError::OutOfRange {
                path: self.path.clone(),
                index,
                count,
            });
        }
        let available = self.available_at(index);
        if available < self.stride {
            return Err(self.truncated(index, available));
        }
        self.read_slot(index)?.ok_or_else(|| self.truncated(index, 0))
    }

    /// Reads and decodes the slot at `index`.
    pub fn decode_at(&self, index: u64) -> Result<FieldMap> {
        let chunk = self.read_at(index)?;
        decode_record(&chunk).map_err(|kind| DbbError::decode(&self.path, index, kind))
    }

    /// Iterates over raw slots from the start of the file.
    ///
    /// Each call starts a fresh pass.
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks {
            pager: self,
            index: 0,
            finished: false,
        }
    }

    /// Iterates over decoded slots from the start of the file.
    ///
    /// Stops after the first error.
    pub fn records(&self) -> Records<'_> {
        Records {
            chunks: self.chunks(),
        }
    }

    /// Bytes of slot `index` present in the file, at most one stride.
    fn available_at(&self, index: u64) -> u64 {
        self.file_len
            .saturating_sub(index.saturating_mul(self.stride))
            .min(self.stride)
    }

    /// Reads one full slot; only called once the file is known to hold it.
    ///
    /// `None` means the file ended exactly at the slot boundary.
    fn read_slot(&self, index: u64) -> Result<Option<Vec<u8>>> {
        let read_err = |e| DbbError::read(&self.path, index, e);
        let len = usize::try_from(self.stride).map_err(|_| {
            DbbError::config(&self.path, format!("record size {} is too large", self.stride))
        })?;
        let mut file = &self.file;
        file.seek(SeekFrom::Start(index.saturating_mul(self.stride)))
            .map_err(read_err)?;
        let mut buf = vec![0u8; len];
        match read_full(&mut file, &mut buf).map_err(read_err)? {
            0 => Ok(None),
            n if n < len => Err(self.truncated(index, n as u64)),
            _ => Ok(Some(buf)),
        }
    }

    fn truncated(&self, index: u64, actual: u64) -> DbbError {
        DbbError::TruncatedRecord {
            path: self.path.clone(),
            index,
            expected: self.stride,
            actual,
        }
    }
}

/// Reads until `buf` is full or the reader is exhausted.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Iterator over the raw slots of a [`RecordPager`].
///
/// Yields `(index, slot)` pairs. Ends cleanly at end of file; a short
/// trailing slot yields one [`DbbError::TruncatedRecord`] and then ends.
pub struct Chunks<'a> {
    pager: &'a RecordPager,
    index: u64,
    finished: bool,
}

impl Chunks<'_> {
    fn read_next(&mut self) -> Result<Option<Vec<u8>>> {
        match self.pager.available_at(self.index) {
            0 => Ok(None),
            n if n < self.pager.stride => Err(self.pager.truncated(self.index, n)),
            _ => self.pager.read_slot(self.index),
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Result<(u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_next() {
            Ok(Some(chunk)) => {
                let index = self.index;
                self.index += 1;
                Some(Ok((index, chunk)))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Iterator over the decoded slots of a [`RecordPager`].
pub struct Records<'a> {
    chunks: Chunks<'a>,
}

impl Iterator for Records<'_> {
    type Item = Result<FieldMap>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, chunk) = match self.chunks.next()? {
            Ok(item) => item,
            Err(e) => return Some(Err(e)),
        };
        let decoded = decode_record(&chunk)
            .map_err(|kind| DbbError::decode(&self.chunks.pager.path, index, kind));
        if decoded.is_err() {
            self.chunks.finished = true;
        }
        Some(decoded)
    }
}
