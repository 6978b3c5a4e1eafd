// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Degrading file reader
//!
//! Source loading is dominated by UTF-8 reads of existing files, so the
//! reader first tries a fast primitive that skips error-object construction
//! and maps a missing file straight to `None`. The fast primitive cannot
//! handle every input shape (directories, non-UTF-8 content); the first time
//! it fails, the reader permanently degrades to the general read-and-decode
//! path for the remainder of the process.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::Mutex;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use crate::value::Value;

/// Requested decode mode for a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 text
    Utf8,
    /// Lowercase hex of the raw bytes
    Hex,
    /// Base64 of the raw bytes
    Base64,
}

/// Fast-path availability, one-way transition only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FastPathState {
    /// Fast primitive has not failed yet
    FastAvailable,
    /// Fast primitive failed once; never retried this process
    Degraded,
}

/// Raw filesystem read primitives provided by the embedding runtime
pub trait ReadPrimitives {
    /// One-shot UTF-8 read
    ///
    /// Returns `Ok(None)` when the file does not exist. Any other failure
    /// (directory target, invalid UTF-8, permission) is an error; callers
    /// treat one as a signal that this primitive cannot be trusted here.
    fn fast_read(&self, path: &Path) -> io::Result<Option<String>>;

    /// Fully general byte read
    fn slow_read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// `std::fs`-backed read primitives
#[derive(Debug, Default)]
pub struct NativeRead;

impl ReadPrimitives for NativeRead {
    fn fast_read(&self, path: &Path) -> io::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn slow_read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Two-tier file reader with permanent fallback on first fast-path failure
pub struct FileReader {
    primitives: Box<dyn ReadPrimitives>,
    state: Mutex<FastPathState>,
}

impl FileReader {
    /// Create a reader over the given primitives
    pub fn new(primitives: Box<dyn ReadPrimitives>) -> Self {
        Self {
            primitives,
            state: Mutex::new(FastPathState::FastAvailable),
        }
    }

    /// Read a file's content
    ///
    /// A non-string filename yields `None` ("not applicable", not an error).
    /// Read failures on the slow path also yield `None`; no error escapes.
    pub fn read(&self, filename: &Value, encoding: Option<Encoding>) -> Option<String> {
        let filename = filename.as_str()?;
        let path = Path::new(filename);

        if encoding == Some(Encoding::Utf8) && self.fast_path_enabled() {
            match self.primitives.fast_read(path) {
                Ok(content) => return content,
                Err(err) => {
                    warn!("fast-path read failed for {filename}, degrading: {err}");
                    *self.state.lock() = FastPathState::Degraded;
                }
            }
        }

        match self.primitives.slow_read(path) {
            Ok(bytes) => Some(decode(&bytes, encoding)),
            Err(err) => {
                debug!("read failed for {filename}: {err}");
                None
            }
        }
    }

    /// Whether the fast path is still available
    pub fn fast_path_enabled(&self) -> bool {
        *self.state.lock() == FastPathState::FastAvailable
    }
}

impl Default for FileReader {
    fn default() -> Self {
        Self::new(Box::new(NativeRead))
    }
}

fn decode(bytes: &[u8], encoding: Option<Encoding>) -> String {
    match encoding {
        Some(Encoding::Hex) => hex::encode(bytes),
        Some(Encoding::Base64) => BASE64.encode(bytes),
        // UTF-8 is the general decode; the slow path tolerates invalid
        // sequences instead of failing the read.
        Some(Encoding::Utf8) | None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;

    struct FlakyFast {
        fast_calls: Rc<Cell<u32>>,
        inner: NativeRead,
    }

    impl FlakyFast {
        fn new() -> (Self, Rc<Cell<u32>>) {
            let fast_calls = Rc::new(Cell::new(0));
            (
                Self {
                    fast_calls: fast_calls.clone(),
                    inner: NativeRead,
                },
                fast_calls,
            )
        }
    }

    impl ReadPrimitives for FlakyFast {
        fn fast_read(&self, _path: &Path) -> io::Result<Option<String>> {
            self.fast_calls.set(self.fast_calls.get() + 1);
            Err(io::Error::other("simulated fast-path failure"))
        }

        fn slow_read(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.inner.slow_read(path)
        }
    }

    #[test]
    fn test_non_string_filename_returns_none() {
        let reader = FileReader::default();
        assert!(reader.read(&Value::Number(42.0), Some(Encoding::Utf8)).is_none());
        assert!(reader.read(&Value::Null, None).is_none());
    }

    #[test]
    fn test_fast_path_reads_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mod.js");
        fs::write(&file, "export default 1\n").unwrap();

        let reader = FileReader::default();
        let content = reader
            .read(&Value::str(file.to_string_lossy()), Some(Encoding::Utf8))
            .unwrap();
        assert_eq!(content, "export default 1\n");
        assert!(reader.fast_path_enabled());
    }

    #[test]
    fn test_missing_file_is_none_not_degrade() {
        let reader = FileReader::default();
        assert!(reader
            .read(&Value::str("/no/such/file.js"), Some(Encoding::Utf8))
            .is_none());
        assert!(reader.fast_path_enabled());
    }

    #[test]
    fn test_degrade_is_one_way() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mod.js");
        fs::write(&file, "ok").unwrap();
        let filename = Value::str(file.to_string_lossy());

        let (primitives, _) = FlakyFast::new();
        let reader = FileReader::new(Box::new(primitives));

        // First read trips the degrade and falls through to the slow path.
        assert_eq!(reader.read(&filename, Some(Encoding::Utf8)).unwrap(), "ok");
        assert!(!reader.fast_path_enabled());

        // Subsequent reads never touch the fast primitive again.
        assert_eq!(reader.read(&filename, Some(Encoding::Utf8)).unwrap(), "ok");
        assert!(!reader.fast_path_enabled());
    }

    #[test]
    fn test_fast_primitive_called_once_after_degrade() {
        let (primitives, fast_calls) = FlakyFast::new();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mod.js");
        fs::write(&file, "ok").unwrap();
        let filename = Value::str(file.to_string_lossy());

        let reader = FileReader::new(Box::new(primitives));
        reader.read(&filename, Some(Encoding::Utf8));
        reader.read(&filename, Some(Encoding::Utf8));
        reader.read(&filename, Some(Encoding::Utf8));
        // The degrade happened on call one; the later calls went straight to
        // the slow path without re-probing.
        assert_eq!(fast_calls.get(), 1);
        assert!(!reader.fast_path_enabled());
    }

    #[test]
    fn test_non_utf8_encoding_skips_fast_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blob.bin");
        fs::write(&file, [0xde, 0xad]).unwrap();
        let filename = Value::str(file.to_string_lossy());

        let (primitives, fast_calls) = FlakyFast::new();
        let reader = FileReader::new(Box::new(primitives));
        assert_eq!(reader.read(&filename, Some(Encoding::Hex)).unwrap(), "dead");
        // Hex never touches the fast primitive, so no degrade occurred.
        assert_eq!(fast_calls.get(), 0);
        assert!(reader.fast_path_enabled());
    }

    #[test]
    fn test_base64_decode() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blob.bin");
        fs::write(&file, b"esm").unwrap();

        let reader = FileReader::default();
        assert_eq!(
            reader
                .read(&Value::str(file.to_string_lossy()), Some(Encoding::Base64))
                .unwrap(),
            "ZXNt"
        );
    }

    #[test]
    fn test_directory_degrades_then_slow_path_answers() {
        let dir = tempfile::tempdir().unwrap();
        let filename = Value::str(dir.path().to_string_lossy());

        let reader = FileReader::default();
        // Reading a directory fails on both tiers, but the fast tier's
        // failure must flip the flag permanently.
        assert!(reader.read(&filename, Some(Encoding::Utf8)).is_none());
        assert!(!reader.fast_path_enabled());
    }
}
