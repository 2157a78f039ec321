use std::io::{self, Read};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset stream: {0}")]
    Io(#[from] io::Error),
    #[error("asset stream truncated: expected {expected_bytes} bytes, got {actual_bytes}")]
    Truncated {
        expected_bytes: usize,
        actual_bytes: usize,
    },
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, AssetError> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(AssetError::Io(error)),
        }
    }
    Ok(filled)
}

pub(crate) fn read_exact_or_truncated<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), AssetError> {
    let filled = read_full(reader, buf)?;
    if filled < buf.len() {
        return Err(AssetError::Truncated {
            expected_bytes: buf.len(),
            actual_bytes: filled,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ChunkedReader {
        data: Vec<u8>,
        cursor: usize,
        chunk: usize,
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let remaining = self.data.len() - self.cursor;
            let count = remaining.min(self.chunk).min(buf.len());
            buf[..count].copy_from_slice(&self.data[self.cursor..self.cursor + count]);
            self.cursor += count;
            Ok(count)
        }
    }

    #[test]
    fn read_full_collects_short_reads() {
        let mut reader = ChunkedReader {
            data: vec![1, 2, 3, 4, 5],
            cursor: 0,
            chunk: 2,
        };
        let mut buf = [0u8; 5];
        let filled = read_full(&mut reader, &mut buf).expect("read");
        assert_eq!(filled, 5);
        assert_eq!(buf, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn read_exact_reports_truncation_counts() {
        let mut reader: &[u8] = &[9, 9, 9];
        let mut buf = [0u8; 8];
        let error = read_exact_or_truncated(&mut reader, &mut buf).expect_err("truncated");
        assert!(matches!(
            error,
            AssetError::Truncated {
                expected_bytes: 8,
                actual_bytes: 3
            }
        ));
    }
}
