use flate2::read::DeflateDecoder;
use std::io::Read;
use std::sync::Arc;
use tracing::trace;

use crate::io::ReadAt;

use super::error::{Result, ZipError};
use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipEntry};

/// Read-only view of a ZIP archive with its member listing loaded
pub struct ZipReader<R: ReadAt> {
    parser: ZipParser<R>,
    entries: Vec<ZipEntry>,
}

impl<R: ReadAt> ZipReader<R> {
    /// Parse the Central Directory of `reader`.
    ///
    /// Fails if the data is not a well-formed ZIP container.
    pub async fn open(reader: Arc<R>) -> Result<Self> {
        let parser = ZipParser::new(reader);
        let entries = parser.list_entries().await?;
        trace!(entries = entries.len(), "read central directory");
        Ok(Self { parser, entries })
    }

    /// All members in Central Directory order
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// First file member, in Central Directory order, whose name ends with `suffix`
    pub fn find_by_suffix(&self, suffix: &str) -> Option<&ZipEntry> {
        self.entries
            .iter()
            .find(|e| !e.is_directory && e.name.ends_with(suffix))
    }

    /// Read and decompress a member into memory.
    ///
    /// The CRC-32 stored in the Central Directory is checked against the
    /// decompressed bytes.
    pub async fn read_entry(&self, entry: &ZipEntry) -> Result<Vec<u8>> {
        let data_offset = self.parser.get_data_offset(entry).await?;

        match data_offset.checked_add(entry.compressed_size) {
            Some(end) if end <= self.parser.size() => {}
            _ => return Err(ZipError::Truncated),
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_exact_at(data_offset, &mut raw)
            .await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => {
                // One byte past the declared size is enough to detect a size mismatch
                let limit = entry.uncompressed_size.saturating_add(1);
                let mut out = Vec::with_capacity(entry.uncompressed_size.min(1 << 24) as usize);
                DeflateDecoder::new(raw.as_slice())
                    .take(limit)
                    .read_to_end(&mut out)
                    .map_err(ZipError::Inflate)?;
                out
            }
            CompressionMethod::Unknown(method) => {
                return Err(ZipError::UnsupportedCompression(method));
            }
        };

        let mut crc = flate2::Crc::new();
        crc.update(&data);
        if data.len() as u64 != entry.uncompressed_size || crc.sum() != entry.crc32 {
            return Err(ZipError::ChecksumMismatch(entry.name.clone()));
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::structures::CDFH_SIGNATURE;
    use async_trait::async_trait;
    use std::io::{self, Cursor, Write};

    struct MemoryReader(Vec<u8>);

    #[async_trait]
    impl ReadAt for MemoryReader {
        async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
            let start = (offset as usize).min(self.0.len());
            let n = buf.len().min(self.0.len() - start);
            buf[..n].copy_from_slice(&self.0[start..start + n]);
            Ok(n)
        }

        fn size(&self) -> u64 {
            self.0.len() as u64
        }
    }

    fn stored_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ::zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = ::zip::write::SimpleFileOptions::default()
            .compression_method(::zip::CompressionMethod::Stored);
        for (name, data) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[tokio::test]
    async fn lists_members_in_central_directory_order() {
        let bytes = stored_zip(&[("b.txt", b"b"), ("a/METADATA", b"m"), ("c/METADATA", b"n")]);
        let archive = ZipReader::open(Arc::new(MemoryReader(bytes))).await.unwrap();

        let names: Vec<_> = archive.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b.txt", "a/METADATA", "c/METADATA"]);
        assert_eq!(archive.find_by_suffix("METADATA").unwrap().name, "a/METADATA");
        assert!(archive.find_by_suffix("setup.py").is_none());
    }

    #[tokio::test]
    async fn inflating_stops_after_declared_size() {
        let payload = vec![b'a'; 200_000];
        let mut writer = ::zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = ::zip::write::SimpleFileOptions::default()
            .compression_method(::zip::CompressionMethod::Deflated);
        writer.start_file("METADATA", options).unwrap();
        writer.write_all(&payload).unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        // Uncompressed size lives 24 bytes into the central directory header
        let cdfh = bytes
            .windows(4)
            .rposition(|w| w == CDFH_SIGNATURE)
            .unwrap();
        bytes[cdfh + 24..cdfh + 28].copy_from_slice(&10u32.to_le_bytes());

        let archive = ZipReader::open(Arc::new(MemoryReader(bytes))).await.unwrap();
        let entry = archive.entries()[0].clone();
        assert_eq!(entry.uncompressed_size, 10);
        assert!(matches!(
            archive.read_entry(&entry).await,
            Err(ZipError::ChecksumMismatch(name)) if name == "METADATA"
        ));
    }

    #[tokio::test]
    async fn detects_corrupted_member_data() {
        let mut bytes = stored_zip(&[("METADATA", b"Requires-Dist: click\n")]);
        let pos = bytes
            .windows(5)
            .position(|w| w == b"click")
            .unwrap();
        bytes[pos] = b'C';

        let archive = ZipReader::open(Arc::new(MemoryReader(bytes))).await.unwrap();
        let entry = archive.entries()[0].clone();
        assert!(matches!(
            archive.read_entry(&entry).await,
            Err(ZipError::ChecksumMismatch(name)) if name == "METADATA"
        ));
    }
}
