//! Fixed-size chunker for splitting data into indexed chunks.

use std::io::Read;
use std::path::Path;

use cairn_types::Chunk;
use tokio::io::AsyncRead;
use tracing::debug;

use crate::error::CasError;

/// Fixed-size chunker that splits data into chunks of a configured size.
///
/// The last chunk may be smaller than `chunk_size`.
/// Empty data produces zero chunks.
/// Chunks come out undigested; hashing is a separate step
/// (see [`hash_all`](crate::hash_all)).
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: u32,
}

impl Chunker {
    /// Create a new chunker with the given chunk size in bytes.
    pub fn new(chunk_size: u32) -> Result<Self, CasError> {
        if chunk_size == 0 {
            return Err(CasError::InvalidChunkSize(chunk_size));
        }
        Ok(Self { chunk_size })
    }

    /// The configured chunk boundary.
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Split an in-memory buffer into fixed-size chunks.
    pub fn split(&self, data: &[u8]) -> Vec<Chunk> {
        data.chunks(self.chunk_size as usize)
            .enumerate()
            .map(|(i, slice)| Chunk::new(i as u64, slice.to_vec()))
            .collect()
    }

    /// Split a blocking reader into fixed-size chunks.
    ///
    /// Short reads are retried until a window is full or the reader hits EOF,
    /// so chunk boundaries never depend on how the reader delivers bytes.
    pub fn split_reader(&self, mut reader: impl Read) -> Result<Vec<Chunk>, CasError> {
        let chunk_size = self.chunk_size as usize;
        let mut chunks = Vec::new();

        loop {
            let mut buf = vec![0u8; chunk_size];
            let mut filled = 0;

            while filled < chunk_size {
                let n = match reader.read(&mut buf[filled..]) {
                    Ok(n) => n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                };
                if n == 0 {
                    break;
                }
                filled += n;
            }

            if filled == 0 {
                break;
            }

            buf.truncate(filled);
            if filled < chunk_size {
                buf.shrink_to_fit();
            }
            chunks.push(Chunk::new(chunks.len() as u64, buf));

            if filled < chunk_size {
                break;
            }
        }

        Ok(chunks)
    }

    /// Split data from an async reader into fixed-size chunks.
    ///
    /// Reads the entire stream, producing chunks as it goes.
    pub async fn split_stream(
        &self,
        mut reader: impl AsyncRead + Unpin,
    ) -> Result<Vec<Chunk>, CasError> {
        use tokio::io::AsyncReadExt;

        let chunk_size = self.chunk_size as usize;
        let mut chunks = Vec::new();

        loop {
            let mut buf = vec![0u8; chunk_size];
            let mut filled = 0;

            // Read exactly chunk_size bytes, or until EOF.
            while filled < chunk_size {
                let n = reader.read(&mut buf[filled..]).await?;
                if n == 0 {
                    break;
                }
                filled += n;
            }

            if filled == 0 {
                break;
            }

            buf.truncate(filled);
            if filled < chunk_size {
                buf.shrink_to_fit();
            }
            chunks.push(Chunk::new(chunks.len() as u64, buf));

            if filled < chunk_size {
                break;
            }
        }

        Ok(chunks)
    }

    /// Open `path` and split its contents.
    ///
    /// An unreadable file is reported as [`CasError::File`]; a readable empty
    /// file yields `Ok` with no chunks.
    pub fn split_file(&self, path: impl AsRef<Path>) -> Result<Vec<Chunk>, CasError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| CasError::file(path, e))?;
        let chunks = self
            .split_reader(std::io::BufReader::new(file))
            .map_err(|e| match e {
                CasError::Io(source) => CasError::file(path, source),
                other => other,
            })?;
        debug!(
            path = %path.display(),
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            "split file"
        );
        Ok(chunks)
    }
}
