//! Uploaded fixture files, kept in memory or spooled to disk.
//!
//! Small uploads stay in memory. Once an upload grows past the configured
//! threshold, what was buffered so far and every later chunk go to a
//! temporary file, which is parsed back with a buffered reader on a blocking
//! thread. Both paths produce the same records.

use std::io::BufReader;
use std::path::Path;

use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use smuggler_core::fixture::{self, FixtureError, FixtureRecord};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// Failure while receiving a multipart submission.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The request body could not be read, e.g. it exceeded the body limit.
    #[error("{}", describe_multipart(.0))]
    Multipart(#[from] MultipartError),

    #[error("Failed to spool upload: {0}")]
    Spool(#[from] std::io::Error),
}

/// One file received by the load form.
#[derive(Debug)]
pub enum UploadedFile {
    Memory { name: String, data: Bytes },
    Temporary { name: String, file: NamedTempFile, size: u64 },
}

impl UploadedFile {
    /// An in-memory upload.
    pub fn in_memory(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::Memory {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a multipart field, spooling to disk past `max_memory_size` bytes.
    pub async fn receive(
        name: String,
        mut field: Field<'_>,
        max_memory_size: usize,
    ) -> Result<Self, UploadError> {
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = next_chunk(&mut field).await? {
            if buffer.len() + chunk.len() > max_memory_size {
                return spool(name, buffer, chunk, field).await;
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(Self::in_memory(name, buffer))
    }

    /// Base filename supplied by the client.
    pub fn name(&self) -> &str {
        match self {
            Self::Memory { name, .. } | Self::Temporary { name, .. } => name,
        }
    }

    pub fn len(&self) -> u64 {
        match self {
            Self::Memory { data, .. } => data.len() as u64,
            Self::Temporary { size, .. } => *size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_spooled(&self) -> bool {
        matches!(self, Self::Temporary { .. })
    }

    /// Parse the upload as a fixture.
    pub async fn parse(&self) -> Result<Vec<FixtureRecord>, FixtureError> {
        match self {
            Self::Memory { data, .. } => fixture::parse_slice(data),
            Self::Temporary { file, .. } => parse_file(file.path()).await,
        }
    }

    /// Write the exact uploaded bytes to `dest`.
    pub async fn save_to(&self, dest: &Path) -> std::io::Result<()> {
        match self {
            Self::Memory { data, .. } => tokio::fs::write(dest, data).await,
            Self::Temporary { file, .. } => tokio::fs::copy(file.path(), dest).await.map(|_| ()),
        }
    }
}

/// Parse a fixture file on a blocking thread.
pub async fn parse_file(path: &Path) -> Result<Vec<FixtureRecord>, FixtureError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        fixture::parse_reader(BufReader::new(file))
    })
    .await
    .map_err(|e| FixtureError::Io(std::io::Error::other(e)))?
}

/// `MultipartError`'s status and text, so a 413 stays visible in messages.
fn describe_multipart(err: &MultipartError) -> String {
    format!("Upload rejected ({}): {}", err.status(), err.body_text())
}

async fn next_chunk(field: &mut Field<'_>) -> Result<Option<Bytes>, UploadError> {
    Ok(field.chunk().await?)
}

async fn spool(
    name: String,
    buffered: Vec<u8>,
    chunk: Bytes,
    mut field: Field<'_>,
) -> Result<UploadedFile, UploadError> {
    let temp = NamedTempFile::new()?;
    let mut out = tokio::fs::File::from_std(temp.reopen()?);

    out.write_all(&buffered).await?;
    out.write_all(&chunk).await?;
    let mut size = (buffered.len() + chunk.len()) as u64;

    while let Some(chunk) = next_chunk(&mut field).await? {
        out.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    out.flush().await?;

    tracing::debug!(file = %name, size, "Spooled upload to a temporary file");
    Ok(UploadedFile::Temporary {
        name,
        file: temp,
        size,
    })
}
