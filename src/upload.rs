//! Storage for files attached to a talk.
//!
//! An upload is planned first (name and public link, which go into the
//! document) and only written once the document has been generated.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use talkcal_core::Attachment;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Longest sanitized original name kept in the stored name.
const MAX_NAME_BYTES: usize = 200;

const FALLBACK_NAME: &str = "upload";

const PDF_MIME_TYPE: &str = "application/pdf";

pub struct UploadStore {
    dir: PathBuf,
    /// `<base_url>/uploads`
    public_base: String,
}

/// Where an upload will live once written.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpload {
    pub stored_name: String,
    pub url: String,
    pub format_type: Option<String>,
}

impl PendingUpload {
    pub fn attachment(&self) -> Attachment {
        let attachment = Attachment::new(self.url.clone());
        match self.format_type {
            Some(ref format_type) => attachment.with_format_type(format_type.clone()),
            None => attachment,
        }
    }
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: &str) -> Self {
        UploadStore {
            dir: dir.into(),
            public_base: format!("{}/uploads", base_url.trim_end_matches('/')),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", self.dir.display()))
    }

    /// Name an upload `<unix-millis>-<sanitized original name>`.
    pub fn plan(&self, file_name: Option<&str>, content_type: Option<&str>, now: DateTime<Utc>) -> PendingUpload {
        let name = sanitize_file_name(file_name.unwrap_or_default());
        let stored_name = format!("{}-{}", now.timestamp_millis(), name);

        PendingUpload {
            url: format!("{}/{}", self.public_base, stored_name),
            format_type: media_type(&name, content_type),
            stored_name,
        }
    }

    /// Write the bytes of a planned upload. Never replaces an existing file.
    pub async fn store(&self, pending: &PendingUpload, data: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(&pending.stored_name);

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_or_discard(file, &path, data).await?;

        Ok(path)
    }
}

/// Write all of `data`, removing `path` if the write does not complete.
async fn write_or_discard<W: AsyncWrite + Unpin>(mut file: W, path: &Path, data: &[u8]) -> Result<()> {
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;
    drop(file);

    if let Err(err) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            tracing::warn!(
                path = %path.display(),
                error = %remove_err,
                "Failed to remove partial upload"
            );
        }
        return Err(err).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

/// Reduce a client-supplied file name to something safe in a path and a URL.
///
/// Directory components are dropped; anything outside `[A-Za-z0-9._-]`
/// becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let mut clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Hidden files and "..": keep the name, lose the leading dots
    let trimmed = clean.trim_start_matches('.');
    if trimmed.len() != clean.len() {
        clean = trimmed.to_string();
    }

    if clean.len() > MAX_NAME_BYTES {
        // ASCII only at this point, so any index is a char boundary
        let keep_ext = clean
            .rfind('.')
            .filter(|dot| clean.len() - dot <= 16)
            .map(|dot| clean[dot..].to_string())
            .unwrap_or_default();
        clean.truncate(MAX_NAME_BYTES - keep_ext.len());
        clean.push_str(&keep_ext);
    }

    if clean.chars().all(|c| c == '_' || c == '.') {
        return FALLBACK_NAME.to_string();
    }
    clean
}

fn media_type(name: &str, content_type: Option<&str>) -> Option<String> {
    match content_type.map(str::trim) {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => Some(ct.to_string()),
        _ if name.to_ascii_lowercase().ends_with(".pdf") => Some(PDF_MIME_TYPE.to_string()),
        _ => None,
    }
}
