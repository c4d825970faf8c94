//! Attachment blob store: PDFs written under a single upload directory.
//!
//! The stored filename is the opaque reference saved in `pdfFile`.

use std::{io, path::PathBuf};

use chrono::Utc;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const FALLBACK_NAME: &str = "attachment.pdf";

#[derive(Debug, Clone)]
pub struct UploadDir {
  root: PathBuf,
}

impl UploadDir {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Write `data` and return its reference, `{unix-millis}-{basename}`.
  pub async fn store(&self, original_name: &str, data: &[u8]) -> io::Result<String> {
    tokio::fs::create_dir_all(&self.root).await?;
    let name = format!("{}-{}", Utc::now().timestamp_millis(), basename(original_name));
    tokio::fs::write(self.root.join(&name), data).await?;
    Ok(name)
  }

  /// Remove a stored file whose complaint was never recorded.
  pub async fn discard(&self, name: &str) {
    if let Err(e) = tokio::fs::remove_file(self.root.join(name)).await {
      tracing::warn!(file = %name, error = %e, "failed to remove orphaned upload");
    }
  }
}

/// Last path component of a client-supplied filename, with either separator.
fn basename(name: &str) -> &str {
  match name.rsplit(['/', '\\']).next() {
    Some(base) if !base.is_empty() && base != "." && base != ".." => base,
    _ => FALLBACK_NAME,
  }
}
