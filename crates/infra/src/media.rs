//! Blob storage for product images and documents.
//!
//! Blobs are addressed by a relative name such as `products/phone.png`; the
//! public locator is `media_url + name`.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `content` under `upload_to` (a directory prefix ending in `/`).
    ///
    /// Returns the name actually used; an existing name is never overwritten.
    async fn save(&self, upload_to: &str, filename: &str, content: &[u8]) -> io::Result<String>;

    async fn open(&self, name: &str) -> io::Result<Vec<u8>>;

    async fn exists(&self, name: &str) -> io::Result<bool>;

    /// Public locator (relative URL) of a stored name.
    fn url(&self, name: &str) -> String;
}

/// Local directory storage.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
    base_url: String,
}

impl FileSystemStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let safe = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid media name {name:?}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for FileSystemStorage {
    async fn save(&self, upload_to: &str, filename: &str, content: &[u8]) -> io::Result<String> {
        let filename = sanitize_filename(filename);
        let mut name = format!("{upload_to}{filename}");

        loop {
            let path = self.resolve(&name)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(content).await?;
                    file.flush().await?;
                    tracing::debug!(%name, bytes = content.len(), "media stored");
                    return Ok(name);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    name = format!("{upload_to}{}", with_suffix(&filename));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn open(&self, name: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.resolve(name)?).await
    }

    async fn exists(&self, name: &str) -> io::Result<bool> {
        tokio::fs::try_exists(self.resolve(name)?).await
    }

    fn url(&self, name: &str) -> String {
        format!("{}{}", self.base_url, name)
    }
}

/// Keep the last path segment and replace anything outside `[A-Za-z0-9._-]`.
fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `phone.png` -> `phone_1a2b3c4.png`
fn with_suffix(filename: &str) -> String {
    let random = Uuid::now_v7().simple().to_string();
    let suffix = &random[random.len() - 7..];
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{filename}_{suffix}"),
    }
}

/// MIME type of a supported raster image, judged by its leading bytes.
pub fn sniff_image(content: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
    ];
    if content.len() >= 12 && &content[..4] == b"RIFF" && &content[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    SIGNATURES
        .iter()
        .find(|(magic, _)| content.starts_with(magic))
        .map(|(_, mime)| *mime)
}

/// Content type for serving a stored blob, by extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain; charset=utf-8",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
