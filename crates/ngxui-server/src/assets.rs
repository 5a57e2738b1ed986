// ABOUTME: Read-only asset tree holding the compiled frontend, embedded or from an on-disk directory.
// ABOUTME: Answers "does this path name a file?" as a plain boolean and opens fresh handles for serving.

use std::io;
use std::path::{Path, PathBuf};

use axum::body::{Body, Bytes};
use include_dir::{Dir, include_dir};
use thiserror::Error;
use tokio::io::BufReader;
use tokio_util::io::ReaderStream;

/// The frontend bundle compiled into the binary. The served tree is its `dist` subdirectory.
static BUNDLE: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/frontend");

/// Subdirectory of the bundle that forms the asset tree root.
pub const BUNDLE_ROOT: &str = "dist";

/// The application shell served for client-side routes.
pub const SHELL: &str = "index.html";

/// Errors raised while building an asset tree at startup.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("embedded bundle has no {0} directory")]
    MissingBundleRoot(&'static str),

    #[error("asset directory {0} does not exist")]
    MissingDirectory(PathBuf),
}

/// An immutable mapping from relative path to file content.
#[derive(Debug, Clone)]
pub enum AssetTree {
    Embedded(&'static Dir<'static>),
    Directory(PathBuf),
}

impl AssetTree {
    /// The tree compiled into the binary.
    pub fn embedded() -> Result<Self, AssetError> {
        BUNDLE
            .get_dir(BUNDLE_ROOT)
            .map(AssetTree::Embedded)
            .ok_or(AssetError::MissingBundleRoot(BUNDLE_ROOT))
    }

    /// A tree served from a directory on disk.
    pub fn from_dir(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AssetError::MissingDirectory(root));
        }
        Ok(AssetTree::Directory(root))
    }

    /// Whether `path` (joined onto `prefix`) names a file in the tree.
    ///
    /// Any failure is "does not exist"; the check holds no handle.
    pub async fn exists(&self, prefix: &str, path: &str) -> bool {
        let joined = format!("{}/{}", prefix.trim_end_matches('/'), path);
        self.locate(&joined).await.is_some()
    }

    /// Open a fresh handle on the file at `path`.
    pub async fn open(&self, path: &str) -> io::Result<Asset> {
        let rel = self
            .locate(path)
            .await
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "asset not found"))?;

        match self {
            AssetTree::Embedded(dir) => {
                let file = dir
                    .get_file(dir.path().join(&rel))
                    .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "asset not found"))?;
                Ok(Asset {
                    len: file.contents().len() as u64,
                    content: AssetContent::Static(file.contents()),
                    path: rel,
                })
            }
            AssetTree::Directory(root) => {
                let file = tokio::fs::File::open(root.join(&rel)).await?;
                let len = file.metadata().await?.len();
                Ok(Asset {
                    len,
                    content: AssetContent::File(file),
                    path: rel,
                })
            }
        }
    }

    /// Resolve a request path to the relative path of an existing file.
    async fn locate(&self, path: &str) -> Option<String> {
        let rel = normalize(path)?;
        if self.is_file(&rel).await {
            return Some(rel);
        }
        if rel.is_empty() || self.is_dir(&rel).await {
            let index = if rel.is_empty() {
                SHELL.to_string()
            } else {
                format!("{}/{}", rel, SHELL)
            };
            if self.is_file(&index).await {
                return Some(index);
            }
        }
        None
    }

    async fn is_file(&self, rel: &str) -> bool {
        if rel.is_empty() {
            return false;
        }
        match self {
            AssetTree::Embedded(dir) => dir.get_file(dir.path().join(rel)).is_some(),
            AssetTree::Directory(root) => tokio::fs::metadata(root.join(rel))
                .await
                .is_ok_and(|m| m.is_file()),
        }
    }

    async fn is_dir(&self, rel: &str) -> bool {
        match self {
            AssetTree::Embedded(dir) => dir.get_dir(dir.path().join(rel)).is_some(),
            AssetTree::Directory(root) => tokio::fs::metadata(root.join(rel))
                .await
                .is_ok_and(|m| m.is_dir()),
        }
    }
}

/// Percent-decode a request path and split it into clean segments.
///
/// `None` when it tries to leave the tree or does not decode to UTF-8. Checks
/// run after decoding, so `%2e%2e` is as rejected as `..`.
fn normalize(path: &str) -> Option<String> {
    let decoded = urlencoding::decode(path).ok()?;
    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => segments.push(s.to_string()),
        }
    }
    Some(segments.join("/"))
}

enum AssetContent {
    Static(&'static [u8]),
    File(tokio::fs::File),
}

/// An opened asset ready to be streamed.
pub struct Asset {
    path: String,
    len: u64,
    content: AssetContent,
}

impl Asset {
    /// Byte length of the file.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Relative path inside the tree.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Guessed MIME type from the file extension.
    pub fn content_type(&self) -> String {
        mime_guess::from_path(Path::new(&self.path))
            .first_or_octet_stream()
            .to_string()
    }

    /// Turn the asset into a response body. Files on disk are streamed through a buffered reader.
    pub fn into_body(self) -> Body {
        match self.content {
            AssetContent::Static(bytes) => Body::from(Bytes::from_static(bytes)),
            AssetContent::File(file) => Body::from_stream(ReaderStream::new(BufReader::new(file))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn disk_tree() -> (TempDir, AssetTree) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<!DOCTYPE html><title>shell</title>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        std::fs::write(dir.path().join("my file.js"), "spaced").unwrap();
        std::fs::write(dir.path().join("empty.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs").join("index.html"), "docs").unwrap();
        std::fs::create_dir(dir.path().join("img")).unwrap();
        let tree = AssetTree::from_dir(dir.path()).unwrap();
        (dir, tree)
    }

    async fn read_all(asset: Asset) -> Vec<u8> {
        axum::body::to_bytes(asset.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn normalize_drops_empty_and_dot_segments() {
        assert_eq!(normalize("/a//./b/").as_deref(), Some("a/b"));
        assert_eq!(normalize("/").as_deref(), Some(""));
    }

    #[test]
    fn normalize_decodes_percent_escapes() {
        assert_eq!(normalize("/my%20file.js").as_deref(), Some("my file.js"));
        assert_eq!(normalize("/assets%2Fapp.css").as_deref(), Some("assets/app.css"));
        assert!(normalize("/%FF.js").is_none(), "not UTF-8 once decoded");
    }

    #[test]
    fn normalize_rejects_encoded_traversal() {
        assert!(normalize("/%2e%2e/etc/passwd").is_none());
        assert!(normalize("/a/%2E%2E/%2e%2e/b").is_none());
        assert!(normalize("/..%2Foutside.txt").is_none());
        assert!(normalize("/a%5C..%5Cb").is_none());
        assert!(normalize("/app.js%00").is_none());
    }

    #[test]
    fn normalize_rejects_parent_segments() {
        assert!(normalize("/../etc/passwd").is_none());
        assert!(normalize("/a/../../b").is_none());
        assert!(normalize("/a\\..\\b").is_none());
    }

    #[tokio::test]
    async fn exists_reports_files_only() {
        let (_dir, tree) = disk_tree();

        assert!(tree.exists("/", "/app.js").await);
        assert!(tree.exists("/", "app.js").await);
        assert!(!tree.exists("/", "/missing.js").await);
        assert!(!tree.exists("/", "/dashboard/settings").await);
    }

    #[tokio::test]
    async fn encoded_names_resolve_to_decoded_files() {
        let (_dir, tree) = disk_tree();

        assert!(tree.exists("/", "/my%20file.js").await);
        let asset = tree.open("/my%20file.js").await.unwrap();
        assert_eq!(asset.path(), "my file.js");
        assert_eq!(read_all(asset).await, b"spaced");
    }

    #[tokio::test]
    async fn empty_file_exists() {
        let (_dir, tree) = disk_tree();
        assert!(tree.exists("/", "/empty.txt").await);
    }

    #[tokio::test]
    async fn directories_resolve_to_their_index() {
        let (_dir, tree) = disk_tree();

        assert!(tree.exists("/", "/").await);
        assert!(tree.exists("/", "/docs/").await);
        assert!(!tree.exists("/", "/img").await, "directory without index is not a file");
    }

    #[tokio::test]
    async fn traversal_never_escapes_root() {
        let (dir, tree) = disk_tree();
        let outside = dir.path().parent().unwrap().join("outside.txt");
        let _ = std::fs::write(&outside, "secret");

        assert!(!tree.exists("/", "/../outside.txt").await);
        assert!(!tree.exists("/", "/%2e%2e/outside.txt").await);
        let _ = std::fs::remove_file(outside);
    }

    #[tokio::test]
    async fn open_reports_length_and_content() {
        let (_dir, tree) = disk_tree();

        let asset = tree.open("/app.js").await.unwrap();
        assert_eq!(asset.len(), 14);
        assert_eq!(asset.path(), "app.js");
        assert!(asset.content_type().contains("javascript"));
        assert_eq!(read_all(asset).await, b"console.log(1)");
    }

    #[tokio::test]
    async fn open_empty_file_is_not_a_failure() {
        let (_dir, tree) = disk_tree();

        let asset = tree.open("empty.txt").await.unwrap();
        assert!(asset.is_empty());
        assert!(read_all(asset).await.is_empty());
    }

    #[tokio::test]
    async fn open_missing_file_is_not_found() {
        let (_dir, tree) = disk_tree();
        let err = tree.open("/nope.css").await.err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn from_dir_rejects_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = AssetTree::from_dir(dir.path().join("absent"));
        assert!(matches!(result, Err(AssetError::MissingDirectory(_))));
    }

    #[tokio::test]
    async fn embedded_bundle_contains_shell() {
        let tree = AssetTree::embedded().unwrap();

        assert!(tree.exists("/", SHELL).await);
        assert!(tree.exists("/", "/app.js").await);
        assert!(tree.exists("/", "/assets/app.css").await);
        assert!(!tree.exists("/", "/dashboard").await);

        let shell = tree.open(SHELL).await.unwrap();
        let len = shell.len();
        let bytes = read_all(shell).await;
        assert_eq!(bytes.len() as u64, len);
        assert!(String::from_utf8(bytes).unwrap().contains("<!DOCTYPE html>"));
    }
}
