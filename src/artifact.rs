//! Transient artifact files: path reservation and cleanup
//!
//! Every request reserves one [`ArtifactSlot`] in the shared working directory
//! before the fetch starts. The slot name combines a timestamp, the request id
//! and a random token, so concurrent requests never collide even within the same
//! second. Cleanup removes every file in the working directory that shares the
//! slot's stem, which covers the side files yt-dlp leaves next to the output
//! (`.part`, `.part-Frag<N>`, `.ytdl`, `.temp.mp4`), whether or not the fetch
//! succeeded.

use crate::error::Result;
use crate::types::RequestId;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A reserved output path owned by exactly one request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactSlot {
    path: PathBuf,
}

impl ArtifactSlot {
    /// Reserve a unique path for `id` inside `working_dir`
    ///
    /// Nothing is created on disk.
    pub fn allocate(working_dir: &Path, id: RequestId) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let token: u32 = rand::thread_rng().r#gen();
        let filename = format!("tiktok_{}_{}_{:08x}.mp4", timestamp, id.get(), token);
        Self {
            path: working_dir.join(filename),
        }
    }

    /// The reserved output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a file named `name` in the working directory belongs to this slot
    ///
    /// yt-dlp derives every temporary name from the output path, either by
    /// appending to it or by replacing the extension, so all of them start
    /// with `<stem>.`.
    fn owns(&self, name: &str) -> bool {
        let Some(stem) = self.path.file_stem().and_then(|s| s.to_str()) else {
            return false;
        };
        name.strip_prefix(stem)
            .is_some_and(|rest| rest.starts_with('.'))
    }

    /// Files currently on disk that belong to this slot
    async fn owned_files(&self, id: RequestId) -> Vec<PathBuf> {
        let Some(dir) = self.path.parent() else {
            return vec![self.path.clone()];
        };
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(request_id = %id, ?dir, error = %e, "cannot scan working directory");
                return vec![self.path.clone()];
            }
        };

        let mut owned = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if self.owns(&entry.file_name().to_string_lossy()) {
                        owned.push(entry.path());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(request_id = %id, ?dir, error = %e, "working directory scan aborted");
                    if !owned.contains(&self.path) {
                        owned.push(self.path.clone());
                    }
                    break;
                }
            }
        }
        owned
    }

    /// Remove the artifact and its side files
    ///
    /// Idempotent: files that vanish before removal are skipped. Failures are
    /// logged and counted, never returned, so cleanup always runs to completion.
    ///
    /// Returns how many files were removed.
    pub async fn cleanup(&self, id: RequestId) -> usize {
        let mut removed = 0;
        for path in self.owned_files(id).await {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(request_id = %id, ?path, "removed artifact file");
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(request_id = %id, ?path, error = %e, "failed to remove artifact file");
                }
            }
        }
        removed
    }

    /// Whether any file belonging to this slot is still on disk
    #[cfg(test)]
    pub(crate) async fn exists(&self) -> bool {
        !self.owned_files(RequestId(0)).await.is_empty()
    }
}

/// A fetched video on disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Location of the file (always the reserved slot path)
    pub path: PathBuf,
    /// Size reported when the fetch completed
    pub size: u64,
}

impl Artifact {
    /// Describe an existing file, reading its size from the filesystem
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }
}

/// Create the working directory if it does not exist
pub async fn prepare_working_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    debug!(?dir, "working directory ready");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    #[test]
    fn test_allocate_inside_working_dir() {
        let dir = tempdir().unwrap();
        let slot = ArtifactSlot::allocate(dir.path(), RequestId(5));
        assert_eq!(slot.path().parent(), Some(dir.path()));

        let name = slot.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("tiktok_"));
        assert!(name.ends_with(".mp4"));
        assert!(name.contains("_5_"));
    }

    #[test]
    fn test_allocate_is_unique_within_one_second() {
        let dir = tempdir().unwrap();
        let paths: HashSet<PathBuf> = (0..500)
            .map(|_| {
                ArtifactSlot::allocate(dir.path(), RequestId::next())
                    .path()
                    .to_path_buf()
            })
            .collect();
        assert_eq!(paths.len(), 500);
    }

    #[test]
    fn test_same_request_id_still_gets_distinct_tokens() {
        let dir = tempdir().unwrap();
        let a = ArtifactSlot::allocate(dir.path(), RequestId(1));
        let b = ArtifactSlot::allocate(dir.path(), RequestId(1));
        // 1 in 2^32 chance of a false failure.
        assert_ne!(a, b);
    }

    #[test]
    fn test_owns_side_files_sharing_the_stem() {
        let slot = ArtifactSlot {
            path: PathBuf::from("/w/tiktok_x_1_0000abcd.mp4"),
        };
        for name in [
            "tiktok_x_1_0000abcd.mp4",
            "tiktok_x_1_0000abcd.mp4.part",
            "tiktok_x_1_0000abcd.mp4.part-Frag1",
            "tiktok_x_1_0000abcd.mp4.ytdl",
            "tiktok_x_1_0000abcd.temp.mp4",
        ] {
            assert!(slot.owns(name), "{name}");
        }
        for name in [
            "tiktok_x_1_0000abcd",
            "tiktok_x_1_0000abcde.mp4",
            "tiktok_x_1_0000abc.mp4",
            "notes.txt",
        ] {
            assert!(!slot.owns(name), "{name}");
        }
    }

    #[tokio::test]
    async fn test_cleanup_removes_artifact_and_partials() {
        let dir = tempdir().unwrap();
        let slot = ArtifactSlot::allocate(dir.path(), RequestId(9));
        let stem = slot.path().file_stem().unwrap().to_str().unwrap().to_string();
        let output = slot.path().file_name().unwrap().to_str().unwrap().to_string();
        for name in [
            output.clone(),
            format!("{output}.part"),
            format!("{output}.ytdl"),
            format!("{output}.part-Frag1"),
            format!("{output}.part-Frag2"),
            format!("{stem}.temp.mp4"),
        ] {
            tokio::fs::write(dir.path().join(name), b"data").await.unwrap();
        }
        assert!(slot.exists().await);

        assert_eq!(slot.cleanup(RequestId(9)).await, 6);
        assert!(!slot.exists().await);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_of_missing_working_dir_is_a_no_op() {
        let dir = tempdir().unwrap();
        let slot = ArtifactSlot::allocate(&dir.path().join("gone"), RequestId(13));
        assert_eq!(slot.cleanup(RequestId(13)).await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let dir = tempdir().unwrap();
        let slot = ArtifactSlot::allocate(dir.path(), RequestId(10));
        tokio::fs::write(slot.path(), b"x").await.unwrap();

        assert_eq!(slot.cleanup(RequestId(10)).await, 1);
        assert_eq!(slot.cleanup(RequestId(10)).await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_leaves_other_files_alone() {
        let dir = tempdir().unwrap();
        let mine = ArtifactSlot::allocate(dir.path(), RequestId(11));
        let theirs = ArtifactSlot::allocate(dir.path(), RequestId(12));
        tokio::fs::write(mine.path(), b"mine").await.unwrap();
        tokio::fs::write(theirs.path(), b"theirs").await.unwrap();
        let mut frag = theirs.path().as_os_str().to_owned();
        frag.push(".part-Frag1");
        tokio::fs::write(&frag, b"theirs").await.unwrap();
        tokio::fs::write(dir.path().join("unrelated.txt"), b"keep").await.unwrap();

        assert_eq!(mine.cleanup(RequestId(11)).await, 1);
        assert!(!mine.exists().await);
        assert!(theirs.exists().await);
        assert!(std::path::Path::new(&frag).exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[tokio::test]
    async fn test_artifact_from_path_reads_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        tokio::fs::write(&path, vec![0u8; 1234]).await.unwrap();

        let artifact = Artifact::from_path(&path).await.unwrap();
        assert_eq!(artifact.size, 1234);
        assert_eq!(artifact.path, path);
    }

    #[tokio::test]
    async fn test_artifact_from_directory_is_rejected() {
        let dir = tempdir().unwrap();
        assert!(Artifact::from_path(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_prepare_working_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        prepare_working_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op
        prepare_working_dir(&nested).await.unwrap();
    }
}
