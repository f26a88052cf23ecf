//! Size ceiling for fetched artifacts

use crate::artifact::Artifact;
use crate::error::Error;

/// Rejects artifacts larger than a fixed ceiling
///
/// The size is read from the filesystem at check time rather than trusted from
/// the fetcher, since the extraction engine's size hint is advisory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeGuard {
    ceiling: u64,
}

impl SizeGuard {
    /// Create a guard with a ceiling in bytes
    pub fn new(ceiling: u64) -> Self {
        Self { ceiling }
    }

    /// The configured ceiling in bytes
    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Check the artifact on disk
    ///
    /// Returns the verified size. A file exactly at the ceiling passes.
    ///
    /// # Errors
    ///
    /// [`Error::Oversized`] if the file is larger than the ceiling, or
    /// [`Error::Io`] if its size cannot be read. The caller must remove the
    /// artifact in both cases; delivery must not be attempted.
    pub async fn check(&self, artifact: &Artifact) -> Result<u64, Error> {
        let size = tokio::fs::metadata(&artifact.path).await?.len();
        if size > self.ceiling {
            return Err(Error::Oversized {
                size,
                limit: self.ceiling,
            });
        }
        Ok(size)
    }

    /// Ceiling rendered for humans, e.g. "50MB"
    pub fn ceiling_label(&self) -> String {
        const MIB: u64 = 1024 * 1024;
        if self.ceiling >= MIB && self.ceiling % MIB == 0 {
            format!("{}MB", self.ceiling / MIB)
        } else {
            format!("{} bytes", self.ceiling)
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    async fn artifact_of(dir: &Path, len: u64) -> Artifact {
        let path = dir.join("video.mp4");
        let file = tokio::fs::File::create(&path).await.unwrap();
        file.set_len(len).await.unwrap();
        Artifact { path, size: len }
    }

    #[tokio::test]
    async fn test_under_and_at_ceiling_pass() {
        let dir = tempfile::tempdir().unwrap();
        let guard = SizeGuard::new(1000);

        let small = artifact_of(dir.path(), 10).await;
        assert_eq!(guard.check(&small).await.unwrap(), 10);

        let exact = artifact_of(dir.path(), 1000).await;
        assert_eq!(guard.check(&exact).await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_one_byte_over_is_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let guard = SizeGuard::new(1000);
        let artifact = artifact_of(dir.path(), 1001).await;

        match guard.check(&artifact).await {
            Err(Error::Oversized { size, limit }) => {
                assert_eq!(size, 1001);
                assert_eq!(limit, 1000);
            }
            other => panic!("expected Oversized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_uses_real_size_not_reported_size() {
        let dir = tempfile::tempdir().unwrap();
        let guard = SizeGuard::new(1000);
        let mut artifact = artifact_of(dir.path(), 5000).await;
        artifact.size = 1;

        assert!(matches!(
            guard.check(&artifact).await,
            Err(Error::Oversized { size: 5000, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let guard = SizeGuard::new(1000);
        let artifact = Artifact {
            path: "/nonexistent/video.mp4".into(),
            size: 1,
        };
        assert!(matches!(guard.check(&artifact).await, Err(Error::Io(_))));
    }

    #[test]
    fn test_ceiling_label() {
        assert_eq!(SizeGuard::new(50 * 1024 * 1024).ceiling_label(), "50MB");
        assert_eq!(SizeGuard::new(1500).ceiling_label(), "1500 bytes");
    }
}
