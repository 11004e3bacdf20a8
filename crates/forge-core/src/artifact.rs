use crate::error::Result;
use crate::io;
use serde::Serialize;
use std::path::PathBuf;

/// A generated text file: where it goes and what it contains.
///
/// Artifacts are written once per run. Writing again replaces the previous
/// content; nothing is merged or versioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub location: PathBuf,
    #[serde(skip)]
    pub content: String,
}

impl Artifact {
    pub fn new(location: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            content: content.into(),
        }
    }

    pub fn write(&self) -> Result<()> {
        io::atomic_write(&self.location, self.content.as_bytes())?;
        tracing::info!(path = %self.location.display(), bytes = self.content.len(), "wrote artifact");
        Ok(())
    }
}

/// Write every artifact in order, stopping at the first failure.
pub fn write_all(artifacts: &[Artifact]) -> Result<()> {
    for a in artifacts {
        a.write()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_all_creates_nested_files() {
        let dir = TempDir::new().unwrap();
        let artifacts = vec![
            Artifact::new(dir.path().join("a/one.txt"), "1"),
            Artifact::new(dir.path().join("b/c/two.txt"), "2"),
        ];
        write_all(&artifacts).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("b/c/two.txt")).unwrap(),
            "2"
        );
    }

    #[test]
    fn rewrite_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spec.md");
        Artifact::new(&path, "old").write().unwrap();
        Artifact::new(&path, "new").write().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
