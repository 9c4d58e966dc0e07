//! Concat demuxer manifest: one `file '<path>'` line per input.

use std::path::{Path, PathBuf};

use reelforge_core::{ReelError, ReelResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcatManifest {
    entries: Vec<PathBuf>,
}

impl ConcatManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an input. Quotes are not escaped by the demuxer syntax we
    /// emit, so a path containing `'` is refused.
    pub fn push(&mut self, path: impl Into<PathBuf>) -> ReelResult<()> {
        let path = path.into();
        if path.to_string_lossy().contains('\'') {
            return Err(ReelError::UnsafeManifestPath(path));
        }
        self.entries.push(path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for path in &self.entries {
            out.push_str("file '");
            out.push_str(&path.to_string_lossy());
            out.push_str("'\n");
        }
        out
    }

    pub async fn write_to(&self, path: &Path) -> ReelResult<()> {
        tokio::fs::write(path, self.render()).await?;
        Ok(())
    }
}

/// Paths listed by a rendered manifest, in order.
#[cfg(test)]
pub(crate) fn parse_manifest(text: &str) -> Vec<PathBuf> {
    text.lines()
        .filter_map(|line| {
            line.strip_prefix("file '")
                .and_then(|rest| rest.strip_suffix('\''))
                .map(PathBuf::from)
        })
        .collect()
}
