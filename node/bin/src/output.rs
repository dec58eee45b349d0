use std::{io::Write as _, path::Path};

use anyhow::Context as _;

/// Writes `contents` to `path` through a temporary file in the same directory, so
/// readers never observe a partially written response.
pub fn write_atomically(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create a temporary file in {}", dir.display()))?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path)
        .with_context(|| format!("cannot move the response to {}", path.display()))?;
    Ok(())
}
