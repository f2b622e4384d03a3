//! Sandbox directories and the file plumbing around them.

/// Where one runner materializes its test folder.
///
/// Temporary folders clean themselves up on drop; pinned folders (the
/// `--sandbox` CLI flag, kept for postmortems) stay behind.
#[derive(Debug)]
pub(crate) enum TestFolder {
    Temp(tempfile::TempDir),
    Pinned(std::path::PathBuf),
}

impl TestFolder {
    /// Create a fresh test folder, inside `root` when pinned there.
    pub(crate) fn new(root: Option<&std::path::Path>, id: &str) -> Result<Self, String> {
        let prefix = format!("clibate-{}-", sanitize_id(id));
        match root {
            Some(root) => {
                std::fs::create_dir_all(root)
                    .map_err(|e| format!("Failed to create {}: {}", root.display(), e))?;
                let dir = tempfile::Builder::new()
                    .prefix(&prefix)
                    .tempdir_in(root)
                    .map_err(|e| format!("Failed to create sandbox in {}: {}", root.display(), e))?;
                // Keep the folder after the run.
                Ok(Self::Pinned(dir.into_path()))
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix(&prefix)
                    .tempdir()
                    .map_err(|e| format!("Failed to create sandbox: {}", e))?;
                Ok(Self::Temp(dir))
            }
        }
    }

    pub(crate) fn path(&self) -> &std::path::Path {
        match self {
            Self::Temp(dir) => dir.path(),
            Self::Pinned(path) => path,
        }
    }
}

fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Read a file as text with newlines normalized to `\n`.
pub(crate) fn read_text(path: &std::path::Path) -> Result<String, String> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(normalize_line_endings::normalized(data.chars()).collect())
}

pub(crate) fn write_text(path: &std::path::Path, data: &str) -> Result<(), String> {
    std::fs::write(path, data).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

/// Copy a file, or a whole tree when `source` is a directory.
pub(crate) fn copy_path(source: &std::path::Path, target: &std::path::Path) -> Result<(), String> {
    if source.is_dir() {
        for entry in walkdir::WalkDir::new(source) {
            let entry = entry.map_err(|e| e.to_string())?;
            let rel = entry
                .path()
                .strip_prefix(source)
                .expect("walked entries live under their root");
            let dest = target.join(rel);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest)
                    .map_err(|e| format!("Failed to create {}: {}", dest.display(), e))?;
            } else {
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
                }
                std::fs::copy(entry.path(), &dest).map_err(|e| {
                    format!(
                        "Failed to copy {} to {}: {}",
                        entry.path().display(),
                        dest.display(),
                        e
                    )
                })?;
            }
        }
        Ok(())
    } else {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        std::fs::copy(source, target)
            .map(|_| ())
            .map_err(|e| {
                format!(
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    target.display(),
                    e
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip_normalizes_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        std::fs::write(&path, b"a\r\nb\r\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn copy_path_recurses_into_directories() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("nested/file.txt"), "data").unwrap();
        let dst = dir.path().join("dst");
        copy_path(&src, &dst).unwrap();
        assert_eq!(std::fs::read_to_string(dst.join("nested/file.txt")).unwrap(), "data");
    }
}
