use std::path::{Path, PathBuf};

use tracing::debug;

use crate::foundation::error::{ConvertError, ConvertResult};

/// List the input files of `dir` in file-name order.
///
/// Subdirectories and dot-files are skipped. An unreadable directory fails with
/// [`ConvertError::Enumeration`]; an empty result is not an error here, callers decide.
pub fn enumerate_sources(dir: &Path) -> ConvertResult<Vec<PathBuf>> {
    let enumeration_err = |source: std::io::Error| ConvertError::Enumeration {
        path: dir.to_path_buf(),
        source,
    };

    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(enumeration_err)? {
        let entry = entry.map_err(enumeration_err)?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        // Follows symlinks, so a link to an image counts as an input.
        if !path.is_file() {
            debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        out.push(path);
    }

    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

/// Drop `exclude` from `paths` (e.g. an output GIF written into the input directory).
pub fn without_path(paths: Vec<PathBuf>, exclude: &Path) -> Vec<PathBuf> {
    let exclude_canon = std::fs::canonicalize(exclude).ok();
    paths
        .into_iter()
        .filter(|p| {
            if p.as_path() == exclude {
                return false;
            }
            match (&exclude_canon, std::fs::canonicalize(p).ok()) {
                (Some(ex), Some(canon)) => &canon != ex,
                _ => true,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/source/enumerate.rs"]
mod tests;
