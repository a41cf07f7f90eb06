//! Selection of the site paths to invalidate.
//!
//! Walks the build output, keeps the files whose root-relative path matches
//! the filter and adds the directory form of every `index.html`, since the
//! edge usually serves `/about/` rather than `/about/index.html`.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{CdnError, CdnResult};

/// Filter used when none is configured.
pub const MATCH_ALL: &str = ".*";

static INDEX_SUFFIX: OnceLock<Regex> = OnceLock::new();

fn index_suffix() -> &'static Regex {
    INDEX_SUFFIX.get_or_init(|| Regex::new(r"\bindex\.html\z").expect("valid index pattern"))
}

/// Compile a filter pattern, defaulting to [`MATCH_ALL`].
pub fn compile_filter(pattern: Option<&str>) -> CdnResult<Regex> {
    let pattern = pattern.unwrap_or(MATCH_ALL);
    Regex::new(pattern).map_err(|source| CdnError::InvalidFilter {
        pattern: pattern.to_string(),
        source,
    })
}

/// Directory form of an `index.html` path, if it has one.
///
/// `about/index.html` becomes `about/` and `index.html` becomes the empty
/// string (the site root). Names that merely end in `index.html`, such as
/// `myindex.html`, are left alone.
pub fn directory_index(path: &str) -> Option<String> {
    let stripped = index_suffix().replace(path, "");
    (stripped != path).then(|| stripped.into_owned())
}

/// Site-relative paths under `build_root` matching `filter`, each starting with `/`.
///
/// Files come first in walk order, followed by the derived directory paths.
/// Returns an empty list when nothing matches.
pub fn select(build_root: &Path, filter: &Regex) -> CdnResult<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(build_root).sort_by_file_name() {
        let entry = entry.map_err(|e| CdnError::BuildDirectory {
            path: build_root.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Follows symlinks, so a link to a directory is skipped as well
        if entry.path().is_dir() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(build_root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if filter.is_match(&relative) {
            files.push(relative);
        } else {
            tracing::trace!("[selector] filtered out {relative}");
        }
    }

    let directories: Vec<String> = files.iter().filter_map(|f| directory_index(f)).collect();
    files.extend(directories);

    let selected: Vec<String> = files
        .into_iter()
        .map(|f| if f.starts_with('/') { f } else { format!("/{f}") })
        .collect();

    tracing::debug!(
        "[selector] selected {} paths under {}",
        selected.len(),
        build_root.display()
    );
    Ok(selected)
}
