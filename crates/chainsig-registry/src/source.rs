//! Flat-file signature sources.
//!
//! Text files hold one signature per line; blank lines and lines starting
//! with `#` are skipped. Files ending in `.json` hold a JSON array of
//! signature strings.

use std::path::Path;

use chainsig_core::SignatureKind;
use thiserror::Error;

use crate::catalog::{Catalog, IngestReport};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read signature file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON signature list in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read the raw signature strings from `path`.
pub fn load_file(path: &Path) -> Result<Vec<String>, SourceError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: display.clone(),
        source,
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(&content).map_err(|source| SourceError::Json {
            path: display,
            source,
        });
    }
    Ok(parse_lines(&content))
}

/// Signature lines of a text source.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Load `path` and ingest it into `catalog`. The source label defaults to
/// the file path.
pub fn ingest_file(
    catalog: &mut Catalog,
    kind: SignatureKind,
    path: &Path,
    label: Option<&str>,
) -> Result<IngestReport, SourceError> {
    let raw = load_file(path)?;
    let label = label.map(str::to_string).unwrap_or_else(|| path.display().to_string());
    Ok(catalog.ingest(kind, &label, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blanks_are_skipped() {
        let lines = parse_lines("# ERC-20\n\ntransfer(address,uint256)\n   \n  approve(address,uint256)  \n");
        assert_eq!(lines, ["transfer(address,uint256)", "approve(address,uint256)"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("/nonexistent/chainsig/signatures.txt")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
