//! Single-file analysis: tokenize, extract, resolve.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::extract::{self, ExportInfo, ImportExtractor, ImportInfo, TokenExtractor};
use crate::resolve::PathResolver;

/// Errors from single-file analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Result of analyzing one source file.
///
/// Created fresh per pass and superseded, never mutated, by the next one.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    /// Absolute path of the analyzed file.
    pub file_path: PathBuf,
    /// Project root the analysis ran under.
    pub root_dir: PathBuf,
    /// The file's own layer, if any glob matched.
    pub layer: Option<String>,
    /// Source-relative normalized path, when a layer matched.
    pub src_rel: Option<String>,
    /// The file's slice within its layer.
    pub slice: Option<String>,
    /// All import sites found.
    pub imports: Vec<ImportInfo>,
    /// All export sites found.
    pub exports: Vec<ExportInfo>,
    /// When this analysis ran.
    pub analyzed_at: SystemTime,
}

impl FileAnalysis {
    /// Whether this file is a slice public entry (an index module).
    #[must_use]
    pub fn is_public_api(&self) -> bool {
        self.file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s == "index")
    }

    /// Whether the file exports types exclusively.
    #[must_use]
    pub fn is_type_only(&self) -> bool {
        extract::is_type_only_module(&self.exports)
    }

    /// Structural equality ignoring the analysis timestamp.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.file_path == other.file_path
            && self.layer == other.layer
            && self.slice == other.slice
            && self.imports == other.imports
            && self.exports == other.exports
    }
}

/// Produces [`FileAnalysis`] records from files on disk.
pub struct FileAnalyzer {
    extractor: Box<dyn ImportExtractor>,
}

impl Default for FileAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FileAnalyzer {
    /// Creates an analyzer using the precise token-based extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractor: Box::new(TokenExtractor),
        }
    }

    /// Creates an analyzer with an explicit extraction strategy.
    #[must_use]
    pub fn with_extractor(extractor: Box<dyn ImportExtractor>) -> Self {
        Self { extractor }
    }

    /// Reads and analyzes one file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Io`] when the file cannot be read; callers
    /// log and skip rather than aborting a batch.
    pub fn analyze(&self, resolver: &PathResolver, path: &Path) -> Result<FileAnalysis, AnalyzeError> {
        let content = std::fs::read_to_string(path).map_err(|e| AnalyzeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(self.analyze_source(resolver, path, &content))
    }

    /// Analyzes already-read source text.
    #[must_use]
    pub fn analyze_source(
        &self,
        resolver: &PathResolver,
        path: &Path,
        content: &str,
    ) -> FileAnalysis {
        let resolved = resolver.resolve_file(path);
        let (layer, src_rel) = match resolved {
            Some((layer, rel)) => (Some(layer), Some(rel)),
            None => (None, None),
        };
        let slice = match (&layer, &src_rel) {
            (Some(layer), Some(rel)) => resolver.slice_of(layer, rel),
            _ => None,
        };

        let imports = self.extractor.extract(content);
        let exports = extract::extract_exports(content);

        debug!(
            file = %path.display(),
            layer = layer.as_deref().unwrap_or("-"),
            imports = imports.len(),
            "analyzed"
        );

        FileAnalysis {
            file_path: path.to_path_buf(),
            root_dir: resolver.root().to_path_buf(),
            layer,
            src_rel,
            slice,
            imports,
            exports,
            analyzed_at: SystemTime::now(),
        }
    }
}
