//! Path resolution: maps files and import specifiers to layers and slices.
//!
//! Layer matching is first-match-wins over the preset's declared order.
//! That tie-break is authoritative; overlapping globs are not diagnosed.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use layer_guard_core::preset::{LayerDef, Preset};

/// Syntactic class of an import specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportClass {
    /// `@/...` or `~/...`, rooted at the source directory.
    Alias,
    /// Starts with the configured source directory (`src/...`).
    RootRelative,
    /// `./...` or `../...`, resolved against the importing file.
    Relative,
    /// Bare package specifier; never validated.
    External,
}

/// Outcome of resolving one import specifier.
#[derive(Debug, Clone)]
pub struct ImportResolution {
    /// How the specifier was written.
    pub class: ImportClass,
    /// Normalized project-root-relative path (forward slashes, includes the
    /// source directory). `None` for external imports and paths escaping
    /// the project root.
    pub project_path: Option<String>,
    /// Matched layer name plus the source-relative candidate that matched.
    pub layer: Option<(String, String)>,
}

impl ImportResolution {
    fn external() -> Self {
        Self {
            class: ImportClass::External,
            project_path: None,
            layer: None,
        }
    }
}

/// Resolves file paths and import specifiers against a layer topology.
pub struct PathResolver {
    root: PathBuf,
    src_dir: String,
    /// Layer defs paired with compiled globs, in preset order.
    layers: Vec<(LayerDef, glob::Pattern)>,
}

impl PathResolver {
    /// Builds a resolver for a project root and preset.
    ///
    /// Layer patterns were validated at config load; any that still fail
    /// to compile are skipped with a warning rather than aborting.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, src_dir: &str, preset: &Preset) -> Self {
        let layers = preset
            .layers
            .iter()
            .filter_map(|layer| match glob::Pattern::new(&layer.pattern) {
                Ok(pattern) => Some((layer.clone(), pattern)),
                Err(e) => {
                    warn!(layer = %layer.name, "skipping layer with bad glob: {e}");
                    None
                }
            })
            .collect();
        Self {
            root: root.into(),
            src_dir: src_dir.trim_matches('/').to_owned(),
            layers,
        }
    }

    /// The project root this resolver is anchored at.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classifies an import specifier without resolving it.
    #[must_use]
    pub fn classify(&self, specifier: &str) -> ImportClass {
        if specifier.starts_with("@/") || specifier.starts_with("~/") {
            ImportClass::Alias
        } else if specifier == self.src_dir
            || specifier.starts_with(&format!("{}/", self.src_dir))
        {
            ImportClass::RootRelative
        } else if specifier.starts_with("./") || specifier.starts_with("../") {
            ImportClass::Relative
        } else {
            ImportClass::External
        }
    }

    /// Resolves a file's own layer.
    ///
    /// Returns the layer name and the source-relative normalized path, or
    /// `None` when the file matches no layer glob.
    #[must_use]
    pub fn resolve_file(&self, file: &Path) -> Option<(String, String)> {
        let rel = file.strip_prefix(&self.root).unwrap_or(file);
        let rel = normalize_slashes(rel);
        let src_rel = self.strip_src_prefix(&rel);
        self.match_layer(&[src_rel.clone()])
            .map(|name| (name, src_rel))
    }

    /// Resolves an import specifier from a given importing file.
    #[must_use]
    pub fn resolve_import(&self, specifier: &str, importing_file: &Path) -> ImportResolution {
        match self.classify(specifier) {
            ImportClass::External => ImportResolution::external(),
            ImportClass::Alias => {
                let tail = &specifier[2..];
                self.resolve_candidates(ImportClass::Alias, tail)
            }
            ImportClass::RootRelative => {
                let tail = self.strip_src_prefix(specifier);
                self.resolve_candidates(ImportClass::RootRelative, &tail)
            }
            ImportClass::Relative => {
                let dir = importing_file.parent().unwrap_or(Path::new(""));
                let joined = dir.join(specifier);
                let normalized = normalize_components(&joined);
                let Ok(rel) = normalized.strip_prefix(&self.root) else {
                    // Escapes the project root: out-of-project import,
                    // ignored rather than an error.
                    return ImportResolution {
                        class: ImportClass::Relative,
                        project_path: None,
                        layer: None,
                    };
                };
                let rel = normalize_slashes(rel);
                if rel.starts_with("..") {
                    return ImportResolution {
                        class: ImportClass::Relative,
                        project_path: None,
                        layer: None,
                    };
                }
                let src_rel = self.strip_src_prefix(&rel);
                let layer = self
                    .match_layer(&[src_rel.clone()])
                    .map(|name| (name, src_rel));
                ImportResolution {
                    class: ImportClass::Relative,
                    project_path: Some(rel),
                    layer,
                }
            }
        }
    }

    /// Builds with/without-src-prefix candidates for alias and
    /// root-relative specifiers and matches them in order.
    fn resolve_candidates(&self, class: ImportClass, tail: &str) -> ImportResolution {
        let stripped = self.strip_src_prefix(tail);
        let mut candidates = vec![tail.to_owned()];
        if stripped != tail {
            candidates.push(stripped.clone());
        }

        let layer = self.match_layer(&candidates).map(|name| {
            // Report the candidate the pattern actually matched.
            let matched = candidates
                .iter()
                .find(|c| self.match_layer(std::slice::from_ref(c)).as_deref() == Some(&name))
                .cloned()
                .unwrap_or_else(|| stripped.clone());
            (name, matched)
        });

        ImportResolution {
            class,
            project_path: Some(format!("{}/{stripped}", self.src_dir)),
            layer,
        }
    }

    /// First matching layer across the candidate paths, in preset order.
    /// A bare layer root (`shared`) carries no segment for a `layer/**`
    /// pattern, so the candidate's implicit `index` module is probed too.
    fn match_layer(&self, candidates: &[String]) -> Option<String> {
        for (layer, pattern) in &self.layers {
            for candidate in candidates {
                if pattern.matches(candidate) || pattern.matches(&format!("{candidate}/index")) {
                    return Some(layer.name.clone());
                }
            }
        }
        None
    }

    /// Extracts the slice: the path segment immediately after the layer's
    /// literal prefix. A segment with an extension is a file directly under
    /// the layer, not a slice.
    #[must_use]
    pub fn slice_of(&self, layer_name: &str, src_rel: &str) -> Option<String> {
        let (layer, _) = self.layers.iter().find(|(l, _)| l.name == layer_name)?;
        let prefix = literal_prefix(&layer.pattern);
        let rest = src_rel.strip_prefix(&prefix)?.trim_start_matches('/');
        let segment = rest.split('/').next()?;
        if segment.is_empty() || segment.contains('.') {
            None
        } else {
            Some(segment.to_owned())
        }
    }

    /// Number of path segments beyond `layer/slice`, used by the
    /// deep-nesting rule. An `index` public entry does not count.
    #[must_use]
    pub fn depth_past_slice(&self, layer_name: &str, src_rel: &str) -> usize {
        let Some((layer, _)) = self.layers.iter().find(|(l, _)| l.name == layer_name) else {
            return 0;
        };
        let prefix = literal_prefix(&layer.pattern);
        let Some(rest) = src_rel.strip_prefix(&prefix) else {
            return 0;
        };
        let segments: Vec<&str> = rest
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        // segments[0] is the slice itself.
        let past: Vec<&str> = segments.iter().skip(1).copied().collect();
        past.iter()
            .filter(|s| {
                let stem = s.split('.').next().unwrap_or(s);
                stem != "index"
            })
            .count()
    }

    fn strip_src_prefix(&self, path: &str) -> String {
        let with_slash = format!("{}/", self.src_dir);
        path.strip_prefix(&with_slash).unwrap_or(path).to_owned()
    }
}

/// Literal path prefix of a glob pattern (up to the first meta character),
/// trimmed of trailing slashes.
fn literal_prefix(pattern: &str) -> String {
    let end = pattern
        .find(['*', '?', '['])
        .unwrap_or(pattern.len());
    pattern[..end].trim_end_matches('/').to_owned()
}

/// Forward-slash string form of a path.
fn normalize_slashes(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolves `.` and `..` components lexically.
fn normalize_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_guard_core::preset::Preset;

    fn resolver() -> PathResolver {
        PathResolver::new("/project", "src", &Preset::layered())
    }

    #[test]
    fn classifies_specifiers() {
        let r = resolver();
        assert_eq!(r.classify("@/features/auth"), ImportClass::Alias);
        assert_eq!(r.classify("~/shared/ui"), ImportClass::Alias);
        assert_eq!(r.classify("src/entities/user"), ImportClass::RootRelative);
        assert_eq!(r.classify("./sibling"), ImportClass::Relative);
        assert_eq!(r.classify("../up"), ImportClass::Relative);
        assert_eq!(r.classify("react"), ImportClass::External);
        assert_eq!(r.classify("node:fs"), ImportClass::External);
    }

    #[test]
    fn file_resolves_to_first_matching_layer() {
        let r = resolver();
        let (layer, rel) = r
            .resolve_file(Path::new("/project/src/features/auth/login.ts"))
            .unwrap();
        assert_eq!(layer, "features");
        assert_eq!(rel, "features/auth/login.ts");
    }

    #[test]
    fn file_outside_layers_is_unresolved() {
        let r = resolver();
        assert!(r.resolve_file(Path::new("/project/src/config.ts")).is_none());
    }

    #[test]
    fn alias_import_resolves_layer() {
        let r = resolver();
        let res = r.resolve_import("@/widgets/header", Path::new("/project/src/features/a/x.ts"));
        assert_eq!(res.class, ImportClass::Alias);
        let (layer, path) = res.layer.unwrap();
        assert_eq!(layer, "widgets");
        assert_eq!(path, "widgets/header");
        assert_eq!(res.project_path.as_deref(), Some("src/widgets/header"));
    }

    #[test]
    fn bare_layer_root_alias_resolves_layer() {
        let r = resolver();
        let res = r.resolve_import("@/shared", Path::new("/project/src/features/a/x.ts"));
        let (layer, path) = res.layer.unwrap();
        assert_eq!(layer, "shared");
        assert_eq!(path, "shared");
    }

    #[test]
    fn bare_layer_root_relative_resolves_layer() {
        let r = resolver();
        let res = r.resolve_import("../../shared", Path::new("/project/src/features/a/x.ts"));
        let (layer, path) = res.layer.unwrap();
        assert_eq!(layer, "shared");
        assert_eq!(path, "shared");
    }

    #[test]
    fn alias_with_src_prefix_still_matches() {
        let r = resolver();
        let res = r.resolve_import("@/src/widgets/header", Path::new("/project/src/a.ts"));
        let (layer, _) = res.layer.unwrap();
        assert_eq!(layer, "widgets");
    }

    #[test]
    fn root_relative_import_resolves_layer() {
        let r = resolver();
        let res = r.resolve_import("src/entities/user", Path::new("/project/src/a.ts"));
        assert_eq!(res.class, ImportClass::RootRelative);
        assert_eq!(res.layer.unwrap().0, "entities");
    }

    #[test]
    fn relative_import_resolves_against_importing_file() {
        let r = resolver();
        let res = r.resolve_import(
            "../../entities/user/model",
            Path::new("/project/src/features/auth/login.ts"),
        );
        assert_eq!(res.class, ImportClass::Relative);
        assert_eq!(res.layer.unwrap().0, "entities");
        assert_eq!(
            res.project_path.as_deref(),
            Some("src/entities/user/model")
        );
    }

    #[test]
    fn relative_import_escaping_root_is_ignored() {
        let r = resolver();
        let res = r.resolve_import("../../../../outside", Path::new("/project/src/a/b.ts"));
        assert!(res.layer.is_none());
        assert!(res.project_path.is_none());
    }

    #[test]
    fn external_import_has_no_layer() {
        let r = resolver();
        let res = r.resolve_import("react", Path::new("/project/src/a.ts"));
        assert_eq!(res.class, ImportClass::External);
        assert!(res.layer.is_none());
        assert!(res.project_path.is_none());
    }

    #[test]
    fn slice_extraction() {
        let r = resolver();
        assert_eq!(
            r.slice_of("features", "features/auth/login.ts").as_deref(),
            Some("auth")
        );
        assert_eq!(
            r.slice_of("features", "features/auth").as_deref(),
            Some("auth")
        );
        // File directly under the layer: no slice.
        assert_eq!(r.slice_of("shared", "shared/utils.ts"), None);
    }

    #[test]
    fn depth_past_slice_counts_internal_segments() {
        let r = resolver();
        assert_eq!(r.depth_past_slice("entities", "entities/user"), 0);
        assert_eq!(r.depth_past_slice("entities", "entities/user/model"), 1);
        assert_eq!(
            r.depth_past_slice("entities", "entities/user/model/types"),
            2
        );
        // Public entry file does not count as nesting.
        assert_eq!(r.depth_past_slice("entities", "entities/user/index.ts"), 0);
    }

    #[test]
    fn first_match_wins_on_overlapping_patterns() {
        use layer_guard_core::preset::LayerDef;
        let preset = Preset::custom(
            vec![
                LayerDef {
                    name: "specific".into(),
                    pattern: "shared/internal/**".into(),
                    allowed_imports: vec![],
                    description: String::new(),
                    client_side: false,
                },
                LayerDef {
                    name: "broad".into(),
                    pattern: "shared/**".into(),
                    allowed_imports: vec![],
                    description: String::new(),
                    client_side: false,
                },
            ],
            None,
        );
        let r = PathResolver::new("/project", "src", &preset);
        let (layer, _) = r
            .resolve_file(Path::new("/project/src/shared/internal/secret.ts"))
            .unwrap();
        assert_eq!(layer, "specific");
    }
}
