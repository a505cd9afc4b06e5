//! Rule engine: turns file analyses into violations.
//!
//! Per import, at most one violation is emitted, following a fixed
//! decision order; a separate graph-wide pass detects two-node import
//! cycles during full scans.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use layer_guard_core::{
    GuardConfig, Preset, Violation, ViolationKind, SHARED_INTERNAL_LAYER,
};

use crate::analyzer::FileAnalysis;
use crate::extract::ImportInfo;
use crate::resolve::{ImportClass, ImportResolution, PathResolver};
use crate::suggest::{self, SuggestionContext};

/// Route entry kinds under the app-router file convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteKind {
    Page,
    Layout,
    Route,
}

/// Evaluates the layer policy against file analyses.
pub struct Validator<'a> {
    config: &'a GuardConfig,
    preset: &'a Preset,
    resolver: &'a PathResolver,
}

impl<'a> Validator<'a> {
    /// Creates a validator over a config, preset, and resolver.
    #[must_use]
    pub fn new(config: &'a GuardConfig, preset: &'a Preset, resolver: &'a PathResolver) -> Self {
        Self {
            config,
            preset,
            resolver,
        }
    }

    /// Checks a single file analysis.
    #[must_use]
    pub fn check_file(&self, analysis: &FileAnalysis) -> Vec<Violation> {
        let mut violations = Vec::new();
        let rel = self.rel_path(&analysis.file_path);

        // File-level rules run once, independent of imports.
        if self.config.ts_only {
            let ext = analysis
                .file_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            if ext == "js" || ext == "jsx" {
                violations.push(self.make_violation(
                    ViolationKind::FileType,
                    &rel,
                    1,
                    1,
                    format!(".{ext} files are not allowed under the TypeScript-only policy"),
                    None,
                    &SuggestionContext::default(),
                ));
            }
        }

        if analysis.layer.as_deref() == Some(SHARED_INTERNAL_LAYER) {
            violations.push(self.make_violation(
                ViolationKind::InvalidSharedSegment,
                &rel,
                1,
                1,
                "file placed in the reserved internal shared segment".to_owned(),
                None,
                &SuggestionContext::default(),
            ));
        }

        for import in &analysis.imports {
            if self.is_ignored_import(&import.path) {
                continue;
            }
            let resolution = self
                .resolver
                .resolve_import(&import.path, &analysis.file_path);
            if resolution.class == ImportClass::External {
                continue;
            }

            // The page-to-page ban applies regardless of layer, so it runs
            // before the layer decision chain.
            if let Some(v) = self.check_page_to_page(analysis, import, &resolution, &rel) {
                violations.push(v);
            } else if let Some(v) = self.check_import(analysis, import, &resolution, &rel) {
                violations.push(v);
            } else if let Some(v) = self.check_route_allowlist(analysis, import, &resolution, &rel)
            {
                violations.push(v);
            }
        }

        violations
    }

    /// The per-import decision chain. Emits at most one violation.
    fn check_import(
        &self,
        analysis: &FileAnalysis,
        import: &ImportInfo,
        resolution: &ImportResolution,
        rel: &Path,
    ) -> Option<Violation> {
        let (to_layer, to_path) = match &resolution.layer {
            Some((layer, path)) => (layer.as_str(), path.as_str()),
            None => return None, // un-modeled target, not validated
        };

        // Env rule: client-side code importing the server-only layer is a
        // layer violation with a fixed target, checked before anything else.
        if let Some(server) = &self.preset.server_only_layer {
            if to_layer == server {
                let client_side = analysis
                    .layer
                    .as_deref()
                    .and_then(|l| self.preset.layer(l))
                    .is_some_and(|l| l.client_side);
                if client_side {
                    let allowed = self.allowed_for(analysis);
                    let ctx = SuggestionContext {
                        from_layer: analysis.layer.as_deref(),
                        to_layer: Some(server),
                        allowed_layers: &allowed,
                        import_path: &import.path,
                    };
                    return Some(
                        self.make_violation(
                            ViolationKind::LayerViolation,
                            rel,
                            import.line,
                            import.column,
                            format!(
                                "client-side layer '{}' must not import the server-only layer '{server}'",
                                analysis.layer.as_deref().unwrap_or("?")
                            ),
                            Some((analysis.layer.clone(), Some(server.clone()))),
                            &ctx,
                        )
                        .with_import(import.raw_statement.clone(), import.path.clone())
                        .with_allowed_layers(allowed.clone()),
                    );
                }
            }
        }

        // Unknown source layers pass validation: no false positives on
        // un-modeled code.
        let from_layer = analysis.layer.as_deref()?;

        if to_layer == from_layer {
            let to_slice = self.resolver.slice_of(to_layer, to_path);
            if let (Some(from_slice), Some(to_slice)) = (&analysis.slice, &to_slice) {
                if from_slice != to_slice {
                    let ctx = SuggestionContext {
                        from_layer: Some(from_layer),
                        to_layer: Some(to_layer),
                        allowed_layers: &[],
                        import_path: &import.path,
                    };
                    return Some(
                        self.make_violation(
                            ViolationKind::CrossSlice,
                            rel,
                            import.line,
                            import.column,
                            format!(
                                "slice '{from_slice}' imports sibling slice '{to_slice}' in layer '{from_layer}'"
                            ),
                            Some((Some(from_layer.to_owned()), Some(to_layer.to_owned()))),
                            &ctx,
                        )
                        .with_import(import.raw_statement.clone(), import.path.clone()),
                    );
                }
            }
            return None; // same layer, same (or no) slice
        }

        let allowed = self.preset.allowed_imports(from_layer);
        if allowed.iter().any(|a| a == to_layer) {
            // Allowed layer, but reaching past the slice public entry?
            if self.resolver.depth_past_slice(to_layer, to_path) >= 1 {
                let ctx = SuggestionContext {
                    from_layer: Some(from_layer),
                    to_layer: Some(to_layer),
                    allowed_layers: &allowed,
                    import_path: &import.path,
                };
                return Some(
                    self.make_violation(
                        ViolationKind::DeepNesting,
                        rel,
                        import.line,
                        import.column,
                        format!(
                            "import reaches into '{to_layer}' internals instead of the slice public entry"
                        ),
                        Some((Some(from_layer.to_owned()), Some(to_layer.to_owned()))),
                        &ctx,
                    )
                    .with_import(import.raw_statement.clone(), import.path.clone()),
                );
            }
            return None;
        }

        let ctx = SuggestionContext {
            from_layer: Some(from_layer),
            to_layer: Some(to_layer),
            allowed_layers: &allowed,
            import_path: &import.path,
        };
        Some(
            self.make_violation(
                ViolationKind::LayerViolation,
                rel,
                import.line,
                import.column,
                format!("layer '{from_layer}' must not import from layer '{to_layer}'"),
                Some((Some(from_layer.to_owned()), Some(to_layer.to_owned()))),
                &ctx,
            )
            .with_import(import.raw_statement.clone(), import.path.clone())
            .with_allowed_layers(allowed),
        )
    }

    /// Page importing another page entry file, flagged regardless of layer.
    fn check_page_to_page(
        &self,
        analysis: &FileAnalysis,
        import: &ImportInfo,
        resolution: &ImportResolution,
        rel: &Path,
    ) -> Option<Violation> {
        let routing = self.config.routing.as_ref().filter(|r| r.enabled)?;
        if !routing.forbid_page_imports || route_kind(&analysis.file_path) != Some(RouteKind::Page)
        {
            return None;
        }
        let project_path = resolution.project_path.as_ref()?;
        let target_stem = project_path
            .rsplit('/')
            .next()
            .map(|s| s.split('.').next().unwrap_or(s));
        if target_stem != Some("page") {
            return None;
        }
        let ctx = SuggestionContext {
            from_layer: analysis.layer.as_deref(),
            to_layer: None,
            allowed_layers: &routing.page_allowed_layers,
            import_path: &import.path,
        };
        Some(
            self.make_violation(
                ViolationKind::RouteRestriction,
                rel,
                import.line,
                import.column,
                "page entry file imports another page entry file".to_owned(),
                Some((analysis.layer.clone(), None)),
                &ctx,
            )
            .with_import(import.raw_statement.clone(), import.path.clone())
            .with_allowed_layers(routing.page_allowed_layers.clone()),
        )
    }

    /// Route-convention overlay: page/layout/route entry files are checked
    /// against their own import allow-lists.
    fn check_route_allowlist(
        &self,
        analysis: &FileAnalysis,
        import: &ImportInfo,
        resolution: &ImportResolution,
        rel: &Path,
    ) -> Option<Violation> {
        let routing = self.config.routing.as_ref().filter(|r| r.enabled)?;
        let kind = route_kind(&analysis.file_path)?;
        let (to_layer, _) = resolution.layer.as_ref()?;
        let allowed = match kind {
            RouteKind::Page => &routing.page_allowed_layers,
            RouteKind::Layout => &routing.layout_allowed_layers,
            RouteKind::Route => &routing.route_allowed_layers,
        };
        if allowed.iter().any(|a| a == to_layer) {
            return None;
        }

        let entry = match kind {
            RouteKind::Page => "page",
            RouteKind::Layout => "layout",
            RouteKind::Route => "route",
        };
        let ctx = SuggestionContext {
            from_layer: analysis.layer.as_deref(),
            to_layer: Some(to_layer),
            allowed_layers: allowed,
            import_path: &import.path,
        };
        Some(
            self.make_violation(
                ViolationKind::RouteRestriction,
                rel,
                import.line,
                import.column,
                format!("{entry} entry file must not import from layer '{to_layer}'"),
                Some((analysis.layer.clone(), Some(to_layer.clone()))),
                &ctx,
            )
            .with_import(import.raw_statement.clone(), import.path.clone())
            .with_allowed_layers(allowed.clone()),
        )
    }

    /// Graph-wide two-node cycle detection.
    ///
    /// Only direct A<->B pairs are detected; longer cycles (A->B->C->A)
    /// are out of scope. Each pair is reported once, keyed unordered.
    #[must_use]
    pub fn check_circular(&self, analyses: &[FileAnalysis]) -> Vec<Violation> {
        // Canonical path index: full relative path plus derived keys
        // (extension stripped, with/without a trailing /index).
        let mut index: HashMap<String, String> = HashMap::new();
        for analysis in analyses {
            let canonical = self.project_rel(&analysis.file_path);
            index.insert(canonical.clone(), canonical.clone());
            let no_ext = strip_extension(&canonical);
            index.insert(no_ext.clone(), canonical.clone());
            if let Some(dir) = no_ext.strip_suffix("/index") {
                index.insert(dir.to_owned(), canonical.clone());
            } else {
                index.insert(format!("{no_ext}/index"), canonical.clone());
            }
        }

        struct Edge<'e> {
            from: String,
            to: String,
            import: &'e ImportInfo,
            file: PathBuf,
        }

        let mut edges: Vec<Edge<'_>> = Vec::new();
        let mut edge_set: HashSet<(String, String)> = HashSet::new();

        for analysis in analyses {
            let from = self.project_rel(&analysis.file_path);
            for import in &analysis.imports {
                let resolution = self
                    .resolver
                    .resolve_import(&import.path, &analysis.file_path);
                let Some(project_path) = resolution.project_path else {
                    continue; // external or escaping target
                };
                let Some(to) = index
                    .get(&project_path)
                    .or_else(|| index.get(&strip_extension(&project_path)))
                else {
                    continue; // target not among analyzed files
                };
                if *to == from {
                    continue;
                }
                edge_set.insert((from.clone(), to.clone()));
                edges.push(Edge {
                    from: from.clone(),
                    to: to.clone(),
                    import,
                    file: self.rel_path(&analysis.file_path),
                });
            }
        }

        let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
        let mut violations = Vec::new();

        for edge in &edges {
            if !edge_set.contains(&(edge.to.clone(), edge.from.clone())) {
                continue;
            }
            let pair = if edge.from < edge.to {
                (edge.from.clone(), edge.to.clone())
            } else {
                (edge.to.clone(), edge.from.clone())
            };
            if !seen_pairs.insert(pair) {
                continue;
            }
            let ctx = SuggestionContext {
                import_path: &edge.import.path,
                ..SuggestionContext::default()
            };
            violations.push(
                self.make_violation(
                    ViolationKind::CircularDependency,
                    &edge.file,
                    edge.import.line,
                    edge.import.column,
                    format!("circular dependency between '{}' and '{}'", edge.from, edge.to),
                    None,
                    &ctx,
                )
                .with_import(edge.import.raw_statement.clone(), edge.import.path.clone()),
            );
        }

        violations
    }

    fn allowed_for(&self, analysis: &FileAnalysis) -> Vec<String> {
        analysis
            .layer
            .as_deref()
            .map(|l| self.preset.allowed_imports(l))
            .unwrap_or_default()
    }

    fn is_ignored_import(&self, path: &str) -> bool {
        self.config.ignore_imports.iter().any(|pattern| {
            glob::Pattern::new(pattern).is_ok_and(|p| p.matches(path))
        })
    }

    fn rel_path(&self, file: &Path) -> PathBuf {
        file.strip_prefix(self.resolver.root())
            .unwrap_or(file)
            .to_path_buf()
    }

    fn project_rel(&self, file: &Path) -> String {
        self.rel_path(file)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    #[allow(clippy::too_many_arguments)]
    fn make_violation(
        &self,
        kind: ViolationKind,
        file: &Path,
        line: usize,
        column: usize,
        message: String,
        layers: Option<(Option<String>, Option<String>)>,
        ctx: &SuggestionContext<'_>,
    ) -> Violation {
        let mut v = Violation::new(kind, file, line, column, message)
            .with_severity(self.config.severity_for(kind))
            .with_suggestions(suggest::suggestions_for(kind, self.preset, ctx));
        if let Some((from, to)) = layers {
            v = v.with_layers(from, to);
        }
        v
    }
}

/// Recognizes page/layout/route entry files by stem.
fn route_kind(path: &Path) -> Option<RouteKind> {
    match path.file_stem().and_then(|s| s.to_str())? {
        "page" => Some(RouteKind::Page),
        "layout" => Some(RouteKind::Layout),
        "route" => Some(RouteKind::Route),
        _ => None,
    }
}

fn strip_extension(path: &str) -> String {
    match (path.rfind('/'), path.rfind('.')) {
        (Some(slash), Some(dot)) if dot > slash => path[..dot].to_owned(),
        (None, Some(dot)) => path[..dot].to_owned(),
        _ => path.to_owned(),
    }
}
