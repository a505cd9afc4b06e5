//! Healing: ranked remediation options, some with executable auto-fixes.
//!
//! Auto-fixes are a tagged [`AutoFix`] enum rather than opaque callbacks,
//! so options stay inspectable and the fix set is compiler-exhaustive.
//! `apply` never panics: every I/O failure is converted into a failed
//! [`FixOutcome`] so a bulk heal run can continue past individual failures.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use layer_guard_core::{GuardConfig, Preset, Violation, ViolationKind};

/// Result of applying one auto-fix.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// Whether the fix fully succeeded.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Files created, modified, or deleted.
    pub changed_files: Vec<PathBuf>,
    /// Underlying error text, when failed.
    pub error: Option<String>,
}

impl FixOutcome {
    fn ok(message: impl Into<String>, changed_files: Vec<PathBuf>) -> Self {
        Self {
            success: true,
            message: message.into(),
            changed_files,
            error: None,
        }
    }

    fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            changed_files: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// An executable source-level fix.
#[derive(Debug, Clone)]
pub enum AutoFix {
    /// Move a module into the shared layer and rewrite the importing
    /// statement. One logical operation: fails as a unit.
    MoveToShared {
        /// Root-relative path candidates for the module to move (first
        /// existing one wins).
        source_candidates: Vec<PathBuf>,
        /// Root-relative destination path.
        dest: PathBuf,
        /// Root-relative file whose import gets rewritten.
        importing_file: PathBuf,
        /// Statement text to replace.
        old_statement: String,
        /// Replacement statement text.
        new_statement: String,
    },
    /// Literal statement replacement in one file.
    ReplaceStatement {
        /// Root-relative file to edit.
        file: PathBuf,
        /// Statement text to replace.
        old_statement: String,
        /// Replacement statement text.
        new_statement: String,
    },
}

impl AutoFix {
    /// Applies the fix under the given project root.
    ///
    /// Idempotence: a second invocation finds the old statement gone (or
    /// the source file already moved) and reports failure instead of
    /// corrupting anything further.
    #[must_use]
    pub fn apply(&self, root: &Path) -> FixOutcome {
        match self {
            Self::MoveToShared {
                source_candidates,
                dest,
                importing_file,
                old_statement,
                new_statement,
            } => apply_move(
                root,
                source_candidates,
                dest,
                importing_file,
                old_statement,
                new_statement,
            ),
            Self::ReplaceStatement {
                file,
                old_statement,
                new_statement,
            } => apply_replace(root, file, old_statement, new_statement),
        }
    }
}

/// One remediation option. Lower `priority` is preferred.
#[derive(Debug)]
pub struct HealingOption {
    /// Short label for menus.
    pub label: String,
    /// What the option does and why it helps.
    pub explanation: String,
    /// Rank; the lowest becomes primary.
    pub priority: u8,
    /// Code before, for display.
    pub before: Option<String>,
    /// Code after, for display.
    pub after: Option<String>,
    /// Executable fix, when the option is automatable.
    pub auto_fix: Option<AutoFix>,
}

impl HealingOption {
    fn manual(label: &str, explanation: String, priority: u8) -> Self {
        Self {
            label: label.to_owned(),
            explanation,
            priority,
            before: None,
            after: None,
            auto_fix: None,
        }
    }
}

/// A primary option plus alternatives and topology context.
#[derive(Debug)]
pub struct HealingSuggestion {
    /// Preferred option (lowest priority).
    pub primary: HealingOption,
    /// Remaining options, by ascending priority.
    pub alternatives: Vec<HealingOption>,
    /// Layer hierarchy and allowed layers, for display.
    pub context: String,
}

/// Produces ranked remediation options for a violation.
///
/// Stateless: the same violation and config always yield the same options.
#[must_use]
pub fn heal(violation: &Violation, config: &GuardConfig, preset: &Preset) -> HealingSuggestion {
    let mut options = match violation.kind {
        ViolationKind::LayerViolation => layer_violation_options(violation, config, preset),
        ViolationKind::CircularDependency => vec![
            HealingOption::manual(
                "extract-shared",
                "extract the code both modules need into a lower layer they can both import"
                    .to_owned(),
                1,
            ),
            HealingOption::manual(
                "split-interface",
                "split an interface out of one module so the other depends on the abstraction"
                    .to_owned(),
                2,
            ),
            HealingOption::manual(
                "inject-dependency",
                "pass one dependency in from a caller instead of importing it".to_owned(),
                3,
            ),
        ],
        ViolationKind::CrossSlice => vec![
            HealingOption::manual(
                "extract-shared-segment",
                "move the shared code into a shared segment both slices may use".to_owned(),
                1,
            ),
            HealingOption::manual(
                "explicit-cross-import",
                "mark the coupling explicitly via the slice public entry if it is intended"
                    .to_owned(),
                2,
            ),
            HealingOption::manual(
                "compose-above",
                "compose the two slices in a widget or page instead of coupling them".to_owned(),
                3,
            ),
        ],
        ViolationKind::DeepNesting => deep_nesting_options(violation),
        ViolationKind::FileType => vec![HealingOption::manual(
            "migrate-to-typescript",
            "rename the file to .ts/.tsx and add type annotations".to_owned(),
            1,
        )],
        ViolationKind::InvalidSharedSegment => vec![HealingOption::manual(
            "relocate-module",
            "move the module out of the reserved internal segment".to_owned(),
            1,
        )],
        ViolationKind::RouteRestriction => vec![HealingOption::manual(
            "extract-to-widget",
            "move the shared logic into a widget or feature and import that instead".to_owned(),
            1,
        )],
    };

    options.sort_by_key(|o| o.priority);
    let mut iter = options.into_iter();
    #[allow(clippy::expect_used)] // every kind above produces at least one option
    let primary = iter.next().expect("healing options are never empty");

    let allowed = if violation.allowed_layers.is_empty() {
        String::new()
    } else {
        format!(" allowed imports: {}", violation.allowed_layers.join(", "))
    };
    HealingSuggestion {
        primary,
        alternatives: iter.collect(),
        context: format!("hierarchy: {}.{allowed}", preset.hierarchy),
    }
}

fn layer_violation_options(
    violation: &Violation,
    config: &GuardConfig,
    preset: &Preset,
) -> Vec<HealingOption> {
    let mut options = Vec::new();

    let shared_layer = preset
        .layer("shared")
        .map_or_else(|| preset.layers.last().map(|l| l.name.clone()), |l| Some(l.name.clone()));

    if let (Some(shared), Some(tail)) = (shared_layer, import_tail(&violation.import_path)) {
        let module = tail.rsplit('/').next().unwrap_or(&tail).to_owned();
        let src = &config.src_dir;
        let source_candidates = module_candidates(src, &tail);
        let dest = PathBuf::from(format!("{src}/{shared}/{module}.ts"));
        let new_path = format!("@/{shared}/{module}");
        let new_statement = violation
            .import_statement
            .replace(&violation.import_path, &new_path);
        options.push(HealingOption {
            label: "move-to-shared".to_owned(),
            explanation: format!(
                "move '{}' into the '{shared}' layer, which '{}' may import",
                violation.import_path,
                violation.from_layer.as_deref().unwrap_or("?")
            ),
            priority: 1,
            before: Some(violation.import_statement.clone()),
            after: Some(new_statement.clone()),
            auto_fix: Some(AutoFix::MoveToShared {
                source_candidates,
                dest,
                importing_file: violation.file.clone(),
                old_statement: violation.import_statement.clone(),
                new_statement,
            }),
        });
    }

    let dynamic = format!("const mod = await import('{}');", violation.import_path);
    options.push(HealingOption {
        label: "dynamic-import".to_owned(),
        explanation: "defer the dependency to runtime with a dynamic import".to_owned(),
        priority: 2,
        before: Some(violation.import_statement.clone()),
        after: Some(dynamic.clone()),
        auto_fix: Some(AutoFix::ReplaceStatement {
            file: violation.file.clone(),
            old_statement: violation.import_statement.clone(),
            new_statement: dynamic,
        }),
    });

    options.push(HealingOption::manual(
        "pass-as-props",
        "pass the needed value down from a layer that may import both sides".to_owned(),
        3,
    ));
    options.push(HealingOption::manual(
        "use-allowed-layer",
        format!(
            "import from an allowed layer instead: {}",
            if violation.allowed_layers.is_empty() {
                "none are allowed".to_owned()
            } else {
                violation.allowed_layers.join(", ")
            }
        ),
        4,
    ));

    options
}

fn deep_nesting_options(violation: &Violation) -> Vec<HealingOption> {
    let mut options = Vec::new();
    if let Some(public) = public_entry_path(&violation.import_path) {
        let new_statement = violation.import_statement.replace(&violation.import_path, &public);
        options.push(HealingOption {
            label: "use-public-entry".to_owned(),
            explanation: format!("import '{public}' instead of reaching into slice internals"),
            priority: 1,
            before: Some(violation.import_statement.clone()),
            after: Some(new_statement.clone()),
            auto_fix: Some(AutoFix::ReplaceStatement {
                file: violation.file.clone(),
                old_statement: violation.import_statement.clone(),
                new_statement,
            }),
        });
    }
    options.push(HealingOption::manual(
        "export-from-index",
        "re-export the needed symbol from the slice index module, then import the entry"
            .to_owned(),
        2,
    ));
    options
}

/// Strips alias/src prefixes from an import path, keeping it only when it
/// points inside the project.
fn import_tail(path: &str) -> Option<String> {
    if let Some(tail) = path.strip_prefix("@/").or_else(|| path.strip_prefix("~/")) {
        Some(tail.to_owned())
    } else if let Some(tail) = path.strip_prefix("src/") {
        Some(tail.to_owned())
    } else {
        None // relative/external: no reliable root-relative location
    }
}

/// `@/entities/user/model/schema` -> `@/entities/user`.
fn public_entry_path(path: &str) -> Option<String> {
    let (prefix, tail) = if let Some(t) = path.strip_prefix("@/") {
        ("@/", t)
    } else if let Some(t) = path.strip_prefix("~/") {
        ("~/", t)
    } else {
        return None;
    };
    let segments: Vec<&str> = tail.split('/').collect();
    if segments.len() <= 2 {
        return None;
    }
    Some(format!("{prefix}{}/{}", segments[0], segments[1]))
}

/// Root-relative file candidates for a source-relative module path.
fn module_candidates(src_dir: &str, tail: &str) -> Vec<PathBuf> {
    ["ts", "tsx", "js", "jsx"]
        .iter()
        .map(|ext| PathBuf::from(format!("{src_dir}/{tail}.{ext}")))
        .chain(
            ["ts", "tsx"]
                .iter()
                .map(|ext| PathBuf::from(format!("{src_dir}/{tail}/index.{ext}"))),
        )
        .collect()
}

/// Lexical containment check: the healing engine must never touch a path
/// outside the project root.
fn is_within_root(root: &Path, path: &Path) -> bool {
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return false;
    }
    path.starts_with(root)
}

fn apply_move(
    root: &Path,
    source_candidates: &[PathBuf],
    dest: &Path,
    importing_file: &Path,
    old_statement: &str,
    new_statement: &str,
) -> FixOutcome {
    let source = source_candidates
        .iter()
        .map(|c| root.join(c))
        .find(|p| p.is_file());
    let Some(source) = source else {
        return FixOutcome::failed(
            "move-to-shared",
            "could not locate the imported module on disk",
        );
    };

    let dest_abs = root.join(dest);
    let importer_abs = root.join(importing_file);
    for path in [&source, &dest_abs, &importer_abs] {
        if !is_within_root(root, path) {
            return FixOutcome::failed(
                "move-to-shared",
                format!("refusing to touch path outside project root: {}", path.display()),
            );
        }
    }

    let content = match std::fs::read_to_string(&source) {
        Ok(c) => c,
        Err(e) => return FixOutcome::failed("move-to-shared", e.to_string()),
    };
    let importer_content = match std::fs::read_to_string(&importer_abs) {
        Ok(c) => c,
        Err(e) => return FixOutcome::failed("move-to-shared", e.to_string()),
    };
    if !importer_content.contains(old_statement) {
        return FixOutcome::failed(
            "move-to-shared",
            "import statement no longer present; fix already applied?",
        );
    }

    if let Some(parent) = dest_abs.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return FixOutcome::failed("move-to-shared", e.to_string());
        }
    }
    if let Err(e) = std::fs::write(&dest_abs, &content) {
        return FixOutcome::failed("move-to-shared", e.to_string());
    }
    if let Err(e) = std::fs::remove_file(&source) {
        // The copy already landed; report the partial state honestly.
        warn!("moved copy written but original not removed: {e}");
        return FixOutcome::failed(
            "move-to-shared",
            format!("copied to {} but failed to remove original: {e}", dest.display()),
        );
    }
    let rewritten = importer_content.replacen(old_statement, new_statement, 1);
    if let Err(e) = std::fs::write(&importer_abs, rewritten) {
        return FixOutcome::failed("move-to-shared", e.to_string());
    }

    debug!(dest = %dest.display(), "module moved to shared layer");
    FixOutcome::ok(
        format!("moved module to {} and rewrote the import", dest.display()),
        vec![
            source
                .strip_prefix(root)
                .unwrap_or(&source)
                .to_path_buf(),
            dest.to_path_buf(),
            importing_file.to_path_buf(),
        ],
    )
}

fn apply_replace(root: &Path, file: &Path, old_statement: &str, new_statement: &str) -> FixOutcome {
    let abs = root.join(file);
    if !is_within_root(root, &abs) {
        return FixOutcome::failed(
            "replace-statement",
            format!("refusing to touch path outside project root: {}", abs.display()),
        );
    }
    let content = match std::fs::read_to_string(&abs) {
        Ok(c) => c,
        Err(e) => return FixOutcome::failed("replace-statement", e.to_string()),
    };
    if !content.contains(old_statement) {
        return FixOutcome::failed(
            "replace-statement",
            "statement no longer present; fix already applied?",
        );
    }
    let rewritten = content.replacen(old_statement, new_statement, 1);
    if let Err(e) = std::fs::write(&abs, rewritten) {
        return FixOutcome::failed("replace-statement", e.to_string());
    }
    FixOutcome::ok("rewrote import statement", vec![file.to_path_buf()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_guard_core::Violation;

    fn layer_violation() -> Violation {
        Violation::new(
            ViolationKind::LayerViolation,
            "src/features/auth/login.ts",
            1,
            1,
            "layer 'features' must not import from layer 'widgets'",
        )
        .with_import("import { Header } from '@/widgets/header'", "@/widgets/header")
        .with_layers(Some("features".to_owned()), Some("widgets".to_owned()))
        .with_allowed_layers(vec!["entities".to_owned(), "shared".to_owned()])
    }

    #[test]
    fn layer_violation_primary_is_move_to_shared() {
        let suggestion = heal(&layer_violation(), &GuardConfig::default(), &Preset::layered());
        assert_eq!(suggestion.primary.label, "move-to-shared");
        assert!(suggestion.primary.auto_fix.is_some());
        assert_eq!(suggestion.alternatives.len(), 3);
    }

    #[test]
    fn circular_dependency_has_no_auto_fix() {
        let v = Violation::new(
            ViolationKind::CircularDependency,
            "src/features/a/index.ts",
            1,
            1,
            "circular",
        );
        let suggestion = heal(&v, &GuardConfig::default(), &Preset::layered());
        assert!(suggestion.primary.auto_fix.is_none());
        assert!(suggestion
            .alternatives
            .iter()
            .all(|o| o.auto_fix.is_none()));
    }

    #[test]
    fn deep_nesting_rewrites_to_public_entry() {
        let v = Violation::new(
            ViolationKind::DeepNesting,
            "src/features/auth/login.ts",
            1,
            1,
            "deep import",
        )
        .with_import(
            "import { schema } from '@/entities/user/model/schema'",
            "@/entities/user/model/schema",
        );
        let suggestion = heal(&v, &GuardConfig::default(), &Preset::layered());
        assert_eq!(suggestion.primary.label, "use-public-entry");
        assert_eq!(
            suggestion.primary.after.as_deref(),
            Some("import { schema } from '@/entities/user'")
        );
    }

    #[test]
    fn context_names_hierarchy_and_allowed_layers() {
        let suggestion = heal(&layer_violation(), &GuardConfig::default(), &Preset::layered());
        assert!(suggestion.context.contains("app -> pages"));
        assert!(suggestion.context.contains("entities, shared"));
    }

    #[test]
    fn public_entry_path_trims_internals() {
        assert_eq!(
            public_entry_path("@/entities/user/model/schema").as_deref(),
            Some("@/entities/user")
        );
        assert_eq!(public_entry_path("@/entities/user"), None);
        assert_eq!(public_entry_path("./relative/deep/path"), None);
    }

    #[test]
    fn containment_rejects_parent_components() {
        let root = Path::new("/project");
        assert!(is_within_root(root, Path::new("/project/src/a.ts")));
        assert!(!is_within_root(root, Path::new("/project/src/../../etc/passwd")));
        assert!(!is_within_root(root, Path::new("/elsewhere/a.ts")));
    }

    #[test]
    fn replace_statement_fails_cleanly_on_missing_file() {
        let fix = AutoFix::ReplaceStatement {
            file: PathBuf::from("src/missing.ts"),
            old_statement: "import x".to_owned(),
            new_statement: "import y".to_owned(),
        };
        let outcome = fix.apply(Path::new("/nonexistent-root"));
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn move_to_shared_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/widgets")).unwrap();
        std::fs::create_dir_all(root.join("src/features/auth")).unwrap();
        std::fs::write(root.join("src/widgets/header.ts"), "export const Header = 1;\n").unwrap();
        std::fs::write(
            root.join("src/features/auth/login.ts"),
            "import { Header } from '@/widgets/header'\n",
        )
        .unwrap();

        let suggestion = heal(&layer_violation(), &GuardConfig::default(), &Preset::layered());
        let fix = suggestion.primary.auto_fix.unwrap();
        let outcome = fix.apply(root);
        assert!(outcome.success, "{:?}", outcome.error);

        assert!(root.join("src/shared/header.ts").is_file());
        assert!(!root.join("src/widgets/header.ts").exists());
        let rewritten =
            std::fs::read_to_string(root.join("src/features/auth/login.ts")).unwrap_or_default();
        assert!(rewritten.contains("@/shared/header"));

        // Second application reports a typed failure, no panic.
        let again = fix.apply(root);
        assert!(!again.success);
    }
}
