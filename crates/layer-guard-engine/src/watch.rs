//! One-shot scanning and incremental watch-mode rechecking.
//!
//! The [`Watcher`] is deliberately free of threads and OS file-watching:
//! callers feed it [`WatchEvent`]s and poll [`Watcher::drain_due`] with an
//! explicit clock. Debouncing is a deadline map, so a burst of change
//! events for one file collapses into a single recheck. The binary wires
//! a real notify backend on top; tests drive time directly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use layer_guard_core::{GuardConfig, Preset, Violation, ViolationReport};
use layer_guard_core::config::{ConfigError, RealtimeFormat};

use crate::analyzer::{FileAnalysis, FileAnalyzer};
use crate::resolve::PathResolver;
use crate::validate::Validator;

/// A filesystem event fed into the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file appeared.
    Add(PathBuf),
    /// A file's content changed.
    Change(PathBuf),
    /// A file was removed or renamed away.
    Unlink(PathBuf),
}

/// Violations found when one file was rechecked.
#[derive(Debug)]
pub struct FileCheck {
    /// The rechecked file, as it was handed to the analyzer.
    pub file: PathBuf,
    /// Violations in that file, empty when it came back clean.
    pub violations: Vec<Violation>,
}

/// Scans a project tree and incrementally rechecks changed files.
///
/// Owns its analysis cache; two watcher instances never share state.
pub struct Watcher {
    config: GuardConfig,
    preset: Preset,
    resolver: PathResolver,
    analyzer: FileAnalyzer,
    root: PathBuf,
    exclude: Vec<glob::Pattern>,
    cache: HashMap<PathBuf, FileAnalysis>,
    pending: HashMap<PathBuf, Instant>,
    closed: bool,
}

impl Watcher {
    /// Builds a watcher for the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error when the config names an unknown preset or fails
    /// validation.
    pub fn new(root: impl Into<PathBuf>, config: GuardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let root = root.into();
        let preset = config.resolve_preset()?;
        let resolver = PathResolver::new(&root, &config.src_dir, &preset);
        let exclude = config
            .exclude
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect();
        Ok(Self {
            config,
            preset,
            resolver,
            analyzer: FileAnalyzer::new(),
            root,
            exclude,
            cache: HashMap::new(),
            pending: HashMap::new(),
            closed: false,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// The resolved layer topology.
    #[must_use]
    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// Analyzes every watched file under the source directory and returns
    /// a full report, priming the cache along the way.
    ///
    /// Unreadable files are logged and skipped, never fatal.
    pub fn scan_all(&mut self) -> ViolationReport {
        let started = Instant::now();
        let files = self.discover();
        info!(files = files.len(), preset = %self.preset.name, "scanning project");

        let mut analyses = Vec::with_capacity(files.len());
        for path in &files {
            match self.analyzer.analyze(&self.resolver, path) {
                Ok(analysis) => analyses.push(analysis),
                Err(e) => warn!("skipping unreadable file: {e}"),
            }
        }

        let validator = Validator::new(&self.config, &self.preset, &self.resolver);
        let mut violations = Vec::new();
        for analysis in &analyses {
            violations.extend(validator.check_file(analysis));
        }
        violations.extend(validator.check_circular(&analyses));

        let files_analyzed = analyses.len();
        if self.config.cache_enabled {
            self.cache = analyses
                .into_iter()
                .map(|a| (a.file_path.clone(), a))
                .collect();
        }

        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        ViolationReport::build(violations, files_analyzed, elapsed)
    }

    /// Records a filesystem event.
    ///
    /// Add and change are debounced: the file's recheck deadline moves to
    /// `now + debounce_ms`, so rapid successive events collapse. Unlink
    /// takes effect immediately, evicting the file from cache and pending.
    pub fn handle_event(&mut self, event: WatchEvent, now: Instant) {
        if self.closed {
            return;
        }
        match event {
            WatchEvent::Add(path) | WatchEvent::Change(path) => {
                if !self.is_watched(&path) {
                    return;
                }
                let deadline = now + Duration::from_millis(self.config.debounce_ms);
                self.pending.insert(path, deadline);
            }
            WatchEvent::Unlink(path) => {
                self.pending.remove(&path);
                if self.cache.remove(&path).is_some() {
                    debug!(file = %path.display(), "evicted removed file");
                }
            }
        }
    }

    /// Rechecks every pending file whose deadline has passed.
    ///
    /// Single-file rechecks skip the circular pass; that requires global
    /// state and runs only in [`Watcher::scan_all`]. A file whose analysis
    /// is unchanged from the cache yields no entry.
    pub fn drain_due(&mut self, now: Instant) -> Vec<FileCheck> {
        if self.closed {
            self.pending.clear();
            return Vec::new();
        }
        let due: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();

        let mut checks = Vec::new();
        for path in due {
            self.pending.remove(&path);
            if let Some(check) = self.recheck(&path) {
                checks.push(check);
            }
        }
        checks.sort_by(|a, b| a.file.cmp(&b.file));
        checks
    }

    /// Whether any files are still awaiting their debounce deadline.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drops all cached analyses; the next recheck of any file starts cold.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Shuts the watcher down: later events and drains are no-ops.
    pub fn stop(&mut self) {
        self.closed = true;
        self.pending.clear();
        self.cache.clear();
        info!("watcher stopped");
    }

    fn recheck(&mut self, path: &Path) -> Option<FileCheck> {
        let analysis = match self.analyzer.analyze(&self.resolver, path) {
            Ok(a) => a,
            Err(e) => {
                // The file may have vanished between the event and the
                // deadline; treat it like an unlink.
                warn!("recheck failed, evicting: {e}");
                self.cache.remove(path);
                return None;
            }
        };

        if self.config.cache_enabled {
            if let Some(cached) = self.cache.get(path) {
                if cached.same_content(&analysis) {
                    debug!(file = %path.display(), "unchanged, skipping recheck");
                    return None;
                }
            }
        }

        let validator = Validator::new(&self.config, &self.preset, &self.resolver);
        let violations = validator.check_file(&analysis);
        let file = analysis.file_path.clone();
        if self.config.cache_enabled {
            self.cache.insert(file.clone(), analysis);
        }
        Some(FileCheck { file, violations })
    }

    fn is_watched(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !self.config.watches_extension(ext) {
            return false;
        }
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        !self.exclude.iter().any(|p| p.matches(&rel_str))
    }

    fn discover(&self) -> Vec<PathBuf> {
        let base = self.root.join(&self.config.src_dir);
        let mut files = Vec::new();
        for entry in ignore::WalkBuilder::new(&base).hidden(false).build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("walk error: {e}");
                    continue;
                }
            };
            let path = entry.path();
            if entry.file_type().is_some_and(|t| t.is_file()) && self.is_watched(path) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        files
    }
}

/// Renders one realtime file-check result in the configured format.
#[must_use]
pub fn render_check(format: RealtimeFormat, check: &FileCheck) -> String {
    match format {
        RealtimeFormat::Console => {
            if check.violations.is_empty() {
                format!("\u{2713} {} clean", check.file.display())
            } else {
                let mut out = format!(
                    "\u{2717} {}: {} violation(s)\n",
                    check.file.display(),
                    check.violations.len()
                );
                for v in &check.violations {
                    out.push_str(&format!("  {}\n", v.format()));
                }
                out
            }
        }
        RealtimeFormat::Agent => {
            // Line-oriented, grep-friendly output for tooling that tails
            // the stream.
            check
                .violations
                .iter()
                .map(|v| {
                    format!(
                        "VIOLATION {} {}:{}:{} {}",
                        v.kind.rule_name(),
                        v.file.display(),
                        v.line,
                        v.column,
                        v.message
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        RealtimeFormat::Json => serde_json::json!({
            "file": check.file,
            "violations": check.violations,
        })
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> (tempfile::TempDir, Watcher) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/shared/format.ts", "export const fmt = 1;\n");
        write(
            root,
            "src/entities/user/index.ts",
            "import { fmt } from '@/shared/format'\nexport const user = 1;\n",
        );
        write(
            root,
            "src/features/auth/login.ts",
            "import { user } from '@/entities/user'\n",
        );
        let watcher = Watcher::new(root, GuardConfig::default()).unwrap();
        (dir, watcher)
    }

    #[test]
    fn scan_all_passes_clean_project() {
        let (_dir, mut watcher) = project();
        let report = watcher.scan_all();
        assert_eq!(report.files_analyzed, 3);
        assert!(report.violations.is_empty(), "{:?}", report.violations);
    }

    #[test]
    fn scan_all_reports_upward_import() {
        let (dir, mut watcher) = project();
        write(
            dir.path(),
            "src/features/auth/panel.ts",
            "import { Header } from '@/widgets/header'\n",
        );
        write(dir.path(), "src/widgets/header.ts", "export const Header = 1;\n");
        let report = watcher.scan_all();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].from_layer.as_deref(), Some("features"));
        assert_eq!(report.violations[0].to_layer.as_deref(), Some("widgets"));
    }

    #[test]
    fn burst_of_events_collapses_to_one_recheck() {
        let (dir, mut watcher) = project();
        watcher.scan_all();
        let file = dir.path().join("src/features/auth/login.ts");
        write(
            dir.path(),
            "src/features/auth/login.ts",
            "import { Header } from '@/widgets/header'\n",
        );

        let t0 = Instant::now();
        for i in 0..5 {
            watcher.handle_event(
                WatchEvent::Change(file.clone()),
                t0 + Duration::from_millis(i * 10),
            );
        }
        // Still inside the debounce window of the last event.
        assert!(watcher
            .drain_due(t0 + Duration::from_millis(60))
            .is_empty());

        let checks = watcher.drain_due(t0 + Duration::from_millis(200));
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].violations.len(), 1);
        assert!(!watcher.has_pending());
    }

    #[test]
    fn unchanged_file_yields_no_check() {
        let (dir, mut watcher) = project();
        watcher.scan_all();
        let file = dir.path().join("src/features/auth/login.ts");
        let t0 = Instant::now();
        watcher.handle_event(WatchEvent::Change(file), t0);
        let checks = watcher.drain_due(t0 + Duration::from_millis(200));
        assert!(checks.is_empty());
    }

    #[test]
    fn unlink_evicts_immediately() {
        let (dir, mut watcher) = project();
        watcher.scan_all();
        let file = dir.path().join("src/features/auth/login.ts");
        watcher.handle_event(WatchEvent::Change(file.clone()), Instant::now());
        watcher.handle_event(WatchEvent::Unlink(file), Instant::now());
        assert!(!watcher.has_pending());
        let checks = watcher.drain_due(Instant::now() + Duration::from_secs(10));
        assert!(checks.is_empty());
    }

    #[test]
    fn stopped_watcher_ignores_events() {
        let (dir, mut watcher) = project();
        watcher.scan_all();
        watcher.stop();
        let file = dir.path().join("src/features/auth/login.ts");
        watcher.handle_event(WatchEvent::Change(file), Instant::now());
        assert!(!watcher.has_pending());
        assert!(watcher
            .drain_due(Instant::now() + Duration::from_secs(10))
            .is_empty());
    }

    #[test]
    fn excluded_and_unwatched_paths_are_ignored() {
        let (dir, mut watcher) = project();
        watcher.scan_all();
        let t0 = Instant::now();
        watcher.handle_event(
            WatchEvent::Change(dir.path().join("src/notes.md")),
            t0,
        );
        watcher.handle_event(
            WatchEvent::Change(dir.path().join("node_modules/pkg/index.ts")),
            t0,
        );
        assert!(!watcher.has_pending());
    }

    #[test]
    fn render_agent_is_line_oriented() {
        let check = FileCheck {
            file: PathBuf::from("src/a.ts"),
            violations: vec![Violation::new(
                layer_guard_core::ViolationKind::LayerViolation,
                "src/a.ts",
                3,
                1,
                "layer 'features' must not import from layer 'widgets'",
            )],
        };
        let out = render_check(RealtimeFormat::Agent, &check);
        assert!(out.starts_with("VIOLATION layer-dependency src/a.ts:3:1"), "{out}");
    }

    #[test]
    fn render_json_is_parseable() {
        let check = FileCheck {
            file: PathBuf::from("src/a.ts"),
            violations: Vec::new(),
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&render_check(RealtimeFormat::Json, &check)).unwrap();
        assert_eq!(parsed["file"], "src/a.ts");
    }
}
