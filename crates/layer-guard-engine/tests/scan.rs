//! End-to-end scans over real temp-dir projects.

use std::path::Path;

use layer_guard_core::{GuardConfig, Severity, ViolationKind};
use layer_guard_engine::heal::heal;
use layer_guard_engine::watch::Watcher;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn composite_project_reports_every_violation_kind_planted() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(root, "src/shared/format.ts", "export const fmt = 1;\n");
    write(root, "src/shared/internal/secrets.ts", "export const k = 1;\n");
    write(root, "src/server/db.ts", "export const db = 1;\n");
    write(root, "src/entities/user/index.ts", "export const user = 1;\n");
    write(
        root,
        "src/entities/user/model/schema.ts",
        "export const schema = 1;\n",
    );
    // Upward import, plus a deep reach into another slice's internals.
    write(
        root,
        "src/features/auth/login.ts",
        "import { Header } from '@/widgets/header'\n\
         import { schema } from '@/entities/user/model/schema'\n",
    );
    // Cross-slice coupling inside one layer.
    write(
        root,
        "src/features/cart/add.ts",
        "import { login } from '@/features/auth/login'\n",
    );
    // Client-side layer reaching the server-only layer.
    write(
        root,
        "src/widgets/header.ts",
        "import { db } from '@/server/db'\n",
    );
    // Two modules importing each other.
    write(
        root,
        "src/entities/order/index.ts",
        "import { links } from '../user/links'\nexport const order = 1;\n",
    );
    write(
        root,
        "src/entities/user/links.ts",
        "import { order } from '../order'\nexport const links = 1;\n",
    );

    let config = GuardConfig::parse("preset = \"composite\"").unwrap();
    let mut watcher = Watcher::new(root, config).unwrap();
    let report = watcher.scan_all();

    let kinds: Vec<ViolationKind> = report.violations.iter().map(|v| v.kind).collect();
    assert!(kinds.contains(&ViolationKind::LayerViolation), "{kinds:?}");
    assert!(kinds.contains(&ViolationKind::DeepNesting), "{kinds:?}");
    assert!(kinds.contains(&ViolationKind::CrossSlice), "{kinds:?}");
    assert!(kinds.contains(&ViolationKind::InvalidSharedSegment), "{kinds:?}");
    assert!(kinds.contains(&ViolationKind::CircularDependency), "{kinds:?}");

    // The cycle is one violation for the pair, not one per direction.
    assert_eq!(report.by_kind[&ViolationKind::CircularDependency], 1);

    // widgets -> server trips the server-only rule.
    let env = report
        .violations
        .iter()
        .find(|v| v.to_layer.as_deref() == Some("server"))
        .expect("server-only violation");
    assert_eq!(env.kind, ViolationKind::LayerViolation);
    assert_eq!(env.from_layer.as_deref(), Some("widgets"));

    assert!(report.has_errors());
}

#[test]
fn severity_overrides_flow_through_to_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "src/widgets/header.ts", "export const Header = 1;\n");
    write(
        root,
        "src/features/auth/login.ts",
        "import { Header } from '@/widgets/header'\n",
    );

    let config = GuardConfig::parse(
        "preset = \"layered\"\n\n[severity]\n\"layer-violation\" = \"warning\"\n",
    )
    .unwrap();
    let mut watcher = Watcher::new(root, config).unwrap();
    let report = watcher.scan_all();

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].severity, Severity::Warning);
    assert!(!report.has_errors());
    assert_eq!(report.by_severity.warnings, 1);
}

#[test]
fn applying_the_primary_fix_makes_the_rescan_clean() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "src/widgets/header.ts", "export const Header = 1;\n");
    write(
        root,
        "src/features/auth/login.ts",
        "import { Header } from '@/widgets/header'\n",
    );

    let config = GuardConfig::default();
    let mut watcher = Watcher::new(root, config.clone()).unwrap();
    let report = watcher.scan_all();
    assert_eq!(report.violations.len(), 1);

    let suggestion = heal(&report.violations[0], &config, watcher.preset());
    let fix = suggestion.primary.auto_fix.expect("layer violation is auto-fixable");
    let outcome = fix.apply(root);
    assert!(outcome.success, "{:?}", outcome.error);

    let mut fresh = Watcher::new(root, GuardConfig::default()).unwrap();
    let rescan = fresh.scan_all();
    assert!(rescan.violations.is_empty(), "{:?}", rescan.violations);
}

#[test]
fn excluded_globs_and_unreadable_entries_do_not_fail_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "src/shared/util.ts", "export const u = 1;\n");
    write(
        root,
        "src/shared/util.test.ts",
        "import { Header } from '@/widgets/header'\n",
    );
    write(
        root,
        "src/shared/util.spec.tsx",
        "import { Header } from '@/widgets/header'\n",
    );

    let mut watcher = Watcher::new(root, GuardConfig::default()).unwrap();
    let report = watcher.scan_all();
    assert_eq!(report.files_analyzed, 1);
    assert!(report.violations.is_empty());
}
