//! Static analysis engine for architecture conformance.
//!
//! The pipeline: [`lexer`] tokenizes JavaScript/TypeScript source,
//! [`extract`] pulls import and export statements out of the token
//! stream, [`resolve`] maps files and import specifiers onto layers,
//! [`validate`] applies the layer topology rules, [`suggest`] and
//! [`heal`] produce remediation, and [`watch`] drives one-shot scans
//! and debounced incremental rechecks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod extract;
pub mod heal;
pub mod lexer;
pub mod resolve;
pub mod suggest;
pub mod validate;
pub mod watch;

pub use analyzer::{AnalyzeError, FileAnalysis, FileAnalyzer};
pub use extract::{
    ExportInfo, ExportKind, ImportExtractor, ImportInfo, ImportKind, RegexExtractor,
    TokenExtractor,
};
pub use heal::{AutoFix, FixOutcome, HealingOption, HealingSuggestion, heal};
pub use resolve::{ImportClass, ImportResolution, PathResolver};
pub use validate::Validator;
pub use watch::{FileCheck, WatchEvent, Watcher, render_check};
