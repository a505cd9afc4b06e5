//! Watch-mode command: notify-fed events on top of the debounce scheduler.

use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher as _};

use layer_guard_engine::watch::{render_check, WatchEvent, Watcher};

use crate::OutputFormat;

/// How often the debounce deadlines are polled between filesystem events.
const POLL_INTERVAL_MS: u64 = 50;

/// Runs the watch command. Blocks until the event stream closes.
pub fn run(path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = crate::config_resolver::load(path, config_path)?;
    let realtime_format = config.realtime_format;
    let src = path.join(&config.src_dir);

    let mut watcher = Watcher::new(path, config).context("configuration rejected")?;

    // Prime the cache and show the current state before going incremental.
    let report = watcher.scan_all();
    super::output::print(&report, OutputFormat::Text)?;
    tracing::info!("watching {} for changes", src.display());

    let (tx, rx) = mpsc::channel();
    let mut fs_watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("failed to create filesystem watcher")?;
    fs_watcher
        .watch(&src, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", src.display()))?;

    loop {
        match rx.recv_timeout(Duration::from_millis(POLL_INTERVAL_MS)) {
            Ok(Ok(event)) => {
                let now = Instant::now();
                for watch_event in translate(event) {
                    watcher.handle_event(watch_event, now);
                }
            }
            Ok(Err(e)) => tracing::warn!("watch error: {e}"),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        for check in watcher.drain_due(Instant::now()) {
            let rendered = render_check(realtime_format, &check);
            if !rendered.is_empty() {
                println!("{rendered}");
            }
        }
    }

    watcher.stop();
    Ok(())
}

/// Maps a notify event onto watcher events, one per affected path.
fn translate(event: notify::Event) -> Vec<WatchEvent> {
    use notify::EventKind;

    event
        .paths
        .into_iter()
        .filter_map(|path| match event.kind {
            EventKind::Create(_) => Some(WatchEvent::Add(path)),
            EventKind::Modify(_) => Some(WatchEvent::Change(path)),
            EventKind::Remove(_) => Some(WatchEvent::Unlink(path)),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn translate_maps_kinds_per_path() {
        let event = notify::Event {
            kind: notify::EventKind::Modify(notify::event::ModifyKind::Any),
            paths: vec![PathBuf::from("/p/a.ts"), PathBuf::from("/p/b.ts")],
            attrs: notify::event::EventAttributes::default(),
        };
        let events = translate(event);
        assert_eq!(
            events,
            vec![
                WatchEvent::Change(PathBuf::from("/p/a.ts")),
                WatchEvent::Change(PathBuf::from("/p/b.ts")),
            ]
        );
    }

    #[test]
    fn access_events_are_dropped() {
        let event = notify::Event {
            kind: notify::EventKind::Access(notify::event::AccessKind::Any),
            paths: vec![PathBuf::from("/p/a.ts")],
            attrs: notify::event::EventAttributes::default(),
        };
        assert!(translate(event).is_empty());
    }
}
