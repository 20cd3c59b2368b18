//! Watch mode: one pass at start-up, then one pass per burst of changes in
//! the source library until the process is told to stop.

use crate::error::{ErrorKind, Result};
use booklink_library::Context;
use booklink_library::coordinator::{Coordinator, Trigger, TriggerSender};
use exn::ResultExt;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use std::path::Path;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};

/// Extensions whose changes can alter the mirror.
const WATCHED_EXTENSIONS: [&str; 2] = ["epub", "opf"];

pub async fn run(ctx: &Context, debounce: Duration) -> Result<()> {
    let (triggers, coordinator) = Coordinator::new();
    // Started before the first pass so that changes made during it are not lost.
    let _debouncer = watch(ctx.source.root(), debounce, triggers.clone())?;
    tracing::info!(source = %ctx.source.root().display(), ?debounce, "Watching library for changes");
    if triggers.send(Trigger::Startup).is_err() {
        return Ok(());
    }
    drop(triggers);

    coordinator
        .run(shutdown_signal(), |trigger| async move {
            let report = booklink_library::sync(ctx).await;
            if !report.is_noop() {
                tracing::debug!(%trigger, ?report, "Mirror updated");
            }
        })
        .await;
    Ok(())
}

/// Starts a recursive, debounced watcher on `root`. Events stop as soon as the
/// returned [`Debouncer`] is dropped.
fn watch(root: &Path, debounce: Duration, triggers: TriggerSender) -> Result<Debouncer<RecommendedWatcher>> {
    let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| match result {
        Ok(events) => {
            let total = events.len();
            if let Some(path) = events.into_iter().map(|event| event.path).find(|path| is_relevant(path)) {
                tracing::trace!(path = %path.display(), events = total, "Library changed");
                // The receiver only goes away during shutdown.
                let _ = triggers.send(Trigger::Changed(path));
            }
        },
        Err(e) => tracing::warn!(error = %e, "Filesystem watcher reported an error"),
    })
    .or_raise(|| ErrorKind::Watch(root.to_path_buf()))?;
    debouncer
        .watcher()
        .watch(root, RecursiveMode::Recursive)
        .or_raise(|| ErrorKind::Watch(root.to_path_buf()))?;
    Ok(debouncer)
}

/// A change matters when it touches an e-book or a sidecar, or when the path
/// is gone altogether (a book or author folder was renamed or removed).
fn is_relevant(path: &Path) -> bool {
    let extension = path.extension().and_then(|ext| ext.to_str());
    extension.is_some_and(|ext| WATCHED_EXTENSIONS.contains(&ext)) || !path.exists()
}

/// Resolves on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                tracing::warn!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = terminate => {},
    }
}
