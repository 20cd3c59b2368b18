//! Single-flight scheduling of sync passes.
//!
//! Filesystem notifications arrive in bursts, often while a pass is still
//! running (the pass itself is slow on a large library). The [`Coordinator`]
//! guarantees that at most one pass runs at a time and that any number of
//! triggers arriving during a pass collapse into exactly one follow-up pass.
//!
//! ```no_run
//! use booklink_library::coordinator::{Coordinator, Trigger};
//!
//! # async fn example() {
//! let (triggers, coordinator) = Coordinator::new();
//! triggers.send(Trigger::Startup).unwrap();
//! let shutdown = std::future::pending::<()>();
//! coordinator.run(shutdown, |trigger| async move {
//!     println!("sync requested by {trigger}");
//! }).await;
//! # }
//! ```

use derive_more::Display;
use std::future::Future;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Why a pass was requested.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The initial pass when the process starts.
    #[display("startup")]
    Startup,
    /// Something changed under the source root.
    #[display("change to {}", _0.display())]
    Changed(PathBuf),
}

/// Sending half handed to whatever produces [`Trigger`]s. Sending never blocks,
/// so it is safe to call from a non-async watcher callback.
pub type TriggerSender = UnboundedSender<Trigger>;

pub struct Coordinator {
    triggers: UnboundedReceiver<Trigger>,
}
impl Coordinator {
    pub fn new() -> (TriggerSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { triggers: rx })
    }

    /// Waits for the next trigger and folds every other trigger already queued
    /// into it. Returns `None` once every sender has been dropped.
    pub async fn next(&mut self) -> Option<Trigger> {
        let trigger = self.triggers.recv().await?;
        let mut coalesced = 0usize;
        while self.triggers.try_recv().is_ok() {
            coalesced += 1;
        }
        if coalesced > 0 {
            tracing::debug!(%trigger, coalesced, "Coalesced queued sync triggers");
        }
        Some(trigger)
    }

    /// Runs `pass` once per (coalesced) trigger until `shutdown` resolves or
    /// every sender is dropped.
    ///
    /// `shutdown` is only observed between passes: a pass that has started
    /// always runs to completion.
    pub async fn run<S, F, Fut>(mut self, shutdown: S, mut pass: F)
    where
        S: Future,
        F: FnMut(Trigger) -> Fut,
        Fut: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            let trigger = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested; no further syncs will run");
                    break;
                },
                trigger = self.next() => match trigger {
                    Some(trigger) => trigger,
                    None => break,
                },
            };
            tracing::debug!(%trigger, "Starting sync");
            pass(trigger).await;
        }
    }
}
