//! Background work started from the UI thread.
//!
//! Generation cycles and headline prefetches run as tokio tasks and report
//! back over an unbounded [`mpsc`] channel that the main loop drains on every
//! tick. The UI thread never awaits anything itself.
//!
//! ## For contributors
//!
//! Tasks own clones of the `Arc`s they need and a clone of the sender. If the
//! receiver is gone the main loop has exited; sends fail silently and the
//! task finishes on its own.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::locale::Category;
use crate::pipeline::{Generator, Outcome, PipelineEvent, Request};

pub type EventSender = mpsc::UnboundedSender<PipelineEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<PipelineEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Start a generation cycle. Rejected cycles finish immediately with no
/// events.
pub fn spawn_generation(
    generator: Arc<Generator>,
    request: Request,
    tx: EventSender,
) -> JoinHandle<Outcome> {
    tokio::spawn(async move { generator.generate(request, &tx).await })
}

/// Drop the cached pool and warm it for a new selection, then toast
/// `announcement` if there is one.
pub fn spawn_prefetch(
    generator: Arc<Generator>,
    category: Category,
    country: String,
    announcement: Option<String>,
    tx: EventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let cache = generator.cache();
        cache.invalidate();
        let items = cache.ensure(category, &country).await;
        tracing::debug!(%category, %country, count = items.len(), "prefetched headlines");
        if let Some(text) = announcement {
            let _ = tx.send(PipelineEvent::Toast(text));
        }
    })
}
