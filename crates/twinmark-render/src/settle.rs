//! Waiting for asynchronous host work to finish.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use twinmark_dom::embed::count_unresolved;
use twinmark_dom::{RenderTarget, inner_html};

/// Poll cadence and deadline of [`wait_for_settle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettleOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for SettleOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(16),
            timeout: Duration::from_millis(500),
        }
    }
}

/// How a settle wait ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Two consecutive polls saw the same tree.
    Stable { polls: u32 },
    /// The deadline passed first; the tree is used as is.
    TimedOut,
}

#[derive(PartialEq, Eq)]
struct Snapshot {
    html: String,
    unresolved: usize,
}

fn snapshot(target: &RenderTarget) -> Snapshot {
    target.read(|root| Snapshot {
        html: inner_html(root),
        unresolved: count_unresolved(root),
    })
}

/// Poll `target` until it stops changing or the timeout elapses.
pub async fn wait_for_settle(target: &RenderTarget, options: SettleOptions) -> SettleOutcome {
    let deadline = Instant::now() + options.timeout;
    let mut previous = snapshot(target);
    let mut polls = 0;

    while Instant::now() < deadline {
        sleep(options.interval).await;
        polls += 1;

        let current = snapshot(target);
        if current == previous {
            return SettleOutcome::Stable { polls };
        }
        previous = current;
    }

    tracing::debug!(
        timeout_ms = options.timeout.as_millis(),
        unresolved = previous.unresolved,
        "Host render did not settle, using current tree"
    );
    SettleOutcome::TimedOut
}
