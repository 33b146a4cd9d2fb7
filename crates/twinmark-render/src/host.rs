//! Host engine contract.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use twinmark_dom::RenderTarget;

use crate::error::HostError;

/// Application handle passed to hosts exposing the generic entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostApp {
    pub name: String,
}

impl HostApp {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for HostApp {
    fn default() -> Self {
        Self::new("twinmark")
    }
}

/// Owner of the work a host starts during one render.
///
/// Created per native render and dropped once the tree is transcoded;
/// tasks still running at that point are aborted.
#[derive(Debug, Default)]
pub struct Component {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Component {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` on the current runtime, bound to this component.
    pub fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) {
        let handle = tokio::spawn(task);
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Number of tasks that have not finished yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }
}

impl Drop for Component {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

/// External Markdown engine rendering into a [`RenderTarget`].
///
/// Both entry points are optional; an engine returns `None` from the ones
/// it does not provide. Engines may keep clones of the target and keep
/// mutating it from tasks spawned on the [`Component`].
#[async_trait]
pub trait HostEngine: Send + Sync {
    /// Render `markdown` into `target`.
    async fn render_markdown(
        &self,
        _markdown: &str,
        _target: &RenderTarget,
        _source_path: &str,
        _component: &Component,
    ) -> Option<Result<(), HostError>> {
        None
    }

    /// Generic entry point taking the application handle.
    async fn render(
        &self,
        _app: &HostApp,
        _markdown: &str,
        _target: &RenderTarget,
        _source_path: &str,
        _component: &Component,
    ) -> Option<Result<(), HostError>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending_tasks() {
        let component = Component::new();
        let (tx, mut rx) = tokio::sync::oneshot::channel::<()>();
        component.spawn(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = tx.send(());
        });
        assert_eq!(component.pending(), 1);

        drop(component);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_default_entry_points_absent() {
        struct Bare;
        impl HostEngine for Bare {}

        let target = RenderTarget::new();
        let component = Component::new();
        assert!(
            Bare.render_markdown("x", &target, "", &component)
                .await
                .is_none()
        );
        assert!(
            Bare.render(&HostApp::default(), "x", &target, "", &component)
                .await
                .is_none()
        );
    }
}
