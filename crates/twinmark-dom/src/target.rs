//! Shared render target handed to host engines.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::kind::NodeKind;
use crate::node::Element;

/// Container element a host engine renders into.
///
/// The handle is cheap to clone: hosts may keep a clone to resolve embedded
/// content after their render call has returned, which is why readers take
/// snapshots instead of borrowing.
#[derive(Clone, Debug)]
pub struct RenderTarget {
    root: Arc<Mutex<Element>>,
}

impl RenderTarget {
    /// Create an empty `div` target.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(Element::new(NodeKind::Div))
    }

    /// Create a target around an existing root.
    #[must_use]
    pub fn with_root(root: Element) -> Self {
        Self {
            root: Arc::new(Mutex::new(root)),
        }
    }

    /// Run `f` with mutable access to the root.
    pub fn update<R>(&self, f: impl FnOnce(&mut Element) -> R) -> R {
        f(&mut self.lock())
    }

    /// Run `f` with shared access to the root.
    pub fn read<R>(&self, f: impl FnOnce(&Element) -> R) -> R {
        f(&self.lock())
    }

    /// Clone the current tree.
    #[must_use]
    pub fn snapshot(&self) -> Element {
        self.lock().clone()
    }

    // A panicking host must not wedge the pipeline; the tree is still usable.
    fn lock(&self) -> MutexGuard<'_, Element> {
        self.root.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::new()
    }
}
