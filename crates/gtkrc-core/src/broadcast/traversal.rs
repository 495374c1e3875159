//! Depth-first search for broadcast recipients.
//!
//! Rules, applied from the root down (the root is depth 0):
//!
//! 1. A window carrying `WM_STATE` is a recipient and its subtree is not
//!    descended.
//! 2. Any other window has its children visited at depth + 1.
//! 3. A depth-1 window that is not itself managed and has no managed
//!    descendant is a recipient.
//! 4. A window that cannot be queried is skipped with its whole subtree.

use tracing::debug;

use super::tree::{WindowId, WindowTree};

/// Depth of the root's direct children.
const TOP_LEVEL_DEPTH: usize = 1;

/// Outcome of a traversal from one root window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPlan {
    /// The root the traversal started from.
    pub root: WindowId,
    /// Windows that should receive the message, in visit order.
    pub recipients: Vec<WindowId>,
    /// Number of windows that could not be queried and were skipped.
    pub skipped: usize,
}

impl BroadcastPlan {
    fn new(root: WindowId) -> Self {
        Self {
            root,
            recipients: Vec::new(),
            skipped: 0,
        }
    }

    /// Returns `true` if no window qualifies.
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// Walks the tree under `root` and collects the windows that should receive a
/// broadcast client message.
pub fn plan_broadcast<T: WindowTree + ?Sized>(tree: &mut T, root: WindowId) -> BroadcastPlan {
    let mut plan = BroadcastPlan::new(root);
    visit(tree, root, 0, &mut plan);
    debug!(
        root = %root,
        recipients = plan.recipients.len(),
        skipped = plan.skipped,
        "broadcast plan ready"
    );
    plan
}

/// Returns `true` if `window` or one of its descendants is managed.
fn visit<T: WindowTree + ?Sized>(
    tree: &mut T,
    window: WindowId,
    depth: usize,
    plan: &mut BroadcastPlan,
) -> bool {
    let managed = match tree.is_managed(window) {
        Ok(managed) => managed,
        Err(e) => {
            debug!(window = %window, "skipping window: {e}");
            plan.skipped += 1;
            return false;
        }
    };

    let mut found = false;
    if !managed {
        let children = match tree.children(window) {
            Ok(children) => children,
            Err(e) => {
                debug!(window = %window, "skipping subtree: {e}");
                plan.skipped += 1;
                return false;
            }
        };
        for child in children {
            if visit(tree, child, depth + 1, plan) {
                found = true;
            }
        }
    }

    if managed || (!found && depth == TOP_LEVEL_DEPTH) {
        plan.recipients.push(window);
    }

    managed || found
}

// ── Tests ─────────────────────────────────────────────────────────────────────
