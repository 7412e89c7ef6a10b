//! Depth reconstruction from depth-first sample streams
//!
//! Samples arrive in depth-first order with only a direct-children count.
//! Depth is recovered with a stack of pending child counts, one entry per
//! open ancestor subtree. The scan is iterative, so arbitrarily deep threads
//! never grow the call stack.

/// Forward-scan depth reconstructor for one thread's sample stream
#[derive(Debug, Clone, Default)]
pub struct DepthReconstructor {
    /// Children still to be visited, per open ancestor (innermost last)
    pending: Vec<u32>,
}

impl DepthReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth the next sample will be assigned (root = 1)
    pub fn current_depth(&self) -> u32 {
        self.pending.len() as u32 + 1
    }

    /// Assign a depth to the next sample and consume its child count
    ///
    /// A sample with children opens a subtree. A leaf closes every enclosing
    /// subtree whose last child it was, which may be several at once.
    pub fn advance(&mut self, children: u32) -> u32 {
        let depth = self.current_depth();

        if children > 0 {
            self.pending.push(children);
        } else {
            while let Some(remaining) = self.pending.pop() {
                if remaining > 1 {
                    self.pending.push(remaining - 1);
                    break;
                }
            }
        }

        depth
    }

    /// Number of ancestor subtrees still open
    pub fn open_subtrees(&self) -> usize {
        self.pending.len()
    }

    /// True when every opened subtree has been closed
    pub fn is_balanced(&self) -> bool {
        self.pending.is_empty()
    }

    /// Discard any leftover state at a thread boundary
    ///
    /// Returns the number of subtrees that were still open.
    pub fn reset(&mut self) -> usize {
        let open = self.pending.len();
        self.pending.clear();
        open
    }
}

/// Reconstruct depths for a whole stream of child counts
pub fn reconstruct_depths<I>(children: I) -> Vec<u32>
where
    I: IntoIterator<Item = u32>,
{
    let mut depths = DepthReconstructor::new();
    children.into_iter().map(|c| depths.advance(c)).collect()
}
