//! Call hierarchy tracking during a forward scan of one thread
//!
//! Keeps the most recently seen marker at each depth. The caller of a marker
//! at depth `d` is whatever occupies depth `d - 1` at the moment the marker is
//! visited. Entries are overwritten, never appended, and the tracker must be
//! reset at every thread boundary.

use crate::model::Marker;

#[derive(Debug, Clone, Default)]
pub struct CallHierarchy {
    /// Latest marker per depth, indexed by `depth - 1`
    latest: Vec<Option<Marker>>,
}

impl CallHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; call at the start of each thread
    pub fn reset(&mut self) {
        self.latest.clear();
    }

    /// Record `marker` as the latest occupant of its depth
    pub fn visit(&mut self, marker: &Marker) {
        let Some(slot) = (marker.depth as usize).checked_sub(1) else {
            return;
        };
        if self.latest.len() <= slot {
            self.latest.resize(slot + 1, None);
        }
        self.latest[slot] = Some(*marker);
    }

    /// Most recent marker seen at `depth`, if any
    pub fn at_depth(&self, depth: u32) -> Option<&Marker> {
        let slot = (depth as usize).checked_sub(1)?;
        self.latest.get(slot)?.as_ref()
    }

    /// Direct caller of a marker at `depth`
    ///
    /// `None` at depth 1, or when nothing has been seen one level up yet.
    pub fn caller_of(&self, depth: u32) -> Option<&Marker> {
        self.at_depth(depth.checked_sub(1)?)
    }
}
