//! Content availability for sections whose subtree depends on fetched data.
//!
//! The reveal core only cares whether the subtree exists. A section that is
//! still loading (or failed) has no subtree to animate; once data arrives
//! the host mounts a fresh [`Reveal`](crate::motion::reveal::Reveal), and
//! when it goes away the host unmounts it.

/// Result of a content fetch, as the host's data layer reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentState<T> {
    /// Fetched data, if any has arrived.
    pub data: Option<T>,
    /// First load in progress.
    pub loading: bool,
    /// Any fetch (including background refresh) in progress.
    pub is_fetching: bool,
    /// Last fetch error, as display text.
    pub error: Option<String>,
}

impl<T> Default for ContentState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            is_fetching: true,
            error: None,
        }
    }
}

impl<T> ContentState<T> {
    /// Loaded content.
    pub fn ready(data: T) -> Self {
        Self {
            data: Some(data),
            loading: false,
            is_fetching: false,
            error: None,
        }
    }

    /// A failed fetch.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            data: None,
            loading: false,
            is_fetching: false,
            error: Some(error.into()),
        }
    }

    /// Whether the section's subtree is rendered.
    ///
    /// Stale data shown during a background refresh still counts; a section
    /// with an error and no data does not.
    pub fn subtree_exists(&self) -> bool {
        self.data.is_some()
    }
}

/// A change in subtree existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceChange {
    /// The subtree was rendered; mount a reveal for it.
    Appeared,
    /// The subtree was removed; unmount its reveal.
    Disappeared,
}

/// Turns successive [`ContentState`]s into mount/unmount edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentPresence {
    present: bool,
}

impl ContentPresence {
    /// Record the latest state. Returns an edge only when existence changed.
    pub fn update<T>(&mut self, state: &ContentState<T>) -> Option<PresenceChange> {
        let exists = state.subtree_exists();
        if exists == self.present {
            return None;
        }
        self.present = exists;
        if let Some(error) = &state.error {
            log::debug!("content gone after fetch error: {error}");
        }
        Some(if exists {
            PresenceChange::Appeared
        } else {
            PresenceChange::Disappeared
        })
    }

    /// Whether the subtree currently exists.
    pub fn is_present(&self) -> bool {
        self.present
    }
}
