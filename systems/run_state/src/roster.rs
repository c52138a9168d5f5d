//! Registry of handles for the enemies of the current wave.

use arena_director_core::{ActiveEnemyHandle, EnemyId, LivenessProbe};

/// Handles registered by the latest wave that have not been confirmed gone.
#[derive(Clone, Debug, Default)]
pub struct ActiveRoster {
    handles: Vec<ActiveEnemyHandle>,
}

impl ActiveRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every handle, returning the ones previously registered.
    pub fn replace(&mut self, handles: Vec<ActiveEnemyHandle>) -> Vec<ActiveEnemyHandle> {
        std::mem::replace(&mut self.handles, handles)
    }

    /// Removes and returns every handle.
    pub fn drain(&mut self) -> Vec<ActiveEnemyHandle> {
        std::mem::take(&mut self.handles)
    }

    /// Removes the handle for `enemy`, reporting whether one was registered.
    pub fn unregister(&mut self, enemy: EnemyId) -> bool {
        let before = self.handles.len();
        self.handles.retain(|handle| handle.enemy() != enemy);
        self.handles.len() != before
    }

    /// Keeps only handles whose enemy is still present and alive.
    ///
    /// Returns how many handles were dropped.
    pub fn prune<P: LivenessProbe + ?Sized>(&mut self, probe: &P) -> usize {
        let before = self.handles.len();
        self.handles
            .retain(|handle| probe.liveness(handle.enemy()).is_alive());
        before - self.handles.len()
    }

    /// Registered handles in spawn order.
    #[must_use]
    pub fn handles(&self) -> &[ActiveEnemyHandle] {
        &self.handles
    }

    /// Number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Reports whether no handle is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
