//! Mode → upstream routing table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::dialog::{Mode, UpstreamKind, UpstreamTarget};
use crate::ports::UpstreamAdapter;

/// A configured upstream and the adapter that calls it.
#[derive(Clone)]
pub struct UpstreamRoute {
    pub target: UpstreamTarget,
    pub adapter: Arc<dyn UpstreamAdapter>,
}

/// Which adapter answers each mode.
///
/// A mode with no route is recognized but unavailable.
#[derive(Clone, Default)]
pub struct UpstreamRegistry {
    routes: HashMap<Mode, UpstreamRoute>,
}

impl UpstreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds routes from configured targets, picking the adapter by kind.
    pub fn from_targets(
        targets: HashMap<Mode, UpstreamTarget>,
        local_model: Arc<dyn UpstreamAdapter>,
        remote_forward: Arc<dyn UpstreamAdapter>,
    ) -> Self {
        let mut registry = Self::new();
        for (mode, target) in targets {
            let adapter = match target.kind {
                UpstreamKind::LocalModel => Arc::clone(&local_model),
                UpstreamKind::RemoteForward => Arc::clone(&remote_forward),
            };
            registry.register(mode, target, adapter);
        }
        registry
    }

    pub fn register(
        &mut self,
        mode: Mode,
        target: UpstreamTarget,
        adapter: Arc<dyn UpstreamAdapter>,
    ) -> &mut Self {
        self.routes.insert(mode, UpstreamRoute { target, adapter });
        self
    }

    pub fn route(&self, mode: Mode) -> Option<&UpstreamRoute> {
        self.routes.get(&mode)
    }

    /// Modes that currently have an upstream, in id order.
    pub fn available_modes(&self) -> Vec<Mode> {
        Mode::ALL
            .into_iter()
            .filter(|m| self.routes.contains_key(m))
            .collect()
    }
}
