//! Application state for the API server.

use std::sync::Arc;

use super::notifier::ChangeNotifier;
use crate::execution::{ExecutionFacade, LlmClient, ToolTransport};
use crate::resolve::Resolver;
use crate::store::ConfigStore;

/// Shared application state.
///
/// Generic over the store, transport, and LLM client so tests can inject
/// doubles without dynamic dispatch. Dependencies are injected via
/// constructor, not created internally.
pub struct AppState<S: ConfigStore, T: ToolTransport, L: LlmClient> {
    store: Arc<S>,
    facade: ExecutionFacade<S, T, L>,
    notifier: ChangeNotifier,
}

// Manual Clone impl - the generics themselves need not be Clone, only the
// Arcs inside.
impl<S: ConfigStore, T: ToolTransport, L: LlmClient> Clone for AppState<S, T, L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            facade: self.facade.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<S: ConfigStore, T: ToolTransport, L: LlmClient> AppState<S, T, L> {
    pub fn new(store: Arc<S>, transport: Arc<T>, llm: Arc<L>, notifier: ChangeNotifier) -> Self {
        Self {
            facade: ExecutionFacade::new(Arc::clone(&store), transport, llm),
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_arc(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    pub fn facade(&self) -> &ExecutionFacade<S, T, L> {
        &self.facade
    }

    pub fn resolver(&self) -> &Resolver<S> {
        self.facade.resolver()
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}
