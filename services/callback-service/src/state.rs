use std::sync::Arc;

use crate::auth::TokenGuard;
use crate::store::CallbackStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CallbackStore>,
    pub guard: TokenGuard,
}

impl AppState {
    pub fn new(store: CallbackStore, auth_token: Option<String>) -> Self {
        Self {
            store: Arc::new(store),
            guard: TokenGuard::new(auth_token),
        }
    }
}
