//! Application state for Axum handlers.

use banquet_core::environment::Environment;
use banquet_core::providers::BanquetStore;

/// Application state shared across all HTTP handlers.
///
/// The store is injected by whoever builds the router: `banquet-server`
/// passes a `PostgresBanquetStore`, the router tests an in-memory one.
///
/// # Examples
///
/// ```ignore
/// async fn handler<S: BanquetStore>(
///     State(state): State<AppState<S>>,
/// ) -> Result<Json<Vec<Customer>>, AppError> {
///     Ok(Json(state.store.list_customers(company_id).await?))
/// }
/// ```
#[derive(Clone, Debug)]
pub struct AppState<S> {
    /// Storage for every component.
    pub store: S,
    /// Clock and password hasher.
    pub env: Environment,
}

impl<S: BanquetStore> AppState<S> {
    /// Create a new application state.
    #[must_use]
    pub const fn new(store: S, env: Environment) -> Self {
        Self { store, env }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banquet_testing::{InMemoryBanquetStore, test_environment};

    #[test]
    fn test_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState<InMemoryBanquetStore>>();
    }

    #[test]
    fn test_state_new() {
        let state = AppState::new(InMemoryBanquetStore::new(), test_environment());
        let _ = state.clone();
    }
}
