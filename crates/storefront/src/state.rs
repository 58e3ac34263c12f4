//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use golden_fig_commerce::recommendations::ScoredProduct;
use golden_fig_core::ProductId;

use crate::config::StorefrontConfig;
use crate::stripe::StripeClient;

/// TTL for cached recommendation lists.
const RECOMMENDATION_CACHE_TTL: Duration = Duration::from_secs(60);

/// Maximum number of cached recommendation lists.
const RECOMMENDATION_CACHE_CAPACITY: u64 = 10_000;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the Stripe client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    stripe: StripeClient,
    recommendation_cache: Cache<ProductId, Arc<Vec<ScoredProduct>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let stripe = StripeClient::new(&config.stripe);
        let recommendation_cache = Cache::builder()
            .max_capacity(RECOMMENDATION_CACHE_CAPACITY)
            .time_to_live(RECOMMENDATION_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stripe,
                recommendation_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Stripe API client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Get a reference to the recommendation cache.
    #[must_use]
    pub fn recommendation_cache(&self) -> &Cache<ProductId, Arc<Vec<ScoredProduct>>> {
        &self.inner.recommendation_cache
    }
}
