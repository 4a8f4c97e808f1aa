//! Feature and agent invocation surface.
//!
//! One POST route per (provider prefix × feature) pair, generated from the
//! static feature table at startup. `/features/...` runs a bare chain,
//! `/agent/...` additionally binds the feature's tool set.

use axum::{
    Json, Router,
    extract::State,
    routing::post,
};
use llm_kit::Provider;
use tracing::info;

pub mod error;
pub mod features;
pub mod handlers;
pub mod state;
pub mod types;

pub use error::{ErrorResponse, FeatureError};
pub use features::{FEATURES, FeatureSpec, feature};
pub use state::AppState;
pub use types::DataRequest;

/// Build the feature router. An unregistered provider prefix or feature name
/// is a 404 because no route was generated for it.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new();

    for provider in Provider::ALL {
        for feature in FEATURES {
            router = router.route(
                &format!("/features/{}/{}", provider.route_prefix(), feature.name),
                post(move |State(state): State<AppState>, Json(body): Json<DataRequest>| {
                    handlers::invoke_chain(provider, feature, state, body)
                }),
            );
            router = router.route(
                &format!("/agent/{}/{}", provider.route_prefix(), feature.name),
                post(move |State(state): State<AppState>, Json(body): Json<DataRequest>| {
                    handlers::invoke_agent(provider, feature, state, body)
                }),
            );
        }
    }

    info!(
        providers = Provider::ALL.len(),
        features = FEATURES.len(),
        "Registered feature routes"
    );

    router.with_state(state)
}
