//! Administrative surface of the Varco gateway.
//!
//! CRUD routes under `/backoffice` for agent configs, prompt frameworks,
//! key/value configuration, and the tool registry. All persistence goes
//! through [`vc_remote_db::DatabaseManager`].

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use vc_remote_db::DatabaseManager;

pub mod error;
pub mod handlers;
pub mod types;

pub use error::{BackofficeError, ErrorResponse};

/// Build the `/backoffice` router over a shared database handle.
pub fn create_router(db: Arc<DatabaseManager>) -> Router {
    Router::new()
        .route(
            "/backoffice/agentconfig",
            get(handlers::list_agent_configs).post(handlers::create_agent_config),
        )
        .route(
            "/backoffice/agentconfig/search",
            get(handlers::search_agent_configs),
        )
        .route(
            "/backoffice/agentconfig/{id}",
            get(handlers::get_agent_config)
                .put(handlers::update_agent_config)
                .delete(handlers::delete_agent_config),
        )
        .route(
            "/backoffice/promptframework",
            get(handlers::list_prompt_frameworks).post(handlers::create_prompt_framework),
        )
        .route(
            "/backoffice/promptframework/{id}",
            get(handlers::get_prompt_framework)
                .put(handlers::update_prompt_framework)
                .delete(handlers::delete_prompt_framework),
        )
        .route(
            "/backoffice/promptframework/{id}/clone",
            post(handlers::clone_prompt_framework),
        )
        .route(
            "/backoffice/promptframework/{id}/default",
            post(handlers::set_default_prompt_framework),
        )
        .route(
            "/backoffice/configuration",
            get(handlers::list_configurations).post(handlers::upsert_configuration),
        )
        .route(
            "/backoffice/configuration/{key}",
            get(handlers::get_configuration).delete(handlers::delete_configuration),
        )
        .route(
            "/backoffice/tools",
            get(handlers::list_tools).post(handlers::upsert_tool),
        )
        .route("/backoffice/tools/builtin", get(handlers::list_builtin_tools))
        .route("/backoffice/tools/{name}", delete(handlers::delete_tool))
        .with_state(db)
}
