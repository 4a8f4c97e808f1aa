use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, instrument};
use uuid::Uuid;
use vc_remote_db::DatabaseManager;

use crate::{
    error::BackofficeError,
    types::{
        ClonePromptFrameworkRequest, CreateAgentConfigRequest, CreatePromptFrameworkRequest,
        SearchAgentConfigParams, UpdateAgentConfigRequest, UpdatePromptFrameworkRequest,
        UpsertConfigurationRequest, UpsertToolRequest,
    },
};

type HandlerResult = Result<Response, BackofficeError>;

// --- agent configs ---

#[instrument(skip(db, payload), fields(name = %payload.name))]
pub async fn create_agent_config(
    State(db): State<Arc<DatabaseManager>>,
    Json(payload): Json<CreateAgentConfigRequest>,
) -> HandlerResult {
    if payload.name.trim().is_empty() {
        return Err(BackofficeError::validation("name must not be empty"));
    }
    if payload.context.trim().is_empty() {
        return Err(BackofficeError::validation("context must not be empty"));
    }

    let config = db
        .create_agent_config()
        .name(payload.name)
        .maybe_description(payload.description)
        .context(payload.context)
        .prompt_framework_id(payload.prompt_framework_id)
        .maybe_profile(payload.profile)
        .maybe_tools(payload.tools)
        .call()
        .await?;

    debug!("Created agent config {}", config.id);
    Ok((StatusCode::CREATED, Json(config)).into_response())
}

#[instrument(skip(db))]
pub async fn list_agent_configs(State(db): State<Arc<DatabaseManager>>) -> HandlerResult {
    let configs = db.list_agent_configs().await?;
    Ok(Json(configs).into_response())
}

#[instrument(skip(db))]
pub async fn search_agent_configs(
    State(db): State<Arc<DatabaseManager>>,
    Query(params): Query<SearchAgentConfigParams>,
) -> HandlerResult {
    let name = params
        .nome
        .ok_or_else(|| BackofficeError::validation("query parameter 'nome' is required"))?;
    let configs = db.search_agent_configs(&name).await?;
    Ok(Json(configs).into_response())
}

#[instrument(skip(db))]
pub async fn get_agent_config(
    State(db): State<Arc<DatabaseManager>>,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    let config = db.get_agent_config(id).await?;
    Ok(Json(config).into_response())
}

#[instrument(skip(db, payload))]
pub async fn update_agent_config(
    State(db): State<Arc<DatabaseManager>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAgentConfigRequest>,
) -> HandlerResult {
    let config = db
        .update_agent_config()
        .id(id)
        .maybe_name(payload.name)
        .maybe_description(payload.description)
        .maybe_context(payload.context)
        .maybe_prompt_framework_id(payload.prompt_framework_id)
        .maybe_profile(payload.profile)
        .maybe_tools(payload.tools)
        .call()
        .await?;
    Ok(Json(config).into_response())
}

#[instrument(skip(db))]
pub async fn delete_agent_config(
    State(db): State<Arc<DatabaseManager>>,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    db.delete_agent_config(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// --- prompt frameworks ---

#[instrument(skip(db, payload), fields(name = %payload.name))]
pub async fn create_prompt_framework(
    State(db): State<Arc<DatabaseManager>>,
    Json(payload): Json<CreatePromptFrameworkRequest>,
) -> HandlerResult {
    if payload.name.trim().is_empty() {
        return Err(BackofficeError::validation("name must not be empty"));
    }

    let framework = db
        .create_prompt_framework()
        .name(payload.name)
        .maybe_description(payload.description)
        .maybe_sections(payload.sections)
        .maybe_is_default(payload.is_default)
        .call()
        .await?;

    debug!("Created prompt framework {}", framework.id);
    Ok((StatusCode::CREATED, Json(framework)).into_response())
}

#[instrument(skip(db))]
pub async fn list_prompt_frameworks(State(db): State<Arc<DatabaseManager>>) -> HandlerResult {
    let frameworks = db.list_prompt_frameworks().await?;
    Ok(Json(frameworks).into_response())
}

#[instrument(skip(db))]
pub async fn get_prompt_framework(
    State(db): State<Arc<DatabaseManager>>,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    let framework = db.get_prompt_framework(id).await?;
    Ok(Json(framework).into_response())
}

#[instrument(skip(db, payload))]
pub async fn update_prompt_framework(
    State(db): State<Arc<DatabaseManager>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePromptFrameworkRequest>,
) -> HandlerResult {
    let framework = db
        .update_prompt_framework()
        .id(id)
        .maybe_name(payload.name)
        .maybe_description(payload.description)
        .maybe_sections(payload.sections)
        .call()
        .await?;
    Ok(Json(framework).into_response())
}

#[instrument(skip(db))]
pub async fn delete_prompt_framework(
    State(db): State<Arc<DatabaseManager>>,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    db.delete_prompt_framework(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[instrument(skip(db, payload), fields(name = %payload.name))]
pub async fn clone_prompt_framework(
    State(db): State<Arc<DatabaseManager>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClonePromptFrameworkRequest>,
) -> HandlerResult {
    if payload.name.trim().is_empty() {
        return Err(BackofficeError::validation("name must not be empty"));
    }
    let framework = db.clone_prompt_framework(id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(framework)).into_response())
}

#[instrument(skip(db))]
pub async fn set_default_prompt_framework(
    State(db): State<Arc<DatabaseManager>>,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    let framework = db.set_default_prompt_framework(id).await?;
    Ok(Json(framework).into_response())
}

// --- key/value configuration ---

#[instrument(skip(db, payload), fields(key = %payload.key))]
pub async fn upsert_configuration(
    State(db): State<Arc<DatabaseManager>>,
    Json(payload): Json<UpsertConfigurationRequest>,
) -> HandlerResult {
    if payload.key.trim().is_empty() {
        return Err(BackofficeError::validation("key must not be empty"));
    }
    let entry = db.upsert_configuration(&payload.key, &payload.value).await?;
    Ok(Json(entry).into_response())
}

#[instrument(skip(db))]
pub async fn list_configurations(State(db): State<Arc<DatabaseManager>>) -> HandlerResult {
    let entries = db.list_configurations().await?;
    Ok(Json(entries).into_response())
}

#[instrument(skip(db))]
pub async fn get_configuration(
    State(db): State<Arc<DatabaseManager>>,
    Path(key): Path<String>,
) -> HandlerResult {
    let entry = db.get_configuration(&key).await?;
    Ok(Json(entry).into_response())
}

#[instrument(skip(db))]
pub async fn delete_configuration(
    State(db): State<Arc<DatabaseManager>>,
    Path(key): Path<String>,
) -> HandlerResult {
    db.delete_configuration(&key).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// --- tool registry ---

#[instrument(skip(db, payload), fields(name = %payload.name))]
pub async fn upsert_tool(
    State(db): State<Arc<DatabaseManager>>,
    Json(payload): Json<UpsertToolRequest>,
) -> HandlerResult {
    if payload.name.trim().is_empty() {
        return Err(BackofficeError::validation("name must not be empty"));
    }
    let record = db
        .upsert_tool()
        .name(payload.name)
        .maybe_description(payload.description)
        .maybe_enabled(payload.enabled)
        .call()
        .await?;
    Ok(Json(record).into_response())
}

#[instrument(skip(db))]
pub async fn list_tools(State(db): State<Arc<DatabaseManager>>) -> HandlerResult {
    let records = db.list_tools().await?;
    Ok(Json(records).into_response())
}

#[instrument(skip(db))]
pub async fn delete_tool(
    State(db): State<Arc<DatabaseManager>>,
    Path(name): Path<String>,
) -> HandlerResult {
    db.delete_tool(&name).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// The tool implementations compiled into the gateway. Registry rows can
/// disable them but never add new ones.
#[instrument]
pub async fn list_builtin_tools() -> Response {
    Json(llm_kit::builtin_tool_names()).into_response()
}
