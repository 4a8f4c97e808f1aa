use std::sync::Arc;

use axum::response::{IntoResponse, Json, Response};
use llm_kit::{Agent, CallOptions, Chain, ChainRequest, Provider, Tool, resolve_tool};
use tracing::{debug, instrument, warn};

use crate::{error::FeatureError, features::FeatureSpec, state::AppState, types::DataRequest};

fn call_options(request: &DataRequest) -> CallOptions {
    CallOptions {
        model: request.model.clone(),
        temperature: request.temperature,
        num_ctx: request.num_ctx,
        max_tokens: request
            .max_token
            .map(|v| i32::try_from(v).unwrap_or(i32::MAX)),
        format: None,
        tools: Vec::new(),
    }
}

async fn compose_prompt(
    state: &AppState,
    feature: &FeatureSpec,
) -> Result<String, FeatureError> {
    let prompt = match feature.section {
        Some(section) => {
            state
                .composer
                .compose_section(feature.context, section)
                .await?
        }
        None => state.composer.compose_system_prompt(feature.context).await?,
    };
    Ok(prompt)
}

/// Chain mode: validate, preprocess, compose, single model call.
#[instrument(skip(state, request), fields(feature = feature.name, provider = %provider))]
pub async fn invoke_chain(
    provider: Provider,
    feature: &'static FeatureSpec,
    state: AppState,
    mut request: DataRequest,
) -> Result<Response, FeatureError> {
    feature.validate(&request)?;
    feature.apply_preprocess(&mut request)?;

    let system_prompt = compose_prompt(&state, feature).await?;
    let options = call_options(&request);
    let model = state.factory.model(provider, &options)?;

    let chain = Chain::new(model, state.memory.clone());
    let chain_request = ChainRequest {
        chat_key: request.chat_key.clone(),
        question: request.question.clone(),
        noappendchat: request.noappendchat,
    };

    let response = chain.invoke(&system_prompt, &chain_request, &options).await?;
    debug!("Chain invocation completed");
    Ok(Json(response).into_response())
}

/// Agent mode: chain pipeline plus the feature's tool set and tool loop.
#[instrument(skip(state, request), fields(feature = feature.name, provider = %provider))]
pub async fn invoke_agent(
    provider: Provider,
    feature: &'static FeatureSpec,
    state: AppState,
    mut request: DataRequest,
) -> Result<Response, FeatureError> {
    feature.validate(&request)?;
    feature.apply_preprocess(&mut request)?;

    let system_prompt = compose_prompt(&state, feature).await?;
    let options = call_options(&request);
    let model = state.factory.model(provider, &options)?;

    let mut tools: Vec<Arc<dyn Tool>> = Vec::with_capacity(feature.tools.len());
    for name in feature.tools {
        match resolve_tool(name) {
            Some(tool) => tools.push(tool),
            None => warn!("Skipping unknown tool '{}'", name),
        }
    }

    let agent = Agent::new(model, state.memory.clone(), tools);
    let chain_request = ChainRequest {
        chat_key: request.chat_key.clone(),
        question: request.question.clone(),
        noappendchat: request.noappendchat,
    };

    let response = agent.invoke(&system_prompt, &chain_request, &options).await?;
    debug!(steps = response.trace.len(), "Agent invocation completed");
    Ok(Json(response).into_response())
}
