use serde::Deserialize;
use uuid::Uuid;
use vc_remote_db::PromptSection;

#[derive(Debug, Deserialize)]
pub struct CreateAgentConfigRequest {
    pub name: String,
    pub description: Option<String>,
    pub context: String,
    pub prompt_framework_id: Uuid,
    pub profile: Option<String>,
    pub tools: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAgentConfigRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub context: Option<String>,
    pub prompt_framework_id: Option<Uuid>,
    pub profile: Option<String>,
    pub tools: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchAgentConfigParams {
    pub nome: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePromptFrameworkRequest {
    pub name: String,
    pub description: Option<String>,
    pub sections: Option<Vec<PromptSection>>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePromptFrameworkRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sections: Option<Vec<PromptSection>>,
}

#[derive(Debug, Deserialize)]
pub struct ClonePromptFrameworkRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpsertConfigurationRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct UpsertToolRequest {
    pub name: String,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}
