use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt;

use crate::api_connection::endpoints::DEFAULT_MODEL;
use crate::api_connection::{ApiConnectionError, ChatCompletionRequest, ChatMessage, Provider};
use crate::equipment_registry::Equipment;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CookingPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub favorite_cuisines: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dietary_restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_frequency: Option<String>,
}

#[derive(Debug)]
pub enum AdvisorError {
    Connection(ApiConnectionError),
    InvalidReply {
        source: serde_json::Error,
        content: String,
    },
}

impl fmt::Display for AdvisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisorError::Connection(err) => write!(f, "Advisor request failed: {}", err),
            AdvisorError::InvalidReply { source, .. } => {
                write!(f, "Advisor replied with invalid JSON: {}", source)
            }
        }
    }
}

impl Error for AdvisorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AdvisorError::Connection(err) => Some(err),
            AdvisorError::InvalidReply { source, .. } => Some(source),
        }
    }
}

impl From<ApiConnectionError> for AdvisorError {
    fn from(err: ApiConnectionError) -> Self {
        AdvisorError::Connection(err)
    }
}

/// The AI side of the system. Implementations hand back the raw JSON they got;
/// checking its shape is left to the reconciler and merger.
#[async_trait]
pub trait KitchenAdvisor: Send + Sync {
    async fn generate_maintenance_schedule(
        &self,
        equipment: &[Equipment],
        preferences: &CookingPreferences,
    ) -> Result<Value, AdvisorError>;

    async fn generate_equipment_recommendations(
        &self,
        equipment: &[Equipment],
        preferences: &CookingPreferences,
        budget: Option<f64>,
    ) -> Result<Value, AdvisorError>;
}

pub struct OpenRouterAdvisor {
    provider: Provider,
    model: String,
}

impl OpenRouterAdvisor {
    pub fn new(api_key_env_var: &str) -> Self {
        Self::with_model(api_key_env_var, DEFAULT_MODEL)
    }

    pub fn with_model(api_key_env_var: &str, model: &str) -> Self {
        Self {
            provider: Provider::openrouter(api_key_env_var),
            model: model.to_string(),
        }
    }

    async fn ask_for_json(&self, system_prompt: String, user_prompt: String) -> Result<Value, AdvisorError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)],
            temperature: Some(0.2),
            max_tokens: Some(2048),
        };

        let response = self.provider.call_chat_completion(request).await?;
        let content = response
            .first_content()
            .ok_or(ApiConnectionError::EmptyResponse)?;
        log::debug!("Raw advisor reply:\n{}", content);
        parse_reply(content)
    }
}

fn equipment_summary(equipment: &[Equipment]) -> String {
    serde_json::to_string_pretty(equipment).unwrap_or_else(|_| "[]".to_string())
}

fn preferences_summary(preferences: &CookingPreferences) -> String {
    serde_json::to_string(preferences).unwrap_or_else(|_| "{}".to_string())
}

pub(crate) fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

pub(crate) fn parse_reply(content: &str) -> Result<Value, AdvisorError> {
    let body = strip_code_fences(content);
    if body.is_empty() {
        return Err(ApiConnectionError::EmptyResponse.into());
    }
    serde_json::from_str(body).map_err(|source| AdvisorError::InvalidReply {
        source,
        content: body.to_string(),
    })
}

#[async_trait]
impl KitchenAdvisor for OpenRouterAdvisor {
    async fn generate_maintenance_schedule(
        &self,
        equipment: &[Equipment],
        preferences: &CookingPreferences,
    ) -> Result<Value, AdvisorError> {
        let system_prompt = "/no_thinking
You are a kitchen equipment maintenance assistant. Given a user's equipment, plan the next service for each item.
Respond ONLY with a JSON array, no markdown and no commentary. Each element must be an object with:
- \"equipmentId\": the integer id of the equipment item,
- \"nextMaintenanceDate\": a date formatted YYYY-MM-DD,
- \"recommendation\": a short description of what needs doing,
- \"suggestedAction\": the concrete next step,
- \"priority\": one of \"high\", \"medium\", \"low\"."
            .to_string();

        let user_prompt = format!(
            "Equipment:\n{}\n\nCooking preferences: {}",
            equipment_summary(equipment),
            preferences_summary(preferences)
        );

        log::info!("Requesting maintenance schedule for {} equipment items", equipment.len());
        self.ask_for_json(system_prompt, user_prompt).await
    }

    async fn generate_equipment_recommendations(
        &self,
        equipment: &[Equipment],
        preferences: &CookingPreferences,
        budget: Option<f64>,
    ) -> Result<Value, AdvisorError> {
        let system_prompt = "/no_thinking
You are a kitchen equipment advisor. Suggest equipment the user does not own yet that fits how they cook.
Respond ONLY with a JSON array, no markdown and no commentary. Each element must be an object with:
- \"name\": the equipment name,
- \"category\": the equipment category,
- \"reason\": why it would help this user,
- \"priority\": one of \"high\", \"medium\", \"low\",
- \"estimatedPrice\": the approximate price in USD as a number."
            .to_string();

        let budget_line = match budget {
            Some(b) => format!("Total budget: ${:.2}", b),
            None => "No fixed budget".to_string(),
        };
        let user_prompt = format!(
            "Owned equipment:\n{}\n\nCooking preferences: {}\n{}",
            equipment_summary(equipment),
            preferences_summary(preferences),
            budget_line
        );

        log::info!("Requesting equipment recommendations ({})", budget_line);
        self.ask_for_json(system_prompt, user_prompt).await
    }
}
