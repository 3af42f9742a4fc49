use crate::core::shortlist::ExplanationGenerator;
use crate::error::ExplainerError;
use crate::models::{Community, Preferences};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are a placement assistant for senior living communities. \
Given a client's preferences and one candidate community, explain in two or three \
sentences why the community is a reasonable fit and note any trade-offs. \
Do not invent facts that are not in the data.";

/// OpenAI-compatible chat-completions client used for shortlist explanations
pub struct ChatExplainer {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    client: Client,
}

impl ChatExplainer {
    /// Create a new explainer client
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        temperature: f64,
        request_timeout: Duration,
    ) -> Result<Self, ExplainerError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            model,
            temperature,
            client,
        })
    }

    fn build_payload(&self, preferences: &Preferences, community: &Community) -> Value {
        let context = json!({
            "client_preferences": preferences,
            "community": community,
        });

        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": context.to_string()},
            ],
        })
    }
}

#[async_trait]
impl ExplanationGenerator for ChatExplainer {
    async fn explain(
        &self,
        preferences: &Preferences,
        community: &Community,
    ) -> Result<String, ExplainerError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        tracing::debug!("Requesting explanation for community {}", community.id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_payload(preferences, community))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Explanation request for {} failed: {} - {}", community.id, status, body);
            return Err(ExplainerError::ApiError(format!(
                "Failed to generate explanation: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        let content = json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.pointer("/message/content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| ExplainerError::InvalidResponse("Missing choices[0].message.content".into()))?;

        if content.trim().is_empty() {
            return Err(ExplainerError::InvalidResponse("Empty explanation".into()));
        }

        Ok(content.to_string())
    }
}

/// Stand-in when no explanation service is configured; every entry gets the placeholder
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledExplainer;

#[async_trait]
impl ExplanationGenerator for DisabledExplainer {
    async fn explain(
        &self,
        _preferences: &Preferences,
        _community: &Community,
    ) -> Result<String, ExplainerError> {
        Err(ExplainerError::Unavailable(
            "no explanation service configured".to_string(),
        ))
    }
}
