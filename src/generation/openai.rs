//! OpenAI chat-completions client with JSON-schema structured output.
//!
//! Every call is bounded by `generator.timeout_secs` and attempted at most
//! `generator.max_attempts` times. Only upstream failures (transport errors,
//! timeouts, rate limiting, server errors, unreadable response) are retried.
//! Any other 4xx status and a well-formed answer that fails validation are
//! returned to the caller as is.

use super::{
    RecipeGenerator, ShoppingListGenerator,
    recipe::{RECIPE_SYSTEM_PROMPT, RecipeDraft, RecipeRequest, parse_recipe_json, recipe_schema},
    shopping_list::{
        GeneratedShoppingList, SHOPPING_LIST_SYSTEM_PROMPT, ShoppingListRequest,
        parse_shopping_list_json, shopping_list_schema,
    },
};
use crate::{
    config::settings::GeneratorSettings,
    errors::{Error, Result},
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

/// Environment variable holding the API key
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    refusal: Option<String>,
}

/// Request body for a structured chat completion.
fn build_request(model: &str, system: &str, user: &str, schema_name: &str, schema: Value) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user }
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": { "name": schema_name, "strict": true, "schema": schema }
        }
    })
}

fn extract_content(completion: ChatCompletion) -> Result<String> {
    let message = completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| Error::upstream("completion contained no choices"))?;
    if let Some(refusal) = message.refusal {
        return Err(Error::validation(format!("generation refused: {refusal}")));
    }
    message
        .content
        .ok_or_else(|| Error::upstream("completion contained no content"))
}

/// Maps a non-success status to an error. Timeouts, rate limiting and server
/// errors are transient; every other client error is permanent.
fn status_error(status: StatusCode, body: &str) -> Error {
    let message = format!("HTTP {status}: {body}");
    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        Error::upstream(message)
    } else {
        Error::Rejected { message }
    }
}

/// Chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    settings: GeneratorSettings,
}

impl OpenAiClient {
    /// Creates a client with the configured timeout.
    ///
    /// # Errors
    /// Returns a configuration error if the key is blank or the HTTP client
    /// cannot be built.
    pub fn new(api_key: impl Into<String>, settings: GeneratorSettings) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config {
                message: format!("{API_KEY_ENV_VAR} is empty"),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            api_key,
            settings,
        })
    }

    /// Creates a client using `OPENAI_API_KEY`.
    ///
    /// # Errors
    /// Returns a configuration error if the variable is missing or blank.
    pub fn from_env(settings: &GeneratorSettings) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV_VAR).map_err(|_| Error::Config {
            message: format!("{API_KEY_ENV_VAR} is not set"),
        })?;
        Self::new(api_key, settings.clone())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    async fn complete_once(&self, body: &Value) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("unreadable response: {e}")))?;
        extract_content(completion)
    }

    async fn complete(&self, body: &Value) -> Result<String> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.complete_once(body).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(attempt, error = %e, "chat completion failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl RecipeGenerator for OpenAiClient {
    #[instrument(skip(self), fields(dish_idea = %request.dish_idea))]
    async fn generate_recipe(&self, request: &RecipeRequest) -> Result<RecipeDraft> {
        let body = build_request(
            &self.settings.model,
            RECIPE_SYSTEM_PROMPT,
            &request.prompt(),
            "recipe",
            recipe_schema(),
        );
        let content = self.complete(&body).await?;
        let draft = parse_recipe_json(&content)?;
        info!(title = %draft.title, "recipe generated");
        Ok(draft)
    }
}

impl ShoppingListGenerator for OpenAiClient {
    #[instrument(skip_all, fields(items = request.items.len()))]
    async fn generate_shopping_list(
        &self,
        request: &ShoppingListRequest,
    ) -> Result<GeneratedShoppingList> {
        let body = build_request(
            &self.settings.model,
            SHOPPING_LIST_SYSTEM_PROMPT,
            &request.prompt()?,
            "shopping_list",
            shopping_list_schema(),
        );
        let content = self.complete(&body).await?;
        let list = parse_shopping_list_json(&content)?;
        info!(items = list.items.len(), "shopping list generated");
        Ok(list)
    }
}
