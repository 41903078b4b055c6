use serde::{Deserialize, Serialize};
use log::{debug, trace};

use crate::config::ServiceConfig;
use crate::error::TransportError;

/// Model that performs the merge
pub const MORPH_MODEL: &str = "morph-v3-large";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , pub stream: bool
}

impl ChatRequest
{   /// Single-message, non-streaming request
    pub fn single(prompt: impl Into<String>) -> Self
    {   ChatRequest
        {   model: MORPH_MODEL.to_string()
          , messages: vec![ChatMessage::user(prompt)]
          , max_tokens: None
          , stream: false
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse
{   pub choices: Vec<Choice>
}

impl ChatResponse
{   /// Content of the first choice, if non-empty
    pub fn first_content(&self) -> Option<&str>
    {   self.choices.first()
          .and_then(|c| c.message.as_ref())
          .and_then(|m| m.content.as_deref())
          .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ResponseMessage>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub role: Option<String>
  , #[serde(default)]
    pub content: Option<String>
}

// ===== Morph HTTP Client =====

/// Thin chat-completions client; safe to share across tasks
#[derive(Debug, Clone)]
pub struct MorphClient
{   http_client: reqwest::Client
  , endpoint: String
  , api_key: String
}

impl MorphClient
{   pub fn new(config: &ServiceConfig)
      -> Result<Self, TransportError>
    {   debug!("Creating MorphClient: {:?}", config);
        let http_client = reqwest::Client::builder()
          .timeout(config.timeout())
          .build()?;

        Ok(MorphClient
        {   http_client
          , endpoint: format!(
              "{}/chat/completions",
              config.base_url.trim_end_matches('/')
            )
          , api_key: config.api_key.clone()
        })
    }

    pub fn endpoint(&self) -> &str
    {   &self.endpoint
    }

    /// Send one non-streaming completion request
    pub async fn chat(
      &self
    , request: &ChatRequest
    ) -> Result<ChatResponse, TransportError>
    {   trace!(
          "Morph request: model={} messages={} max_tokens={:?}",
          request.model,
          request.messages.len(),
          request.max_tokens
        );

        let response = self.http_client
          .post(&self.endpoint)
          .bearer_auth(&self.api_key)
          .json(request)
          .send()
          .await
          .map_err(|e| {
            debug!("HTTP error: {}", e);
            TransportError::Http(e.to_string())
          })?;

        let status = response.status();
        trace!("Morph response status: {}", status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            debug!("Morph API error {}: {}", status, body);
            return Err(TransportError::Api
            {   status: status.as_u16()
              , body
            });
        }

        let body = response.text().await
          .map_err(|e| TransportError::Http(e.to_string()))?;

        serde_json::from_str::<ChatResponse>(&body)
          .map_err(|e| {
            debug!("Parse error: {}", e);
            TransportError::Parse(e.to_string())
          })
    }
}
