use log::debug;

use crate::config::{ServiceConfig, SettingsSource};
use crate::error::Error;
use crate::providers::morph::{ChatRequest, MorphClient};
use crate::request::EditRequest;

/// Prompt used to probe the credential
const PROBE_PROMPT: &str = "test";

/// Merges sparse edits into full content via the Morph service.
/// Holds only immutable config and a reusable HTTP client;
/// calls through `&self` are independent.
#[derive(Debug, Clone)]
pub struct EditApplier
{   config: ServiceConfig
  , client: MorphClient
}

impl EditApplier
{   pub fn new(config: ServiceConfig) -> Result<Self, Error>
    {   debug!("Creating EditApplier");
        let client = MorphClient::new(&config)?;
        Ok(EditApplier
        {   config
          , client
        })
    }

    /// `None` when the feature is disabled in settings
    pub fn from_settings(source: &dyn SettingsSource)
      -> Result<Option<Self>, Error>
    {   ServiceConfig::from_settings(source)?
          .map(EditApplier::new)
          .transpose()
    }

    pub fn config(&self) -> &ServiceConfig
    {   &self.config
    }

    /// Merge `request.code_edit` into `request.original_content`
    pub async fn apply_edit(
      &self
    , request: &EditRequest
    ) -> Result<crate::MergedContent, Error>
    {   let prompt = request.prompt()?;
        debug!(
          "apply_edit: prompt {} bytes, endpoint {}",
          prompt.len(),
          self.client.endpoint()
        );

        let response = self.client
          .chat(&ChatRequest::single(prompt))
          .await?;

        response.first_content()
          .map(str::to_string)
          .ok_or(Error::EmptyResponse)
    }

    /// True only if a minimal request succeeds
    pub async fn validate_credential(&self) -> bool
    {   let mut probe = ChatRequest::single(PROBE_PROMPT);
        probe.max_tokens = Some(1);

        match self.client.chat(&probe).await
        {   Ok(_) => true
          , Err(e) => {
              debug!("Credential check failed: {}", e);
              false
            }
        }
    }
}
