use std::fmt;

/// Failure raised by the transport while talking to the
/// completion service. Carried as the cause of
/// `Error::RequestFailed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError
{   /// Connection, timeout or other reqwest failure
    Http(String)
  , /// Service answered with a non-success status
    Api
    {   status: u16
      , body: String
    }
  , /// Response body could not be decoded
    Parse(String)
}

impl fmt::Display for TransportError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   TransportError::Http(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , TransportError::Api { status, body } => {
              write!(f, "API error ({}): {}", status, body)
            }
          , TransportError::Parse(msg) => {
              write!(f, "Parse error: {}", msg)
            }
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_decode()
        {   TransportError::Parse(e.to_string())
        } else
        {   TransportError::Http(e.to_string())
        }
    }
}

/// Error type for edit application
/// Implements Clone so results can be fanned out by callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Request failed validation, never sent
    Validation(String)
  , /// Service succeeded but returned no content
    EmptyResponse
  , /// Transport or remote failure, wraps the cause
    RequestFailed(TransportError)
  , /// Settings could not produce a usable configuration
    InvalidConfiguration(String)
}

impl Error
{   pub fn validation(msg: impl Into<String>) -> Self
    {   Error::Validation(msg.into())
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Validation(msg) => {
              write!(f, "Invalid edit request: {}", msg)
            }
          , Error::EmptyResponse => {
              write!(f, "Service returned an empty response")
            }
          , Error::RequestFailed(cause) => {
              write!(f, "Edit request failed: {}", cause)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error
{   fn source(&self)
      -> Option<&(dyn std::error::Error + 'static)>
    {   match self
        {   Error::RequestFailed(cause) => Some(cause)
          , _ => None
        }
    }
}

impl From<TransportError> for Error
{   fn from(e: TransportError) -> Self
    {   Error::RequestFailed(e)
    }
}
