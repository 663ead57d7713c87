//! Connection URL construction.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::{ConnectionConfig, ValidationError};

const REDACTED: &str = "REDACTED";

/// The endpoint plus identity query parameters.
///
/// The token is held as a secret and only exposed when the real URL is
/// built for the transport. Logs use [`ConnectionTarget::redacted`].
#[derive(Debug)]
pub struct ConnectionTarget {
    base: Url,
    token: Option<SecretString>,
}

impl ConnectionTarget {
    pub fn from_config(config: &ConnectionConfig) -> Result<Self, ValidationError> {
        let mut base = config.endpoint_url()?;

        {
            let mut query = base.query_pairs_mut();
            query
                .append_pair("user_id", &config.user_id)
                .append_pair("channel", &config.channel)
                .append_pair("role", &config.role);
            if let Some(conversation_id) = &config.conversation_id {
                query.append_pair("conversation_id", conversation_id);
            }
            if let Some(thread_id) = &config.thread_id {
                query.append_pair("thread_id", thread_id);
            }
        }

        Ok(Self {
            base,
            token: config.token.clone().map(SecretString::new),
        })
    }

    /// URL handed to the connector.
    pub fn url(&self) -> Url {
        self.with_token(self.token.as_ref().map(|t| t.expose_secret().as_str()))
    }

    /// URL safe for logging.
    pub fn redacted(&self) -> Url {
        self.with_token(self.token.as_ref().map(|_| REDACTED))
    }

    fn with_token(&self, token: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Some(token) = token {
            url.query_pairs_mut().append_pair("token", token);
        }
        url
    }
}
