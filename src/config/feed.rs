//! Feed selection for the diagnostic binary

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::EntityId;

/// Which channel variant to run
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    #[default]
    Chat,
    Escalation,
}

/// Feed configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub kind: FeedKind,

    /// Escalation ids to subscribe to (comma-separated)
    pub subscribe: Option<String>,
}

impl FeedConfig {
    /// Parsed subscription ids; blank entries are skipped.
    pub fn subscription_ids(&self) -> Result<Vec<EntityId>, ValidationError> {
        self.subscribe
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(|id| {
                        EntityId::new(id).map_err(|e| ValidationError::InvalidSubscription(e.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Validate feed configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.subscription_ids().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_ids() {
        let config = FeedConfig {
            kind: FeedKind::Escalation,
            subscribe: Some("esc-1, esc-2,,esc-3 ".to_string()),
        };

        let ids: Vec<String> = config
            .subscription_ids()
            .unwrap()
            .iter()
            .map(|id| id.to_string())
            .collect();

        assert_eq!(ids, vec!["esc-1", "esc-2", "esc-3"]);
    }

    #[test]
    fn missing_list_means_no_subscriptions() {
        assert!(FeedConfig::default().subscription_ids().unwrap().is_empty());
    }

    #[test]
    fn default_kind_is_chat() {
        assert_eq!(FeedConfig::default().kind, FeedKind::Chat);
    }
}
