use crate::ledger::InsufficientResources;
use crate::resource::ResourceType;

/// Why an upgrade request was rejected.
///
/// A rejected upgrade never changes any state: the ledger is only debited
/// after every eligibility check has passed, and the debit itself is
/// all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpgradeError {
    /// The resource name is not one of `iron`, `copper`, `gold`.
    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    /// A countdown is already running for this factory. Retry once it completes.
    #[error("upgrade already in progress for {0}")]
    AlreadyInProgress(ResourceType),

    /// The factory is at the top of its ladder. Permanent.
    #[error("{resource} factory is already at the highest tier ({tier})")]
    MaxTierReached { resource: ResourceType, tier: u32 },

    /// The ledger cannot cover the cost. Retry once enough has accumulated.
    #[error(transparent)]
    InsufficientResources(#[from] InsufficientResources),

    /// Called outside a tokio runtime, so no countdown could be started.
    #[error("no tokio runtime available to run the upgrade countdown")]
    RuntimeUnavailable,
}

impl UpgradeError {
    /// Whether the same request may succeed later without changing it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            UpgradeError::AlreadyInProgress(_) | UpgradeError::InsufficientResources(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Shortfall;

    #[test]
    fn retryable_classification() {
        assert!(!UpgradeError::UnknownResource("x".into()).is_retryable());
        assert!(UpgradeError::AlreadyInProgress(ResourceType::Iron).is_retryable());
        assert!(
            !UpgradeError::MaxTierReached {
                resource: ResourceType::Gold,
                tier: 5
            }
            .is_retryable()
        );
        let short = InsufficientResources::new(vec![Shortfall {
            resource: ResourceType::Gold,
            required: 1,
            available: 0,
        }]);
        assert!(UpgradeError::from(short).is_retryable());
        assert!(!UpgradeError::RuntimeUnavailable.is_retryable());
    }

    #[test]
    fn messages() {
        assert_eq!(
            UpgradeError::AlreadyInProgress(ResourceType::Copper).to_string(),
            "upgrade already in progress for copper"
        );
        assert_eq!(
            UpgradeError::MaxTierReached {
                resource: ResourceType::Iron,
                tier: 5
            }
            .to_string(),
            "iron factory is already at the highest tier (5)"
        );
    }
}
