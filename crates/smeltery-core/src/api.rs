//! Contract between the core and an external request layer.
//!
//! The request layer (HTTP or otherwise) owns routing and status codes. It
//! deserializes an [`UpgradeRequest`], calls [`handle_upgrade`], and turns
//! the outcome into a response: [`ApiReply`] on success, and on failure an
//! [`ApiRejection`] whose [`RejectionKind`] tells it which bad-request
//! variant to send.

use serde::{Deserialize, Serialize};

use crate::economy::{Dashboard, Economy};
use crate::error::UpgradeError;

/// Message sent back when the resource name does not parse.
pub const INVALID_RESOURCE_MESSAGE: &str = "enum is not valid";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRequest {
    /// Case-insensitive resource name: `iron`, `copper` or `gold`.
    pub resource: String,
}

/// Body of every reply, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReply {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The resource name was missing or unknown.
    InvalidResource,
    /// The resource was valid but the upgrade could not go ahead.
    BadRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRejection {
    pub kind: RejectionKind,
    pub message: String,
    /// The underlying error, absent when the request itself was malformed.
    pub cause: Option<UpgradeError>,
}

impl ApiRejection {
    pub fn body(&self) -> ApiReply {
        ApiReply {
            message: self.message.clone(),
        }
    }

    /// For request layers that fail to decode the body at all.
    pub fn malformed() -> Self {
        Self {
            kind: RejectionKind::InvalidResource,
            message: INVALID_RESOURCE_MESSAGE.to_string(),
            cause: None,
        }
    }
}

impl From<UpgradeError> for ApiRejection {
    fn from(err: UpgradeError) -> Self {
        match err {
            UpgradeError::UnknownResource(_) => Self {
                kind: RejectionKind::InvalidResource,
                message: INVALID_RESOURCE_MESSAGE.to_string(),
                cause: Some(err),
            },
            other => Self {
                kind: RejectionKind::BadRequest,
                message: other.to_string(),
                cause: Some(other),
            },
        }
    }
}

/// `GET dashboard`.
pub fn handle_dashboard(economy: &Economy) -> Dashboard {
    economy.dashboard()
}

/// `POST upgrade`. The countdown is detached; the reply does not wait for it.
pub fn handle_upgrade(economy: &Economy, request: &UpgradeRequest) -> Result<ApiReply, ApiRejection> {
    let handle = economy.upgrade_by_name(&request.resource)?;
    Ok(ApiReply {
        message: format!("Successfully upgraded {}", handle.resource()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceMap, ResourceType};
    use crate::test_utils::*;

    fn request(name: &str) -> UpgradeRequest {
        UpgradeRequest {
            resource: name.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn success_names_the_resource() {
        let economy = seeded_economy(rich());
        let reply = handle_upgrade(&economy, &request("IRON")).unwrap();
        assert_eq!(reply.message, "Successfully upgraded iron");
    }

    #[test]
    fn unknown_resource_is_invalid() {
        let economy = seeded_economy(rich());
        let rejection = handle_upgrade(&economy, &request("dragon")).unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::InvalidResource);
        assert_eq!(rejection.body().message, INVALID_RESOURCE_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn insufficient_funds_is_bad_request_with_message() {
        let economy = seeded_economy(ResourceMap::default());
        let rejection = handle_upgrade(&economy, &request("gold")).unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::BadRequest);
        assert!(rejection.message.starts_with("payment error: "));
        assert!(matches!(
            rejection.cause,
            Some(UpgradeError::InsufficientResources(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn in_progress_is_bad_request() {
        let economy = seeded_economy(rich());
        handle_upgrade(&economy, &request("copper")).unwrap();
        let rejection = handle_upgrade(&economy, &request("copper")).unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::BadRequest);
        assert_eq!(
            rejection.cause,
            Some(UpgradeError::AlreadyInProgress(ResourceType::Copper))
        );
    }

    #[test]
    fn request_body_decodes() {
        let req: UpgradeRequest = serde_json::from_str(r#"{"resource":"Gold"}"#).unwrap();
        assert_eq!(req, request("Gold"));
    }

    #[test]
    fn dashboard_json_shape() {
        let economy = seeded_economy(ResourceMap::new(1, 2, 3));
        let value = serde_json::to_value(handle_dashboard(&economy)).unwrap();
        assert_eq!(value["resources"]["copper"], 2);
        assert_eq!(value["factories"]["iron"]["level"]["tier"], 1);
        assert_eq!(value["factories"]["gold"]["status"]["in_progress"], false);
    }
}
