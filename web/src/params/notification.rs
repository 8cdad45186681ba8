use super::required_id;
use domain::error::Error as DomainError;
use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct MarkReadParams {
    pub(crate) notification_id: Option<String>,
}

impl MarkReadParams {
    pub(crate) fn notification_id(&self) -> Result<Id, DomainError> {
        required_id(self.notification_id.as_deref(), "notification_id")
    }
}
