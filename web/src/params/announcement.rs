use super::required_id;
use domain::error::Error as DomainError;
use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateParams {
    pub(crate) message: Option<String>,
}

/// Names the announcement to toggle or delete.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ManageParams {
    pub(crate) announcement_id: Option<String>,
}

impl ManageParams {
    pub(crate) fn announcement_id(&self) -> Result<Id, DomainError> {
        required_id(self.announcement_id.as_deref(), "announcement_id")
    }
}
