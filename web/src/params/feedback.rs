use super::{optional_text, required, required_id};
use domain::error::{Error as DomainError, ValidationErrorKind};
use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateParams {
    pub(crate) appointment_id: Option<String>,
    /// 1 to 5
    pub(crate) rating: Option<String>,
    pub(crate) comment: Option<String>,
}

impl CreateParams {
    pub(crate) fn parse(self) -> Result<(Id, i16, Option<String>), DomainError> {
        let appointment_id = required_id(self.appointment_id.as_deref(), "appointment_id")?;
        let rating = required(self.rating.as_deref(), "rating")?
            .parse::<i16>()
            .map_err(|_| DomainError::validation(ValidationErrorKind::InvalidRating))?;
        Ok((appointment_id, rating, optional_text(self.comment)))
    }
}
