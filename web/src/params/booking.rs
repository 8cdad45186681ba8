use super::{optional_id, optional_text, required, required_id};
use domain::booking::{parse_status, ListParams, SlotRequest};
use domain::error::Error as DomainError;
use domain::{appointment_status::AppointmentStatus, Id};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    /// First day, `YYYY-MM-DD`
    pub(crate) from: Option<String>,
    /// Last day, `YYYY-MM-DD`
    pub(crate) to: Option<String>,
    pub(crate) status: Option<String>,
    /// Staff only: restrict to appointments assigned to the caller
    pub(crate) mine: Option<bool>,
}

impl IndexParams {
    pub(crate) fn into_list_params(self) -> Result<ListParams, DomainError> {
        let status = match self.status.as_deref().map(str::trim) {
            Some(status) if !status.is_empty() => Some(parse_status(status)?),
            _ => None,
        };

        Ok(ListParams {
            from: required(self.from.as_deref(), "from")?.to_string(),
            to: required(self.to.as_deref(), "to")?.to_string(),
            status,
            mine: self.mine.unwrap_or(false),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateParams {
    pub(crate) service_id: Option<String>,
    /// `YYYY-MM-DD`
    pub(crate) date: Option<String>,
    /// `HH:MM`
    pub(crate) time: Option<String>,
    pub(crate) notes: Option<String>,
}

impl CreateParams {
    pub(crate) fn into_slot(self) -> Result<(SlotRequest, Option<String>), DomainError> {
        let slot = SlotRequest {
            service_id: Some(required_id(self.service_id.as_deref(), "service_id")?),
            date: required(self.date.as_deref(), "date")?.to_string(),
            time: required(self.time.as_deref(), "time")?.to_string(),
        };
        Ok((slot, optional_text(self.notes)))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CancelParams {
    pub(crate) appointment_id: Option<String>,
}

impl CancelParams {
    pub(crate) fn appointment_id(&self) -> Result<Id, DomainError> {
        required_id(self.appointment_id.as_deref(), "appointment_id")
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct EditParams {
    pub(crate) appointment_id: Option<String>,
    /// Leave out to keep the current service
    pub(crate) service_id: Option<String>,
    pub(crate) date: Option<String>,
    pub(crate) time: Option<String>,
}

impl EditParams {
    pub(crate) fn into_slot(self) -> Result<(Id, SlotRequest), DomainError> {
        let appointment_id = required_id(self.appointment_id.as_deref(), "appointment_id")?;
        let slot = SlotRequest {
            service_id: optional_id(self.service_id.as_deref(), "service_id")?,
            date: required(self.date.as_deref(), "date")?.to_string(),
            time: required(self.time.as_deref(), "time")?.to_string(),
        };
        Ok((appointment_id, slot))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct StatusParams {
    pub(crate) appointment_id: Option<String>,
    /// `pending`, `confirmed`, `completed` or `cancelled`
    pub(crate) status: Option<String>,
}

impl StatusParams {
    pub(crate) fn parse(&self) -> Result<(Id, AppointmentStatus), DomainError> {
        let appointment_id = required_id(self.appointment_id.as_deref(), "appointment_id")?;
        let status = parse_status(required(self.status.as_deref(), "status")?)?;
        Ok((appointment_id, status))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct AssignStaffParams {
    pub(crate) appointment_id: Option<String>,
    pub(crate) staff_id: Option<String>,
}

impl AssignStaffParams {
    pub(crate) fn parse(&self) -> Result<(Id, Id), DomainError> {
        Ok((
            required_id(self.appointment_id.as_deref(), "appointment_id")?,
            required_id(self.staff_id.as_deref(), "staff_id")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_keeps_the_service_when_none_is_posted() {
        let (appointment_id, slot) = EditParams {
            appointment_id: Some("42".to_string()),
            service_id: Some(String::new()),
            date: Some("2099-01-02".to_string()),
            time: Some("14:30".to_string()),
        }
        .into_slot()
        .unwrap();

        assert_eq!(appointment_id, 42);
        assert_eq!(slot.service_id, None);
    }

    #[test]
    fn index_without_status_lists_every_status() {
        let params = IndexParams {
            from: Some("2030-01-01".to_string()),
            to: Some("2030-01-31".to_string()),
            status: Some(String::new()),
            mine: None,
        }
        .into_list_params()
        .unwrap();

        assert_eq!(params.status, None);
        assert!(!params.mine);
    }
}
