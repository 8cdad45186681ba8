use serde::Serialize;
use std::borrow::Cow;

pub(crate) mod announcement_controller;
pub(crate) mod attendance_controller;
pub(crate) mod booking_controller;
pub(crate) mod feedback_controller;
pub(crate) mod health_check_controller;
pub(crate) mod notification_controller;
pub(crate) mod user_session_controller;

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Status {
    Success,
    Error,
}

/// The envelope every endpoint answers with: `{status, message?, data?}`.
#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T: Serialize> {
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: Status::Success,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status: Status::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn error(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            data: None,
        }
    }
}
