use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The kind of account a user holds. A user has exactly one role.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role")]
pub enum Role {
    #[sea_orm(string_value = "client")]
    #[default]
    Client,
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    /// Staff and admins may manage bookings they do not own.
    pub fn is_staff_or_admin(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Client => write!(fmt, "client"),
            Role::Staff => write!(fmt, "staff"),
            Role::Admin => write!(fmt, "admin"),
        }
    }
}
