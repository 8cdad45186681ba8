use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Language a user reads notifications in.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "locale")]
pub enum Locale {
    #[sea_orm(string_value = "ar")]
    #[default]
    Ar,
    #[sea_orm(string_value = "en")]
    En,
}

impl std::fmt::Display for Locale {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::Ar => write!(fmt, "ar"),
            Locale::En => write!(fmt, "en"),
        }
    }
}
