use super::error::{EntityApiErrorKind, Error};
use super::query::{self, QueryFilterMap};
use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId};
use chrono::Utc;
use entity::users::{ActiveModel, Column, Entity, Model};
use entity::{locale::Locale, Id};
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, Set, Value};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

pub use entity::users::Role;

#[derive(Clone, Debug)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub locale: Locale,
}

pub async fn create(db: &impl ConnectionTrait, new: NewUser) -> Result<Model, Error> {
    debug!("New User to be inserted: {} ({})", new.email, new.role);

    let now = Utc::now();
    let user_active_model = ActiveModel {
        full_name: Set(new.full_name),
        email: Set(new.email),
        password: Set(generate_hash(new.password)),
        role: Set(new.role),
        locale: Set(new.locale),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(user_active_model.insert(db).await?)
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// All active users holding `role`, e.g. every admin for a broadcast.
pub async fn find_active_by_role(db: &impl ConnectionTrait, role: Role) -> Result<Vec<Model>, Error> {
    let mut query_filter_map = QueryFilterMap::new();
    query_filter_map.insert(
        "role".to_string(),
        Some(Value::String(Some(Box::new(role.to_string())))),
    );
    query_filter_map.insert("is_active".to_string(), Some(Value::Bool(Some(true))));

    query::find_by::<Entity, Column>(db, query_filter_map).await
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}

async fn authenticate_user(creds: Credentials, user: Model) -> Result<Option<Model>, Error> {
    if !user.is_active {
        warn!("Login attempt for deactivated user {}", user.id);
        return Ok(None);
    }

    match password_auth::verify_password(creds.password, &user.password) {
        Ok(_) => Ok(Some(user)),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

#[derive(Debug, Clone)]
pub struct Backend {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Clone, ToSchema, IntoParams, Deserialize)]
#[schema(as = domain::user::Credentials)] // OpenAPI schema
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Backend {
    pub fn new(db: &Arc<DatabaseConnection>) -> Self {
        Self { db: Arc::clone(db) }
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = Model;
    type Credentials = Credentials;
    type Error = Error;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        match find_by_email(self.db.as_ref(), &creds.email).await? {
            Some(user) => authenticate_user(creds, user).await,
            None => Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::RecordUnauthenticated,
            }),
        }
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        let user = Entity::find_by_id(*user_id).one(self.db.as_ref()).await?;
        // A deactivated user loses any session they still hold.
        Ok(user.filter(|user| user.is_active))
    }
}

pub type AuthSession = axum_login::AuthSession<Backend>;
