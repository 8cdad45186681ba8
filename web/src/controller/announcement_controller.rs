use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::announcement::{CreateParams, ManageParams};
use crate::{AppState, Error};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Form, Json};
use domain::announcement as AnnouncementApi;

use log::*;

/// POST an announcement: store it and notify every active client
#[utoipa::path(
    post,
    path = "/announcements",
    request_body(content = CreateParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Announcement stored and sent", body = domain::announcements::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins publish announcements"),
        (status = 422, description = "Empty message"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
    Form(params): Form<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    let announcement = AnnouncementApi::publish(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        &authenticated_user.actor(),
        params.message.as_deref().unwrap_or_default(),
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        "Announcement sent successfully!",
        announcement,
    )))
}

/// GET every announcement, newest first
#[utoipa::path(
    get,
    path = "/announcements",
    responses(
        (status = 200, description = "All announcements, active or not", body = [domain::announcements::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins manage announcements"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let announcements =
        AnnouncementApi::list(app_state.db_conn_ref(), &authenticated_user.actor()).await?;

    debug!("Found {} announcements", announcements.len());

    Ok(Json(ApiResponse::new(announcements)))
}

/// GET the announcements currently shown to clients
#[utoipa::path(
    get,
    path = "/announcements/active",
    responses(
        (status = 200, description = "Active announcements, newest first", body = [domain::announcements::Model]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn active(
    AuthenticatedUser(_user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let announcements = AnnouncementApi::list_active(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(announcements)))
}

/// POST show a hidden announcement again, or hide a shown one
#[utoipa::path(
    post,
    path = "/announcements/toggle",
    request_body(content = ManageParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Announcement status updated", body = domain::announcements::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins manage announcements"),
        (status = 404, description = "Announcement not found"),
        (status = 422, description = "Missing announcement ID"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn toggle(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
    Form(params): Form<ManageParams>,
) -> Result<impl IntoResponse, Error> {
    let announcement_id = params.announcement_id()?;

    let announcement = AnnouncementApi::toggle(
        app_state.db_conn_ref(),
        &authenticated_user.actor(),
        announcement_id,
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        "Announcement status updated successfully",
        announcement,
    )))
}

/// POST delete an announcement
#[utoipa::path(
    post,
    path = "/announcements/delete",
    request_body(content = ManageParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Announcement deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins manage announcements"),
        (status = 404, description = "Announcement not found"),
        (status = 422, description = "Missing announcement ID"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(
    authenticated_user: AuthenticatedUser,
    State(app_state): State<AppState>,
    Form(params): Form<ManageParams>,
) -> Result<impl IntoResponse, Error> {
    let announcement_id = params.announcement_id()?;

    AnnouncementApi::delete(
        app_state.db_conn_ref(),
        &authenticated_user.actor(),
        announcement_id,
    )
    .await?;

    Ok(Json(ApiResponse::message(
        "Announcement deleted successfully",
    )))
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use crate::test_support::{app, client, get, login, mock_db, post_form, read_json, user};
    use axum::http::StatusCode;
    use chrono::Utc;
    use domain::{announcements, roles::Role};
    use sea_orm::MockExecResult;
    use tower::ServiceExt;

    fn stored(id: i32, is_active: bool) -> announcements::Model {
        announcements::Model {
            id,
            message: "مغلق يوم الجمعة".to_string(),
            created_by: 1,
            is_active,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn admin_publish_returns_the_stored_announcement() {
        let admin = user(1, Role::Admin);
        let db = mock_db(|db| {
            db.append_query_results([[admin.clone()]])
                .append_query_results([[admin.clone()]])
                .append_query_results([[stored(5, true)]])
        });
        let app = app(&db);
        let session = login(&app, &admin.email).await;

        let response = app
            .oneshot(post_form("/announcements", &session, "message=Closed+on+Friday"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["message"], "Announcement sent successfully!");
        assert_eq!(body["data"]["id"], 5);
    }

    #[tokio::test]
    async fn clients_see_only_active_announcements() {
        let user = client(7);
        let db = mock_db(|db| {
            db.append_query_results([[user.clone()]])
                .append_query_results([[user.clone()]])
                .append_query_results([[stored(2, true)]])
        });
        let app = app(&db);
        let session = login(&app, &user.email).await;

        let response = app
            .oneshot(get("/announcements/active", &session))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"][0]["id"], 2);
        assert_eq!(body["data"][0]["is_active"], true);
    }

    #[tokio::test]
    async fn clients_cannot_list_every_announcement() {
        let user = client(7);
        let db = mock_db(|db| {
            db.append_query_results([[user.clone()]])
                .append_query_results([[user.clone()]])
        });
        let app = app(&db);
        let session = login(&app, &user.email).await;

        let response = app.oneshot(get("/announcements", &session)).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_toggle_returns_the_updated_announcement() {
        let admin = user(1, Role::Admin);
        let db = mock_db(|db| {
            db.append_query_results([[admin.clone()]])
                .append_query_results([[admin.clone()]])
                .append_query_results([[stored(2, false)]])
        });
        let app = app(&db);
        let session = login(&app, &admin.email).await;

        let response = app
            .oneshot(post_form("/announcements/toggle", &session, "announcement_id=2"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["message"], "Announcement status updated successfully");
        assert_eq!(body["data"]["is_active"], false);
    }

    #[tokio::test]
    async fn deleting_a_missing_announcement_is_not_found() {
        let admin = user(1, Role::Admin);
        let db = mock_db(|db| {
            db.append_query_results([[admin.clone()]])
                .append_query_results([[admin.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
        });
        let app = app(&db);
        let session = login(&app, &admin.email).await;

        let response = app
            .oneshot(post_form("/announcements/delete", &session, "announcement_id=99"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["message"], "Announcement not found");
    }

    #[tokio::test]
    async fn delete_without_an_id_is_rejected() {
        let admin = user(1, Role::Admin);
        let db = mock_db(|db| {
            db.append_query_results([[admin.clone()]])
                .append_query_results([[admin.clone()]])
        });
        let app = app(&db);
        let session = login(&app, &admin.email).await;

        let response = app
            .oneshot(post_form("/announcements/delete", &session, ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(read_json(response).await["message"], "Missing announcement ID");
    }
}
