use crate::{
    controller::health_check_controller,
    middleware::{auth::require_auth, csrf::require_csrf_token},
    params, protect, AppState,
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use crate::controller::{
    announcement_controller, attendance_controller, booking_controller, feedback_controller,
    notification_controller, user_session_controller,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Salon Booking API"
        ),
        paths(
            announcement_controller::create,
            announcement_controller::index,
            announcement_controller::active,
            announcement_controller::toggle,
            announcement_controller::delete,
            attendance_controller::check_in,
            attendance_controller::check_out,
            booking_controller::index,
            booking_controller::create,
            booking_controller::cancel,
            booking_controller::edit,
            booking_controller::update_status,
            booking_controller::assign_staff,
            feedback_controller::create,
            health_check_controller::health_check,
            notification_controller::view,
            notification_controller::unread_count,
            notification_controller::mark_read,
            notification_controller::mark_all_read,
            user_session_controller::login,
            user_session_controller::logout,
        ),
        components(
            schemas(
                domain::AppointmentDetails,
                domain::announcements::Model,
                domain::appointments::Model,
                domain::appointment_status::AppointmentStatus,
                domain::feedback::Model,
                domain::notifications::Model,
                domain::users::Model,
                domain::user::Credentials,
                params::announcement::CreateParams,
                params::announcement::ManageParams,
                params::booking::CreateParams,
                params::booking::CancelParams,
                params::booking::EditParams,
                params::booking::StatusParams,
                params::booking::AssignStaffParams,
                params::feedback::CreateParams,
                params::notification::MarkReadParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "salon_booking", description = "Salon appointments and notifications API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned from successful login via Set-Cookie header",
                ))),
            )
        }
    }
}

// Layers run outermost first, i.e. in the reverse of the order they are added:
// authentication, then the CSRF check, then the role gate, then the handler.
pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(user_session_routes())
        .merge(user_session_protected_routes(app_state.clone()))
        .merge(booking_read_routes(app_state.clone()))
        .merge(booking_client_routes(app_state.clone()))
        .merge(booking_staff_routes(app_state.clone()))
        .merge(notification_routes(app_state.clone()))
        .merge(feedback_routes(app_state.clone()))
        .merge(announcement_routes(app_state.clone()))
        .merge(attendance_routes(app_state.clone()))
        // FIXME: protect the OpenAPI web UI
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

pub fn user_session_routes() -> Router {
    Router::new().route("/login", post(user_session_controller::login))
}

pub fn user_session_protected_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/logout", post(user_session_controller::logout))
        .route_layer(from_fn(require_csrf_token))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn booking_read_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/bookings", get(booking_controller::index))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn booking_client_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/bookings", post(booking_controller::create))
        .route("/bookings/cancel", post(booking_controller::cancel))
        .route("/bookings/edit", post(booking_controller::edit))
        .route_layer(from_fn_with_state(app_state.clone(), protect::clients))
        .route_layer(from_fn(require_csrf_token))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn booking_staff_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/bookings/status", post(booking_controller::update_status))
        .route("/bookings/assign_staff", post(booking_controller::assign_staff))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            protect::staff_or_admins,
        ))
        .route_layer(from_fn(require_csrf_token))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route(
                    "/notifications/mark_read",
                    post(notification_controller::mark_read),
                )
                .route(
                    "/notifications/mark_all_read",
                    post(notification_controller::mark_all_read),
                )
                .route_layer(from_fn(require_csrf_token)),
        )
        .route("/notifications/view", post(notification_controller::view))
        .route(
            "/notifications/unread_count",
            get(notification_controller::unread_count),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn feedback_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/feedback", post(feedback_controller::create))
        .route_layer(from_fn_with_state(app_state.clone(), protect::clients))
        .route_layer(from_fn(require_csrf_token))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn announcement_routes(app_state: AppState) -> Router {
    let admin_writes = Router::new()
        .route("/announcements", post(announcement_controller::create))
        .route(
            "/announcements/toggle",
            post(announcement_controller::toggle),
        )
        .route(
            "/announcements/delete",
            post(announcement_controller::delete),
        )
        .route_layer(from_fn_with_state(app_state.clone(), protect::admins))
        .route_layer(from_fn(require_csrf_token));

    let admin_reads = Router::new()
        .route("/announcements", get(announcement_controller::index))
        .route_layer(from_fn_with_state(app_state.clone(), protect::admins));

    Router::new()
        .merge(admin_writes)
        .merge(admin_reads)
        .route(
            "/announcements/active",
            get(announcement_controller::active),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn attendance_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/attendance/check_in", post(attendance_controller::check_in))
        .route("/attendance/check_out", post(attendance_controller::check_out))
        .route_layer(from_fn_with_state(app_state.clone(), protect::staff))
        .route_layer(from_fn(require_csrf_token))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_doc_lists_the_booking_routes() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/bookings/cancel"));
        assert!(doc.paths.paths.contains_key("/notifications/mark_read"));
        assert!(doc.paths.paths.contains_key("/announcements/toggle"));
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|components| components.security_schemes.contains_key("cookie_auth")));
    }
}
