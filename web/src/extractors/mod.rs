pub(crate) mod authenticated_user;

use crate::controller::ApiResponse;
use axum::{http::StatusCode, Json};

type RejectionType = (StatusCode, Json<ApiResponse<()>>);
