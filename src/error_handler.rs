use actix_web::{http::StatusCode, HttpResponse};
use log::{error, warn, info};
use serde_json::json;

use crate::error::{FriendRequestError, GeoError, OverlayError, ViewError};

pub struct ErrorHandler;

impl ErrorHandler {
    pub fn log_and_respond(
        status: StatusCode,
        message: &str,
        error_details: Option<&str>,
    ) -> HttpResponse {
        let status_code = status.as_u16();

        // 에러 로깅
        match status_code {
            400 => {
                warn!("🚨 400 Bad Request - {}", message);
                if let Some(details) = error_details {
                    warn!("   📋 상세 에러: {}", details);
                }
            }
            404 => {
                info!("🔍 404 Not Found - {}", message);
            }
            409 => {
                info!("🔁 409 Conflict - {}", message);
            }
            502 => {
                error!("🌐 502 Bad Gateway - {}", message);
                if let Some(details) = error_details {
                    error!("   📋 상세 에러: {}", details);
                }
            }
            503 => {
                warn!("🗺️ 503 Service Unavailable - {}", message);
            }
            500 => {
                error!("💥 500 Internal Server Error - {}", message);
                if let Some(details) = error_details {
                    error!("   📋 상세 에러: {}", details);
                }
            }
            _ => {
                let reason = status.canonical_reason().unwrap_or("Unknown");
                error!("❓ {} {} - {}", status_code, reason, message);
                if let Some(details) = error_details {
                    error!("   📋 상세 에러: {}", details);
                }
            }
        }

        // JSON 응답 생성
        let response_body = json!({
            "success": false,
            "error": {
                "code": status_code,
                "message": message,
                "status": status.canonical_reason().unwrap_or("Unknown")
            }
        });

        HttpResponse::build(status).json(response_body)
    }

    pub fn bad_request(message: &str, details: Option<&str>) -> HttpResponse {
        Self::log_and_respond(StatusCode::BAD_REQUEST, message, details)
    }

    pub fn not_found(message: &str) -> HttpResponse {
        Self::log_and_respond(StatusCode::NOT_FOUND, message, None)
    }

    pub fn conflict(message: &str) -> HttpResponse {
        Self::log_and_respond(StatusCode::CONFLICT, message, None)
    }

    pub fn bad_gateway(message: &str, details: Option<&str>) -> HttpResponse {
        Self::log_and_respond(StatusCode::BAD_GATEWAY, message, details)
    }

    pub fn service_unavailable(message: &str) -> HttpResponse {
        Self::log_and_respond(StatusCode::SERVICE_UNAVAILABLE, message, None)
    }

    pub fn internal_server_error(message: &str, details: Option<&str>) -> HttpResponse {
        Self::log_and_respond(StatusCode::INTERNAL_SERVER_ERROR, message, details)
    }

    /// 화면 상태 에러를 HTTP 응답으로
    pub fn view_error(e: &ViewError) -> HttpResponse {
        let message = e.to_string();
        match e {
            ViewError::Geo(GeoError::InvalidRadius(_)) => Self::bad_request(&message, None),
            ViewError::Overlay(OverlayError::RenderSurfaceUnavailable) => {
                Self::service_unavailable(&message)
            }
            ViewError::Overlay(OverlayError::UnknownOverlay(_)) => Self::not_found(&message),
            ViewError::UnknownFriend(_) => Self::not_found(&message),
            ViewError::FriendRequest(FriendRequestError::NothingSelected) => {
                Self::bad_request(&message, None)
            }
            ViewError::FriendRequest(FriendRequestError::AlreadySent(_)) => {
                Self::conflict(&message)
            }
        }
    }
}
