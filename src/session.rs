use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::{Coordinate, FALLBACK_LOCATION};

/// 로그인 API 응답 (`POST /login`, `GET /naver/callback`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    #[serde(default)]
    pub user_nick: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// 로그인한 사용자. 로그인 시 만들어지고 로그아웃 시 사라진다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    pub nickname: Option<String>,
    pub location: Option<Coordinate>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn from_login(login: LoginResponse) -> Self {
        // 위도/경도 둘 다 있어야 위치로 인정
        let location = match (login.latitude, login.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        };

        Self {
            id: Uuid::new_v4(),
            user_id: login.user_id,
            nickname: login.user_nick,
            location,
            created_at: Utc::now(),
        }
    }

    pub fn viewer_location(&self) -> Coordinate {
        self.viewer_location_or(FALLBACK_LOCATION)
    }

    pub fn viewer_location_or(&self, fallback: Coordinate) -> Coordinate {
        self.location.unwrap_or(fallback)
    }
}
