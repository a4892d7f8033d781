use std::env;
use std::time::Duration;

use dotenv::dotenv;

use crate::geo::{Coordinate, FALLBACK_LOCATION};
use crate::region::DEFAULT_RADIUS_METERS;
use crate::scene::DEFAULT_MAP_LEVEL;

/// 요청이 없으면 세션을 정리하기까지의 기본 시간 (30분)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origin: String,

    // Remote API
    pub api_base_url: String,

    // Map
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_radius_meters: f64,
    pub map_level: u8,

    // Session
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // .env 파일 로드
        dotenv().ok();

        Ok(Self {
            // Server
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "5500".to_string())
                .parse()
                .unwrap_or(5500),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            // Remote API
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9999".to_string()),

            // Map
            default_latitude: env::var("DEFAULT_LATITUDE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(FALLBACK_LOCATION.latitude),
            default_longitude: env::var("DEFAULT_LONGITUDE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(FALLBACK_LOCATION.longitude),
            default_radius_meters: env::var("DEFAULT_RADIUS_METERS")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|r| r.is_finite() && *r >= 0.0)
                .unwrap_or(DEFAULT_RADIUS_METERS),
            map_level: env::var("MAP_LEVEL")
                .unwrap_or_else(|_| DEFAULT_MAP_LEVEL.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAP_LEVEL),

            // Session
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_SECS),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// 사용자 위치가 없을 때 쓸 기본 위치
    pub fn default_location(&self) -> Coordinate {
        Coordinate::new(self.default_latitude, self.default_longitude)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 5500,
            cors_allowed_origin: "http://localhost:3000".to_string(),
            api_base_url: "http://localhost:9999".to_string(),
            default_latitude: FALLBACK_LOCATION.latitude,
            default_longitude: FALLBACK_LOCATION.longitude,
            default_radius_meters: DEFAULT_RADIUS_METERS,
            map_level: DEFAULT_MAP_LEVEL,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}
