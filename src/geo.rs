use serde::{Deserialize, Serialize};

/// 지구 반지름 (미터)
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// 사용자 위치를 알 수 없을 때 쓰는 기본 위치 (강남역)
pub const FALLBACK_LOCATION: Coordinate = Coordinate {
    latitude: 37.497942,
    longitude: 127.027621,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<Coordinate> for geo_types::Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo_types::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<geo_types::Point<f64>> for Coordinate {
    fn from(point: geo_types::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// 두 좌표 사이의 대권 거리를 미터 단위로 계산 (haversine)
///
/// 위경도 범위는 검증하지 않는다. 유한한 입력이면 항상 0 이상의 유한한 값을 돌려준다.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let rad_lat1 = a.latitude.to_radians();
    let rad_lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = ((delta_lat / 2.0).sin().powi(2)
        + rad_lat1.cos() * rad_lat2.cos() * (delta_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}
