use serde::Serialize;

use crate::error::GeoError;
use crate::friend::Friend;
use crate::geo::{Coordinate, EARTH_RADIUS_METERS, distance_meters};

/// 기본 검색 반경 (미터)
pub const DEFAULT_RADIUS_METERS: f64 = 1000.0;

/// 중심 좌표와 반경으로 정의되는 원형 검색 영역. 값 전체를 교체하는 식으로만 바꾼다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    center: Coordinate,
    radius_meters: f64,
}

impl Region {
    pub fn new(center: Coordinate, radius_meters: f64) -> Result<Self, GeoError> {
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(GeoError::InvalidRadius(radius_meters));
        }
        Ok(Self { center, radius_meters })
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    pub fn with_center(&self, center: Coordinate) -> Self {
        Self { center, ..*self }
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        distance_meters(self.center, coordinate) <= self.radius_meters
    }

    /// 원을 감싸는 위경도 사각형 (x = 경도, y = 위도)
    pub fn bounding_rect(&self) -> geo_types::Rect<f64> {
        let center = geo_types::Point::from(self.center);
        let lat_delta = (self.radius_meters / EARTH_RADIUS_METERS).to_degrees();
        // 극지방에서 경도 폭이 무한대가 되지 않게
        let lng_delta = lat_delta / center.y().to_radians().cos().abs().max(1e-6);

        geo_types::Rect::new(
            geo_types::Point::new(center.x() - lng_delta, center.y() - lat_delta),
            geo_types::Point::new(center.x() + lng_delta, center.y() + lat_delta),
        )
    }
}

/// 영역 안에 있는 친구만 입력 순서대로 돌려준다. 캐시 없이 매번 전체를 다시 계산한다.
pub fn filter(friends: &[Friend], region: &Region) -> Vec<Friend> {
    friends
        .iter()
        .filter(|friend| region.contains(friend.coordinate))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::FALLBACK_LOCATION;

    fn friends() -> Vec<Friend> {
        vec![
            Friend::new("a", "A", FALLBACK_LOCATION),
            Friend::new("b", "B", Coordinate::new(37.60, 127.20)),
            Friend::new("c", "C", Coordinate::new(37.5010, 127.0270)),
            Friend::new("d", "D", Coordinate::new(37.4950, 127.0300)),
            Friend::new("e", "E", Coordinate::new(37.5665, 126.9780)),
        ]
    }

    #[test]
    fn test_gangnam_scenario() {
        let region = Region::new(FALLBACK_LOCATION, 1000.0).unwrap();
        let result = filter(&friends()[..2], &region);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id.as_str(), "a");
    }

    #[test]
    fn test_output_is_bounded_subsequence() {
        let input = friends();
        for radius in [0.0, 10.0, 500.0, 1000.0, 5000.0, 50_000.0] {
            let region = Region::new(FALLBACK_LOCATION, radius).unwrap();
            let result = filter(&input, &region);
            assert!(result.len() <= input.len());
            for friend in &result {
                assert!(distance_meters(region.center(), friend.coordinate) <= radius);
            }
            // 입력 순서 유지
            let positions: Vec<usize> = result
                .iter()
                .map(|f| input.iter().position(|i| i == f).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_monotonic_in_radius() {
        let input = friends();
        let mut previous = 0;
        for radius in [0.0, 100.0, 400.0, 1000.0, 10_000.0, 30_000.0, 100_000.0] {
            let region = Region::new(FALLBACK_LOCATION, radius).unwrap();
            let count = filter(&input, &region).len();
            assert!(count >= previous, "radius {} shrank result", radius);
            previous = count;
        }
        assert_eq!(previous, input.len());
    }

    #[test]
    fn test_zero_radius_only_exact_center() {
        let region = Region::new(FALLBACK_LOCATION, 0.0).unwrap();
        let result = filter(&friends(), &region);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].coordinate, FALLBACK_LOCATION);
    }

    #[test]
    fn test_empty_list_yields_empty() {
        let region = Region::new(FALLBACK_LOCATION, DEFAULT_RADIUS_METERS).unwrap();
        assert!(filter(&[], &region).is_empty());
    }

    #[test]
    fn test_invalid_radius_rejected() {
        assert_eq!(
            Region::new(FALLBACK_LOCATION, -1.0),
            Err(GeoError::InvalidRadius(-1.0))
        );
        assert!(Region::new(FALLBACK_LOCATION, f64::NAN).is_err());
        assert!(Region::new(FALLBACK_LOCATION, f64::INFINITY).is_err());
    }

    #[test]
    fn test_with_center_keeps_radius() {
        let region = Region::new(FALLBACK_LOCATION, 250.0).unwrap();
        let moved = region.with_center(Coordinate::new(35.0, 129.0));
        assert_eq!(moved.radius_meters(), 250.0);
        assert_eq!(moved.center(), Coordinate::new(35.0, 129.0));
    }

    #[test]
    fn test_bounding_rect_encloses_circle() {
        let region = Region::new(FALLBACK_LOCATION, 1000.0).unwrap();
        let rect = region.bounding_rect();
        let south_west = Coordinate::from(geo_types::Point::from(rect.min()));
        let north_east = Coordinate::from(geo_types::Point::from(rect.max()));

        // 원 위의 동서남북 끝점이 사각형 변에 닿는다
        let north = Coordinate::new(north_east.latitude, FALLBACK_LOCATION.longitude);
        let east = Coordinate::new(FALLBACK_LOCATION.latitude, north_east.longitude);
        assert!((distance_meters(FALLBACK_LOCATION, north) - 1000.0).abs() < 1.0);
        assert!((distance_meters(FALLBACK_LOCATION, east) - 1000.0).abs() < 5.0);
        assert!(south_west.latitude < FALLBACK_LOCATION.latitude);
        assert!(south_west.longitude < FALLBACK_LOCATION.longitude);
    }

    #[test]
    fn test_zero_radius_bounding_rect_is_point() {
        let region = Region::new(FALLBACK_LOCATION, 0.0).unwrap();
        let rect = region.bounding_rect();
        assert_eq!(rect.min(), rect.max());
        assert_eq!(Coordinate::from(geo_types::Point::from(rect.center())), FALLBACK_LOCATION);
    }
}
