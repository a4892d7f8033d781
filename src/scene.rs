use log::debug;
use serde::Serialize;

use crate::geo::Coordinate;
use crate::overlay::{MarkerMetadata, OverlayHandle, RenderSurface};
use crate::region::Region;

/// 기본 지도 확대 레벨
pub const DEFAULT_MAP_LEVEL: u8 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMarker {
    pub handle: OverlayHandle,
    pub position: Coordinate,
    pub title: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoWindow {
    pub anchor: OverlayHandle,
    pub content: String,
}

/// 지도 화면 영역 (남서, 북동 모서리)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl From<geo_types::Rect<f64>> for Bounds {
    fn from(rect: geo_types::Rect<f64>) -> Self {
        Self {
            south_west: geo_types::Point::from(rect.min()).into(),
            north_east: geo_types::Point::from(rect.max()).into(),
        }
    }
}

/// 반경 원 (빨간 테두리, 반투명 채우기)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleOutline {
    pub center: Coordinate,
    pub radius: f64,
    /// 원 전체가 보이도록 지도를 맞출 영역
    pub bounds: Bounds,
    pub stroke_color: &'static str,
    pub stroke_opacity: f32,
    pub fill_color: &'static str,
    pub fill_opacity: f32,
}

impl From<&Region> for CircleOutline {
    fn from(region: &Region) -> Self {
        Self {
            center: region.center(),
            radius: region.radius_meters(),
            bounds: region.bounding_rect().into(),
            stroke_color: "#FF0000",
            stroke_opacity: 0.8,
            fill_color: "#FF0000",
            fill_opacity: 0.3,
        }
    }
}

/// 프런트 지도 SDK가 그대로 다시 그릴 수 있는 장면
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub mounted: bool,
    pub level: u8,
    pub center: Option<Coordinate>,
    pub circle: Option<CircleOutline>,
    pub markers: Vec<SceneMarker>,
    pub info_window: Option<InfoWindow>,
}

/// 지도 명령을 기록해 두는 `RenderSurface` 구현
#[derive(Debug)]
pub struct SceneSurface {
    mounted: bool,
    level: u8,
    next_handle: u64,
    center: Option<Coordinate>,
    circle: Option<CircleOutline>,
    markers: Vec<(SceneMarker, bool)>,
    info_window: Option<InfoWindow>,
}

impl SceneSurface {
    pub fn mounted(level: u8) -> Self {
        Self {
            mounted: true,
            level,
            next_handle: 0,
            center: None,
            circle: None,
            markers: Vec::new(),
            info_window: None,
        }
    }

    pub fn unmounted(level: u8) -> Self {
        Self {
            mounted: false,
            ..Self::mounted(level)
        }
    }

    pub fn mount(&mut self) {
        self.mounted = true;
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn snapshot(&self) -> Scene {
        Scene {
            mounted: self.mounted,
            level: self.level,
            center: self.center,
            circle: self.circle.clone(),
            markers: self
                .markers
                .iter()
                .filter(|(_, attached)| *attached)
                .map(|(marker, _)| marker.clone())
                .collect(),
            info_window: self.info_window.clone(),
        }
    }

    fn marker_mut(&mut self, handle: OverlayHandle) -> Option<&mut (SceneMarker, bool)> {
        self.markers.iter_mut().find(|(marker, _)| marker.handle == handle)
    }
}

impl RenderSurface for SceneSurface {
    fn is_available(&self) -> bool {
        self.mounted
    }

    fn create_marker(
        &mut self,
        coordinate: Coordinate,
        metadata: &MarkerMetadata,
    ) -> OverlayHandle {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.markers.push((
            SceneMarker {
                handle,
                position: coordinate,
                title: metadata.title.clone(),
                image_url: metadata.image_url.clone(),
            },
            false,
        ));
        handle
    }

    fn attach(&mut self, handle: OverlayHandle) {
        if let Some((_, attached)) = self.marker_mut(handle) {
            *attached = true;
        }
    }

    fn detach(&mut self, handle: OverlayHandle) {
        // 떼어낸 마커는 다시 쓰지 않으므로 기록에서도 지운다
        self.markers.retain(|(marker, _)| marker.handle != handle);
        if self.info_window.as_ref().is_some_and(|info| info.anchor == handle) {
            self.info_window = None;
        }
    }

    fn open_info_content(&mut self, handle: OverlayHandle, content: &str) {
        debug!("💬 정보창 열기: {:?} {}", handle, content);
        // 정보창은 지도에 하나뿐이다
        self.info_window = Some(InfoWindow {
            anchor: handle,
            content: content.to_string(),
        });
    }

    fn close_info(&mut self, handle: OverlayHandle) {
        if self.info_window.as_ref().is_some_and(|info| info.anchor == handle) {
            self.info_window = None;
        }
    }

    fn pan_to(&mut self, coordinate: Coordinate) {
        self.center = Some(coordinate);
    }

    fn outline_region(&mut self, region: &Region) {
        // 반경이 바뀌면 지도를 중심 위치로 다시 맞춘다
        self.center = Some(region.center());
        self.circle = Some(CircleOutline::from(region));
    }
}
