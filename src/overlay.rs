use log::{info, warn};
use serde::Serialize;

use crate::error::OverlayError;
use crate::friend::{Friend, FriendId, Selectable};
use crate::geo::Coordinate;
use crate::region::Region;
use crate::selection::SelectionState;

/// 내 위치 마커의 정보창 내용
pub const SELF_INFO_CONTENT: &str = "나";

/// 렌더링 쪽이 발급하는 마커 핸들. 한 번 쓴 값은 다시 쓰지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OverlayHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerMetadata {
    pub title: String,
    pub image_url: Option<String>,
}

/// 지도 SDK 경계. 실제 지도 구현은 이 트레이트 뒤에 숨는다.
pub trait RenderSurface {
    /// 지도를 붙일 영역이 준비되었는지
    fn is_available(&self) -> bool;

    fn create_marker(
        &mut self,
        coordinate: Coordinate,
        metadata: &MarkerMetadata,
    ) -> OverlayHandle;

    fn attach(&mut self, handle: OverlayHandle);

    fn detach(&mut self, handle: OverlayHandle);

    /// `handle` 마커 위에 정보창을 연다
    fn open_info_content(&mut self, handle: OverlayHandle, content: &str);

    fn close_info(&mut self, handle: OverlayHandle);

    fn pan_to(&mut self, coordinate: Coordinate);

    /// 검색 반경 원 표시
    fn outline_region(&mut self, _region: &Region) {}
}

/// 지도에 올라간 마커 하나. 선택 핸들러는 마커마다 정확히 하나다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub handle: OverlayHandle,
    pub coordinate: Coordinate,
    pub on_select: Selectable,
}

impl Overlay {
    pub fn info_content(&self) -> &str {
        match &self.on_select {
            Selectable::Me => SELF_INFO_CONTENT,
            Selectable::Friend(friend) => &friend.display_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub disposed: usize,
    pub created: usize,
}

/// 필터링된 친구 목록과 지도 마커를 맞춘다.
///
/// 부분 재사용 없이 매번 기존 마커를 모두 떼고 새로 만든다.
#[derive(Debug, Default)]
pub struct OverlaySyncManager {
    self_overlay: Option<Overlay>,
    friend_overlays: Vec<Overlay>,
}

impl OverlaySyncManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resync<S: RenderSurface>(
        &mut self,
        filtered: &[Friend],
        region: &Region,
        surface: &mut S,
    ) -> Result<SyncReport, OverlayError> {
        // 지도 영역이 없으면 아무것도 건드리지 않는다
        if !surface.is_available() {
            warn!("🗺️ 지도 영역을 찾을 수 없어 마커 갱신을 건너뜁니다");
            return Err(OverlayError::RenderSurfaceUnavailable);
        }

        let disposed = self.dispose_all(surface);

        surface.outline_region(region);

        let me = Self::create(surface, region.center(), Selectable::Me, SELF_INFO_CONTENT, None);
        self.self_overlay = Some(me);

        self.friend_overlays = filtered
            .iter()
            .map(|friend| {
                Self::create(
                    surface,
                    friend.coordinate,
                    Selectable::Friend(friend.clone()),
                    &friend.display_name,
                    friend.profile_image_url.clone(),
                )
            })
            .collect();

        let report = SyncReport {
            disposed,
            created: self.friend_overlays.len() + 1,
        };
        info!(
            "📍 마커 갱신 완료 - 제거 {}개, 생성 {}개 (반경 {}m)",
            report.disposed,
            report.created,
            region.radius_meters()
        );
        Ok(report)
    }

    fn create<S: RenderSurface>(
        surface: &mut S,
        coordinate: Coordinate,
        on_select: Selectable,
        title: &str,
        image_url: Option<String>,
    ) -> Overlay {
        let metadata = MarkerMetadata {
            title: title.to_string(),
            image_url,
        };
        let handle = surface.create_marker(coordinate, &metadata);
        surface.attach(handle);
        Overlay {
            handle,
            coordinate,
            on_select,
        }
    }

    /// 모든 마커를 지도에서 뗀다. 뗀 개수를 돌려준다.
    pub fn dispose_all<S: RenderSurface>(&mut self, surface: &mut S) -> usize {
        let mut disposed = 0;
        for overlay in self.self_overlay.take().into_iter().chain(self.friend_overlays.drain(..)) {
            surface.detach(overlay.handle);
            disposed += 1;
        }
        disposed
    }

    /// 마커 클릭: 해당 마커의 선택 핸들러를 실행한다
    pub fn click<S: RenderSurface>(
        &self,
        handle: OverlayHandle,
        selection: &mut SelectionState,
        surface: &mut S,
    ) -> Result<&Overlay, OverlayError> {
        let overlay = self.find(handle).ok_or(OverlayError::UnknownOverlay(handle))?;

        selection.select(overlay.on_select.clone(), surface);
        selection.close_all_open(surface);
        selection.open_info(overlay.handle, overlay.info_content(), surface);

        Ok(overlay)
    }

    pub fn find(&self, handle: OverlayHandle) -> Option<&Overlay> {
        self.self_overlay
            .iter()
            .chain(self.friend_overlays.iter())
            .find(|overlay| overlay.handle == handle)
    }

    pub fn overlay_for(&self, friend_id: &FriendId) -> Option<&Overlay> {
        self.friend_overlays.iter().find(|overlay| {
            overlay
                .on_select
                .friend()
                .is_some_and(|friend| &friend.id == friend_id)
        })
    }

    pub fn self_overlay(&self) -> Option<&Overlay> {
        self.self_overlay.as_ref()
    }

    /// 친구 마커 목록 (내 위치 마커 제외)
    pub fn overlays(&self) -> &[Overlay] {
        &self.friend_overlays
    }
}
