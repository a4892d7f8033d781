use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::error::{FriendRequestError, OverlayError, ViewError};
use crate::friend::{Friend, FriendId, Selectable};
use crate::friend_requests::{FriendRequestLedger, SentRequest};
use crate::geo::Coordinate;
use crate::overlay::{OverlayHandle, OverlaySyncManager, RenderSurface, SELF_INFO_CONTENT};
use crate::region::{self, Region};
use crate::scene::{Scene, SceneSurface};
use crate::selection::SelectionState;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MapStatus {
    Attached,
    /// 지도 없이 목록만 사용 가능
    Unavailable,
}

/// 친구 선택 시 띄우는 프로필 팝업
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePopup {
    pub user_id: String,
    pub nickname: String,
    pub profile_image: String,
    pub address: Option<String>,
}

impl From<&Friend> for ProfilePopup {
    fn from(friend: &Friend) -> Self {
        Self {
            user_id: friend.id.to_string(),
            nickname: friend.display_name.clone(),
            profile_image: friend.profile_image().to_string(),
            address: friend.address.clone(),
        }
    }
}

/// 주변 친구 찾기 화면 하나의 상태
///
/// 친구 목록, 내 위치, 반경 중 하나라도 바뀌면 필터링과 마커를 처음부터 다시 만든다.
pub struct NearbyFriendsView<S: RenderSurface> {
    session: Session,
    friends: Vec<Friend>,
    region: Region,
    displayed: Vec<Friend>,
    overlays: OverlaySyncManager,
    selection: SelectionState,
    requests: FriendRequestLedger,
    surface: S,
    map_status: MapStatus,
}

impl<S: RenderSurface> NearbyFriendsView<S> {
    pub fn new(session: Session, region: Region, surface: S) -> Self {
        let mut view = Self {
            session,
            friends: Vec::new(),
            region,
            displayed: Vec::new(),
            overlays: OverlaySyncManager::new(),
            selection: SelectionState::new(),
            requests: FriendRequestLedger::new(),
            surface,
            map_status: MapStatus::Unavailable,
        };
        view.recompute();
        view
    }

    /// 친구 목록 교체. 로그인한 본인은 목록에서 뺀다.
    pub fn replace_friends(&mut self, friends: Vec<Friend>) -> MapStatus {
        let me = self.session.user_id.as_str();
        self.friends = friends
            .into_iter()
            .filter(|friend| friend.id.as_str() != me)
            .collect();
        info!("👥 친구 목록 갱신: {}명", self.friends.len());
        self.recompute()
    }

    pub fn set_radius(&mut self, radius_meters: f64) -> Result<MapStatus, ViewError> {
        self.region = Region::new(self.region.center(), radius_meters)?;
        info!("⭕ 반경 변경: {}m", radius_meters);
        Ok(self.recompute())
    }

    pub fn set_location(&mut self, location: Coordinate) -> MapStatus {
        self.session.location = Some(location);
        self.region = self.region.with_center(location);
        info!("📍 내 위치 변경: ({}, {})", location.latitude, location.longitude);
        self.recompute()
    }

    /// 현재 상태로 다시 그린다. 지도 연결을 다시 시도할 때도 쓴다.
    pub fn recompute(&mut self) -> MapStatus {
        // 목록은 지도와 상관없이 항상 갱신
        self.displayed = region::filter(&self.friends, &self.region);

        let synced = self
            .overlays
            .resync(&self.displayed, &self.region, &mut self.surface);
        self.map_status = match synced {
            Ok(_) => {
                // 이전 정보창의 기준 마커는 이미 떼어졌다
                self.selection.close_all_open(&mut self.surface);
                MapStatus::Attached
            }
            Err(e) => {
                warn!("⚠️ 지도 없이 목록만 표시합니다: {}", e);
                MapStatus::Unavailable
            }
        };
        self.map_status
    }

    pub fn click_marker(&mut self, handle: OverlayHandle) -> Result<(), ViewError> {
        if !self.surface.is_available() {
            return Err(OverlayError::RenderSurfaceUnavailable.into());
        }
        let overlay = self.overlays.click(handle, &mut self.selection, &mut self.surface)?;
        info!("🖱️ 마커 클릭: {}", overlay.info_content());
        Ok(())
    }

    /// 목록에서 친구를 누르면 지도를 그 친구로 옮기고 정보창을 연다
    pub fn click_list_item(&mut self, friend_id: &FriendId) -> Result<(), ViewError> {
        let friend = self
            .displayed
            .iter()
            .find(|friend| &friend.id == friend_id)
            .cloned()
            .ok_or_else(|| ViewError::UnknownFriend(friend_id.clone()))?;

        let anchor = self.overlays.overlay_for(friend_id).map(|overlay| overlay.handle);
        let map_ready = self.surface.is_available();

        if map_ready {
            self.surface.pan_to(friend.coordinate);
        }
        self.selection.select(Selectable::Friend(friend.clone()), &mut self.surface);
        if let (true, Some(anchor)) = (map_ready, anchor) {
            self.selection.open_info(anchor, &friend.display_name, &mut self.surface);
        }
        info!("📋 목록 선택: {}", friend.display_name);
        Ok(())
    }

    /// 내 위치로 이동
    pub fn move_to_my_location(&mut self) {
        let me = self.region.center();
        let anchor = self.overlays.self_overlay().map(|overlay| overlay.handle);

        if self.surface.is_available() {
            self.surface.pan_to(me);
        }
        self.selection.select(Selectable::Me, &mut self.surface);
        if let (true, Some(anchor)) = (self.surface.is_available(), anchor) {
            self.selection.open_info(anchor, SELF_INFO_CONTENT, &mut self.surface);
        }
    }

    /// 팝업 닫기
    pub fn close_popup(&mut self) {
        self.selection.clear_selection(&mut self.surface);
    }

    /// 선택된 친구에게 보낼 요청을 만든다. 전송 후 `confirm_request`로 기록한다.
    pub fn request_friend(&self) -> Result<SentRequest, ViewError> {
        let friend = self
            .selection
            .selected()
            .and_then(Selectable::friend)
            .ok_or(FriendRequestError::NothingSelected)?;
        Ok(self.requests.prepare(&self.session.user_id, &friend.id)?)
    }

    pub fn confirm_request(&mut self, request: SentRequest) {
        info!("✅ 친구 요청 전송: {} -> {}", request.sender_id, request.receiver_id);
        self.requests.record(request);
    }

    pub fn sync_sent_requests(&mut self, sent: Vec<SentRequest>) {
        self.requests.replace(sent);
    }

    /// 로그아웃: 지도에서 모두 떼고 선택을 지운다
    pub fn close(&mut self) {
        self.selection.clear_selection(&mut self.surface);
        let disposed = self.overlays.dispose_all(&mut self.surface);
        info!("👋 화면 정리: 마커 {}개 제거", disposed);
    }

    pub fn popup(&self) -> Option<ProfilePopup> {
        self.selection
            .selected()
            .and_then(Selectable::friend)
            .map(ProfilePopup::from)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn displayed(&self) -> &[Friend] {
        &self.displayed
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn overlays(&self) -> &OverlaySyncManager {
        &self.overlays
    }

    pub fn map_status(&self) -> MapStatus {
        self.map_status
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub session_id: uuid::Uuid,
    pub user_id: String,
    pub region: Region,
    pub map_status: MapStatus,
    pub friends: Vec<Friend>,
    pub selected: Option<Selectable>,
    pub popup: Option<ProfilePopup>,
    /// 보낸 친구 요청을 서버와 마지막으로 맞춘 시각
    pub requests_synced_at: Option<DateTime<Utc>>,
    pub scene: Scene,
}

impl NearbyFriendsView<SceneSurface> {
    /// 지도 영역 준비 여부를 바꾸고 다시 그린다
    pub fn set_map_mounted(&mut self, mounted: bool) -> MapStatus {
        if mounted {
            self.surface.mount();
        } else {
            self.surface.unmount();
        }
        self.recompute()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            session_id: self.session.id,
            user_id: self.session.user_id.clone(),
            region: self.region,
            map_status: self.map_status,
            friends: self.displayed.clone(),
            selected: self.selection.selected().cloned(),
            popup: self.popup(),
            requests_synced_at: self.requests.synced_at(),
            scene: self.surface.snapshot(),
        }
    }
}
