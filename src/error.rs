use thiserror::Error;

use crate::friend::FriendId;
use crate::overlay::OverlayHandle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("반경은 0 이상이어야 합니다: {0}")]
    InvalidRadius(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    #[error("지도 영역을 찾을 수 없습니다")]
    RenderSurfaceUnavailable,

    #[error("알 수 없는 마커: {0:?}")]
    UnknownOverlay(OverlayHandle),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FriendRequestError {
    #[error("선택된 친구가 없습니다")]
    NothingSelected,

    #[error("이미 친구 요청이 접수된 상태입니다")]
    AlreadySent(FriendId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error(transparent)]
    Geo(#[from] GeoError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),

    #[error(transparent)]
    FriendRequest(#[from] FriendRequestError),

    #[error("주변 친구 목록에 없는 사용자입니다: {0}")]
    UnknownFriend(FriendId),
}
