use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// 프로필 이미지가 없는 사용자에게 보여주는 기본 이미지
pub const DEFAULT_PROFILE_IMAGE: &str = "/images/profile.png";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FriendId(pub String);

impl FriendId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FriendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FriendId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// 주변 친구 후보. 외부 API에서 받아온 값이며 여기서는 수정하지 않는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: FriendId,
    pub display_name: String,
    pub coordinate: Coordinate,
    pub profile_image_url: Option<String>,
    pub address: Option<String>,
}

// 식별은 id로만 한다
impl PartialEq for Friend {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Friend {}

impl Hash for Friend {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Friend {
    pub fn new(id: &str, display_name: &str, coordinate: Coordinate) -> Self {
        Self {
            id: FriendId::from(id),
            display_name: display_name.to_string(),
            coordinate,
            profile_image_url: None,
            address: None,
        }
    }

    pub fn profile_image(&self) -> &str {
        self.profile_image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_PROFILE_IMAGE)
    }
}

/// `GET /user` 응답의 사용자 레코드
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    pub user_nick: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub user_pro_img: Option<String>,
    #[serde(default)]
    pub user_address: Option<String>,
}

impl From<UserRecord> for Friend {
    fn from(record: UserRecord) -> Self {
        Self {
            id: FriendId(record.user_id),
            display_name: record.user_nick,
            coordinate: Coordinate::new(record.latitude, record.longitude),
            profile_image_url: record.user_pro_img,
            address: record.user_address,
        }
    }
}

/// 선택 가능한 대상: 나 자신 또는 친구
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "friend", rename_all = "camelCase")]
pub enum Selectable {
    Me,
    Friend(Friend),
}

impl Selectable {
    pub fn friend(&self) -> Option<&Friend> {
        match self {
            Selectable::Me => None,
            Selectable::Friend(friend) => Some(friend),
        }
    }
}
