use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;
use uuid::Uuid;

use crate::config::{Config, DEFAULT_SESSION_TTL_SECS};
use crate::nearby::NearbyFriendsView;
use crate::remote_api::RemoteApi;
use crate::scene::SceneSurface;

pub type SessionView = NearbyFriendsView<SceneSurface>;

/// 오래 쓰지 않은 세션을 정리하는 주기
pub const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

pub struct AppState {
    pub config: Config,
    pub api: RemoteApi,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let api = RemoteApi::new(&config.api_base_url);
        let sessions = SessionStore::new(config.session_ttl());
        Self {
            config,
            api,
            sessions,
        }
    }
}

struct SessionEntry {
    view: SessionView,
    last_seen: DateTime<Utc>,
}

/// 로그인한 세션별 주변 친구 화면
///
/// `ttl` 동안 요청이 없던 세션은 로그아웃 없이도 정리된다.
pub struct SessionStore {
    entries: Mutex<HashMap<Uuid, SessionEntry>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 로그인 시 화면 등록. 만료된 세션도 이때 함께 정리한다.
    pub fn open(&self, view: SessionView) -> Uuid {
        let id = view.session().id;
        let last_seen = view.session().created_at;
        info!("🔑 세션 시작: {} ({})", view.session().user_id, id);

        let mut entries = self.lock();
        Self::prune(&mut entries, self.ttl, Utc::now());
        entries.insert(id, SessionEntry { view, last_seen });
        id
    }

    /// 로그아웃 시 화면 정리
    pub fn close(&self, id: Uuid) -> bool {
        match self.lock().remove(&id) {
            Some(mut entry) => {
                entry.view.close();
                info!("🔒 세션 종료: {}", id);
                true
            }
            None => false,
        }
    }

    pub fn with_view<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionView) -> R) -> Option<R> {
        self.lock().get_mut(&id).map(|entry| {
            entry.last_seen = Utc::now();
            f(&mut entry.view)
        })
    }

    /// 만료된 세션을 모두 정리하고 정리한 개수를 돌려준다
    pub fn prune_idle(&self) -> usize {
        self.prune_idle_at(Utc::now())
    }

    fn prune_idle_at(&self, now: DateTime<Utc>) -> usize {
        Self::prune(&mut self.lock(), self.ttl, now)
    }

    fn prune(
        entries: &mut HashMap<Uuid, SessionEntry>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> usize {
        let expired: Vec<Uuid> = entries
            .iter()
            .filter(|(_, entry)| (now - entry.last_seen).to_std().is_ok_and(|idle| idle > ttl))
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            if let Some(mut entry) = entries.remove(id) {
                entry.view.close();
                info!("⌛ 세션 만료: {} ({})", entry.view.session().user_id, id);
            }
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
