use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::FriendRequestError;
use crate::friend::FriendId;

/// `GET /friend/sentRequests` 응답 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentRequest {
    pub sender_id: String,
    pub receiver_id: String,
}

/// 이 세션에서 이미 보낸 친구 요청 목록
#[derive(Debug, Default)]
pub struct FriendRequestLedger {
    sent: Vec<SentRequest>,
    synced_at: Option<DateTime<Utc>>,
}

impl FriendRequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 서버에서 받아온 목록으로 통째로 교체
    pub fn replace(&mut self, sent: Vec<SentRequest>) {
        info!("📨 보낸 친구 요청 {}건 동기화", sent.len());
        self.sent = sent;
        self.synced_at = Some(Utc::now());
    }

    pub fn already_sent(&self, receiver: &FriendId) -> bool {
        self.sent.iter().any(|request| request.receiver_id == receiver.as_str())
    }

    /// 보낼 요청을 검증한다. 기록은 전송이 성공한 뒤 `record`로 한다.
    pub fn prepare(
        &self,
        sender_id: &str,
        receiver: &FriendId,
    ) -> Result<SentRequest, FriendRequestError> {
        if self.already_sent(receiver) {
            return Err(FriendRequestError::AlreadySent(receiver.clone()));
        }
        Ok(SentRequest {
            sender_id: sender_id.to_string(),
            receiver_id: receiver.to_string(),
        })
    }

    pub fn record(&mut self, request: SentRequest) {
        if !self.sent.contains(&request) {
            self.sent.push(request);
        }
    }

    pub fn sent(&self) -> &[SentRequest] {
        &self.sent
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }
}
