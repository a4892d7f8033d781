use anyhow::{Context, Result};
use log::{error, info};
use reqwest::Client;

use crate::friend::{Friend, UserRecord};
use crate::friend_requests::SentRequest;

/// 동네방네 API 서버 클라이언트
#[derive(Clone)]
pub struct RemoteApi {
    client: Client,
    base_url: String,
}

impl RemoteApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 사용자 목록 (`GET /user?userId=`)
    pub async fn fetch_friends(&self, user_id: &str) -> Result<Vec<Friend>> {
        let records: Vec<UserRecord> = self
            .client
            .get(self.url("/user"))
            .query(&[("userId", user_id)])
            .send()
            .await
            .context("친구 데이터 요청 실패")?
            .error_for_status()
            .context("친구 데이터를 가져오는 데 오류가 발생했습니다")?
            .json()
            .await
            .context("친구 데이터 파싱 실패")?;

        info!("📥 친구 데이터 {}건 수신", records.len());
        Ok(records.into_iter().map(Friend::from).collect())
    }

    /// 보낸 친구 요청 목록 (`GET /friend/sentRequests?userId=`)
    pub async fn fetch_sent_requests(&self, user_id: &str) -> Result<Vec<SentRequest>> {
        let sent = self
            .client
            .get(self.url("/friend/sentRequests"))
            .query(&[("userId", user_id)])
            .send()
            .await
            .context("보낸 친구 요청 조회 실패")?
            .error_for_status()
            .context("보낸 친구 요청을 가져오는 중 오류 발생")?
            .json()
            .await
            .context("보낸 친구 요청 파싱 실패")?;
        Ok(sent)
    }

    /// 화면 진입 시처럼 친구 목록과 보낸 요청을 동시에 가져온다
    pub async fn fetch_nearby_data(
        &self,
        user_id: &str,
    ) -> Result<(Vec<Friend>, Vec<SentRequest>)> {
        futures::try_join!(self.fetch_friends(user_id), self.fetch_sent_requests(user_id))
    }

    /// 친구 추가 요청 (`POST /friend/addFriendRequest?senderId=&receiverId=`)
    pub async fn send_friend_request(&self, request: &SentRequest) -> Result<()> {
        let response = self
            .client
            .post(self.url("/friend/addFriendRequest"))
            .query(&[
                ("senderId", request.sender_id.as_str()),
                ("receiverId", request.receiver_id.as_str()),
            ])
            .send()
            .await
            .context("서버에 요청을 보냈으나 응답이 없습니다")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ 친구 요청 전송 실패: {} {}", status, body);
            return Err(anyhow::anyhow!("서버 오류: {} {}", status, body));
        }
        Ok(())
    }
}
