use actix_web::{web, HttpResponse, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ViewError;
use crate::error_handler::ErrorHandler;
use crate::friend::{Friend, FriendId, UserRecord};
use crate::friend_requests::SentRequest;
use crate::geo::Coordinate;
use crate::nearby::{NearbyFriendsView, ViewSnapshot};
use crate::overlay::OverlayHandle;
use crate::region::Region;
use crate::scene::SceneSurface;
use crate::session::{LoginResponse, Session};
use crate::state::{AppState, SessionView};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub success: bool,
    pub message: String,
    pub view: ViewSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend_request: Option<SentRequest>,
}

impl ViewResponse {
    fn ok(message: &str, view: ViewSnapshot) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            view,
            friend_request: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    #[serde(flatten)]
    pub login: LoginResponse,
    #[serde(default = "map_mounted_default")]
    pub map_mounted: bool,
}

fn map_mounted_default() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusRequest {
    pub radius_meters: f64,
}

#[derive(Deserialize)]
pub struct MapRequest {
    pub mounted: bool,
}

const SESSION_NOT_FOUND: &str = "로그인 하셔야 이용할 수 있는 페이지입니다.";

pub fn setup_routes(config: &mut web::ServiceConfig) {
    config
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health_check))
                .service(
                    web::scope("/sessions")
                        .route("", web::post().to(open_session))
                        .route("/{id}", web::delete().to(close_session))
                        .route("/{id}/view", web::get().to(get_view))
                        .route("/{id}/friends", web::put().to(replace_friends))
                        .route("/{id}/friends/refresh", web::post().to(refresh_friends))
                        .route("/{id}/friends/{friend_id}/click", web::post().to(click_list_item))
                        .route("/{id}/radius", web::put().to(set_radius))
                        .route("/{id}/location", web::put().to(set_location))
                        .route("/{id}/map", web::put().to(set_map))
                        .route("/{id}/markers/{handle}/click", web::post().to(click_marker))
                        .route("/{id}/me", web::post().to(move_to_my_location))
                        .route("/{id}/selection", web::delete().to(close_popup))
                        .route("/{id}/friend-requests", web::post().to(send_friend_request)),
                ),
        )
        .route("/", web::get().to(index));
}

async fn index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "동네방네 주변 친구 API",
        "status": "running"
    })))
}

async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "dongnebangne",
        "sessions": state.sessions.len()
    })))
}

/// 세션의 화면에 `action`을 적용하고 최신 화면을 돌려준다
fn apply<F>(state: &AppState, id: Uuid, message: &str, action: F) -> HttpResponse
where
    F: FnOnce(&mut SessionView) -> Result<(), ViewError>,
{
    let outcome = state
        .sessions
        .with_view(id, |view| action(view).map(|_| view.snapshot()));

    match outcome {
        None => ErrorHandler::not_found(SESSION_NOT_FOUND),
        Some(Err(e)) => ErrorHandler::view_error(&e),
        Some(Ok(snapshot)) => HttpResponse::Ok().json(ViewResponse::ok(message, snapshot)),
    }
}

async fn open_session(
    state: web::Data<AppState>,
    body: web::Json<OpenSessionRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    if request.login.user_id.trim().is_empty() {
        return Ok(ErrorHandler::bad_request("userId가 필요합니다", None));
    }

    let session = Session::from_login(request.login);
    let center = session.viewer_location_or(state.config.default_location());
    let region = match Region::new(center, state.config.default_radius_meters) {
        Ok(region) => region,
        Err(e) => {
            return Ok(ErrorHandler::internal_server_error(
                "기본 반경 설정이 잘못되었습니다",
                Some(&e.to_string()),
            ));
        }
    };

    let surface = if request.map_mounted {
        SceneSurface::mounted(state.config.map_level)
    } else {
        SceneSurface::unmounted(state.config.map_level)
    };

    let view = NearbyFriendsView::new(session, region, surface);
    let snapshot = view.snapshot();
    state.sessions.open(view);

    Ok(HttpResponse::Created().json(ViewResponse::ok("로그인 성공", snapshot)))
}

async fn close_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    if state.sessions.close(path.into_inner()) {
        Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "로그아웃 되었습니다"
        })))
    } else {
        Ok(ErrorHandler::not_found(SESSION_NOT_FOUND))
    }
}

async fn get_view(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    Ok(apply(&state, path.into_inner(), "화면 조회 성공", |_| Ok(())))
}

async fn replace_friends(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<Vec<UserRecord>>,
) -> Result<HttpResponse> {
    let friends: Vec<Friend> = body.into_inner().into_iter().map(Friend::from).collect();
    Ok(apply(&state, path.into_inner(), "친구 목록 갱신", move |view| {
        view.replace_friends(friends);
        Ok(())
    }))
}

async fn refresh_friends(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let Some(user_id) = state.sessions.with_view(id, |view| view.session().user_id.clone()) else {
        return Ok(ErrorHandler::not_found(SESSION_NOT_FOUND));
    };

    info!("🔄 친구 데이터 새로고침: {}", user_id);
    let (friends, sent) = match state.api.fetch_nearby_data(&user_id).await {
        Ok(data) => data,
        Err(e) => {
            error!("친구 데이터를 가져오는 중 오류 발생: {:?}", e);
            return Ok(ErrorHandler::bad_gateway(
                "친구 데이터를 가져오는 데 오류가 발생했습니다.",
                Some(&format!("{:#}", e)),
            ));
        }
    };

    Ok(apply(&state, id, "친구 목록 갱신", move |view| {
        view.sync_sent_requests(sent);
        view.replace_friends(friends);
        Ok(())
    }))
}

async fn click_list_item(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse> {
    let (id, friend_id) = path.into_inner();
    let friend_id = FriendId(friend_id);
    Ok(apply(&state, id, "친구 선택", move |view| view.click_list_item(&friend_id)))
}

async fn set_radius(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<RadiusRequest>,
) -> Result<HttpResponse> {
    let radius = body.radius_meters;
    Ok(apply(&state, path.into_inner(), "반경 변경", move |view| {
        view.set_radius(radius).map(|_| ())
    }))
}

async fn set_location(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<Coordinate>,
) -> Result<HttpResponse> {
    let location = body.into_inner();
    Ok(apply(&state, path.into_inner(), "위치 변경", move |view| {
        view.set_location(location);
        Ok(())
    }))
}

async fn set_map(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<MapRequest>,
) -> Result<HttpResponse> {
    let mounted = body.mounted;
    Ok(apply(&state, path.into_inner(), "지도 상태 변경", move |view| {
        view.set_map_mounted(mounted);
        Ok(())
    }))
}

async fn click_marker(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, u64)>,
) -> Result<HttpResponse> {
    let (id, handle) = path.into_inner();
    Ok(apply(&state, id, "마커 선택", move |view| view.click_marker(OverlayHandle(handle))))
}

async fn move_to_my_location(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    Ok(apply(&state, path.into_inner(), "내 위치로 이동", |view| {
        view.move_to_my_location();
        Ok(())
    }))
}

async fn close_popup(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    Ok(apply(&state, path.into_inner(), "팝업 닫기", |view| {
        view.close_popup();
        Ok(())
    }))
}

async fn send_friend_request(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    // 전송 중에는 잠금을 잡지 않는다
    let request = match state.sessions.with_view(id, |view| view.request_friend()) {
        None => return Ok(ErrorHandler::not_found(SESSION_NOT_FOUND)),
        Some(Err(e)) => return Ok(ErrorHandler::view_error(&e)),
        Some(Ok(request)) => request,
    };

    if let Err(e) = state.api.send_friend_request(&request).await {
        return Ok(ErrorHandler::bad_gateway(
            "친구 요청 전송 중 오류 발생",
            Some(&format!("{:#}", e)),
        ));
    }

    let snapshot = state.sessions.with_view(id, |view| {
        view.confirm_request(request.clone());
        view.snapshot()
    });

    match snapshot {
        Some(snapshot) => Ok(HttpResponse::Created().json(ViewResponse {
            friend_request: Some(request),
            ..ViewResponse::ok("친구 요청이 전송되었습니다.", snapshot)
        })),
        // 전송 도중 로그아웃된 경우
        None => Ok(ErrorHandler::not_found(SESSION_NOT_FOUND)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    fn app_state() -> web::Data<AppState> {
        web::Data::new(AppState::new(Config::default()))
    }

    fn friends_body() -> Value {
        serde_json::json!([
            {"userId": "me", "userNick": "나", "latitude": 37.497942, "longitude": 127.027621},
            {"userId": "near", "userNick": "가까운친구", "latitude": 37.4990, "longitude": 127.0280,
             "userProImg": "/u/near.webp", "userAddress": "서울 강남구"},
            {"userId": "far", "userNick": "먼친구", "latitude": 37.60, "longitude": 127.20}
        ])
    }

    fn open_request(body: Value) -> test::TestRequest {
        test::TestRequest::post().uri("/api/sessions").set_json(body)
    }

    fn session_id(resp: &Value) -> String {
        resp["view"]["sessionId"].as_str().unwrap().to_string()
    }

    #[actix_web::test]
    async fn test_health() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(setup_routes)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["status"], "healthy");
        assert_eq!(resp["sessions"], 0);
    }

    #[actix_web::test]
    async fn test_nearby_flow() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(setup_routes)).await;
        let req = open_request(serde_json::json!({"userId": "me", "userNick": "나"})).to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        let id = session_id(&resp);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/friends", id))
            .set_json(friends_body())
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        let friends = resp["view"]["friends"].as_array().unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0]["id"], "near");
        assert_eq!(resp["view"]["mapStatus"], "attached");
        let markers = resp["view"]["scene"]["markers"].as_array().unwrap();
        assert_eq!(markers.len(), 2);

        // 친구 마커 클릭
        let handle = markers
            .iter()
            .find(|m| m["title"] == "가까운친구")
            .and_then(|m| m["handle"].as_u64())
            .unwrap();
        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/markers/{}/click", id, handle))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["view"]["popup"]["nickname"], "가까운친구");
        assert_eq!(resp["view"]["popup"]["profileImage"], "/u/near.webp");
        assert_eq!(resp["view"]["scene"]["infoWindow"]["anchor"], handle);

        // 팝업 닫기
        let req = test::TestRequest::delete()
            .uri(&format!("/api/sessions/{}/selection", id))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert!(resp["view"]["popup"].is_null());
        assert!(resp["view"]["scene"]["infoWindow"].is_null());

        // 반경 확대
        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/radius", id))
            .set_json(serde_json::json!({"radiusMeters": 50000.0}))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["view"]["friends"].as_array().unwrap().len(), 2);
        assert_eq!(resp["view"]["scene"]["markers"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_negative_radius_is_bad_request() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(setup_routes)).await;
        let req = open_request(serde_json::json!({"userId": "me"})).to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        let id = session_id(&resp);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/radius", id))
            .set_json(serde_json::json!({"radiusMeters": -10.0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unknown_session_is_not_found() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(setup_routes)).await;
        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/view", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_unmounted_map_reports_status() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(setup_routes)).await;
        let req =
            open_request(serde_json::json!({"userId": "me", "mapMounted": false})).to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        let id = session_id(&resp);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/friends", id))
            .set_json(friends_body())
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["view"]["mapStatus"], "unavailable");
        assert_eq!(resp["view"]["friends"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/markers/1/click", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/map", id))
            .set_json(serde_json::json!({"mounted": true}))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["view"]["mapStatus"], "attached");
        assert_eq!(resp["view"]["scene"]["markers"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_friend_request_validation() {
        let state = app_state();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(setup_routes)).await;
        let req = open_request(serde_json::json!({"userId": "me"})).to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        let id = session_id(&resp);

        // 선택 없이 요청
        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/friend-requests", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/friends", id))
            .set_json(friends_body())
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/friends/near/click", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // 이미 보낸 요청
        let session_id: Uuid = id.parse().unwrap();
        state.sessions.with_view(session_id, |view| {
            view.sync_sent_requests(vec![SentRequest {
                sender_id: "me".to_string(),
                receiver_id: "near".to_string(),
            }])
        });
        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/friend-requests", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_logout_removes_session() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(setup_routes)).await;
        let req = open_request(serde_json::json!({"userId": "me"})).to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        let id = session_id(&resp);

        let req = test::TestRequest::delete().uri(&format!("/api/sessions/{}", id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post().uri(&format!("/api/sessions/{}/me", id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_empty_user_id_rejected() {
        let app =
            test::init_service(App::new().app_data(app_state()).configure(setup_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(serde_json::json!({"userId": " "}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
