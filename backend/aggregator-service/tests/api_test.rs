mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use aggregator_service::models::Platform;
use aggregator_service::routes::{configure_debug_routes, configure_routes};
use aggregator_service::services::oauth::KickState;
use aggregator_service::AppState;
use serde_json::{json, Value};
use stream_cache::CacheBackend;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{credential_aged, seed_session, test_state, FRONTEND_URL};

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes)
                .configure(configure_debug_routes),
        )
        .await
    };
}

async fn mount_app_token(server: &MockServer, token_path: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path(token_path.to_string()))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

#[actix_rt::test]
async fn health_reports_cache_state() {
    let server = MockServer::start().await;
    let app = app!(test_state(&server.uri()));

    let body: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cache"], "healthy");
}

#[actix_rt::test]
async fn following_without_session_is_empty() {
    let server = MockServer::start().await;
    let app = app!(test_state(&server.uri()));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/user/following").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn platform_following_without_session_is_unauthorized() {
    let server = MockServer::start().await;
    let app = app!(test_state(&server.uri()));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/user/twitch/following").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn search_rejects_short_queries() {
    let server = MockServer::start().await;
    let app = app!(test_state(&server.uri()));

    for uri in ["/api/search?q=a", "/api/search?q=%20x%20", "/api/search"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_rt::test]
async fn search_isolates_a_failing_platform() {
    let server = MockServer::start().await;
    mount_app_token(&server, "/twitch-auth/oauth2/token", "twitch-app").await;
    Mock::given(method("POST"))
        .and(path("/kick-auth/oauth/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/helix/users"))
        .and(query_param("login", "shroud"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "37402112",
                "login": "shroud",
                "display_name": "shroud",
                "broadcaster_type": "partner",
                "profile_image_url": "https://cdn.twitch/shroud.png"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("forHandle", "@Shroud"))
        .and(query_param("key", "youtube-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "UC-shroud",
                "snippet": { "title": "Shroud", "customUrl": "@shroud" }
            }]
        })))
        .mount(&server)
        .await;

    let app = app!(test_state(&server.uri()));
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/search?q=Shroud").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["twitch"]["username"], "shroud");
    assert_eq!(body["twitch"]["platform"], "twitch");
    assert_eq!(body["youtube"]["id"], "UC-shroud");
    assert_eq!(body["youtube"]["username"], "shroud");
    assert!(body["kick"].is_null());
}

#[actix_rt::test]
async fn kick_login_returns_url_and_sets_cookie() {
    let server = MockServer::start().await;
    let app = app!(test_state(&server.uri()));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/auth/kick/oauth").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.response().cookies().any(|c| c.name() == "omniview_session"));

    let body: Value = test::read_body_json(resp).await;
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with(&format!("{}/kick-auth/oauth/authorize?", server.uri())));
    assert!(url.contains("code_challenge_method=S256"));
}

#[actix_rt::test]
async fn kick_callback_with_garbage_state_redirects_with_error() {
    let server = MockServer::start().await;
    let app = app!(test_state(&server.uri()));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/kick/oauth/callback?code=abc&state=not-base64!")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("{}?error=invalid_state", FRONTEND_URL)
    );
}

#[actix_rt::test]
async fn provider_error_is_forwarded_to_frontend() {
    let server = MockServer::start().await;
    let app = app!(test_state(&server.uri()));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/twitch/callback?error=access_denied")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("{}?error=access_denied", FRONTEND_URL)
    );
}

#[actix_rt::test]
async fn twitch_callback_rejects_unissued_state() {
    let server = MockServer::start().await;
    let app = app!(test_state(&server.uri()));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/twitch/callback?code=abc&state=forged")
            .to_request(),
    )
    .await;
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("{}?error=invalid_state", FRONTEND_URL)
    );
}

#[actix_rt::test]
async fn kick_callback_exchanges_code_with_state_verifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/kick-auth/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("code_verifier=any-verifier-the-client-chose"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "kick-user-token",
            "refresh_token": "kick-refresh",
            "expires_in": 7200,
            "token_type": "Bearer",
            "scope": "user:read channel:read"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/kick-api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "user_id": 4242, "name": "alice", "profile_picture": "https://kick/alice.png" }]
        })))
        .mount(&server)
        .await;

    let app = app!(test_state(&server.uri()));
    let state_param = KickState::new("any-verifier-the-client-chose").encode().unwrap();
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/auth/kick/oauth/callback?code=the-code&state={}",
                state_param
            ))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("{}/auth/success?platform=kick", FRONTEND_URL)
    );
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "omniview_session")
        .unwrap()
        .into_owned();

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/kick/authenticated")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["profile"]["id"], "4242");
    assert_eq!(body["profile"]["display_name"], "alice");
    assert!(body.get("access_token").is_none());
}

#[actix_rt::test]
async fn login_status_lists_every_platform() {
    let server = MockServer::start().await;
    let state = test_state(&server.uri());
    let (_, cookie) = seed_session(&state, Platform::Twitch, credential_aged("t", Some("r"), 10)).await;
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/auth/status").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(
        body,
        json!({
            "data": [
                { "platform": "Youtube", "loggedIn": false },
                { "platform": "Twitch", "loggedIn": true },
                { "platform": "Kick", "loggedIn": false }
            ],
            "error": null
        })
    );
}

#[actix_rt::test]
async fn public_status_reflects_app_credentials() {
    let server = MockServer::start().await;
    mount_app_token(&server, "/twitch-auth/oauth2/token", "twitch-app").await;
    Mock::given(method("POST"))
        .and(path("/kick-auth/oauth/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let app = app!(test_state(&server.uri()));

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/auth/status/public").to_request(),
    )
    .await;
    assert_eq!(body["data"][0], json!({ "platform": "Twitch", "accessTokenAvailable": true }));
    assert_eq!(body["data"][1], json!({ "platform": "Youtube", "accessTokenAvailable": true }));
    assert_eq!(body["data"][2], json!({ "platform": "Kick", "accessTokenAvailable": false }));
}

#[actix_rt::test]
async fn top_streams_degrade_per_platform() {
    let server = MockServer::start().await;
    mount_app_token(&server, "/kick-auth/oauth/token", "kick-app").await;
    mount_app_token(&server, "/twitch-auth/oauth2/token", "twitch-app").await;
    Mock::given(method("GET"))
        .and(path("/helix/streams"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/kick-api/livestreams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "broadcaster_user_id": 7,
                "slug": "xqc",
                "stream_title": "live",
                "viewer_count": 50000,
                "thumbnail": "https://kick/thumb.jpg"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/kick-api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "user_id": 7, "name": "xQc", "profile_picture": "https://kick/xqc.png" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;
    let app = app!(test_state(&server.uri()));

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/public/top_streams").to_request(),
    )
    .await;
    assert_eq!(body["twitch"], json!([]));
    assert_eq!(body["youtube"], json!([]));
    assert_eq!(body["kick"][0]["user_id"], "7");
    assert_eq!(body["kick"][0]["profile_image_url"], "https://kick/xqc.png");
    assert_eq!(body["kick"][0]["user_name"], "xQc");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/public/twitch/top_streams").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/public/mixer/top_streams").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn logout_clears_only_that_platform() {
    let server = MockServer::start().await;
    let state = test_state(&server.uri());
    let (session_id, cookie) = seed_session(&state, Platform::Kick, credential_aged("k", Some("r"), 10)).await;
    state
        .credentials
        .store(
            &session_id,
            &aggregator_service::models::PlatformSession::new(
                Platform::Twitch,
                credential_aged("t", Some("r"), 10),
            ),
        )
        .await
        .unwrap();
    let credentials = state.credentials.clone();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/auth/kick/clear").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(credentials.current(Platform::Kick, &session_id).await.is_none());
    assert!(credentials.current(Platform::Twitch, &session_id).await.is_some());
}

#[actix_rt::test]
async fn debug_routes_expose_cache_contents() {
    let server = MockServer::start().await;
    let state: AppState = test_state(&server.uri());
    state.cache.set("twitch:top_streams", &json!([{ "id": "1" }]), 60).await;
    state.cache.backend().set_raw("plain", "text".to_string(), 60).await.unwrap();
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/debug/cache/keys").to_request(),
    )
    .await;
    assert_eq!(body["keys"], json!(["plain", "twitch:top_streams"]));

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/debug/cache/get?key=twitch:top_streams")
            .to_request(),
    )
    .await;
    assert_eq!(body["value"][0]["id"], "1");

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/debug/cache/get?key=plain").to_request(),
    )
    .await;
    assert_eq!(body["value"], "text");

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri("/api/debug/cache/flush").to_request(),
    )
    .await;
    assert_eq!(body["deleted"], 2);
}
