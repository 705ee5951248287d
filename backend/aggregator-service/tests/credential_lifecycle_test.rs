mod common;

use aggregator_service::models::Platform;
use aggregator_service::AppError;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{credential_aged, seed_session, test_state};

#[tokio::test]
async fn stale_token_rejected_by_provider_is_refreshed_once() {
    let server = MockServer::start().await;
    let state = test_state(&server.uri());
    let (session_id, _) = seed_session(
        &state,
        Platform::Twitch,
        credential_aged("old-token", Some("refresh-1"), 7_200),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/twitch-auth/oauth2/validate"))
        .and(header("Authorization", "OAuth old-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/twitch-auth/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-token",
            "expires_in": 14400,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = state
        .credentials
        .ensure_valid_token(Platform::Twitch, &session_id)
        .await
        .unwrap();
    assert_eq!(record.credential.access_token, "new-token");
    // Twitch omitted a new refresh token; the old one is kept.
    assert_eq!(record.credential.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(record.credential.scope, vec!["user:read:follows".to_string()]);

    // Freshly refreshed: no second validation or refresh.
    let again = state
        .credentials
        .ensure_valid_token(Platform::Twitch, &session_id)
        .await
        .unwrap();
    assert_eq!(again.credential.access_token, "new-token");
}

#[tokio::test]
async fn stale_but_valid_token_only_updates_validation_time() {
    let server = MockServer::start().await;
    let state = test_state(&server.uri());
    let (session_id, _) = seed_session(
        &state,
        Platform::Twitch,
        credential_aged("live-token", Some("refresh-1"), 7_200),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/twitch-auth/oauth2/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "expires_in": 7200 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/twitch-auth/oauth2/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let before = chrono::Utc::now().timestamp();
    let record = state
        .credentials
        .ensure_valid_token(Platform::Twitch, &session_id)
        .await
        .unwrap();
    assert_eq!(record.credential.access_token, "live-token");
    assert!(record.credential.last_validated >= before);

    let stored = state
        .credentials
        .current(Platform::Twitch, &session_id)
        .await
        .unwrap();
    assert!(stored.credential.last_validated >= before);
}

#[tokio::test]
async fn failed_refresh_drops_the_credential() {
    let server = MockServer::start().await;
    let state = test_state(&server.uri());
    let (session_id, _) = seed_session(
        &state,
        Platform::Kick,
        // Past its 4h lifetime: refreshed without validating first.
        credential_aged("expired", Some("refresh-k"), 20_000),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/kick-auth/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .expect(1)
        .mount(&server)
        .await;

    let err = state
        .credentials
        .ensure_valid_token(Platform::Kick, &session_id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::TokenRefreshFailed {
            platform: Platform::Kick,
            ..
        }
    ));
    assert!(state.credentials.current(Platform::Kick, &session_id).await.is_none());
}

#[tokio::test]
async fn missing_refresh_token_logs_the_platform_out() {
    let server = MockServer::start().await;
    let state = test_state(&server.uri());
    let (session_id, _) = seed_session(
        &state,
        Platform::Youtube,
        credential_aged("expired", None, 20_000),
    )
    .await;

    assert!(!state.credentials.is_logged_in(Platform::Youtube, &session_id).await);
    assert!(state.credentials.current(Platform::Youtube, &session_id).await.is_none());
}

#[tokio::test]
async fn app_token_is_minted_once_and_cached() {
    let server = MockServer::start().await;
    let state = test_state(&server.uri());

    Mock::given(method("POST"))
        .and(path("/twitch-auth/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "app-token",
            "expires_in": 5000000,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let first = state.credentials.app_token(Platform::Twitch).await.unwrap();
    let second = state.credentials.app_token(Platform::Twitch).await.unwrap();
    assert_eq!(first, "app-token");
    assert_eq!(second, "app-token");
}

#[tokio::test]
async fn youtube_has_no_app_token() {
    let server = MockServer::start().await;
    let state = test_state(&server.uri());

    let err = state.credentials.app_token(Platform::Youtube).await.unwrap_err();
    assert!(matches!(err, AppError::OAuth(_)));
}
