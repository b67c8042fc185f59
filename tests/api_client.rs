//! HTTP client tests against a mock Ignite Gym backend.
//!
//! These verify request shapes (paths, bodies, bearer token, multipart) and
//! the error convention: a JSON `message` is surfaced verbatim, everything
//! else maps to a generic failure.

use std::time::Duration;

use ignite_gym::api::{GymApi, GymClient, ProfileUpdate};
use ignite_gym::avatar::AvatarUpload;
use ignite_gym::{AppError, Session};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_body() -> serde_json::Value {
    json!({
        "user": {
            "id": 7,
            "name": "Ana Souza",
            "email": "ana@gym.com",
            "avatar": null
        },
        "token": "test-auth-token"
    })
}

#[tokio::test]
async fn test_sign_in_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sessions"))
        .and(body_json(json!({"email": "ana@gym.com", "password": "123456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GymClient::new(&mock_server.uri());
    let auth = client.sign_in("ana@gym.com", "123456").await.unwrap();

    assert_eq!(auth.user.id, "7");
    assert_eq!(auth.user.name, "Ana Souza");
    assert_eq!(auth.token, "test-auth-token");
}

#[tokio::test]
async fn test_sign_in_rejected_message_is_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({
                "status": "error",
                "message": "Invalid credentials."
            })),
        )
        .mount(&mock_server)
        .await;

    let client = GymClient::new(&mock_server.uri());
    let err = client.sign_in("a@b.com", "123456").await.unwrap_err();

    assert_eq!(err, AppError::application("Invalid credentials.", 400));
    assert_eq!(
        err.user_message("Could not sign in, try again later."),
        "Invalid credentials."
    );
}

#[tokio::test]
async fn test_error_without_message_is_unexpected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = GymClient::new(&mock_server.uri());
    let err = client.groups().await.unwrap_err();

    assert!(matches!(err, AppError::Unexpected(_)), "got {err:?}");
    assert_eq!(err.user_message("fallback"), "fallback");
}

#[tokio::test]
async fn test_malformed_success_body_is_unexpected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = GymClient::new(&mock_server.uri());
    let err = client.history().await.unwrap_err();
    assert!(matches!(err, AppError::Unexpected(_)), "got {err:?}");
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["costas"]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = GymClient::with_timeout(&mock_server.uri(), Duration::from_millis(50));
    let err = client.groups().await.unwrap_err();
    assert!(matches!(err, AppError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on port 9 (discard) in test environments
    let client = GymClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2));
    let err = client.groups().await.unwrap_err();
    assert!(matches!(err, AppError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_authenticated_requests_carry_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/exercises/bygroup/costas"))
        .and(header("Authorization", "Bearer test-auth-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "name": "Remada curvada",
                "series": 3,
                "repetitions": "12",
                "group": "costas",
                "demo": "remada.gif",
                "thumb": "remada.png"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = GymClient::new(&mock_server.uri());
    client.set_token(Some("test-auth-token".into()));
    assert!(client.is_authorized());

    let exercises = client.exercises_by_group("costas").await.unwrap();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0].id, "1");
    assert_eq!(exercises[0].repetitions, 12);
    assert_eq!(
        client.demo_url(&exercises[0].demo),
        format!("{}/exercise/demo/remada.gif", mock_server.uri())
    );
}

#[tokio::test]
async fn test_profile_update_omits_unchanged_password() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/users"))
        .and(body_json(json!({"name": "Ana Lima"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GymClient::new(&mock_server.uri());
    let update = ProfileUpdate {
        name: "Ana Lima".into(),
        password: None,
        old_password: None,
    };
    client.update_profile(&update).await.unwrap();
}

#[tokio::test]
async fn test_avatar_upload_is_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/users/avatar"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"avatar\""))
        .and(body_string_contains("filename=\"ana souza.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"avatar": "abc123.png"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GymClient::new(&mock_server.uri());
    let upload = AvatarUpload {
        file_name: "ana souza.png".into(),
        mime: "image/png".into(),
        bytes: b"\x89PNG fake".to_vec(),
    };
    let stored = client.update_avatar(&upload).await.unwrap();
    assert_eq!(stored, "abc123.png");
}

#[tokio::test]
async fn test_register_history_posts_exercise_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/history"))
        .and(body_json(json!({"exercise_id": "42"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GymClient::new(&mock_server.uri());
    client.register_history("42").await.unwrap();
}

#[tokio::test]
async fn test_sign_up_then_sign_in() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({
            "name": "Ana Souza",
            "email": "ana@gym.com",
            "password": "abcdef"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sessions"))
        .and(body_json(json!({"email": "ana@gym.com", "password": "abcdef"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = GymClient::new(&mock_server.uri());
    let mut session = Session::new();
    session
        .sign_up(&mut client, "Ana Souza", "ana@gym.com", "abcdef")
        .await
        .unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("test-auth-token"));
    assert!(client.is_authorized());
}

#[tokio::test]
async fn test_failed_sign_up_never_signs_in() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "E-mail already in use."})),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut client = GymClient::new(&mock_server.uri());
    let mut session = Session::new();
    let err = session
        .sign_up(&mut client, "Ana Souza", "ana@gym.com", "abcdef")
        .await
        .unwrap_err();

    assert_eq!(err.user_message("fallback"), "E-mail already in use.");
    assert!(!session.is_authenticated());
}
