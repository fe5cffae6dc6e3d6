//! Tests for the Playlist API client.
//!
//! These tests use mock servers to verify request shapes and error
//! translation without a real API.

use chorus_client::{ApiError, ClientConfig, ExportFormat, PlaylistApiClient, PlaylistGateway};
use chorus_core::{Playlist, PlaylistId, RecordingId, Track};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MBID: &str = "4b7c8b6a-3e3a-4d5e-9a57-0c1a0f5a4a11";
const TOKEN: &str = "user_token";

fn playlist_id() -> PlaylistId {
    PlaylistId::from_mbid(MBID).unwrap()
}

fn client_for(server: &MockServer) -> PlaylistApiClient {
    PlaylistApiClient::new(ClientConfig::new(server.uri())).unwrap()
}

fn playlist_json() -> serde_json::Value {
    serde_json::json!({
        "playlist": {
            "identifier": format!("https://listenbrainz.org/playlist/{MBID}"),
            "title": "Shared mix",
            "creator": "alice",
            "annotation": "for the road",
            "date": "2024-03-01T10:00:00+00:00",
            "track": [
                {"identifier": "https://musicbrainz.org/recording/t1", "title": "One", "creator": "A"},
                {"identifier": "https://musicbrainz.org/recording/t2", "title": "Two", "creator": "B"}
            ],
            "extension": {
                "https://musicbrainz.org/doc/jspf#playlist": {
                    "public": true,
                    "collaborators": ["bob"]
                }
            }
        }
    })
}

// =============================================================================
// Fetch Tests
// =============================================================================

mod fetch {
    use super::*;

    #[tokio::test]
    async fn test_get_playlist_with_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/1/playlist/{MBID}")))
            .and(header("Authorization", "Bearer user_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(playlist_json()))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let playlist = client
            .get_playlist(Some(TOKEN), &playlist_id())
            .await
            .unwrap();

        assert_eq!(playlist.title, "Shared mix");
        assert_eq!(playlist.track.len(), 2);
        assert_eq!(playlist.collaborators(), ["bob"]);
        assert!(playlist.is_public());
    }

    #[tokio::test]
    async fn test_get_missing_playlist() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/1/playlist/{MBID}")))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "code": 404,
                "error": "Cannot find playlist"
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.get_playlist(None, &playlist_id()).await;

        match result.unwrap_err() {
            ApiError::NotFound(msg) => assert_eq!(msg, "Cannot find playlist"),
            e => panic!("Expected NotFound error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/1/playlist/{MBID}")))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.get_playlist(None, &playlist_id()).await;
        assert!(matches!(result, Err(ApiError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client = PlaylistApiClient::new(ClientConfig::new("http://127.0.0.1:9")).unwrap();

        let result = client.get_playlist(None, &playlist_id()).await;
        match result.unwrap_err() {
            e @ (ApiError::Network(_) | ApiError::Request(_)) => assert!(e.is_network()),
            e => panic!("Expected Network error, got: {:?}", e),
        }
    }
}

// =============================================================================
// Item Tests
// =============================================================================

mod items {
    use super::*;

    #[tokio::test]
    async fn test_add_track_sends_single_track() {
        let mock_server = MockServer::start().await;
        let track = Track::from_recording("t9", "Nine", "Band");

        Mock::given(method("POST"))
            .and(path(format!("/1/playlist/{MBID}/item/add")))
            .and(header("Authorization", "Bearer user_token"))
            .and(body_json(serde_json::json!({
                "playlist": {
                    "track": [{
                        "identifier": "https://musicbrainz.org/recording/t9",
                        "title": "Nine",
                        "creator": "Band"
                    }]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client.add_track(TOKEN, &playlist_id(), &track).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_track_conflict() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/1/playlist/{MBID}/item/delete")))
            .and(body_json(serde_json::json!({"mbid": "t2", "index": 1, "count": 1})))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "code": 409,
                "error": "Recording at index 1 does not match"
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client
            .delete_track(TOKEN, &playlist_id(), &RecordingId::new("t2"), 1)
            .await;

        match result.unwrap_err() {
            ApiError::Conflict(msg) => assert!(msg.contains("index 1")),
            e => panic!("Expected Conflict error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_move_track_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/1/playlist/{MBID}/item/move")))
            .and(body_json(serde_json::json!({"mbid": "t3", "from": 2, "to": 0, "count": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client
            .move_track(TOKEN, &playlist_id(), &RecordingId::new("t3"), 2, 0, 1)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_forbidden_is_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/1/playlist/{MBID}/item/move")))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "code": 403,
                "error": "You are not allowed to edit this playlist"
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client
            .move_track(TOKEN, &playlist_id(), &RecordingId::new("t3"), 2, 0, 1)
            .await;

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_missing_token_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let track = Track::from_recording("t9", "Nine", "Band");

        assert!(matches!(
            client.add_track("", &playlist_id(), &track).await,
            Err(ApiError::Unauthenticated)
        ));
        assert!(matches!(
            client.delete_playlist("", &playlist_id()).await,
            Err(ApiError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/1/playlist/{MBID}/item/add")))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let track = Track::from_recording("t9", "Nine", "Band");
        let result = client.add_track(TOKEN, &playlist_id(), &track).await;

        match result.unwrap_err() {
            ApiError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 12),
            e => panic!("Expected RateLimited error, got: {:?}", e),
        }
    }
}

// =============================================================================
// Playlist Tests
// =============================================================================

mod playlists {
    use super::*;

    #[tokio::test]
    async fn test_edit_metadata_sends_document_without_tracks() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/1/playlist/edit/{MBID}")))
            .and(header("Authorization", "Bearer user_token"))
            .and(body_partial_json(serde_json::json!({
                "playlist": {
                    "identifier": format!("https://listenbrainz.org/playlist/{MBID}"),
                    "title": "Renamed",
                    "creator": "alice",
                    "annotation": "desc",
                    "extension": {
                        "https://musicbrainz.org/doc/jspf#playlist": {
                            "public": false,
                            "collaborators": ["bob", "carol"]
                        }
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let mut playlist: Playlist =
            serde_json::from_value(playlist_json()["playlist"].clone()).unwrap();
        playlist.title = "Renamed".into();
        playlist.annotation = "desc".into();
        let ext = playlist.extension_mut();
        ext.public = false;
        ext.collaborators = vec!["bob".into(), "Alice".into(), "carol".into()];

        client.edit_metadata(TOKEN, &playlist).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let sent = body["playlist"].as_object().unwrap();
        assert!(!sent.contains_key("track"));
        assert!(sent.contains_key("date"));
        assert_eq!(
            body["playlist"]["extension"]["https://musicbrainz.org/doc/jspf#playlist"]["collaborators"],
            serde_json::json!(["bob", "carol"])
        );
    }

    #[tokio::test]
    async fn test_create_and_copy_return_new_ids() {
        let mock_server = MockServer::start().await;
        let new_mbid = "0d6a3f0c-57f2-4a49-9c5e-3ee0c9a27b51";

        Mock::given(method("POST"))
            .and(path("/1/playlist/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "playlist_mbid": new_mbid
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("/1/playlist/{MBID}/copy")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "playlist_mbid": new_mbid
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let draft = Playlist::new(playlist_id(), "Draft", "alice");

        let created = client.create_playlist(TOKEN, &draft).await.unwrap();
        assert_eq!(created.mbid(), new_mbid);

        let copied = client.copy_playlist(TOKEN, &playlist_id()).await.unwrap();
        assert_eq!(copied.mbid(), new_mbid);
    }

    #[tokio::test]
    async fn test_delete_playlist() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/1/playlist/{MBID}/delete")))
            .and(header("Authorization", "Bearer user_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client.delete_playlist(TOKEN, &playlist_id()).await.unwrap();
    }

    #[tokio::test]
    async fn test_export_to_xspf() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/1/playlist/{MBID}/export/xspf")))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/xspf+xml")
                    .set_body_string("<playlist version=\"1\"/>"),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let export = client
            .export_to_format(TOKEN, &playlist_id(), ExportFormat::Xspf)
            .await
            .unwrap()
            .with_title("Shared mix");

        assert_eq!(export.filename, "Shared mix.xspf");
        assert_eq!(export.content_type, "application/xspf+xml");
        assert_eq!(export.bytes, b"<playlist version=\"1\"/>");

        let dir = tempfile::tempdir().unwrap();
        let saved = export.save_to_dir(dir.path()).await.unwrap();
        assert!(saved.ends_with("Shared mix.xspf"));
    }

    #[tokio::test]
    async fn test_server_error_keeps_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/1/playlist/{MBID}/delete")))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        match client.delete_playlist(TOKEN, &playlist_id()).await.unwrap_err() {
            ApiError::ServerError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            e => panic!("Expected ServerError, got: {:?}", e),
        }
    }
}
