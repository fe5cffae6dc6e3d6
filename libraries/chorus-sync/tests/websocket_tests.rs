//! Change channel over a real websocket.

use chorus_core::{Playlist, PlaylistId, Track};
use chorus_sync::{ChangeChannel, ChannelConnector, ChannelEvent, ChannelMessage, WebSocketConnector};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

const MBID: &str = "4a9f5c6e-2b1d-4e8f-9c3a-7d6b5e4f3a21";

fn playlist(title: &str) -> Playlist {
    let mut playlist = Playlist::new(PlaylistId::from_mbid(MBID).unwrap(), title, "alice");
    playlist.append_track(Track::from_recording("T1", "One", "Band"));
    playlist
}

#[tokio::test]
async fn joins_receives_and_broadcasts_over_websocket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let joined = ws.next().await.unwrap().unwrap().into_text().unwrap();
        assert_eq!(
            ChannelMessage::from_text(&joined).unwrap(),
            ChannelMessage::joined(MBID)
        );

        let pushed = ChannelMessage::PlaylistChanged(Box::new(playlist("From server")));
        ws.send(Message::Text(pushed.to_text().unwrap()))
            .await
            .unwrap();

        let change = ws.next().await.unwrap().unwrap().into_text().unwrap();
        ChannelMessage::from_text(&change).unwrap()
        // socket dropped here
    });

    let connector: Arc<dyn ChannelConnector> =
        Arc::new(WebSocketConnector::new(&format!("ws://{}", addr), "/socket.io/").unwrap());
    let channel = ChangeChannel::open(connector, PlaylistId::from_mbid(MBID).unwrap())
        .await
        .unwrap();

    match channel.next_event().await.unwrap() {
        ChannelEvent::PlaylistChanged(p) => assert_eq!(p.title, "From server"),
        other => panic!("unexpected {:?}", other),
    }

    channel.broadcast(&playlist("From client")).await.unwrap();
    match server.await.unwrap() {
        ChannelMessage::ChangePlaylist(p) => assert_eq!(p.title, "From client"),
        other => panic!("unexpected {}", other.event_name()),
    }

    assert!(matches!(
        channel.next_event().await,
        Some(ChannelEvent::Disconnected { .. })
    ));
    assert!(!channel.is_connected().await);
}

#[tokio::test]
async fn connect_failure_is_reported() {
    // Nothing listens on the discard port
    let connector: Arc<dyn ChannelConnector> =
        Arc::new(WebSocketConnector::new("ws://127.0.0.1:9", "/").unwrap());

    let result = ChangeChannel::open(connector, PlaylistId::from_mbid(MBID).unwrap()).await;

    assert!(matches!(
        result,
        Err(chorus_sync::ChannelError::Connect(_))
    ));
}
