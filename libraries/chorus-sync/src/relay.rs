//! In-process change relay.
//!
//! Plays the push server's role for sessions living in one process: every
//! `change_playlist` from one subscriber is delivered as `playlist_changed`
//! to all other subscribers of the same playlist.

use crate::error::ChannelError;
use crate::message::ChannelMessage;
use crate::transport::{ChannelConnector, ChannelTransport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, info};

type Room = HashMap<u64, mpsc::UnboundedSender<ChannelMessage>>;

#[derive(Default)]
struct HubInner {
    rooms: Mutex<HashMap<String, Room>>,
    next_id: AtomicU64,
}

/// Shared hub; clones refer to the same rooms.
#[derive(Clone, Default)]
pub struct RelayHub {
    inner: Arc<HubInner>,
}

impl RelayHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    fn rooms(&self) -> MutexGuard<'_, HashMap<String, Room>> {
        // Room maps stay consistent even if a holder panicked
        self.inner
            .rooms
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Number of live subscribers of a playlist
    pub fn subscriber_count(&self, playlist_mbid: &str) -> usize {
        self.rooms().get(playlist_mbid).map_or(0, HashMap::len)
    }

    /// Drop every subscriber of a playlist, as the server does when it goes away
    pub fn disconnect_all(&self, playlist_mbid: &str) {
        if let Some(room) = self.rooms().remove(playlist_mbid) {
            info!(playlist_id = %playlist_mbid, subscribers = room.len(), "Relay room closed");
        }
    }

    fn join(&self, playlist_mbid: &str, id: u64, inbox: mpsc::UnboundedSender<ChannelMessage>) {
        self.rooms()
            .entry(playlist_mbid.to_string())
            .or_default()
            .insert(id, inbox);
        debug!(playlist_id = %playlist_mbid, subscriber = id, "Subscriber joined");
    }

    fn leave(&self, playlist_mbid: &str, id: u64) {
        let mut rooms = self.rooms();
        if let Some(room) = rooms.get_mut(playlist_mbid) {
            room.remove(&id);
            if room.is_empty() {
                rooms.remove(playlist_mbid);
            }
        }
    }

    /// Deliver to every subscriber of the room except the sender
    fn fan_out(&self, playlist_mbid: &str, sender: u64, message: &ChannelMessage) -> usize {
        let mut rooms = self.rooms();
        let Some(room) = rooms.get_mut(playlist_mbid) else {
            return 0;
        };

        // Receivers that went away are pruned here
        room.retain(|id, inbox| *id == sender || inbox.send(message.clone()).is_ok());
        room.len().saturating_sub(1)
    }
}

#[async_trait]
impl ChannelConnector for RelayHub {
    async fn connect(&self) -> Result<Box<dyn ChannelTransport>, ChannelError> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(RelayTransport {
            hub: self.clone(),
            id,
            subscription: None,
        }))
    }
}

struct Subscription {
    room: String,
    inbox: mpsc::UnboundedReceiver<ChannelMessage>,
}

/// One subscriber's connection to a [`RelayHub`].
///
/// Each `joined` opens a fresh inbox registered with the hub; the hub closes
/// the subscription by dropping its sender.
pub struct RelayTransport {
    hub: RelayHub,
    id: u64,
    subscription: Option<Subscription>,
}

impl RelayTransport {
    fn unsubscribe(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.hub.leave(&subscription.room, self.id);
        }
    }
}

#[async_trait]
impl ChannelTransport for RelayTransport {
    async fn send(&mut self, message: ChannelMessage) -> Result<(), ChannelError> {
        match message {
            ChannelMessage::Joined { playlist_id } => {
                self.unsubscribe();
                let (inbox_tx, inbox) = mpsc::unbounded_channel();
                self.hub.join(&playlist_id, self.id, inbox_tx);
                self.subscription = Some(Subscription {
                    room: playlist_id,
                    inbox,
                });
                Ok(())
            }
            ChannelMessage::ChangePlaylist(playlist) => {
                let room = self
                    .subscription
                    .as_ref()
                    .map(|s| s.room.as_str())
                    .ok_or_else(|| ChannelError::Protocol("change sent before joining".into()))?;
                let delivered =
                    self.hub
                        .fan_out(room, self.id, &ChannelMessage::PlaylistChanged(playlist));
                debug!(playlist_id = %room, delivered, "Relayed playlist change");
                Ok(())
            }
            ChannelMessage::PlaylistChanged(_) => Err(ChannelError::Protocol(
                "playlist_changed is server-to-client only".into(),
            )),
        }
    }

    async fn recv(&mut self) -> Option<Result<ChannelMessage, ChannelError>> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.inbox.recv().await.map(Ok),
            // Nothing can arrive before joining
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        self.unsubscribe();
        Ok(())
    }
}

impl Drop for RelayTransport {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
