//! Per-playlist change channel.
//!
//! A [`ChangeChannel`] owns one transport at a time and a pump task that
//! forwards outgoing changes and surfaces incoming ones as [`ChannelEvent`]s.

use crate::error::ChannelError;
use crate::message::ChannelMessage;
use crate::transport::{ChannelConnector, ChannelTransport};
use chorus_core::{Playlist, PlaylistId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long `dispose` waits for the transport to close before aborting.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Something that happened on the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Another viewer replaced the playlist
    PlaylistChanged(Box<Playlist>),

    /// The connection ended; call `reconnect` to resume
    Disconnected {
        /// Why the connection ended
        reason: String,
    },
}

struct Link {
    playlist_id: PlaylistId,
    outgoing: Option<mpsc::UnboundedSender<ChannelMessage>>,
    task: Option<JoinHandle<()>>,
    events: Option<mpsc::UnboundedSender<ChannelEvent>>,
}

impl Link {
    fn is_disposed(&self) -> bool {
        self.events.is_none()
    }

    /// Let the current pump close its transport and exit on its own.
    fn detach(&mut self) {
        self.outgoing = None;
        self.task = None;
    }
}

/// Change subscription for one playlist.
///
/// All methods take `&self` so a session can broadcast while another task
/// waits on [`ChangeChannel::next_event`]. Dropping the channel aborts its
/// pump task.
pub struct ChangeChannel {
    connector: Arc<dyn ChannelConnector>,
    link: Mutex<Link>,
    events_rx: Mutex<mpsc::UnboundedReceiver<ChannelEvent>>,
}

impl ChangeChannel {
    /// Connect and announce `joined` for `playlist_id`.
    pub async fn open(
        connector: Arc<dyn ChannelConnector>,
        playlist_id: PlaylistId,
    ) -> Result<Self, ChannelError> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let channel = Self {
            connector,
            link: Mutex::new(Link {
                playlist_id,
                outgoing: None,
                task: None,
                events: Some(events_tx),
            }),
            events_rx: Mutex::new(events_rx),
        };

        {
            let mut link = channel.link.lock().await;
            channel.attach(&mut link).await?;
        }
        Ok(channel)
    }

    async fn attach(&self, link: &mut Link) -> Result<(), ChannelError> {
        let events = link.events.clone().ok_or(ChannelError::Closed)?;

        let mut transport = self.connector.connect().await?;
        transport
            .send(ChannelMessage::joined(link.playlist_id.mbid()))
            .await?;

        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let playlist_id = link.playlist_id.clone();
        link.task = Some(tokio::spawn(pump(
            transport,
            outgoing_rx,
            events,
            playlist_id,
        )));
        link.outgoing = Some(outgoing_tx);

        info!(playlist_id = %link.playlist_id, "Joined change channel");
        Ok(())
    }

    /// Playlist this channel is subscribed to
    pub async fn playlist_id(&self) -> PlaylistId {
        self.link.lock().await.playlist_id.clone()
    }

    /// Whether a live connection is attached
    pub async fn is_connected(&self) -> bool {
        self.link
            .lock()
            .await
            .outgoing
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Send the full updated playlist to the other viewers.
    ///
    /// Fails with `Closed` when disposed or disconnected; nothing is queued
    /// for a later connection.
    pub async fn broadcast(&self, playlist: &Playlist) -> Result<(), ChannelError> {
        let link = self.link.lock().await;
        if link.playlist_id != playlist.identifier {
            return Err(ChannelError::Protocol(format!(
                "channel is subscribed to {}, not {}",
                link.playlist_id, playlist.identifier
            )));
        }
        let outgoing = link
            .outgoing
            .as_ref()
            .filter(|tx| !tx.is_closed())
            .ok_or(ChannelError::Closed)?;

        outgoing
            .send(ChannelMessage::ChangePlaylist(Box::new(playlist.clone())))
            .map_err(|_| ChannelError::Closed)?;
        debug!(playlist_id = %playlist.identifier, tracks = playlist.track.len(), "Broadcast playlist change");
        Ok(())
    }

    /// Wait for the next event; `None` once the channel is disposed.
    pub async fn next_event(&self) -> Option<ChannelEvent> {
        self.events_rx.lock().await.recv().await
    }

    /// Drop the current connection and join again on a fresh one.
    pub async fn reconnect(&self) -> Result<(), ChannelError> {
        let mut link = self.link.lock().await;
        if link.is_disposed() {
            return Err(ChannelError::Closed);
        }
        link.detach();
        info!(playlist_id = %link.playlist_id, "Reconnecting change channel");
        self.attach(&mut link).await
    }

    /// Leave the current playlist and subscribe to another.
    pub async fn retarget(&self, playlist_id: PlaylistId) -> Result<(), ChannelError> {
        let mut link = self.link.lock().await;
        if link.is_disposed() {
            return Err(ChannelError::Closed);
        }
        link.detach();
        debug!(from = %link.playlist_id, to = %playlist_id, "Switching change channel");
        link.playlist_id = playlist_id;
        self.attach(&mut link).await
    }

    /// Close the transport and stop delivering events. Idempotent.
    pub async fn dispose(&self) {
        let mut link = self.link.lock().await;
        if link.is_disposed() {
            return;
        }
        link.events = None;
        link.outgoing = None;

        if let Some(mut task) = link.task.take() {
            if tokio::time::timeout(CLOSE_GRACE, &mut task).await.is_err() {
                warn!(playlist_id = %link.playlist_id, "Change channel did not close in time");
                task.abort();
            }
        }
        info!(playlist_id = %link.playlist_id, "Change channel disposed");
    }

    /// Whether `dispose` has been called
    pub async fn is_disposed(&self) -> bool {
        self.link.lock().await.is_disposed()
    }
}

impl Drop for ChangeChannel {
    fn drop(&mut self) {
        if let Some(task) = self.link.get_mut().task.take() {
            task.abort();
        }
    }
}

/// Shuttle frames between the transport and the channel handle.
async fn pump(
    mut transport: Box<dyn ChannelTransport>,
    mut outgoing: mpsc::UnboundedReceiver<ChannelMessage>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    playlist_id: PlaylistId,
) {
    let reason = loop {
        tokio::select! {
            message = outgoing.recv() => match message {
                Some(message) => {
                    if let Err(e) = transport.send(message).await {
                        break format!("send failed: {}", e);
                    }
                }
                None => {
                    // Handle detached or disposed: leave quietly
                    if let Err(e) = transport.close().await {
                        debug!(playlist_id = %playlist_id, error = %e, "Error closing change channel");
                    }
                    return;
                }
            },
            incoming = transport.recv() => match incoming {
                Some(Ok(ChannelMessage::PlaylistChanged(playlist))) => {
                    debug!(playlist_id = %playlist_id, "Received playlist change");
                    if events.send(ChannelEvent::PlaylistChanged(playlist)).is_err() {
                        return;
                    }
                }
                Some(Ok(other)) => {
                    debug!(playlist_id = %playlist_id, event = other.event_name(), "Ignoring channel message");
                }
                Some(Err(e)) if e.is_recoverable() => {
                    warn!(playlist_id = %playlist_id, error = %e, "Dropping malformed channel message");
                }
                Some(Err(e)) => break e.to_string(),
                None => break "closed by peer".to_string(),
            },
        }
    };

    // Mark the handle disconnected before anyone hears about it
    drop(outgoing);
    drop(transport);

    warn!(playlist_id = %playlist_id, reason = %reason, "Change channel disconnected");
    let _ = events.send(ChannelEvent::Disconnected { reason });
}
