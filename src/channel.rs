//! The persistent socket to the chat server.
//!
//! Inbound frames are parsed and pushed onto a queue of [`ChannelEvent`]s in
//! receipt order; the session drains that queue on its own loop. Outbound
//! frames go through a writer task so `send` never blocks the caller.

use crate::api::events::IncomingEvent;
use crate::api::models::{Message, OutboundFrame};
use crate::error::{ChatError, Result};
use crate::utils::spawn_async;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Message(Message),
    State(ConnectionState),
}

/// Outbound half of the connection as seen by the session.
pub trait MessageSink: Send + Sync {
    fn send(&self, frame: &OutboundFrame) -> Result<()>;
    fn state(&self) -> ConnectionState;
}

pub struct ConnectionChannel {
    url: Url,
    connected: bool,
    announced: bool,
    outbound: Option<mpsc::UnboundedSender<WsMessage>>,
    state: Arc<watch::Sender<ConnectionState>>,
}

fn mark_closed(
    state: &watch::Sender<ConnectionState>,
    events: &mpsc::UnboundedSender<ChannelEvent>,
) {
    let changed = state.send_if_modified(|s| {
        if *s == ConnectionState::Closed {
            false
        } else {
            *s = ConnectionState::Closed;
            true
        }
    });
    if changed {
        let _ = events.send(ChannelEvent::State(ConnectionState::Closed));
    }
}

impl ConnectionChannel {
    pub fn new(ws_url: &str) -> Result<Self> {
        let url = Url::parse(ws_url)?;
        let (state, _) = watch::channel(ConnectionState::Closed);
        Ok(Self {
            url,
            connected: false,
            announced: false,
            outbound: None,
            state: Arc::new(state),
        })
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Opens the socket. Allowed once per channel; there is no reconnect.
    ///
    /// The returned queue yields `State(Open)` first, then every routable
    /// inbound chat in receipt order, then `State(Closed)` when the socket
    /// drops.
    pub async fn connect(&mut self) -> Result<mpsc::UnboundedReceiver<ChannelEvent>> {
        if self.connected {
            return Err(ChatError::AlreadyConnected);
        }
        self.connected = true;
        self.state.send_replace(ConnectionState::Connecting);

        let (ws, _) = match connect_async(self.url.as_str()).await {
            Ok(pair) => pair,
            Err(e) => {
                self.state.send_replace(ConnectionState::Closed);
                return Err(ChatError::Connect(e.to_string()));
            }
        };
        log::info!("WebSocket connected to {}", self.url);

        let (mut write, mut read) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<WsMessage>();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        self.state.send_replace(ConnectionState::Open);
        let _ = events_tx.send(ChannelEvent::State(ConnectionState::Open));

        let state = self.state.clone();
        let events = events_tx.clone();
        spawn_async(async move {
            while let Some(frame) = out_rx.recv().await {
                if let Err(e) = write.send(frame).await {
                    log::warn!("WebSocket write error: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
            mark_closed(&state, &events);
        });

        let state = self.state.clone();
        spawn_async(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(WsMessage::Text(text)) => match IncomingEvent::from_text(&text) {
                        IncomingEvent::Chat(msg) => {
                            if events_tx.send(ChannelEvent::Message(msg)).is_err() {
                                break;
                            }
                        }
                        IncomingEvent::Ignored(reason) => log::debug!("dropping frame: {}", reason),
                    },
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("WebSocket read error: {}", e);
                        break;
                    }
                }
            }
            log::info!("WebSocket closed");
            mark_closed(&state, &events_tx);
        });

        self.outbound = Some(out_tx);
        Ok(events_rx)
    }

    /// Resolves once the handshake has finished, successfully or not.
    pub async fn wait_open(&self) -> Result<()> {
        let mut rx = self.state.subscribe();
        let state = *rx
            .wait_for(|s| *s != ConnectionState::Connecting)
            .await
            .map_err(|_| ChatError::NotConnected)?;
        match state {
            ConnectionState::Open => Ok(()),
            _ => Err(ChatError::NotConnected),
        }
    }

    /// Tells the server who is on the other end of this socket. Only the
    /// first call after open transmits anything.
    pub fn announce_presence(&mut self, user: &str) -> Result<()> {
        if self.state() != ConnectionState::Open {
            return Err(ChatError::NotConnected);
        }
        if self.announced {
            log::debug!("presence already announced for {}", user);
            return Ok(());
        }
        self.transmit(&OutboundFrame::Bootup {
            user: user.to_string(),
        })?;
        self.announced = true;
        log::info!("announced presence for {}", user);
        Ok(())
    }

    pub async fn connect_and_announce(
        &mut self,
        user: &str,
    ) -> Result<mpsc::UnboundedReceiver<ChannelEvent>> {
        let events = self.connect().await?;
        self.wait_open().await?;
        self.announce_presence(user)?;
        Ok(events)
    }

    fn transmit(&self, frame: &OutboundFrame) -> Result<()> {
        let out = self
            .outbound
            .as_ref()
            .ok_or_else(|| ChatError::Send("connection is not open".into()))?;
        let json = serde_json::to_string(frame).map_err(|e| ChatError::Send(e.to_string()))?;
        out.send(WsMessage::Text(json))
            .map_err(|_| ChatError::Send("writer has shut down".into()))
    }
}

impl MessageSink for ConnectionChannel {
    fn send(&self, frame: &OutboundFrame) -> Result<()> {
        if self.state() != ConnectionState::Open {
            return Err(ChatError::Send("connection is not open".into()));
        }
        self.transmit(frame)
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }
}
