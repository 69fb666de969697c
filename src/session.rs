//! The conversation synchronization engine.
//!
//! A [`Session`] owns every piece of per-session state. It is driven from a
//! single loop ([`Session::run`]) that drains three queues: socket events,
//! background completions, and user commands. Nothing else mutates it.

use crate::api::client::ChatService;
use crate::api::models::{Contact, Message};
use crate::channel::{ChannelEvent, ConnectionState, MessageSink};
use crate::directory::ContactDirectory;
use crate::error::{ChatError, Result};
use crate::history::{HistoryLoad, spawn_fetch};
use crate::router::{self, Transcript, TranscriptLine};
use crate::selector::{ConversationSelector, HistoryTicket};
use crate::utils::spawn_async;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(String),
    Compose(String),
    Submit,
    AddContact(String),
    Shutdown,
}

/// What the rendering layer is told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Transcript(Vec<TranscriptLine>),
    Contacts(Vec<Contact>),
    ContactInvalid(bool),
    Connection(ConnectionState),
    SendFailed(String),
}

/// Results of background requests, delivered back onto the session loop.
#[derive(Debug)]
pub enum Completion {
    Contacts(Result<Vec<Contact>>),
    History(HistoryLoad),
    Verified { candidate: String, result: Result<bool> },
}

impl From<HistoryLoad> for Completion {
    fn from(load: HistoryLoad) -> Self {
        Completion::History(load)
    }
}

pub struct Session {
    selector: ConversationSelector,
    transcript: Transcript,
    directory: ContactDirectory,
    compose: String,
    contact_invalid: bool,
    connection: ConnectionState,
    service: Arc<dyn ChatService>,
    sink: Arc<dyn MessageSink>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    view: mpsc::UnboundedSender<ViewEvent>,
}

impl Session {
    pub fn new(
        local_user: impl Into<String>,
        service: Arc<dyn ChatService>,
        sink: Arc<dyn MessageSink>,
    ) -> (Self, mpsc::UnboundedReceiver<ViewEvent>) {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (view, view_rx) = mpsc::unbounded_channel();
        let connection = sink.state();
        let session = Self {
            selector: ConversationSelector::new(local_user),
            transcript: Transcript::new(),
            directory: ContactDirectory::new(),
            compose: String::new(),
            contact_invalid: false,
            connection,
            service,
            sink,
            completions_tx,
            completions_rx,
            view,
        };
        (session, view_rx)
    }

    pub fn local_user(&self) -> &str {
        self.selector.local_user()
    }

    pub fn current_conversation(&self) -> (&str, Option<&str>) {
        self.selector.current_conversation()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn contacts(&self) -> &[Contact] {
        self.directory.contacts()
    }

    pub fn compose_buffer(&self) -> &str {
        &self.compose
    }

    pub fn contact_invalid(&self) -> bool {
        self.contact_invalid
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    fn emit(&self, event: ViewEvent) {
        let _ = self.view.send(event);
    }

    fn emit_transcript(&self) {
        self.emit(ViewEvent::Transcript(self.transcript.lines(self.local_user())));
    }

    fn emit_contacts(&self) {
        self.emit(ViewEvent::Contacts(self.directory.contacts().to_vec()));
    }

    /// Kicks off the one-shot contact list fetch.
    pub fn start(&mut self) {
        let service = self.service.clone();
        let user = self.local_user().to_string();
        let done = self.completions_tx.clone();
        spawn_async(async move {
            let result = service.contact_list(&user).await;
            let _ = done.send(Completion::Contacts(result));
        });
    }

    /// Switches the active conversation. The transcript is emptied at once
    /// and reseeded when the history for this selection arrives.
    pub fn select_contact(&mut self, contact: &str) -> HistoryTicket {
        let ticket = self.selector.select_contact(contact);
        self.transcript.clear();
        self.emit_transcript();
        log::debug!("selected {} (epoch {})", contact, ticket.epoch);

        spawn_fetch(
            self.service.clone(),
            self.local_user().to_string(),
            ticket.clone(),
            self.completions_tx.clone(),
        );
        ticket
    }

    pub fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Message(msg) => {
                self.handle_inbound(msg);
            }
            ChannelEvent::State(state) => {
                log::info!("connection is now {:?}", state);
                self.connection = state;
                self.emit(ViewEvent::Connection(state));
            }
        }
    }

    pub fn handle_inbound(&mut self, msg: Message) -> bool {
        let accepted = router::route(&self.selector, &mut self.transcript, msg);
        if accepted {
            self.emit_transcript();
        }
        accepted
    }

    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.compose = text.into();
    }

    /// Sends the compose buffer to the active contact.
    ///
    /// Returns `Ok(false)` without side effects when no contact is selected
    /// or the buffer is empty. On failure the buffer is kept for a retry.
    pub fn submit(&mut self) -> Result<bool> {
        let Some(frame) = router::compose(&self.selector, &self.compose) else {
            return Ok(false);
        };
        if let Err(e) = self.sink.send(&frame) {
            self.emit(ViewEvent::SendFailed(e.to_string()));
            return Err(e);
        }
        self.compose.clear();
        Ok(true)
    }

    pub fn add_contact(&mut self, candidate: &str) {
        let candidate = candidate.trim().to_string();
        if candidate.is_empty() {
            self.set_contact_invalid(true);
            return;
        }
        let service = self.service.clone();
        let done = self.completions_tx.clone();
        spawn_async(async move {
            let result = service.verify_contact(&candidate).await;
            let _ = done.send(Completion::Verified { candidate, result });
        });
    }

    fn set_contact_invalid(&mut self, invalid: bool) {
        self.contact_invalid = invalid;
        self.emit(ViewEvent::ContactInvalid(invalid));
    }

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Contacts(result) => {
                self.directory.apply_load(result);
                self.emit_contacts();
            }
            Completion::History(HistoryLoad { ticket, result }) => {
                if !self.selector.is_current(&ticket) {
                    log::debug!(
                        "discarding stale history for {} (epoch {})",
                        ticket.contact,
                        ticket.epoch
                    );
                    return;
                }
                let history = result.unwrap_or_else(|e| {
                    log::warn!("{}", e);
                    Vec::new()
                });
                self.transcript.seed(history);
                self.emit_transcript();
            }
            Completion::Verified { candidate, result } => {
                match self.directory.apply_verification(&candidate, result) {
                    Ok(contact) => {
                        log::info!("added contact {}", contact.username);
                        self.set_contact_invalid(false);
                        self.emit_contacts();
                    }
                    Err(ChatError::InvalidContact(name)) => {
                        log::info!("contact {} does not exist", name);
                        self.set_contact_invalid(true);
                    }
                    Err(e) => log::warn!("could not verify {}: {}", candidate, e),
                }
            }
        }
    }

    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Select(contact) => {
                self.select_contact(&contact);
            }
            Command::Compose(text) => self.set_compose(text),
            Command::Submit => {
                if let Err(e) = self.submit() {
                    log::warn!("{}", e);
                }
            }
            Command::AddContact(candidate) => self.add_contact(&candidate),
            Command::Shutdown => return false,
        }
        true
    }

    /// Drives the session until `Shutdown` arrives or the command queue is
    /// dropped. A closed socket does not end the loop.
    pub async fn run(
        mut self,
        mut channel: mpsc::UnboundedReceiver<ChannelEvent>,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) {
        let mut channel_open = true;
        loop {
            tokio::select! {
                event = channel.recv(), if channel_open => match event {
                    Some(event) => self.handle_channel_event(event),
                    None => channel_open = false,
                },
                Some(completion) = self.completions_rx.recv() => self.apply(completion),
                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        log::info!("session for {} ended", self.local_user());
    }
}
