use crate::api::models::Contact;
use crate::channel::ConnectionState;
use crate::router::TranscriptLine;
use crate::session::{Command, ViewEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Maps one input line to the commands it stands for.
pub fn parse_line(line: &str) -> Vec<Command> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(contact) = line.strip_prefix("/to ") {
        return vec![Command::Select(contact.trim().to_string())];
    }
    if let Some(name) = line.strip_prefix("/add ") {
        return vec![Command::AddContact(name.trim().to_string())];
    }
    if line.trim() == "/quit" {
        return vec![Command::Shutdown];
    }
    if line.is_empty() {
        return Vec::new();
    }
    vec![Command::Compose(line.to_string()), Command::Submit]
}

pub async fn read_commands(commands: mpsc::UnboundedSender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                for command in parse_line(&line) {
                    if commands.send(command).is_err() {
                        return;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::warn!("stdin: {}", e);
                break;
            }
        }
    }
    let _ = commands.send(Command::Shutdown);
}

fn print_contacts(contacts: &[Contact]) {
    println!("-- contacts --");
    for c in contacts {
        println!("  {}", c.username);
    }
}

fn print_line(line: &TranscriptLine) {
    if line.own {
        println!("{:>40}", line.text);
    } else {
        println!("{}: {}", line.from, line.text);
    }
}

/// Prints view events. Transcript updates that only extend what is already
/// on screen print just the new lines.
pub async fn render(mut events: mpsc::UnboundedReceiver<ViewEvent>) {
    let mut shown: Vec<TranscriptLine> = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            ViewEvent::Transcript(lines) => {
                if lines.starts_with(&shown) {
                    lines[shown.len()..].iter().for_each(print_line);
                } else {
                    println!("----");
                    lines.iter().for_each(print_line);
                }
                shown = lines;
            }
            ViewEvent::Contacts(contacts) => print_contacts(&contacts),
            ViewEvent::ContactInvalid(true) => println!("! contact does not exist"),
            ViewEvent::ContactInvalid(false) => {}
            ViewEvent::Connection(ConnectionState::Closed) => println!("! disconnected"),
            ViewEvent::Connection(_) => {}
            ViewEvent::SendFailed(reason) => println!("! not sent: {}", reason),
        }
    }
}
