use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tandem_chat::api::client::ApiClient;
use tandem_chat::app::AppConfig;
use tandem_chat::channel::ConnectionChannel;
use tandem_chat::session::Session;
use tandem_chat::ui::terminal;
use tokio::sync::mpsc;

/// Two-party chat client.
#[derive(Parser, Debug)]
#[command(name = "tandem-chat")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Authenticated username for this session
    #[arg(long, short)]
    user: String,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the request/response endpoint
    #[arg(long)]
    http: Option<String>,

    /// Override the WebSocket endpoint
    #[arg(long)]
    ws: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => AppConfig::load(),
    };
    if let Some(http) = cli.http {
        config.http_endpoint = http;
    }
    if let Some(ws) = cli.ws {
        config.ws_endpoint = ws;
    }
    config.normalize();

    tandem_chat::utils::RUNTIME.block_on(run(cli.user, config))
}

async fn run(user: String, config: AppConfig) -> anyhow::Result<()> {
    let client = ApiClient::new(&config.http_endpoint, config.request_timeout())?;
    let mut channel = ConnectionChannel::new(&config.ws_endpoint)?;
    let events = channel
        .connect_and_announce(&user)
        .await
        .with_context(|| format!("connecting to {}", config.ws_endpoint))?;

    let (mut session, view) = Session::new(user, Arc::new(client), Arc::new(channel));
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();

    tokio::spawn(terminal::render(view));
    tokio::spawn(terminal::read_commands(commands_tx));

    session.start();
    session.run(events, commands_rx).await;
    Ok(())
}
