use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use wire::Signal;
use wire::glb::{GlbError, GlbHeader};


type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket i/o failed: {0}")]
    WsIo(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("invalid scene: {0}")]
    Glb(#[from] GlbError),
    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Parser, Debug)]
#[command(name = "glbview-cli", about = "Drive and inspect a glbview sync server")]
struct Cli {
    #[arg(long, env = "GLBVIEW_SOCKET_URL", default_value_t = wire::default_socket_url())]
    socket_url: String,

    #[arg(long, env = "GLBVIEW_HTTP_URL", default_value_t = default_http_url())]
    http_url: String,

    /// Seconds to wait for each websocket frame.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Health check against the HTTP port.
    Ping,
    /// Ask the server to export and broadcast the scene.
    Sync {
        /// Return after the echo instead of waiting for the broadcast.
        #[arg(long, default_value_t = false)]
        no_wait: bool,
    },
    /// Send one message and print the echo.
    Send { message: String },
    /// Print inbound messages until interrupted.
    Watch {
        /// Stop after this many messages.
        #[arg(long)]
        count: Option<usize>,
    },
    /// Download the scene and check its GLB header.
    Fetch {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Command::Ping => run_ping(&cli.http_url).await,
        Command::Sync { no_wait } => run_sync(&cli.socket_url, timeout, no_wait).await,
        Command::Send { message } => run_send(&cli.socket_url, timeout, &message).await,
        Command::Watch { count } => run_watch(&cli.socket_url, count).await,
        Command::Fetch { output } => run_fetch(&cli.http_url, output).await,
    }
}

fn default_http_url() -> String {
    format!("http://localhost:{}", wire::DEFAULT_HTTP_PORT)
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

async fn run_ping(http_url: &str) -> Result<(), CliError> {
    let response = reqwest::get(endpoint(http_url, "/healthz")).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Status { status: status.as_u16(), body: response.text().await? });
    }
    println!("ok");
    Ok(())
}

async fn run_sync(socket_url: &str, timeout: Duration, no_wait: bool) -> Result<(), CliError> {
    let mut stream = connect(socket_url).await?;
    send_text(&mut stream, wire::SYNC_TRIGGER).await?;

    let mut progress = SyncProgress::default();
    while !progress.is_done(no_wait) {
        let signal = Signal::parse(&recv_next(&mut stream, timeout).await?);
        progress.observe(&signal);
        println!("{signal}");
    }
    Ok(())
}

async fn run_send(socket_url: &str, timeout: Duration, message: &str) -> Result<(), CliError> {
    let mut stream = connect(socket_url).await?;
    send_text(&mut stream, message).await?;
    loop {
        let signal = Signal::parse(&recv_next(&mut stream, timeout).await?);
        if signal == Signal::echo_of(message) {
            println!("{signal}");
            return Ok(());
        }
    }
}

async fn run_watch(socket_url: &str, count: Option<usize>) -> Result<(), CliError> {
    let mut stream = connect(socket_url).await?;
    let mut seen = 0;
    while count.is_none_or(|limit| seen < limit) {
        let Some(message) = stream.next().await else {
            return Err(CliError::WsClosed);
        };
        match message.map_err(ws_io)? {
            Message::Text(text) => {
                println!("{}", describe(&Signal::parse(text.as_str())));
                seen += 1;
            }
            Message::Close(_) => return Err(CliError::WsClosed),
            _ => {}
        }
    }
    Ok(())
}

async fn run_fetch(http_url: &str, output: Option<PathBuf>) -> Result<(), CliError> {
    let response = reqwest::get(endpoint(http_url, wire::SCENE_PATH)).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Status { status: status.as_u16(), body: response.text().await? });
    }
    let bytes = response.bytes().await?;
    let header = GlbHeader::parse(&bytes)?;

    if let Some(path) = output {
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| CliError::Write { path: path.display().to_string(), source })?;
        println!("wrote {}", path.display());
    }
    println!("{}", summarize(&header));
    Ok(())
}

/// Tracks a sync round trip: the echo of our trigger, then the broadcast.
#[derive(Debug, Default, PartialEq, Eq)]
struct SyncProgress {
    echoed: bool,
    broadcast: bool,
}

impl SyncProgress {
    fn observe(&mut self, signal: &Signal) {
        match signal {
            Signal::Echo(text) if text == wire::SYNC_TRIGGER => self.echoed = true,
            Signal::Sync => self.broadcast = true,
            _ => {}
        }
    }

    fn is_done(&self, no_wait: bool) -> bool {
        self.echoed && (no_wait || self.broadcast)
    }
}

fn describe(signal: &Signal) -> String {
    match signal {
        Signal::Sync => "sync    | reload requested".to_owned(),
        Signal::Echo(text) => format!("echo    | {text}"),
        Signal::Text(text) => format!("text    | {text}"),
    }
}

fn summarize(header: &GlbHeader) -> String {
    format!("glb v{} | {} bytes | json chunk {} bytes", header.version, header.length, header.json_length)
}

fn ws_io(error: tokio_tungstenite::tungstenite::Error) -> CliError {
    CliError::WsIo(Box::new(error))
}

async fn connect(url: &str) -> Result<WsStream, CliError> {
    let (stream, _) = connect_async(url).await.map_err(|error| CliError::WsConnect(Box::new(error)))?;
    Ok(stream)
}

async fn send_text(stream: &mut WsStream, text: &str) -> Result<(), CliError> {
    stream
        .send(Message::Text(text.into()))
        .await
        .map_err(ws_io)
}

async fn recv_next(stream: &mut WsStream, timeout: Duration) -> Result<String, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message.map_err(ws_io)? {
                Message::Text(text) => return Ok(text.as_str().to_owned()),
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    };

    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CliError::Timeout)?
}
