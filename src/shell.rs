//! Line-oriented stand-in for the mobile UI.
//!
//! Reads commands from stdin, forwards them over the bridge and prints what
//! the backend sends back. Push payloads are given as JSON, e.g.
//! `tap {"data":{"tipo":"encuesta","encuestaId":"42"}}`.

use anyhow::{Context, bail};
use copicom_bridge::{
    MessageFromBackend, MessageToBackend, notification::NotificationRecord, push::PushPayload,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

const HELP: &str = "\
commands:
  refresh              merge server notifications into the list
  ready | unready      mount or unmount the navigation container
  open <id>            tap a row of the list
  read <id>            mark a notification as read
  delete <id>          delete a notification
  push <json>          a push arrives while the app is open
  tap <json>           the user taps a delivered push
  token <token>        register a push token with the server
  config               print the active configuration
  quit";

/// A parsed input line.
#[derive(Debug)]
enum Command {
    Send(MessageToBackend),
    Help,
    Quit,
}

fn parse_command(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let argument = |what: &str| -> anyhow::Result<String> {
        if rest.is_empty() {
            bail!("`{verb}` needs {what}");
        }
        Ok(rest.to_string())
    };
    let payload = || -> anyhow::Result<PushPayload> {
        let json = if rest.is_empty() { "{}" } else { rest };
        serde_json::from_str(json).context("push payload is not valid JSON")
    };

    let message = match verb {
        "help" | "?" => return Ok(Some(Command::Help)),
        "quit" | "exit" => return Ok(Some(Command::Quit)),
        "refresh" => MessageToBackend::RefreshNotifications,
        "ready" => MessageToBackend::NavigationReady,
        "unready" => MessageToBackend::NavigationUnavailable,
        "config" => MessageToBackend::ConfigurationRequest,
        "open" => MessageToBackend::OpenNotification(argument("an id")?),
        "read" => MessageToBackend::MarkRead(argument("an id")?),
        "delete" => MessageToBackend::Delete(argument("an id")?),
        "token" => MessageToBackend::RegisterPushToken(argument("a token")?),
        "push" => MessageToBackend::PushReceived(payload()?),
        "tap" => MessageToBackend::PushTapped(payload()?),
        other => bail!("unknown command `{other}`, try `help`"),
    };
    Ok(Some(Command::Send(message)))
}

fn format_record(record: &NotificationRecord) -> String {
    let marker = if record.read { ' ' } else { '*' };
    let link = record
        .link_target()
        .map(|target| format!(" -> {target}"))
        .unwrap_or_default();
    format!(
        "{marker} [{}] {:?} {}: {} ({}){link}",
        record.id, record.kind, record.title, record.description, record.occurred_at
    )
}

fn print_backend_message(message: MessageFromBackend) {
    match message {
        MessageFromBackend::NotificationsUpdated(list) => {
            println!("[LIST] {} notification(s)", list.len());
            for record in &list {
                println!("  {}", format_record(record));
            }
        }
        MessageFromBackend::Navigate(route) => println!("[NAVIGATE] {route}"),
        MessageFromBackend::Toast(toast) => println!("[{:?}] {}", toast.kind, toast.message),
        MessageFromBackend::ConfigurationResponse(config) => println!("[CONFIG] {config:#?}"),
    }
}

async fn read_commands(tx: mpsc::Sender<MessageToBackend>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Some(Command::Send(message))) => {
                if tx.send(message).await.is_err() {
                    bail!("backend stopped");
                }
            }
            Ok(Some(Command::Help)) => println!("{HELP}"),
            Ok(Some(Command::Quit)) => break,
            Ok(None) => {}
            Err(e) => println!("[ERROR] {e:#}"),
        }
    }
    Ok(())
}

/// Runs the shell until stdin closes or `quit` is entered.
pub fn run(
    mut rx: mpsc::Receiver<MessageFromBackend>,
    tx: mpsc::Sender<MessageToBackend>,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the shell runtime")?;

    runtime.block_on(async move {
        println!("{HELP}");
        let printer = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                print_backend_message(message);
            }
        });

        let result = read_commands(tx).await;
        printer.abort();
        result
    })
}
