use anyhow::{Context, Result};
use memo_client::api::{ChatBackend, HttpBackend};
use memo_client::capture::{AudioBlob, Transcriber};
use memo_client::config::ClientConfig;
use memo_client::notify::NotificationController;
use memo_client::session::SessionState;
use memo_client::sync::ConversationSyncController;
use memo_client::telemetry::init_tracing;
use memo_client::types::{ChatMessage, ConversationId, Role};
use std::path::Path;
use std::sync::Arc;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

const HELP: &str = "\
/list              show conversations
/open <n>          switch to conversation n from /list
/new               start a new conversation
/transcribe <file> upload an audio file and put the text in the compose field
/send              send the compose field
/quit              exit
anything else      send as a message";

fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

fn print_message(message: &ChatMessage) {
    let who = match message.role {
        Role::User => "tú",
        Role::Assistant => "memo",
    };
    match format_message_timestamp(message.created_at) {
        Some(ts) => println!("[{ts}] {who}: {}", message.content),
        None => println!("{who}: {}", message.content),
    }
}

fn print_session(session: &SessionState) {
    if let Some(summary) = session.current_summary() {
        println!("== {} ==", summary.title);
    }
    for message in session.current_log() {
        print_message(message);
    }
    if !session.compose.is_empty() {
        println!("(compose) {}", session.compose);
    }
}

fn print_toast(notifier: &NotificationController) {
    if let Some(text) = notifier.current_text() {
        println!("** {text} **");
    }
}

fn blob_from_file(path: &Path) -> Result<AudioBlob> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("webm")
        .to_ascii_lowercase();
    Ok(AudioBlob {
        file_name: format!("grabacion.{extension}"),
        mime: format!("audio/{extension}"),
        bytes,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ClientConfig::from_env();
    let api: Arc<dyn ChatBackend> =
        Arc::new(HttpBackend::from_config(&config, config.token_store()));
    let notifier = NotificationController::new(config.toast_duration);
    let sync = ConversationSyncController::new(Arc::clone(&api), notifier.clone());
    let transcriber = Transcriber::new(Arc::clone(&api), notifier.clone());
    let mut session = SessionState::with_auto_speak(config.auto_speak);

    sync.load_conversations(&mut session).await;
    print_session(&session);
    print_toast(&notifier);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            "" => continue,
            "/quit" => break,
            "/list" => {
                for (i, summary) in session.store.summaries().iter().enumerate() {
                    let marker = if Some(summary.id) == session.current { "*" } else { " " };
                    println!("{marker}{i}: {}", summary.title);
                }
                continue;
            }
            "/open" => {
                let target = arg
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| session.store.summaries().get(i))
                    .map(|summary| summary.id);
                match target {
                    Some(id) => sync.select_conversation(&mut session, id).await,
                    None => println!("no such conversation"),
                }
            }
            "/new" => {
                if !sync.start_draft_conversation(&mut session).await {
                    println!("a new conversation is already open");
                }
            }
            "/transcribe" => match blob_from_file(Path::new(arg.trim())) {
                Ok(blob) => transcriber.upload(blob, &mut session, &sync).await,
                Err(err) => warn!(%err, "could not read audio file"),
            },
            "/send" => {
                let text = session.compose.clone();
                sync.send_message(&mut session, &text).await;
            }
            _ => sync.send_message(&mut session, line).await,
        }
        print_session(&session);
        print_toast(&notifier);
        if session.current == Some(ConversationId::Draft) {
            println!("(draft, not saved until the first message)");
        }
    }

    Ok(())
}
