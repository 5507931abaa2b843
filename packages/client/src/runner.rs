//! Interactive client: prompt input on one side, session events on the other.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{broadcast::error::RecvError, mpsc};

use crate::{
    command::{HELP, InputCommand},
    config::SessionConfig,
    error::ClientError,
    formatter::MessageFormatter,
    session::{ChatSession, SessionEvent},
};

/// Connect as `user_id` and run the prompt until the user quits
pub async fn run_client(
    config: SessionConfig,
    user_id: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = ChatSession::new(config);
    let mut events = session.subscribe();
    session.connect(&user_id).await?;

    let mut input_rx = spawn_readline(user_id.clone());

    let result = loop {
        tokio::select! {
            input = input_rx.recv() => match input {
                Some(Ok(line)) => {
                    if !dispatch(&session, &line).await {
                        break Ok(());
                    }
                    redisplay_prompt(&user_id);
                }
                Some(Err(e)) => break Err(e),
                // Ctrl+C or Ctrl+D
                None => break Ok(()),
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(text) = MessageFormatter::format_event(&event, &user_id) {
                        print!("{}", text);
                        redisplay_prompt(&user_id);
                    }
                    if let SessionEvent::ConnectionLost { retry_in: None } = event {
                        break Err(ClientError::ConnectionError(
                            "Connection lost and reconnection is disabled".to_string(),
                        ));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Display fell behind; skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    session.disconnect().await;
    tracing::info!("Client session ended");
    result.map_err(Into::into)
}

/// Apply one input line to the session; returns `false` on quit
async fn dispatch(session: &ChatSession, line: &str) -> bool {
    let command = match InputCommand::parse(line) {
        Ok(command) => command,
        Err(e) => {
            println!("{}", e);
            return true;
        }
    };

    match command {
        InputCommand::Chat(content) => session.send_message(&content).await,
        InputCommand::Notify(draft) => session.send_notification(draft).await,
        InputCommand::ClearMessages => {
            session.clear_messages().await;
            println!("Messages cleared");
        }
        InputCommand::ClearNotifications => {
            session.clear_notifications().await;
            println!("Notifications cleared");
        }
        InputCommand::Help => println!("{}", HELP),
        InputCommand::Quit => return false,
    }
    true
}

/// Read lines on a blocking thread (rustyline is synchronous)
fn spawn_readline(user_id: String) -> mpsc::UnboundedReceiver<Result<String, ClientError>> {
    let (input_tx, input_rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                let _ = input_tx.send(Err(ClientError::Readline(e.to_string())));
                return;
            }
        };

        let prompt = format!("{}> ", user_id);
        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str()).ok();
                    if input_tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    let _ = input_tx.send(Err(ClientError::Readline(err.to_string())));
                    break;
                }
            }
        }
    });

    input_rx
}

fn redisplay_prompt(user_id: &str) {
    print!("{}> ", user_id);
    std::io::stdout().flush().ok();
}
