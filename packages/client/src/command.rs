//! Parsing of lines typed at the client prompt.

use hearth_shared::dto::{NotificationDraft, NotificationType};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  <text>                                          send a chat message
  /notify <TYPE> <recipient> <title> | <message>  send a notification (TYPE: INFO, SUCCESS, WARNING, ERROR)
  /clear                                          clear received messages
  /clear-notifications                            clear received notifications
  /help                                           show this help
  /quit                                           disconnect and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Chat(String),
    Notify(NotificationDraft),
    ClearMessages,
    ClearNotifications,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: /{0} (try /help)")]
    Unknown(String),

    #[error("Usage: /notify <TYPE> <recipient> <title> | <message>")]
    NotifyUsage,

    #[error("{0}")]
    InvalidType(String),
}

impl InputCommand {
    /// Parse one non-empty input line.
    ///
    /// Chat text is kept as typed, surrounding whitespace included.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let Some(rest) = line.trim().strip_prefix('/') else {
            return Ok(InputCommand::Chat(line.to_string()));
        };

        let (name, args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, args)| (name, args.trim()));
        match name {
            "notify" => parse_notify(args).map(InputCommand::Notify),
            "clear" => Ok(InputCommand::ClearMessages),
            "clear-notifications" => Ok(InputCommand::ClearNotifications),
            "help" => Ok(InputCommand::Help),
            "quit" | "exit" => Ok(InputCommand::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_notify(args: &str) -> Result<NotificationDraft, CommandError> {
    let (head, message) = args.split_once('|').ok_or(CommandError::NotifyUsage)?;

    let mut parts = head.split_whitespace();
    let (Some(kind), Some(recipient)) = (parts.next(), parts.next()) else {
        return Err(CommandError::NotifyUsage);
    };
    let title = parts.collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return Err(CommandError::NotifyUsage);
    }

    let kind = kind
        .parse::<NotificationType>()
        .map_err(CommandError::InvalidType)?;
    Ok(NotificationDraft::new(title, message.trim(), kind, recipient))
}
