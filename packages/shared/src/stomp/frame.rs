//! STOMP frame model and encoding.

use std::{fmt, str::FromStr};

use super::{ACCEPT_VERSION, HeartBeat, StompError, VERSION};

/// STOMP 1.2 commands (client and server)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // client
    Connect,
    Stomp,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Begin,
    Commit,
    Abort,
    Disconnect,
    // server
    Connected,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Begin => "BEGIN",
            Command::Commit => "COMMIT",
            Command::Abort => "ABORT",
            Command::Disconnect => "DISCONNECT",
            Command::Connected => "CONNECTED",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    /// CONNECT and CONNECTED headers are never escaped
    pub(super) fn escapes_headers(&self) -> bool {
        !matches!(
            self,
            Command::Connect | Command::Stomp | Command::Connected
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = StompError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s {
            "CONNECT" => Command::Connect,
            "STOMP" => Command::Stomp,
            "SEND" => Command::Send,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "ACK" => Command::Ack,
            "NACK" => Command::Nack,
            "BEGIN" => Command::Begin,
            "COMMIT" => Command::Commit,
            "ABORT" => Command::Abort,
            "DISCONNECT" => Command::Disconnect,
            "CONNECTED" => Command::Connected,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            other => return Err(StompError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

/// A single STOMP frame.
///
/// Headers keep their wire order; when a header repeats, the first one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn require_header(&self, name: &'static str) -> Result<&str, StompError> {
        self.header(name).ok_or(StompError::MissingHeader(name))
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The frame's `heart-beat` header; absent means `0,0`
    pub fn heart_beat(&self) -> Result<HeartBeat, StompError> {
        match self.header("heart-beat") {
            Some(value) => HeartBeat::parse(value),
            None => Ok(HeartBeat::default()),
        }
    }

    pub fn connect(host: &str, heart_beat: HeartBeat) -> Self {
        Frame::new(Command::Connect)
            .with_header("accept-version", ACCEPT_VERSION)
            .with_header("host", host)
            .with_header("heart-beat", heart_beat.to_header())
    }

    pub fn connected(heart_beat: HeartBeat, server: &str) -> Self {
        Frame::new(Command::Connected)
            .with_header("version", VERSION)
            .with_header("heart-beat", heart_beat.to_header())
            .with_header("server", server)
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Frame::new(Command::Subscribe)
            .with_header("id", id)
            .with_header("destination", destination)
            .with_header("ack", "auto")
    }

    pub fn unsubscribe(id: &str) -> Self {
        Frame::new(Command::Unsubscribe).with_header("id", id)
    }

    /// SEND frame with a JSON body
    pub fn send(destination: &str, body: impl Into<String>) -> Self {
        Frame::new(Command::Send)
            .with_header("destination", destination)
            .with_header("content-type", "application/json")
            .with_body(body)
    }

    pub fn message(
        destination: &str,
        subscription: &str,
        message_id: &str,
        body: impl Into<String>,
    ) -> Self {
        Frame::new(Command::Message)
            .with_header("destination", destination)
            .with_header("subscription", subscription)
            .with_header("message-id", message_id)
            .with_header("content-type", "application/json")
            .with_body(body)
    }

    pub fn disconnect() -> Self {
        Frame::new(Command::Disconnect)
    }

    pub fn receipt(receipt_id: &str) -> Self {
        Frame::new(Command::Receipt).with_header("receipt-id", receipt_id)
    }

    pub fn error(message: &str, detail: impl Into<String>) -> Self {
        Frame::new(Command::Error)
            .with_header("message", message)
            .with_header("content-type", "text/plain")
            .with_body(detail)
    }

    /// Encode to wire text, terminated by NUL.
    ///
    /// `content-length` is added for non-empty bodies unless already present.
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            push_header(&mut out, name, value, escape);
        }
        if !self.body.is_empty() && self.header("content-length").is_none() {
            push_header(&mut out, "content-length", &self.body.len().to_string(), false);
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }
}

fn push_header(out: &mut String, name: &str, value: &str, escape: bool) {
    if escape {
        out.push_str(&escape_header(name));
        out.push(':');
        out.push_str(&escape_header(value));
    } else {
        out.push_str(name);
        out.push(':');
        out.push_str(value);
    }
    out.push('\n');
}

pub(super) fn escape_header(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            ':' => escaped.push_str("\\c"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub(super) fn unescape_header(value: &str) -> Result<String, StompError> {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('c') => unescaped.push(':'),
            _ => return Err(StompError::MalformedHeader(value.to_string())),
        }
    }
    Ok(unescaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_send_frame() {
        // テスト項目: SEND フレームがヘッダ・content-length・NUL 終端付きでエンコードされる
        // given (前提条件):
        let frame = Frame::send("/app/chat.sendMessage", r#"{"a":1}"#);

        // when (操作):
        let encoded = frame.encode();

        // then (期待する結果):
        assert_eq!(
            encoded,
            "SEND\ndestination:/app/chat.sendMessage\ncontent-type:application/json\ncontent-length:7\n\n{\"a\":1}\0"
        );
    }

    #[test]
    fn test_encode_connect_does_not_escape() {
        // テスト項目: CONNECT フレームのヘッダはエスケープされない
        // given (前提条件):
        let frame = Frame::connect("localhost:8080", HeartBeat::new(4000, 4000));

        // when (操作):
        let encoded = frame.encode();

        // then (期待する結果):
        assert!(encoded.starts_with("CONNECT\naccept-version:1.2,1.1,1.0\nhost:localhost:8080\n"));
        assert!(encoded.contains("heart-beat:4000,4000\n"));
        assert!(encoded.ends_with("\n\n\0"));
    }

    #[test]
    fn test_encode_escapes_message_headers() {
        // テスト項目: CONNECT 以外のフレームではヘッダ値の特殊文字がエスケープされる
        // given (前提条件):
        let frame = Frame::error("bad:frame\nhere", "");

        // when (操作):
        let encoded = frame.encode();

        // then (期待する結果):
        assert!(encoded.contains("message:bad\\cframe\\nhere\n"));
        assert!(!encoded.contains("content-length"));
    }

    #[test]
    fn test_header_first_occurrence_wins() {
        // テスト項目: 同名ヘッダが重複した場合は最初の値が使われる
        // given (前提条件):
        let frame = Frame::new(Command::Message)
            .with_header("destination", "/topic/public")
            .with_header("destination", "/topic/other");

        // when (操作):
        let destination = frame.header("destination");

        // then (期待する結果):
        assert_eq!(destination, Some("/topic/public"));
        assert_eq!(frame.headers().len(), 2);
    }

    #[test]
    fn test_missing_heart_beat_means_disabled() {
        // テスト項目: heart-beat ヘッダが無い場合は 0,0 として扱われる
        // given (前提条件):
        let frame = Frame::new(Command::Connected).with_header("version", "1.2");

        // when (操作):
        let heart_beat = frame.heart_beat();

        // then (期待する結果):
        assert_eq!(heart_beat, Ok(HeartBeat::new(0, 0)));
    }

    #[test]
    fn test_unescape_rejects_undefined_escape() {
        // テスト項目: 未定義のエスケープシーケンスはエラーになる
        // given (前提条件):
        let value = "bad\\tvalue";

        // when (操作):
        let result = unescape_header(value);

        // then (期待する結果):
        assert!(matches!(result, Err(StompError::MalformedHeader(_))));
        assert_eq!(unescape_header(&escape_header("a:b\\c")), Ok("a:b\\c".to_string()));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        // テスト項目: 未知のコマンドはパースできない
        // given (前提条件):
        let line = "PUBLISH";

        // when (操作):
        let result = line.parse::<Command>();

        // then (期待する結果):
        assert_eq!(result, Err(StompError::UnknownCommand("PUBLISH".to_string())));
    }
}
