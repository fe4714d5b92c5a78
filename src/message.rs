//! IRC message values and the line parser.
//!
//! [`Message::parse`] turns one wire line (trailing CRLF already stripped)
//! into a structured [`Message`]. Parsing is total: malformed lines produce
//! whatever the grammar salvages, never an error. The parser performs no
//! I/O.

use std::fmt;

use crate::ctcp::CtcpMessage;
use crate::error::CtcpError;

/// The sender identification at the start of a server-originated line,
/// decoded from `nick!user@host` or a bare `host`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prefix {
    /// Nickname portion, empty for server prefixes.
    pub nick: String,
    /// Username portion, empty for server prefixes.
    pub user: String,
    /// Host portion; for a prefix without `!` this is the whole prefix.
    pub host: String,
}

impl Prefix {
    fn parse(raw: &str) -> Prefix {
        if !raw.contains('!') {
            return Prefix {
                host: raw.to_owned(),
                ..Prefix::default()
            };
        }
        let mut fields = raw.split(['!', '@']).filter(|part| !part.is_empty());
        Prefix {
            nick: fields.next().unwrap_or("").to_owned(),
            user: fields.next().unwrap_or("").to_owned(),
            host: fields.next().unwrap_or("").to_owned(),
        }
    }
}

/// One parsed IRC line.
///
/// The message is immutable after parse except for [`signal`], which the
/// client rewrites when it derives synthetic routing keys (`ctcp:<SUB>`,
/// `irc:connected`). Cloning a message is a deep copy; the mux hands every
/// handler its own clone.
///
/// [`signal`]: Message::signal
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// The original line, without trailing CRLF.
    pub raw: String,
    /// Decoded sender prefix; all fields empty for client-originated lines.
    pub prefix: Prefix,
    /// Command token (`PRIVMSG`, `NICK`, ...) or three-digit numeric.
    pub command: String,
    /// Ordered parameters. The last element may contain spaces.
    pub params: Vec<String>,
    /// The routing key used by the mux. Equals [`command`](Message::command)
    /// straight out of the parser.
    pub signal: String,
}

impl Message {
    /// Parses an IRC line as it may be sent or received.
    ///
    /// # Examples
    ///
    /// ```
    /// use slirc_client::Message;
    ///
    /// let m = Message::parse(":example.com 001 nick :Welcome");
    /// assert_eq!(m.prefix.host, "example.com");
    /// assert_eq!(m.command, "001");
    /// assert_eq!(m.params, vec!["nick", "Welcome"]);
    /// assert_eq!(m.signal, "001");
    /// ```
    pub fn parse(line: &str) -> Message {
        let mut msg = Message {
            raw: line.to_owned(),
            ..Message::default()
        };

        let rest = match line.strip_prefix(':') {
            Some(stripped) => {
                let (prefix, rest) = stripped.split_once(' ').unwrap_or((stripped, ""));
                msg.prefix = Prefix::parse(prefix);
                rest
            }
            None => line,
        };

        let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));
        msg.command = command.to_owned();
        msg.signal = msg.command.clone();
        msg.params = parse_params(params);
        msg
    }

    /// Builds a synthetic message carrying only a routing signal.
    pub(crate) fn synthetic(signal: &str) -> Message {
        Message {
            signal: signal.to_owned(),
            ..Message::default()
        }
    }

    /// Reports whether the command is numeric (e.g. `001`) as opposed to a
    /// word (e.g. `JOIN`).
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }

    /// Reports whether the command denotes an error, i.e. whether it is
    /// numeric and starts with a `4` or a `5`.
    pub fn is_error(&self) -> bool {
        self.is_numeric() && matches!(self.command.as_bytes()[0], b'4' | b'5')
    }

    /// Reports whether the final parameter carries a CTCP payload.
    pub fn is_ctcp(&self) -> bool {
        match self.params.last() {
            Some(tail) => {
                let bytes = tail.as_bytes();
                bytes.len() >= 2 && bytes[0] == 0x01 && bytes[bytes.len() - 1] == 0x01
            }
            None => false,
        }
    }

    /// Decodes the CTCP payload carried in the final parameter.
    pub fn ctcp(&self) -> Result<CtcpMessage, CtcpError> {
        if !self.is_ctcp() {
            return Err(CtcpError);
        }
        CtcpMessage::parse(self.params.last().map(String::as_str).unwrap_or(""))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_params(params: &str) -> Vec<String> {
    if params.is_empty() {
        return Vec::new();
    }

    // A leading colon means the whole tail is one trailing parameter.
    if let Some(trailing) = params.strip_prefix(':') {
        return vec![trailing.trim_end_matches(' ').to_owned()];
    }

    match params.find(" :") {
        None => params.split(' ').map(str::to_owned).collect(),
        Some(idx) => {
            let left = &params[..idx];
            let right = params[idx + 2..].trim_end_matches(' ');
            let mut out: Vec<String> = if left.is_empty() {
                Vec::new()
            } else {
                left.split(' ').map(str::to_owned).collect()
            };
            out.push(right.to_owned());
            out
        }
    }
}
