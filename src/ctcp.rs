//! CTCP (Client-to-Client Protocol) payload decoding.
//!
//! CTCP embeds structured commands inside PRIVMSG and NOTICE payloads,
//! delimited by `\x01` at both ends of the final parameter.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>

use crate::error::CtcpError;

/// The CTCP delimiter byte.
pub(crate) const CTCP_DELIM: char = '\x01';

/// A decoded CTCP payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CtcpMessage {
    /// The payload as it appeared on the wire, delimiters included.
    pub raw: String,
    /// The CTCP subcommand (`ACTION`, `VERSION`, ...).
    pub command: String,
    /// Space-split tail after the subcommand token.
    pub params: Vec<String>,
}

impl CtcpMessage {
    /// Decodes a CTCP payload from a PRIVMSG/NOTICE final parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use slirc_client::CtcpMessage;
    ///
    /// let ctcp = CtcpMessage::parse("\u{1}ACTION waves hello\u{1}").unwrap();
    /// assert_eq!(ctcp.command, "ACTION");
    /// assert_eq!(ctcp.params, vec!["waves", "hello"]);
    /// ```
    pub fn parse(payload: &str) -> Result<CtcpMessage, CtcpError> {
        if payload.len() < 2
            || !payload.starts_with(CTCP_DELIM)
            || !payload.ends_with(CTCP_DELIM)
        {
            return Err(CtcpError);
        }

        let inner = &payload[1..payload.len() - 1];
        let mut parts = inner.split(' ');
        Ok(CtcpMessage {
            raw: payload.to_owned(),
            command: parts.next().unwrap_or("").to_owned(),
            params: parts.map(str::to_owned).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        let ctcp = CtcpMessage::parse("\u{1}ACTION a test message\u{1}").unwrap();
        assert_eq!(ctcp.command, "ACTION");
        assert_eq!(ctcp.params, vec!["a", "test", "message"]);
        assert_eq!(ctcp.raw, "\u{1}ACTION a test message\u{1}");
    }

    #[test]
    fn test_parse_bare_command() {
        let ctcp = CtcpMessage::parse("\u{1}VERSION\u{1}").unwrap();
        assert_eq!(ctcp.command, "VERSION");
        assert!(ctcp.params.is_empty());
    }

    #[test]
    fn test_parse_rejects_undelimited() {
        assert_eq!(CtcpMessage::parse("hello world"), Err(CtcpError));
        assert_eq!(CtcpMessage::parse(""), Err(CtcpError));
        assert_eq!(CtcpMessage::parse("\u{1}"), Err(CtcpError));
    }

    #[test]
    fn test_parse_empty_payload() {
        let ctcp = CtcpMessage::parse("\u{1}\u{1}").unwrap();
        assert_eq!(ctcp.command, "");
        assert!(ctcp.params.is_empty());
    }
}
