//! Symbolic names for the server numerics the engine references.
//!
//! Numerics are three-digit command tokens sent by servers. They are kept
//! as wire strings rather than an enum because
//! [`Message::command`](crate::Message::command) carries the raw token and
//! the mux routing table is keyed by it.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

// === Connection registration (001-099) ===

/// 001 - Welcome to the IRC network.
pub const RPL_WELCOME: &str = "001";
/// 002 - Your host is running version.
pub const RPL_YOURHOST: &str = "002";
/// 003 - Server creation date.
pub const RPL_CREATED: &str = "003";
/// 004 - Server info (name, version, user modes, channel modes).
pub const RPL_MYINFO: &str = "004";
/// 005 - Server supported features (ISUPPORT).
pub const RPL_ISUPPORT: &str = "005";

// === Command replies (200-399) ===

/// 311 - WHOIS user info.
pub const RPL_WHOISUSER: &str = "311";
/// 313 - WHOIS operator status.
pub const RPL_WHOISOPERATOR: &str = "313";
/// 317 - WHOIS idle time.
pub const RPL_WHOISIDLE: &str = "317";
/// 318 - End of WHOIS.
pub const RPL_ENDOFWHOIS: &str = "318";
/// 319 - WHOIS channel list.
pub const RPL_WHOISCHANNELS: &str = "319";
/// 324 - Channel mode string.
pub const RPL_CHANNELMODEIS: &str = "324";
/// 330 - WHOIS logged-in account.
pub const RPL_WHOISACCOUNT: &str = "330";
/// 353 - NAMES reply.
pub const RPL_NAMEREPLY: &str = "353";
/// 367 - Ban list entry.
pub const RPL_BANLIST: &str = "367";

// === Error replies (400-599) ===

/// 401 - No such nick/channel.
pub const ERR_NOSUCHNICK: &str = "401";
/// 402 - No such server.
pub const ERR_NOSUCHSERVER: &str = "402";
/// 422 - MOTD file is missing.
pub const ERR_NOMOTD: &str = "422";
/// 433 - Nickname is already in use.
pub const ERR_NICKNAMEINUSE: &str = "433";

// === SASL (900-999) ===

/// 903 - SASL authentication successful.
pub const RPL_SASLSUCCESS: &str = "903";
/// 904 - SASL authentication failed.
pub const RPL_SASLFAILED: &str = "904";
/// 905 - SASL message too long.
pub const RPL_SASLERROR: &str = "905";
/// 907 - Already authenticated via SASL.
pub const RPL_SASLALREADYAUTH: &str = "907";
