//! Typed accumulator for RPL_ISUPPORT (numeric 005) capability
//! advertisements.
//!
//! Servers spread their ISUPPORT tokens over several 005 replies;
//! [`Isupport::parse`] folds each one into the same record. Unknown tokens
//! are ignored, and a token that fails to parse leaves the previous value
//! untouched.
//!
//! # Reference
//! - <https://modern.ircdocs.horse/#rplisupport-005>

use std::collections::HashMap;

use crate::message::Message;
use crate::response::RPL_ISUPPORT;

/// The four CHANMODES classes. Class A modes take a parameter that is a
/// list entry, B always take a parameter, C only when set, D never.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChanModes {
    /// List modes (e.g. bans).
    pub a: Vec<char>,
    /// Parameter modes.
    pub b: Vec<char>,
    /// Set-only parameter modes.
    pub c: Vec<char>,
    /// Flag modes.
    pub d: Vec<char>,
}

/// Negotiated session capabilities.
///
/// Constructed with protocol defaults at dial time; mutated only by the
/// read loop while folding 005 replies. In the limit maps a value of `-1`
/// means "unlimited".
#[derive(Clone, Debug, PartialEq)]
pub struct Isupport {
    /// AWAYLEN - maximum away message length.
    pub away_len: u32,
    /// CNOTICE - the CNOTICE command is available.
    pub cnotice: bool,
    /// CPRIVMSG - the CPRIVMSG command is available.
    pub cprivmsg: bool,
    /// CASEMAPPING - nick/channel case folding method.
    pub case_mapping: String,
    /// CHANLIMIT - joinable channel count per channel prefix.
    pub chan_limit: HashMap<char, i32>,
    /// CHANMODES - the four channel mode classes.
    pub chan_modes: ChanModes,
    /// CHANTYPES - channel name prefix characters.
    pub chan_types: Vec<char>,
    /// CHANNELLEN - maximum channel name length.
    pub channel_len: u32,
    /// CHIDLEN - channel id length for `!` channels.
    pub chid_len: u32,
    /// ETRACE - the ETRACE command is available.
    pub etrace: bool,
    /// ELIST - supported LIST extensions.
    pub elist: Vec<char>,
    /// EXCEPTS - ban exceptions are supported.
    pub excepts: bool,
    /// FNC - the server may force nick changes.
    pub fnc: bool,
    /// INVEX - invite exceptions are supported.
    pub invex: bool,
    /// KICKLEN - maximum kick reason length.
    pub kick_len: u32,
    /// KNOCK - the KNOCK command is available.
    pub knock: bool,
    /// MAXBANS - maximum bans per channel.
    pub max_bans: u32,
    /// MAXCHANNELS - maximum joined channels.
    pub max_channels: u32,
    /// MAXLIST - maximum entries per list mode.
    pub max_list: HashMap<char, i32>,
    /// MAXTARGETS - maximum message targets.
    pub max_targets: u32,
    /// MODES - maximum mode changes per MODE command.
    pub modes: u32,
    /// MONITOR - monitor list size.
    pub monitor: u32,
    /// NETWORK - network name.
    pub network: String,
    /// NICKLEN - maximum nickname length.
    pub nick_len: u32,
    /// PREFIX - channel membership mode letter to status sigil.
    pub prefix: HashMap<char, char>,
    /// SILENCE - silence list size.
    pub silence: u32,
    /// STATUSMSG - sigils usable as message target prefixes.
    pub status_msg: Vec<char>,
    /// TARGMAX - maximum targets per command.
    pub targ_max: HashMap<String, i32>,
    /// TOPICLEN - maximum topic length.
    pub topic_len: u32,
    /// WATCH - watch list size.
    pub watch: u32,
}

impl Default for Isupport {
    fn default() -> Self {
        Isupport {
            away_len: 0,
            cnotice: false,
            cprivmsg: false,
            case_mapping: "rfc1459".to_owned(),
            chan_limit: HashMap::new(),
            chan_modes: ChanModes::default(),
            chan_types: Vec::new(),
            channel_len: 0,
            chid_len: 0,
            etrace: false,
            elist: Vec::new(),
            excepts: false,
            fnc: false,
            invex: false,
            kick_len: 0,
            knock: false,
            max_bans: 0,
            max_channels: 0,
            max_list: HashMap::new(),
            max_targets: 0,
            modes: 3,
            monitor: 0,
            network: String::new(),
            nick_len: 9,
            prefix: HashMap::from([('o', '@'), ('v', '+')]),
            silence: 0,
            status_msg: Vec::new(),
            targ_max: HashMap::new(),
            topic_len: 0,
            watch: 0,
        }
    }
}

impl Isupport {
    /// Creates a record holding the protocol defaults.
    pub fn new() -> Isupport {
        Isupport::default()
    }

    /// Folds one RPL_ISUPPORT message into the record. Messages with any
    /// other command are ignored. Can be called repeatedly to accumulate
    /// tokens from successive 005 replies.
    pub fn parse(&mut self, msg: &Message) {
        if msg.command != RPL_ISUPPORT {
            return;
        }

        // params[0] is the addressee.
        for option in msg.params.iter().skip(1) {
            let (name, value) = match option.split_once('=') {
                Some((name, value)) => (name, value),
                None => (option.as_str(), ""),
            };

            match name {
                "EXCEPTS" | "INVEX" | "KNOCK" | "ETRACE" | "CPRIVMSG" | "CNOTICE" | "FNC" => {
                    self.set_flag(name);
                }
                "MODES" | "NICKLEN" | "CHANNELLEN" | "TOPICLEN" | "MONITOR" | "MAXCHANNELS"
                | "MAXBANS" | "KICKLEN" | "CHIDLEN" | "SILENCE" | "AWAYLEN" | "WATCH"
                | "MAXTARGETS" => {
                    if let Ok(n) = value.parse::<u32>() {
                        self.set_count(name, n);
                    }
                }
                "NETWORK" => self.network = value.to_owned(),
                "CASEMAPPING" => self.case_mapping = value.to_owned(),
                "CHANMODES" => {
                    let mut groups = value.split(',');
                    self.chan_modes.a = groups.next().unwrap_or("").chars().collect();
                    self.chan_modes.b = groups.next().unwrap_or("").chars().collect();
                    self.chan_modes.c = groups.next().unwrap_or("").chars().collect();
                    self.chan_modes.d = groups.next().unwrap_or("").chars().collect();
                }
                "CHANTYPES" => self.chan_types = value.chars().collect(),
                "CHANLIMIT" => {
                    for (prefixes, limit) in split_prefix_num(value) {
                        for prefix in prefixes.chars() {
                            self.chan_limit.insert(prefix, limit);
                        }
                    }
                }
                "ELIST" => self.elist = value.chars().collect(),
                "PREFIX" => {
                    // Expected form: (letters)sigils, sides equal length.
                    let close = match value.find(')') {
                        Some(idx) if idx >= 1 && idx + 1 < value.len() => idx,
                        _ => continue,
                    };
                    let letters: Vec<char> = value[1..close].chars().collect();
                    let sigils: Vec<char> = value[close + 1..].chars().collect();
                    if letters.len() != sigils.len() {
                        continue;
                    }
                    for (letter, sigil) in letters.into_iter().zip(sigils) {
                        self.prefix.insert(letter, sigil);
                    }
                }
                "TARGMAX" => {
                    for (command, limit) in split_prefix_num(value) {
                        self.targ_max.insert(command, limit);
                    }
                }
                "MAXLIST" => {
                    for (modes, limit) in split_prefix_num(value) {
                        for mode in modes.chars() {
                            self.max_list.insert(mode, limit);
                        }
                    }
                }
                "STATUSMSG" => self.status_msg = value.chars().collect(),
                _ => {}
            }
        }
    }

    fn set_flag(&mut self, name: &str) {
        match name {
            "EXCEPTS" => self.excepts = true,
            "INVEX" => self.invex = true,
            "KNOCK" => self.knock = true,
            "ETRACE" => self.etrace = true,
            "CPRIVMSG" => self.cprivmsg = true,
            "CNOTICE" => self.cnotice = true,
            "FNC" => self.fnc = true,
            _ => {}
        }
    }

    fn set_count(&mut self, name: &str, n: u32) {
        match name {
            "MODES" => self.modes = n,
            "NICKLEN" => self.nick_len = n,
            "CHANNELLEN" => self.channel_len = n,
            "TOPICLEN" => self.topic_len = n,
            "MONITOR" => self.monitor = n,
            "MAXCHANNELS" => self.max_channels = n,
            "MAXBANS" => self.max_bans = n,
            "KICKLEN" => self.kick_len = n,
            "CHIDLEN" => self.chid_len = n,
            "SILENCE" => self.silence = n,
            "AWAYLEN" => self.away_len = n,
            "WATCH" => self.watch = n,
            "MAXTARGETS" => self.max_targets = n,
            _ => {}
        }
    }
}

/// Splits the shared `name:int[,name:int...]` grammar of TARGMAX,
/// CHANLIMIT and MAXLIST. An empty integer means unlimited (-1).
fn split_prefix_num(list: &str) -> Vec<(String, i32)> {
    let mut out = Vec::new();
    for pair in list.split(',') {
        let Some((name, num)) = pair.split_once(':') else {
            continue;
        };
        let limit = if num.is_empty() {
            -1
        } else {
            match num.parse() {
                Ok(n) => n,
                Err(_) => continue,
            }
        };
        out.push((name.to_owned(), limit));
    }
    out
}
