//! Word-boundary-preferring fragmenter for oversized PRIVMSG/NOTICE lines.

/// Splits a PRIVMSG or NOTICE line into several lines, each at most
/// `limit` bytes long and each repeating the command and target list.
///
/// The input must look like `<cmd> <targets> :<text>`. Splitting assumes
/// UTF-8 and never cuts through a multi-byte character, but combining
/// characters are not respected. Cuts prefer the last ASCII space inside
/// the byte window; a single word longer than the budget is cut at a
/// character boundary.
///
/// IRC lines can be at most 512 bytes, including the terminating CRLF and
/// the `:hostmask` prefix the server prepends on delivery. For optimal
/// results compute `limit` accordingly; a safe value that needs no
/// calculation is around 350.
///
/// # Examples
///
/// ```
/// use slirc_client::split_message;
///
/// let parts = split_message("PRIVMSG #target :An ordinary message with a couple words", 30);
/// assert_eq!(parts, vec![
///     "PRIVMSG #target :An ordinary",
///     "PRIVMSG #target :message with",
///     "PRIVMSG #target :a couple",
///     "PRIVMSG #target :words",
/// ]);
/// ```
pub fn split_message(line: &str, limit: usize) -> Vec<String> {
    if line.len() < limit {
        return vec![line.to_owned()];
    }
    let Some(idx) = line.find(" :") else {
        return vec![line.to_owned()];
    };

    let header = &line[..idx + 2];
    let mut text = &line[idx + 2..];
    let budget = limit.saturating_sub(header.len()).max(1);

    let mut parts = Vec::new();
    while text.len() > budget {
        let window = &text.as_bytes()[..budget];
        let mut pos = window
            .iter()
            .rposition(|&b| b == b' ')
            .unwrap_or(budget);

        // Keep the cut on a character boundary: back off first, and only
        // walk forward when backing off would produce an empty piece.
        let mut dir: isize = -1;
        while !text.is_char_boundary(pos) {
            pos = (pos as isize + dir) as usize;
            if pos == 0 {
                pos = 1;
                dir = 1;
            }
        }

        parts.push(text[..pos].to_owned());
        text = text[pos..].trim_start();
    }
    if !text.is_empty() {
        parts.push(text.to_owned());
    }

    parts
        .into_iter()
        .map(|part| format!("{header}{part}"))
        .collect()
}
