//! Wire framing: splitting a raw read buffer into `\r\n`-delimited lines,
//! and formatting/splitting outbound messages the other direction.

use crate::limits::{CHAN_MAX, CMD_MAX, CTCP_MARKER, MAX_MSG_SPLITS, MSG_FOOTER, MSG_MAX};

/// Incrementally splits a byte buffer into `\r\n`-terminated lines.
///
/// Grounded on the incremental buffer-scan idiom of a line-oriented codec,
/// made synchronous: `next_index` remembers how far the previous call
/// already scanned so repeated calls on a growing buffer are not quadratic.
#[derive(Debug, Default)]
pub struct LineSplitter {
    next_index: usize,
}

impl LineSplitter {
    /// Creates a fresh splitter with no scan progress.
    pub fn new() -> LineSplitter {
        LineSplitter { next_index: 0 }
    }

    /// Resets scan progress. Call this whenever the caller discards or
    /// replaces the buffer being scanned.
    pub fn reset(&mut self) {
        self.next_index = 0;
    }

    /// Looks for the next `\n` (optionally preceded by `\r`) starting at the
    /// not-yet-scanned portion of `buf`. On success, returns the line's text
    /// (without the terminator) and the byte offset where the next line
    /// begins; scan progress is reset to zero so the next call starts a
    /// fresh scan of the remaining buffer.
    pub fn next_line<'a>(&mut self, buf: &'a str) -> Option<(&'a str, usize)> {
        let scan_from = self.next_index.min(buf.len());
        match buf[scan_from..].find('\n') {
            Some(rel) => {
                let end = scan_from + rel;
                let line_end = if end > 0 && buf.as_bytes()[end - 1] == b'\r' {
                    end - 1
                } else {
                    end
                };
                self.next_index = 0;
                Some((&buf[..line_end], end + 1))
            }
            None => {
                self.next_index = buf.len();
                None
            }
        }
    }
}

/// Formats one outbound line: `<action> <target> :<body>\r\n`, or
/// `<action> <target> :\x01<verb> <body>\x01\r\n` when `ctcp_verb` is set.
/// Omits the trailing `:<body>` section entirely when `body` is empty and
/// not a CTCP message.
pub fn format_line(action: &str, target: &str, ctcp_verb: Option<&str>, body: &str) -> String {
    let mut out = String::with_capacity(action.len() + target.len() + body.len() + 8);
    out.push_str(action);
    if !target.is_empty() {
        out.push(' ');
        out.push_str(target);
    }
    if let Some(verb) = ctcp_verb {
        out.push_str(" :");
        out.push(CTCP_MARKER);
        out.push_str(verb);
        if !body.is_empty() {
            out.push(' ');
            out.push_str(body);
        }
        out.push(CTCP_MARKER);
    } else if !body.is_empty() {
        out.push_str(" :");
        out.push_str(body);
    }
    out.push_str(MSG_FOOTER);
    out
}

/// The fixed per-message overhead (action, target, footer, and the sending
/// nick's own echo space the server reserves) subtracted from `MSG_MAX` to
/// decide how much room a body has before it must be split.
pub fn overhead_len(own_nick: &str) -> usize {
    CMD_MAX + 1 + CHAN_MAX + 1 + MSG_FOOTER.len() + own_nick.len()
}

/// Splits `body` into at most [`MAX_MSG_SPLITS`] chunks, each short enough
/// that `format_line(action, target, None, chunk)` stays within `MSG_MAX`
/// bytes once `overhead` is accounted for.
///
/// Splits prefer a whitespace boundary near the chunk limit, falling back
/// to a hard character cut when no whitespace is found in the window.
/// Leading whitespace on continuation chunks is trimmed.
pub fn split_message(body: &str, overhead: usize) -> Vec<String> {
    let max_chunk = MSG_MAX.saturating_sub(overhead).max(1);
    if body.len() <= max_chunk {
        return vec![body.to_owned()];
    }

    let mut chunks = Vec::new();
    let mut rest = body;
    while !rest.is_empty() && chunks.len() < MAX_MSG_SPLITS {
        if rest.len() <= max_chunk || chunks.len() + 1 == MAX_MSG_SPLITS {
            chunks.push(rest.to_owned());
            break;
        }
        let window = &rest[..max_chunk];
        let split_at = window.rfind(' ').unwrap_or(max_chunk);
        let (chunk, remainder) = rest.split_at(split_at);
        chunks.push(chunk.to_owned());
        rest = remainder.trim_start_matches(' ');
    }
    chunks
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn splits_single_line_into_one_frame() {
        let mut splitter = LineSplitter::new();
        let buf = "PING :abc\r\nPRIVMSG #c :hi\r\n";
        let (line, next) = splitter.next_line(buf).unwrap();
        assert_eq!(line, "PING :abc");
        let (line2, _) = splitter.next_line(&buf[next..]).unwrap();
        assert_eq!(line2, "PRIVMSG #c :hi");
    }

    #[test]
    fn incomplete_line_returns_none_and_remembers_progress() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.next_line("PRIVMSG #c :partial").is_none());
    }

    #[test]
    fn format_line_basic() {
        let line = format_line("PRIVMSG", "#chan", None, "hello");
        assert_eq!(line, "PRIVMSG #chan :hello\r\n");
    }

    #[test]
    fn format_line_ctcp() {
        let line = format_line("PRIVMSG", "#chan", Some("ACTION"), "waves");
        assert_eq!(line, "PRIVMSG #chan :\u{1}ACTION waves\u{1}\r\n");
    }

    #[test]
    fn split_message_fits_in_one_chunk() {
        let chunks = split_message("hello", 400);
        assert_eq!(chunks, vec!["hello".to_owned()]);
    }

    #[test]
    fn split_message_splits_on_whitespace() {
        let body = "a ".repeat(300);
        let chunks = split_message(body.trim_end(), 400);
        assert!(chunks.len() > 1);
        assert!(chunks.len() <= MAX_MSG_SPLITS);
        for c in &chunks {
            assert!(!c.starts_with(' '));
        }
    }
}
