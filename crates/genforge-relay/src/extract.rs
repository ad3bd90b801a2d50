//! Textual unwrapping of the generated artifact.
//!
//! Models are asked to emit a single fenced code block, but the output
//! is unwrapped purely textually: no language-aware parsing or
//! validation happens here.

/// Isolates the most likely source-code artifact in `text`.
///
/// Returns the contents of the first markdown code fence (a line of
/// three or more backticks, optional language tag, closed by a fence of
/// at least the same length), with the fence lines stripped and blank
/// lines inside the fence trimmed. When no complete fence exists the
/// whole text is returned with surrounding whitespace trimmed, on the
/// assumption the model emitted raw code.
///
/// Pure, deterministic, and total. Later fences are discarded by
/// policy; an unterminated fence counts as no fence at all.
pub fn extract_code(text: &str) -> String {
    match first_fenced_block(text) {
        Some(block) => block,
        None => text.trim().to_string(),
    }
}

fn first_fenced_block(text: &str) -> Option<String> {
    let mut opener: Option<usize> = None;
    let mut body: Vec<&str> = Vec::new();
    for line in text.lines() {
        match opener {
            None => {
                if let Some((len, _info)) = parse_fence(line) {
                    opener = Some(len);
                }
            }
            Some(open_len) => {
                if let Some((len, info)) = parse_fence(line)
                    && len >= open_len
                    && info.is_empty()
                {
                    return Some(trim_blank_edges(&body).join("\n"));
                }
                body.push(line);
            }
        }
    }
    None
}

/// Parses a fence line into (backtick count, info string).
///
/// A fence is at least three backticks at the start of the (trimmed)
/// line; the remainder is the info string and must not itself contain
/// backticks.
fn parse_fence(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim();
    let ticks = trimmed.bytes().take_while(|&b| b == b'`').count();
    if ticks < 3 {
        return None;
    }
    let info = trimmed[ticks..].trim();
    if info.contains('`') {
        return None;
    }
    Some((ticks, info))
}

fn trim_blank_edges<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    &lines[start..end]
}
