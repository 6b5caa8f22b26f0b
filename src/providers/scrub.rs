use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Token prefixes of keys this service handles (OpenRouter/OpenAI, Hugging Face).
const PREFIX_PATTERNS: [&str; 2] = ["sk-", "hf_"];

/// Markers followed by a secret value in headers, queries or JSON bodies.
const MARKER_PATTERNS: [&str; 7] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "Bearer ",
    "api_key=",
    "access_token=",
    "\"api_key\":\"",
    "\"access_token\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

/// True when `start` begins a word, so `sk-` in "task-force" is not a key.
fn at_word_start(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

/// Replace the token following each occurrence of `marker`. A prefix marker
/// is itself part of the token, is redacted along with it and only matches
/// at the start of a word.
fn redact_after(text: &mut String, marker: &str, include_marker: bool) {
    let mut from = 0;
    while let Some(rel) = text[from..].find(marker) {
        let start = from + rel;
        let value_start = start + marker.len();
        if include_marker && !at_word_start(text, start) {
            from = value_start;
            continue;
        }
        let value_len: usize = text[value_start..]
            .chars()
            .take_while(|c| is_secret_char(*c))
            .map(char::len_utf8)
            .sum();

        if value_len == 0 {
            from = value_start;
            continue;
        }

        let redact_from = if include_marker { start } else { value_start };
        text.replace_range(redact_from..value_start + value_len, REDACTED);
        from = redact_from + REDACTED.len();
    }
}

/// Scrub key-like tokens from upstream error text before it is logged.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let hit = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|p| input.contains(p));
    if !hit {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for prefix in PREFIX_PATTERNS {
        redact_after(&mut scrubbed, prefix, true);
    }
    for marker in MARKER_PATTERNS {
        redact_after(&mut scrubbed, marker, false);
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets and cap length so a whole HTML error page never hits the log.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    match scrubbed.char_indices().nth(MAX_API_ERROR_CHARS) {
        Some((cut, _)) => format!("{}...", &scrubbed[..cut]),
        None => scrubbed.into_owned(),
    }
}
