/// Longest prefix of `s` that fits in `max_bytes` without splitting a character.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(start, _)| start)
        .take_while(|&start| start <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

/// Remove a surrounding Markdown fence, including any language tag
/// (```` ```json ````, ```` ```JSON ````, ...) on the opening line.
pub fn strip_code_blocks(response: &str) -> &str {
    let body = response.trim();
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };
    let rest = match rest.find('\n') {
        Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[newline + 1..],
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    rest.trim_end().trim_end_matches("```").trim()
}

/// Best-effort isolation of the JSON document in a provider response.
///
/// Strips code fences, then looks for a span that parses: first from the
/// earliest `{`/`[` to the last `}`/`]`, then the outermost `{...}`, then the
/// outermost `[...]`. Falls back to the widest span, or the trimmed input
/// when no brackets are found.
pub fn extract_json(response: &str) -> &str {
    let stripped = strip_code_blocks(response);
    let widest = bracket_span(stripped, &['{', '['], &['}', ']']);
    let candidates = [
        widest,
        bracket_span(stripped, &['{'], &['}']),
        bracket_span(stripped, &['['], &[']']),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|candidate| serde_json::from_str::<serde::de::IgnoredAny>(candidate).is_ok())
        .or(widest)
        .unwrap_or(stripped)
}

fn bracket_span<'a>(text: &'a str, open: &[char], close: &[char]) -> Option<&'a str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start <= end).then(|| &text[start..=end])
}

/// Short, log-safe preview of a secret.
pub fn redact(secret: &str) -> String {
    let prefix = truncate_to_char_boundary(secret, 5);
    format!("{}...({} chars)", prefix, secret.chars().count())
}
