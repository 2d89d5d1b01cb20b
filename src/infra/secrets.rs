use std::panic;

const REDACTED: &str = "[REDACTED]";

const SENSITIVE_MARKERS: [&str; 5] = ["token", "bearer", "authorization", "password", "secret"];

/// Replaces whitespace-separated chunks that look like credentials.
pub fn redact_text(input: &str) -> String {
    let mut redact_next = false;

    input
        .split_whitespace()
        .map(|chunk| {
            let lowered = chunk.to_ascii_lowercase();
            // "Bearer <token>" puts the secret in the following chunk.
            let follows_scheme = std::mem::replace(&mut redact_next, lowered == "bearer");
            if follows_scheme || is_sensitive(&lowered) || looks_like_token(chunk) {
                REDACTED.to_owned()
            } else {
                chunk.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed = redact_text(&payload);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "tutor-chat panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            eprintln!("tutor-chat panic: {}", scrubbed);
        }
    }));
}

fn is_sensitive(lowered: &str) -> bool {
    lowered != "bearer"
        && SENSITIVE_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
}

/// Long mixed alphanumeric runs, as API tokens are.
fn looks_like_token(value: &str) -> bool {
    let cleaned = value.trim_matches(|ch: char| !ch.is_ascii_alphanumeric());

    cleaned.len() >= 20
        && cleaned
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '|' | '-' | '_' | '.'))
        && cleaned.chars().any(|ch| ch.is_ascii_alphabetic())
        && cleaned.chars().any(|ch| ch.is_ascii_digit())
}
