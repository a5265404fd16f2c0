//! Text rendering utilities for human-friendly error messages.
//!
//! Identifiers in Block are plain strings, but the ones used for
//! auto-wiring are full Rust type paths. These helpers keep error
//! output readable for both.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use block_support::rendering::render_chain;
///
/// let chain = vec!["mailer", "transport", "mailer"];
/// assert_eq!(render_chain(&chain), "mailer → transport → mailer");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| shorten_type_name(s.as_ref()))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Shortens a fully qualified type path for display.
///
/// Identifiers that are not paths come back unchanged.
///
/// ```
/// use block_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("app::mail::Mailer"), "Mailer");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn app::log::Logger>"),
///     "Arc<dyn Logger>"
/// );
/// assert_eq!(shorten_type_name("db.url"), "db.url");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                // path prefix, keep only the last segment
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Suggests registered identifiers that look like `requested`.
///
/// Scoring, highest first: substring match on the full identifier,
/// substring match on the shortened identifier, then a shared prefix
/// of at least three characters. At most `max_suggestions` are returned.
pub fn suggest_similar(
    requested: &str,
    available: &[&str],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_short = shorten_type_name(requested).to_lowercase();

    if requested_short.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter(|&&name| name != requested)
        .filter_map(|&name| {
            let name_lower = name.to_lowercase();
            let name_short = shorten_type_name(name).to_lowercase();

            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            if name_short.contains(&requested_short) || requested_short.contains(&name_short) {
                return Some((name, 80));
            }

            let common = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();

            (common >= 3).then_some((name, common * 10))
        })
        .collect();

    // stable sort keeps the caller's order among equal scores
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}
