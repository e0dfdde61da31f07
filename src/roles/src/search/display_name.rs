//! Japanese display-name synthesis
//!
//! Some roles come back without a Japanese display name even though their
//! Japanese description opens with one ("閲覧者ロールは…"). The heuristic
//! takes the text before the first particle or full stop, drops a trailing
//! "ロール", and gives up on anything longer than [`MAX_DERIVED_CHARS`].

/// Characters that end the leading noun phrase
pub const DELIMITERS: [&str; 6] = ["。", "は", "を", "に", "が", "の"];

/// Suffix meaning "role"
pub const ROLE_SUFFIX: &str = "ロール";

/// Longest accepted derived name, in characters
pub const MAX_DERIVED_CHARS: usize = 50;

/// Derive a display name from a Japanese description
///
/// Returns `None` when the leading phrase is empty or longer than
/// [`MAX_DERIVED_CHARS`].
pub fn derive_display_name(description: &str) -> Option<String> {
    let cut = DELIMITERS
        .iter()
        .filter_map(|delimiter| description.find(delimiter))
        .min()
        .unwrap_or(description.len());

    let head = description[..cut].trim();
    let head = head.strip_suffix(ROLE_SUFFIX).unwrap_or(head);

    if head.is_empty() || head.chars().count() > MAX_DERIVED_CHARS {
        None
    } else {
        Some(head.to_string())
    }
}
