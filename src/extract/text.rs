// src/extract/text.rs

/// Separators that split a list-typed cell: ASCII and full-width commas,
/// the ideographic comma, ASCII and full-width semicolons.
const LIST_SEPARATORS: [char; 5] = [',', '，', '、', ';', '；'];

/// Normalize a cell value:
///  - NBSP and ideographic space become plain spaces
///  - full-width parentheses become ASCII ones
///  - every whitespace run (newlines included) collapses to one space
///  - leading/trailing whitespace is trimmed
///
/// Returns `None` for `None` input and for values that end up empty.
pub fn clean(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '\u{00a0}' | '\u{3000}' => ' ',
            '（' => '(',
            '）' => ')',
            other => other,
        })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Split a delimiter-joined value into its trimmed, non-empty tokens, in
/// source order with duplicates kept. `None` when nothing is left.
pub fn split_list(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    let items: Vec<String> = raw
        .split(|c| LIST_SEPARATORS.contains(&c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Collapse whitespace the way header cells are compared.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
