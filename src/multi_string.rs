//! Splitting of decoded `REG_MULTI_SZ` text into its strings.

/// Splits a decoded multi-string span into its items.
///
/// When the text contains NUL characters, one trailing NUL (the last item's
/// terminator) is dropped and the rest is split on NUL. Order and empty
/// strings between consecutive NULs are kept. Text without any NUL is not a
/// well-formed multi-string; it is split on whitespace runs instead.
///
/// # Examples
///
/// ```rust
/// use reg_pol::multi_string::split_multi_string;
///
/// assert_eq!(split_multi_string("a\0b\0\0"), vec!["a", "b", ""]);
/// assert_eq!(split_multi_string("a  b"), vec!["a", "b"]);
/// ```
pub fn split_multi_string(text: &str) -> Vec<String> {
    if !text.contains('\0') {
        return text.split_whitespace().map(str::to_string).collect();
    }

    let body = text.strip_suffix('\0').unwrap_or(text);
    if body.is_empty() {
        return Vec::new();
    }

    body.split('\0')
        .map(|piece| piece.trim_end_matches('\0').to_string())
        .collect()
}
