//! Tokenization of a single command line.
//!
//! There is no quoting, escaping or multi-character delimiter handling here:
//! a line is split on a fixed whitespace class and a trailing `&` token marks
//! the command for background execution. Tokens borrow from the input line,
//! so the token list cannot outlive the line it was cut from.

/// Characters treated as token separators.
const SEPARATORS: [char; 5] = [' ', '\t', '\r', '\n', '\u{7}'];

/// Splits `line` into its whitespace-separated tokens, in source order.
///
/// Every returned token is non-empty; a blank line yields an empty vector.
pub fn split_into_tokens(line: &str) -> Vec<&str> {
    line.split(|c| SEPARATORS.contains(&c))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Strips a trailing `&` token and reports whether one was present.
///
/// Only the final token counts: an `&` in the middle of the line stays in
/// the list and is passed to the command as an ordinary argument.
pub fn extract_background(tokens: &mut Vec<&str>) -> bool {
    if tokens.last() == Some(&"&") {
        tokens.pop();
        true
    } else {
        false
    }
}
