//! Color validation for status blocks.
//!
//! i3bar accepts colors as `#RGB` or `#RRGGBB`. Anything else is either
//! ignored or rendered incorrectly by the host, so collaborators check
//! colors with [`is_valid_color`] before publishing them.

/// Color used by feeds that don't have anything better to say.
pub const DEFAULT_STATUS_COLOR: &str = "#999999";

/// Color used to render an error message in place of a feed's value.
pub const DEFAULT_ERROR_COLOR: &str = "#e20024";

/// Check whether `color` is `#` followed by exactly 3 or 6 hex digits.
///
/// Hex digits are case-insensitive. This is a pure predicate.
pub fn is_valid_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };

    matches!(digits.len(), 3 | 6) && digits.bytes().all(|b| b.is_ascii_hexdigit())
}
