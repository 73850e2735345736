//! Status block value type.

use crate::color::{is_valid_color, DEFAULT_ERROR_COLOR};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// One block of the i3bar status line.
///
/// Blocks are immutable values: a feed publishes a new block to replace the
/// previous one, it never edits a published block in place. Deserializing
/// checks the color like [`StatusBlock::with_color`] does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStatusBlock")]
pub struct StatusBlock {
    /// Text shown in the bar. Always serialized, possibly empty.
    pub full_text: String,
    /// `#RGB` / `#RRGGBB` color. `None` lets the host pick its default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Deserialize)]
struct RawStatusBlock {
    full_text: String,
    #[serde(default)]
    color: Option<String>,
}

impl TryFrom<RawStatusBlock> for StatusBlock {
    type Error = CoreError;

    fn try_from(raw: RawStatusBlock) -> CoreResult<Self> {
        match raw.color {
            Some(color) => Self::with_color(raw.full_text, color),
            None => Ok(Self::new(raw.full_text)),
        }
    }
}

impl StatusBlock {
    /// Create a block rendered in the host's default color.
    pub fn new(full_text: impl Into<String>) -> Self {
        Self {
            full_text: full_text.into(),
            color: None,
        }
    }

    /// Create a block with an explicit color.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidColor` if `color` isn't `#RGB`/`#RRGGBB`.
    pub fn with_color(
        full_text: impl Into<String>,
        color: impl Into<String>,
    ) -> CoreResult<Self> {
        let color = color.into();
        if !is_valid_color(&color) {
            return Err(CoreError::InvalidColor(color));
        }

        Ok(Self {
            full_text: full_text.into(),
            color: Some(color),
        })
    }

    /// Create a block in one of the crate's fixed colors.
    ///
    /// For color constants only; runtime input goes through
    /// [`StatusBlock::with_color`].
    pub fn colored(full_text: impl Into<String>, color: &'static str) -> Self {
        debug_assert!(is_valid_color(color), "invalid color constant {color:?}");
        Self {
            full_text: full_text.into(),
            color: Some(color.to_string()),
        }
    }

    /// Render an error message in the error color.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self {
            full_text: err.to_string(),
            color: Some(DEFAULT_ERROR_COLOR.to_string()),
        }
    }

    /// The empty block shown for a slot that has nothing to display yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Length of the text in Unicode scalar values.
    pub fn char_len(&self) -> usize {
        self.full_text.chars().count()
    }
}
