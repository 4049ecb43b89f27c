#![forbid(unsafe_code)]

//! Widget identifiers shared by the spatial index and the widget tree.

use std::fmt;

/// Opaque identifier for a widget.
///
/// The layout collaborator assigns ids; the pipeline only compares and
/// hashes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WidgetId(pub u32);

impl WidgetId {
    /// Create a new widget id from a raw value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for WidgetId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
