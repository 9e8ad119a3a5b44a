//! Tag state and quality.

use std::fmt;

use smol_str::SmolStr;
use time::OffsetDateTime;

/// Confidence in a tag's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// No read or write has been applied yet.
    #[default]
    Init,
    /// Last merge yielded a usable value.
    Good,
    /// Last merge failed or yielded exactly zero.
    Bad,
}

impl Quality {
    /// Derive quality from a merged value.
    ///
    /// A reading of exactly zero is reported as `Bad`. This conflates a
    /// legitimate zero with a failure signal; it is a known quirk of the
    /// reference monitor, preserved rather than fixed.
    #[must_use]
    pub fn from_value(value: f64) -> Self {
        if value == 0.0 {
            Self::Bad
        } else {
            Self::Good
        }
    }

    /// Uppercase label as shown in the tag table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Good => "GOOD",
            Self::Bad => "BAD",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named process value with override state.
///
/// Name uniqueness is not enforced; duplicate names are separately
/// addressable by insertion order and name lookups resolve to the first
/// match.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Display name.
    pub name: SmolStr,
    /// Opaque source address, e.g. `ns=2;i=3`.
    pub node_id: SmolStr,
    /// Current value.
    pub value: f64,
    /// Engineering unit, descriptive only.
    pub unit: SmolStr,
    /// Confidence in `value`.
    pub quality: Quality,
    /// A manual write is in effect; polling skips this tag.
    pub written: bool,
    /// Wall-clock time of the last merge, second resolution.
    pub stamp: SmolStr,
}

impl Tag {
    pub(crate) fn new(
        name: impl Into<SmolStr>,
        node_id: impl Into<SmolStr>,
        unit: impl Into<SmolStr>,
        value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_id: node_id.into(),
            value,
            unit: unit.into(),
            quality: Quality::from_value(value),
            written: false,
            stamp: timestamp_now(),
        }
    }

    /// `AUTO` or `WRITTEN`, as shown in the tag table.
    #[must_use]
    pub fn mode(&self) -> &'static str {
        if self.written {
            "WRITTEN"
        } else {
            "AUTO"
        }
    }
}

/// Wall-clock `HH:MM:SS` stamp for merges and history points.
#[must_use]
pub fn timestamp_now() -> SmolStr {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = time::macros::format_description!("[hour]:[minute]:[second]");
    now.format(&format)
        .map(SmolStr::new)
        .unwrap_or_else(|_| SmolStr::new_static("00:00:00"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_derivation_treats_zero_as_bad() {
        assert_eq!(Quality::from_value(0.1), Quality::Good);
        assert_eq!(Quality::from_value(-0.1), Quality::Good);
        assert_eq!(Quality::from_value(0.0), Quality::Bad);
        assert_eq!(Quality::default(), Quality::Init);
    }

    #[test]
    fn timestamp_has_second_resolution_form() {
        let stamp = timestamp_now();
        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.as_bytes()[2], b':');
        assert_eq!(stamp.as_bytes()[5], b':');
    }

    #[test]
    fn new_tag_starts_in_auto_mode() {
        let tag = Tag::new("Pressure", "ns=2;i=7", "bar", 1.5);
        assert!(!tag.written);
        assert_eq!(tag.mode(), "AUTO");
        assert_eq!(tag.quality, Quality::Good);
        assert!(!tag.stamp.is_empty());
    }
}
