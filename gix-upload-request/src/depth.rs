//! How much history a client asks the remote to send.

use bstr::{BString, ByteSlice};

/// The limit on history depth requested with a `deepen*` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Depth {
    /// No limit, nothing is sent.
    #[default]
    None,
    /// Limit history to this amount of commits from each want, sent as `deepen <n>`.
    ///
    /// `0` means no limit and is not sent.
    Commits(u32),
    /// Limit history to commits younger than this time, sent as `deepen-since <seconds>`.
    Since(gix_date::Time),
    /// Exclude history reachable from the named reference, sent as `deepen-not <ref>`.
    Reference(BString),
}

impl Depth {
    /// Return `true` if this depth doesn't limit history and produces no `deepen*` line.
    pub fn is_zero(&self) -> bool {
        matches!(self, Depth::None | Depth::Commits(0))
    }

    /// Return the reason the `deepen-not` reference of this depth can't be written as a single line, if any.
    pub(crate) fn invalid_reference_reason(&self) -> Option<&'static str> {
        match self {
            Depth::Reference(name) if name.is_empty() => Some("reference name is empty"),
            Depth::Reference(name) if name.find_byteset(b" \t\r\n\x0b\x0c\0").is_some() => {
                Some("reference name contains whitespace or NUL")
            }
            Depth::None | Depth::Commits(_) | Depth::Since(_) | Depth::Reference(_) => None,
        }
    }
}

impl From<gix_date::Time> for Depth {
    fn from(time: gix_date::Time) -> Self {
        Depth::Since(time)
    }
}

/// Formats the directive as it appears on the wire, without trailing newline.
impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Depth::None => f.write_str("none"),
            Depth::Commits(n) => write!(f, "deepen {n}"),
            // The offset only affects presentation, seconds are always relative to the UTC epoch.
            Depth::Since(time) => write!(f, "deepen-since {}", time.seconds),
            Depth::Reference(name) => write!(f, "deepen-not {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_depths() {
        assert!(Depth::default().is_zero());
        assert!(Depth::Commits(0).is_zero());
        assert!(!Depth::Commits(1).is_zero());
        assert!(!Depth::Since(gix_date::Time::new(0, 0)).is_zero());
        assert!(!Depth::Reference("refs/heads/main".into()).is_zero());
    }

    #[test]
    fn display_ignores_utc_offset() {
        let plus_two_hours = gix_date::Time::new(1_704_067_200, 2 * 60 * 60);
        assert_eq!(Depth::from(plus_two_hours).to_string(), "deepen-since 1704067200");
        assert_eq!(Depth::Commits(5).to_string(), "deepen 5");
        assert_eq!(
            Depth::Reference("refs/tags/v1.0".into()).to_string(),
            "deepen-not refs/tags/v1.0"
        );
    }

    #[test]
    fn references_must_fit_on_a_line() {
        assert_eq!(
            Depth::Reference("".into()).invalid_reference_reason(),
            Some("reference name is empty")
        );
        assert!(Depth::Reference("refs/heads/a b".into()).invalid_reference_reason().is_some());
        assert!(Depth::Reference("refs/heads/a\n".into()).invalid_reference_reason().is_some());
        assert!(Depth::Reference("refs/heads/main".into()).invalid_reference_reason().is_none());
        assert!(Depth::Commits(u32::MAX).invalid_reference_reason().is_none());
    }
}
