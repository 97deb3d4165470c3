//! Capabilities negotiated on the first `want` line of an upload-request.

use bstr::{BStr, BString, ByteSlice, ByteVec};
use smallvec::SmallVec;

/// Names of capabilities with a meaning known to this crate.
#[allow(missing_docs)]
pub mod name {
    pub const MULTI_ACK: &str = "multi_ack";
    pub const MULTI_ACK_DETAILED: &str = "multi_ack_detailed";
    pub const NO_DONE: &str = "no-done";
    pub const THIN_PACK: &str = "thin-pack";
    pub const SIDE_BAND: &str = "side-band";
    pub const SIDE_BAND_64K: &str = "side-band-64k";
    pub const OFS_DELTA: &str = "ofs-delta";
    pub const AGENT: &str = "agent";
    pub const SHALLOW: &str = "shallow";
    pub const DEEPEN_SINCE: &str = "deepen-since";
    pub const DEEPEN_NOT: &str = "deepen-not";
    pub const DEEPEN_RELATIVE: &str = "deepen-relative";
    pub const NO_PROGRESS: &str = "no-progress";
    pub const INCLUDE_TAG: &str = "include-tag";
    pub const REPORT_STATUS: &str = "report-status";
    pub const DELETE_REFS: &str = "delete-refs";
    pub const QUIET: &str = "quiet";
    pub const ATOMIC: &str = "atomic";
    pub const PUSH_OPTIONS: &str = "push-options";
    pub const ALLOW_TIP_SHA1_IN_WANT: &str = "allow-tip-sha1-in-want";
    pub const ALLOW_REACHABLE_SHA1_IN_WANT: &str = "allow-reachable-sha1-in-want";
    pub const PUSH_CERT: &str = "push-cert";
    pub const SYMREF: &str = "symref";
}

/// The error returned when a capability is given arguments it can't take.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Error {
    #[error("capability token {token:?} has no name")]
    EmptyName { token: BString },
    #[error("capability {name} requires an argument")]
    ArgumentsRequired { name: BString },
    #[error("capability {name} does not take arguments")]
    ArgumentsNotAllowed { name: BString },
    #[error("capability {name} was given an empty argument")]
    EmptyArgument { name: BString },
    #[error("capability {name} takes a single argument")]
    MultipleArguments { name: BString },
    #[error("capability {name:?} contains whitespace, NUL or a misplaced '=' in {part} {token:?}")]
    InvalidToken {
        name: BString,
        part: &'static str,
        token: BString,
    },
}

fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'\0' || b == 0x0b
}

/// How many arguments a capability accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arguments {
    None,
    One,
    AtLeastOne,
    Unchecked,
}

fn arguments(capability: &BStr) -> Arguments {
    use name::*;
    match capability.to_str().unwrap_or_default() {
        AGENT | PUSH_CERT => Arguments::One,
        SYMREF => Arguments::AtLeastOne,
        MULTI_ACK
        | MULTI_ACK_DETAILED
        | NO_DONE
        | THIN_PACK
        | SIDE_BAND
        | SIDE_BAND_64K
        | OFS_DELTA
        | SHALLOW
        | DEEPEN_SINCE
        | DEEPEN_NOT
        | DEEPEN_RELATIVE
        | NO_PROGRESS
        | INCLUDE_TAG
        | REPORT_STATUS
        | DELETE_REFS
        | QUIET
        | ATOMIC
        | PUSH_OPTIONS
        | ALLOW_TIP_SHA1_IN_WANT
        | ALLOW_REACHABLE_SHA1_IN_WANT => Arguments::None,
        _ => Arguments::Unchecked,
    }
}

/// A single capability, a name with zero or more values.
///
/// It renders as `name`, or as one `name=value` token per value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    name: BString,
    values: SmallVec<[BString; 1]>,
}

impl Capability {
    /// The name of the capability.
    pub fn name(&self) -> &BStr {
        self.name.as_bstr()
    }

    /// All values in the order they were added.
    pub fn values(&self) -> impl Iterator<Item = &BStr> + '_ {
        self.values.iter().map(|v| v.as_bstr())
    }

    /// The first value, if there is one.
    pub fn value(&self) -> Option<&BStr> {
        self.values.first().map(|v| v.as_bstr())
    }

    fn validate(&self) -> Result<(), Error> {
        if self.name.iter().any(|&b| is_separator(b) || b == b'=') {
            return Err(Error::InvalidToken {
                name: self.name.clone(),
                part: "name",
                token: self.name.clone(),
            });
        }
        if let Some(value) = self.values.iter().find(|v| v.iter().any(|&b| is_separator(b))) {
            return Err(Error::InvalidToken {
                name: self.name.clone(),
                part: "value",
                token: value.clone(),
            });
        }
        if self.values.iter().any(|v| v.is_empty()) {
            return Err(Error::EmptyArgument {
                name: self.name.clone(),
            });
        }
        match (arguments(self.name.as_bstr()), self.values.len()) {
            (Arguments::None, 0) | (Arguments::One, 1) | (Arguments::Unchecked, _) => Ok(()),
            (Arguments::AtLeastOne, n) if n > 0 => Ok(()),
            (Arguments::None, _) => Err(Error::ArgumentsNotAllowed {
                name: self.name.clone(),
            }),
            (Arguments::One | Arguments::AtLeastOne, 0) => Err(Error::ArgumentsRequired {
                name: self.name.clone(),
            }),
            (Arguments::One | Arguments::AtLeastOne, _) => Err(Error::MultipleArguments {
                name: self.name.clone(),
            }),
        }
    }

    fn write_to(&self, out: &mut BString) {
        if self.values.is_empty() {
            out.push_str(&self.name);
            return;
        }
        for (idx, value) in self.values.iter().enumerate() {
            if idx != 0 {
                out.push_byte(b' ');
            }
            out.push_str(&self.name);
            out.push_byte(b'=');
            out.push_str(value);
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = BString::default();
        self.write_to(&mut buf);
        std::fmt::Display::fmt(&buf, f)
    }
}

/// An ordered list of capabilities with unique names.
///
/// Entries keep their insertion order until [`sort()`](Self::sort()) is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    entries: Vec<Capability>,
}

impl Capabilities {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse whitespace separated `name` or `name=value` tokens, as found in capability advertisements.
    ///
    /// Repeated names accumulate their values.
    pub fn from_bytes(input: &[u8]) -> Result<Self, Error> {
        let mut caps = Self::new();
        for token in input.split(u8::is_ascii_whitespace).filter(|t| !t.is_empty()) {
            match token.find_byte(b'=') {
                Some(0) => {
                    return Err(Error::EmptyName {
                        token: token.as_bstr().to_owned(),
                    })
                }
                Some(pos) => caps.add_value(token[..pos].as_bstr(), token[pos + 1..].as_bstr())?,
                None => caps.set(token.as_bstr())?,
            }
        }
        Ok(caps)
    }

    /// Return `true` if there is no capability in this list.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The amount of capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate all capabilities in their current order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> + '_ {
        self.entries.iter()
    }

    /// Return `true` if the capability `name` is present.
    pub fn supports(&self, name: impl AsRef<[u8]>) -> bool {
        self.get(name).is_some()
    }

    /// Return the capability `name`, if present.
    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&Capability> {
        let name = name.as_ref();
        self.entries.iter().find(|c| c.name == name)
    }

    /// Set the capability `name` without values, replacing a previous entry of the same name.
    pub fn set(&mut self, name: impl Into<BString>) -> Result<(), Error> {
        self.replace(Capability {
            name: name.into(),
            values: SmallVec::new(),
        })
    }

    /// Set the capability `name` to the single `value`, replacing a previous entry of the same name.
    pub fn set_value(&mut self, name: impl Into<BString>, value: impl Into<BString>) -> Result<(), Error> {
        self.replace(Capability {
            name: name.into(),
            values: smallvec::smallvec![value.into()],
        })
    }

    /// Append `value` to the values of the capability `name`, adding it if it isn't present yet.
    pub fn add_value(&mut self, name: impl Into<BString>, value: impl Into<BString>) -> Result<(), Error> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter().position(|c| c.name == name) {
            Some(idx) => {
                let mut updated = self.entries[idx].clone();
                updated.values.push(value);
                updated.validate()?;
                self.entries[idx] = updated;
                Ok(())
            }
            None => self.replace(Capability {
                name,
                values: smallvec::smallvec![value],
            }),
        }
    }

    /// Remove the capability `name` and return it, if it was present.
    pub fn remove(&mut self, name: impl AsRef<[u8]>) -> Option<Capability> {
        let name = name.as_ref();
        let idx = self.entries.iter().position(|c| c.name == name)?;
        Some(self.entries.remove(idx))
    }

    /// Sort all capabilities by name, which is their canonical order on the wire.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Render all capabilities separated by a single space, in their current order.
    pub fn to_bstring(&self) -> BString {
        let mut out = BString::default();
        for (idx, cap) in self.entries.iter().enumerate() {
            if idx != 0 {
                out.push_byte(b' ');
            }
            cap.write_to(&mut out);
        }
        out
    }

    fn replace(&mut self, capability: Capability) -> Result<(), Error> {
        if capability.name.is_empty() {
            return Err(Error::EmptyName {
                token: capability.to_string().into(),
            });
        }
        capability.validate()?;
        match self.entries.iter_mut().find(|c| c.name == capability.name) {
            Some(existing) => *existing = capability,
            None => self.entries.push(capability),
        }
        Ok(())
    }
}

impl std::fmt::Display for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.to_bstring(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_insertion_order_until_sorted() {
        let mut caps = Capabilities::new();
        caps.set(name::OFS_DELTA).unwrap();
        caps.set_value(name::AGENT, "git/2.40").unwrap();
        caps.set(name::MULTI_ACK).unwrap();
        assert_eq!(caps.to_string(), "ofs-delta agent=git/2.40 multi_ack");

        caps.sort();
        assert_eq!(caps.to_string(), "agent=git/2.40 multi_ack ofs-delta");
    }

    #[test]
    fn set_replaces_and_remove_deletes() {
        let mut caps = Capabilities::new();
        caps.set_value(name::AGENT, "a").unwrap();
        caps.set_value(name::AGENT, "b").unwrap();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps.get(name::AGENT).and_then(Capability::value), Some("b".into()));

        let removed = caps.remove(name::AGENT).expect("present");
        assert_eq!(removed.name(), "agent");
        assert!(caps.is_empty());
        assert!(caps.remove(name::AGENT).is_none());
    }

    #[test]
    fn symref_accumulates_values() {
        let mut caps = Capabilities::new();
        caps.add_value(name::SYMREF, "HEAD:refs/heads/main").unwrap();
        caps.add_value(name::SYMREF, "refs/remotes/origin/HEAD:refs/remotes/origin/main")
            .unwrap();
        assert_eq!(
            caps.to_string(),
            "symref=HEAD:refs/heads/main symref=refs/remotes/origin/HEAD:refs/remotes/origin/main"
        );
    }

    #[test]
    fn argument_rules_of_known_capabilities() {
        let mut caps = Capabilities::new();
        assert_eq!(
            caps.set(name::AGENT),
            Err(Error::ArgumentsRequired { name: "agent".into() })
        );
        assert_eq!(
            caps.set_value(name::OFS_DELTA, "yes"),
            Err(Error::ArgumentsNotAllowed {
                name: "ofs-delta".into()
            })
        );
        assert_eq!(
            caps.set_value(name::SYMREF, ""),
            Err(Error::EmptyArgument { name: "symref".into() })
        );
        caps.add_value(name::AGENT, "a").unwrap();
        assert_eq!(
            caps.add_value(name::AGENT, "b"),
            Err(Error::MultipleArguments { name: "agent".into() })
        );
        assert_eq!(caps.to_string(), "agent=a", "failed additions leave the list untouched");
    }

    #[test]
    fn unknown_capabilities_are_unchecked() {
        let mut caps = Capabilities::new();
        caps.set("object-format").unwrap();
        caps.set_value("object-format", "sha1").unwrap();
        caps.add_value("object-format", "sha256").unwrap();
        assert_eq!(caps.to_string(), "object-format=sha1 object-format=sha256");
    }

    #[test]
    fn parse_advertisement() {
        let caps = Capabilities::from_bytes(
            b"multi_ack thin-pack side-band ofs-delta symref=HEAD:refs/heads/main agent=git/2.43.0\n",
        )
        .unwrap();
        assert_eq!(caps.len(), 6);
        assert!(caps.supports(name::THIN_PACK));
        assert!(!caps.supports(name::SHALLOW));
        assert_eq!(caps.get(name::AGENT).and_then(Capability::value), Some("git/2.43.0".into()));
        assert_eq!(
            caps.to_string(),
            "multi_ack thin-pack side-band ofs-delta symref=HEAD:refs/heads/main agent=git/2.43.0"
        );
    }

    #[test]
    fn tokens_must_not_split_or_end_the_line() {
        let mut caps = Capabilities::new();
        assert_eq!(
            caps.set("two words"),
            Err(Error::InvalidToken {
                name: "two words".into(),
                part: "name",
                token: "two words".into(),
            })
        );
        assert_eq!(
            caps.set_value("x", "a\nb"),
            Err(Error::InvalidToken {
                name: "x".into(),
                part: "value",
                token: "a\nb".into(),
            })
        );
        assert!(matches!(
            caps.set("key=value"),
            Err(Error::InvalidToken { part: "name", .. })
        ));
        assert!(matches!(
            caps.set_value("x-unknown", "a\0b"),
            Err(Error::InvalidToken { part: "value", .. })
        ));
        caps.add_value(name::SYMREF, "HEAD:refs/heads/main").unwrap();
        assert!(matches!(
            caps.add_value(name::SYMREF, "a\rwant b"),
            Err(Error::InvalidToken { part: "value", .. })
        ));
        assert_eq!(caps.to_string(), "symref=HEAD:refs/heads/main");

        caps.set_value("x-unknown", "a=b").unwrap();
    }

    #[test]
    fn parse_rejects_invalid_tokens() {
        assert_eq!(
            Capabilities::from_bytes(b"ofs-delta =value"),
            Err(Error::EmptyName { token: "=value".into() })
        );
        assert_eq!(
            Capabilities::from_bytes(b"agent"),
            Err(Error::ArgumentsRequired { name: "agent".into() })
        );
        assert!(matches!(
            Capabilities::from_bytes(b"thin-pack no\0done"),
            Err(Error::InvalidToken { part: "name", .. })
        ));
        assert_eq!(Capabilities::from_bytes(b"  \n"), Ok(Capabilities::new()));
    }
}
