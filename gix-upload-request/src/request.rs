//! The upload-request value and its consistency checks.

use gix_hash::ObjectId;

use crate::{capabilities::name, Capabilities, Depth, Error, Result};

/// A request for objects sent by a fetching client after receiving the ref advertisement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRequest {
    /// Objects the client wants. Must not be empty when encoding.
    pub wants: Vec<ObjectId>,
    /// Commits at which the client's history ends.
    pub shallows: Vec<ObjectId>,
    /// The requested limit on history depth.
    pub depth: Depth,
    /// Capabilities requested from the server, sent with the first want.
    pub capabilities: Capabilities,
}

impl UploadRequest {
    /// Create a request without wants, shallows, depth or capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a request pre-populated with the capabilities every client wants if the
    /// server `advertised` them: `ofs-delta` and our `agent`.
    pub fn from_advertised(advertised: &Capabilities) -> Self {
        let mut req = Self::new();
        // Neither call can fail as both have valid argument counts.
        if advertised.supports(name::OFS_DELTA) {
            req.capabilities.set(name::OFS_DELTA).ok();
        }
        if advertised.supports(name::AGENT) {
            req.capabilities.set_value(name::AGENT, crate::agent()).ok();
        }
        req
    }

    /// Add `id` to the wanted objects.
    pub fn with_want(mut self, id: ObjectId) -> Self {
        self.wants.push(id);
        self
    }

    /// Add `id` to the shallow boundary.
    pub fn with_shallow(mut self, id: ObjectId) -> Self {
        self.shallows.push(id);
        self
    }

    /// Set the requested depth.
    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    /// Set the requested capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Check that the request is complete and that its capabilities allow what it asks for.
    ///
    /// Shallows and commit depths need `shallow`, `Since` needs `deepen-since` and `Reference`
    /// needs `deepen-not`. `side-band` and `side-band-64k` as well as `multi_ack` and
    /// `multi_ack_detailed` exclude each other.
    pub fn validate(&self) -> Result<()> {
        if self.wants.is_empty() {
            return Err(Error::EmptyWants);
        }
        self.validate_required_capabilities()?;
        self.validate_conflicting_capabilities()
    }

    fn validate_required_capabilities(&self) -> Result<()> {
        let require = |capability: &'static str| {
            if self.capabilities.supports(capability) {
                Ok(())
            } else {
                Err(Error::MissingCapability { capability })
            }
        };
        if !self.shallows.is_empty() {
            require(name::SHALLOW)?;
        }
        match self.depth {
            Depth::None | Depth::Commits(0) => Ok(()),
            Depth::Commits(_) => require(name::SHALLOW),
            Depth::Since(_) => require(name::DEEPEN_SINCE),
            Depth::Reference(_) => require(name::DEEPEN_NOT),
        }
    }

    fn validate_conflicting_capabilities(&self) -> Result<()> {
        for (first, second) in [
            (name::SIDE_BAND, name::SIDE_BAND_64K),
            (name::MULTI_ACK, name::MULTI_ACK_DETAILED),
        ] {
            if self.capabilities.supports(first) && self.capabilities.supports(second) {
                return Err(Error::ConflictingCapabilities { first, second });
            }
        }
        Ok(())
    }
}
