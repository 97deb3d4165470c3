//! Writing an [`UploadRequest`] as a sequence of lines.
//!
//! The request is written in a fixed order, and the first failing write ends the operation:
//!
//! 1. the smallest want, followed by all capabilities sorted by name,
//! 2. all other wants,
//! 3. all shallows,
//! 4. at most one `deepen`, `deepen-since` or `deepen-not` line,
//! 5. a flush packet.
//!
//! Wants and shallows are sorted by their hexadecimal representation.

use bstr::{BString, ByteVec};

use crate::{order::sorted_hex, Depth, Error, LineSink, Result, UploadRequest};

/// Configuration for an [`Encoder`].
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// If `true`, run [`UploadRequest::validate()`] before writing anything, rejecting requests
    /// whose capabilities don't allow their shallows or depth.
    pub strict: bool,
}

impl Options {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Writes upload-requests into a [`LineSink`].
///
/// An encoder keeps no state between calls to [`encode()`](Self::encode()), so it can be reused
/// after a failure.
pub struct Encoder<S> {
    sink: S,
    options: Options,
}

impl<S: LineSink> Encoder<S> {
    /// Create a new encoder writing into `sink` with default options.
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, Options::default())
    }

    /// Create a new encoder writing into `sink`, configured by `options`.
    pub fn with_options(sink: S, options: Options) -> Self {
        Self { sink, options }
    }

    /// The options this encoder was configured with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get access to the underlying sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Return the underlying sink.
    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Write `request` followed by a flush packet.
    ///
    /// Nothing is written if the request has no wants or can't be represented. If the sink fails,
    /// no further line and no flush packet is written.
    pub fn encode(&mut self, request: &UploadRequest) -> Result<()> {
        if request.wants.is_empty() {
            return Err(Error::EmptyWants);
        }
        if self.options.strict {
            request.validate()?;
        }
        if let Depth::Reference(name) = &request.depth {
            if let Some(reason) = request.depth.invalid_reference_reason() {
                return Err(Error::InvalidReference {
                    name: name.clone(),
                    reason,
                });
            }
        }
        gix_trace::debug!(
            "encoding upload-request with {} wants, {} shallows and depth '{}'",
            request.wants.len(),
            request.shallows.len(),
            request.depth
        );

        self.encode_lines(request).map_err(|err| {
            gix_trace::debug!("aborted upload-request: {}", err);
            err
        })
    }

    fn encode_lines(&mut self, request: &UploadRequest) -> Result<()> {
        let wants = sorted_hex(&request.wants);
        self.encode_wants(&wants, request)?;
        self.encode_shallows(request)?;
        self.encode_depth(&request.depth)?;
        self.encode_flush()
    }

    fn encode_wants(&mut self, sorted_wants: &[String], request: &UploadRequest) -> Result<()> {
        let (first, rest) = sorted_wants.split_first().ok_or(Error::EmptyWants)?;
        let mut line = BString::from(format!("want {first}"));
        if !request.capabilities.is_empty() {
            let mut capabilities = request.capabilities.clone();
            capabilities.sort();
            line.push_byte(b' ');
            line.push_str(capabilities.to_bstring());
        }
        line.push_byte(b'\n');
        self.sink
            .write_line(&line)
            .map_err(|source| Error::FirstWant { source })?;

        for id in rest {
            self.sink
                .write_line(format!("want {id}\n").as_bytes())
                .map_err(|source| Error::Want { id: id.clone(), source })?;
        }
        Ok(())
    }

    fn encode_shallows(&mut self, request: &UploadRequest) -> Result<()> {
        for id in sorted_hex(&request.shallows) {
            if let Err(source) = self.sink.write_line(format!("shallow {id}\n").as_bytes()) {
                return Err(Error::Shallow { id, source });
            }
        }
        Ok(())
    }

    fn encode_depth(&mut self, depth: &Depth) -> Result<()> {
        if depth.is_zero() {
            return Ok(());
        }
        let mut line = BString::from(depth.to_string());
        line.push_byte(b'\n');
        self.sink.write_line(&line).map_err(|source| Error::Depth {
            depth: depth.to_string(),
            source,
        })
    }

    fn encode_flush(&mut self) -> Result<()> {
        self.sink.write_flush().map_err(|source| Error::Flush { source })
    }
}
