use std::fmt::{self, Debug, Display, Formatter};

use derive_more::Display;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A set of errors that can occur during parsing a multipart stream and in
/// other operations.
///
/// Every parse error is fatal to the decode: there is no recovery and no
/// partial result set.
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// The stream ended before the message's grammar was complete: no
    /// boundary was ever found, or a boundary line, header block or part
    /// body was never terminated.
    #[display(fmt = "incomplete multipart stream")]
    IncompleteStream,

    /// Bytes consumed at a position expected to hold an exact boundary
    /// sequence didn't match it. Unreachable while the search logic is
    /// correct; kept as an invariant check.
    #[display(fmt = "consumed bytes didn't match the expected boundary")]
    BoundaryMismatch,

    /// A boundary line carried something other than spaces before its CRLF.
    #[display(fmt = "unexpected byte {:#04x} in the padding after a boundary", byte)]
    InvalidTransportPadding { byte: u8 },

    /// A part ended without any `form-data` disposition supplying a `name`
    /// parameter.
    #[display(fmt = "part received without a field name")]
    MissingFieldName,

    /// Couldn't read the part headers completely.
    #[display(fmt = "failed to read part complete headers")]
    IncompleteHeaders,

    /// Failed to read headers.
    #[display(fmt = "failed to read headers: {}", _0)]
    ReadHeaderFailed(httparse::Error),

    /// Failed to decode a part's raw header name to
    /// [`HeaderName`](http::header::HeaderName) type.
    #[display(fmt = "failed to decode part's raw header name: {:?} {}", name, cause)]
    DecodeHeaderName { name: String, cause: BoxError },

    /// Failed to decode a part's raw header value to
    /// [`HeaderValue`](http::header::HeaderValue) type.
    #[display(fmt = "failed to decode part's raw header value: {}", cause)]
    DecodeHeaderValue { value: Vec<u8>, cause: BoxError },

    /// The parser reached a state it can't reach while its transitions are
    /// correct.
    #[display(fmt = "multipart parser state is inconsistent")]
    InconsistentState,

    /// Stream read failed.
    #[display(fmt = "stream read failed: {}", _0)]
    StreamReadFailed(BoxError),

    /// The caller's part handler failed; the decode stopped at that part.
    #[display(fmt = "part handler failed: {}", _0)]
    PartHandlerFailed(BoxError),

    /// The `Content-Type` header is not `multipart/form-data`.
    #[display(fmt = "Content-Type is not multipart/form-data")]
    NoMultipart,

    /// Failed to convert the `Content-Type` to [`mime::Mime`] type.
    #[display(fmt = "failed to convert Content-Type to `mime::Mime` type: {}", _0)]
    DecodeContentType(mime::FromStrError),

    /// No boundary found in `Content-Type` header.
    #[display(fmt = "multipart boundary not found in Content-Type")]
    NoBoundary,

    /// Failed to decode the part body as `JSON` in
    /// [`Part::json`](crate::Part::json).
    #[cfg(feature = "json")]
    #[cfg_attr(nightly, doc(cfg(feature = "json")))]
    #[display(fmt = "failed to decode part body as JSON: {}", _0)]
    DecodeJson(serde_json::Error),
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}
