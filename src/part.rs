use std::borrow::Cow;
use std::fmt;

use bytes::{Bytes, BytesMut};
use encoding_rs::{Encoding, UTF_8};
use http::header::{self, HeaderMap};
use mime::Mime;
#[cfg(feature = "json")]
use serde::de::DeserializeOwned;

use crate::content_disposition::ContentDisposition;

/// A single decoded part of a `multipart/form-data` message.
///
/// Parts are immutable snapshots: the body is decoupled from the parser's
/// internal buffers, so a `Part` can be retained for as long as the caller
/// likes after the decode has moved on.
pub struct Part {
    name: String,
    file_name: Option<String>,
    content_type: Option<Mime>,
    headers: HeaderMap,
    body: Bytes,
    idx: usize,
}

impl Part {
    /// The `name` parameter of the part's `form-data` disposition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `filename` parameter, if one was supplied.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The part's `Content-Type`, if one was supplied.
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// The full header block of the part.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The part body.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the part, returning its body.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// The zero-based position of this part within the message.
    pub fn index(&self) -> usize {
        self.idx
    }

    /// The part body decoded as text, assuming UTF-8 when the part's
    /// content type names no charset.
    pub fn text(&self) -> String {
        self.text_with_charset("utf-8")
    }

    /// The part body decoded as text with a caller-chosen fallback charset.
    ///
    /// The charset named by the content type's `charset` parameter wins;
    /// `default_encoding` applies otherwise. Unknown labels fall back to
    /// UTF-8, and malformed sequences decode to replacement characters.
    pub fn text_with_charset(&self, default_encoding: &str) -> String {
        let encoding_name = self
            .content_type()
            .and_then(|mime| mime.get_param(mime::CHARSET))
            .map(|charset| charset.as_str())
            .unwrap_or(default_encoding);

        let encoding = Encoding::for_label(encoding_name.as_bytes()).unwrap_or(UTF_8);

        let (text, _, _) = encoding.decode(&self.body);

        match text {
            Cow::Owned(s) => s,
            Cow::Borrowed(s) => String::from(s),
        }
    }

    /// Deserializes the part body as JSON.
    ///
    /// # Optional
    ///
    /// This requires the optional `json` feature to be enabled.
    #[cfg(feature = "json")]
    #[cfg_attr(nightly, doc(cfg(feature = "json")))]
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        serde_json::from_slice(&self.body).map_err(crate::Error::DecodeJson)
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("name", &self.name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("body", &format_args!("{} bytes", self.body.len()))
            .finish()
    }
}

/// The part currently being accumulated. At most one exists per decode;
/// it turns into a [`Part`] when the next boundary shows up.
pub(crate) struct PendingPart {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<Mime>,
    headers: HeaderMap,
    body: BytesMut,
}

impl PendingPart {
    pub fn new() -> PendingPart {
        PendingPart {
            name: None,
            file_name: None,
            content_type: None,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }

    pub fn apply_headers(&mut self, headers: HeaderMap) {
        let ContentDisposition { field_name, file_name } = ContentDisposition::parse(&headers);

        self.name = field_name;
        self.file_name = file_name;
        self.content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<Mime>().ok());
        self.headers = headers;
    }

    pub fn append_body(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Seals the part. Fails when no `form-data` disposition supplied a
    /// `name` parameter.
    pub fn finish(self, idx: usize) -> crate::Result<Part> {
        let name = self.name.ok_or(crate::Error::MissingFieldName)?;

        Ok(Part {
            name,
            file_name: self.file_name,
            content_type: self.content_type,
            headers: self.headers,
            body: self.body.freeze(),
            idx,
        })
    }
}

#[cfg(test)]
mod tests {
    use http::header::{HeaderMap, HeaderValue};

    use super::*;

    fn pending_with_disposition(value: &'static str) -> PendingPart {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_static(value));

        let mut pending = PendingPart::new();
        pending.apply_headers(headers);
        pending
    }

    #[test]
    fn test_finish() {
        let mut pending = pending_with_disposition(r#"form-data; name="comment""#);
        pending.append_body(b"hello, ");
        pending.append_body(b"world");

        let part = pending.finish(3).unwrap();
        assert_eq!(part.name(), "comment");
        assert_eq!(part.file_name(), None);
        assert_eq!(part.content_type(), None);
        assert_eq!(&part.bytes()[..], b"hello, world");
        assert_eq!(part.index(), 3);
        assert_eq!(part.text(), "hello, world");
    }

    #[test]
    fn test_finish_without_name() {
        let pending = pending_with_disposition(r#"form-data; filename="cat.jpg""#);
        assert_eq!(pending.finish(0).unwrap_err(), crate::Error::MissingFieldName);
    }

    #[test]
    fn test_content_type_charset_drives_text() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static(r#"form-data; name="greeting""#),
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=iso-8859-1"),
        );

        let mut pending = PendingPart::new();
        pending.apply_headers(headers);
        // "héllo" in latin-1.
        pending.append_body(&[b'h', 0xE9, b'l', b'l', b'o']);

        let part = pending.finish(0).unwrap();
        assert_eq!(part.content_type().unwrap().essence_str(), "text/plain");
        assert_eq!(part.text(), "héllo");
    }
}
