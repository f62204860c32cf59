#![cfg_attr(nightly, feature(doc_cfg))]

//! An async streaming parser for `multipart/form-data` bodies.
//!
//! [`MultipartReader`] consumes any [`Stream`](futures_util::stream::Stream)
//! of byte chunks plus the message's boundary token, and hands each
//! completed [`Part`] to an async callback, in stream order, without ever
//! holding the whole message in memory. Boundary sequences split across
//! chunk reads are handled transparently, so the chunking of the source
//! stream never changes the decoded parts.
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use formpart::MultipartReader;
//! use futures_util::stream::once;
//! use std::convert::Infallible;
//!
//! # async fn run() {
//! let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
//! let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });
//!
//! let parts = MultipartReader::new(stream, "X-BOUNDARY").into_parts().await.unwrap();
//!
//! assert_eq!(parts.len(), 1);
//! assert_eq!(parts[0].name(), "my_text_field");
//! assert_eq!(parts[0].text(), "abcd");
//! # }
//! # tokio::runtime::Runtime::new().unwrap().block_on(run());
//! ```

pub use error::Error;
pub use form::{FormData, FormFile, FormValue};
pub use multipart::MultipartReader;
pub use part::Part;

mod buffer;
mod constants;
mod content_disposition;
mod error;
mod form;
mod helpers;
mod multipart;
mod part;
mod state;

/// A Result type often returned from methods that can have `formpart` errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses the `Content-Type` header to extract the boundary value.
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> crate::Result<String> {
    let m = content_type
        .as_ref()
        .parse::<mime::Mime>()
        .map_err(crate::Error::DecodeContentType)?;

    if !(m.type_() == mime::MULTIPART_FORM_DATA.type_() && m.subtype() == mime::MULTIPART_FORM_DATA.subtype()) {
        return Err(crate::Error::NoMultipart);
    }

    m.get_param(mime::BOUNDARY)
        .map(|name| name.as_str().to_owned())
        .ok_or(crate::Error::NoBoundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boundary() {
        let content_type = "multipart/form-data; boundary=ABCDEFG";
        assert_eq!(parse_boundary(content_type), Ok("ABCDEFG".to_owned()));

        let content_type = "multipart/form-data; boundary=------ABCDEFG";
        assert_eq!(parse_boundary(content_type), Ok("------ABCDEFG".to_owned()));

        let content_type = "boundary=------ABCDEFG";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "text/plain";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "text/plain; boundary=------ABCDEFG";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "multipart/form-data";
        assert_eq!(parse_boundary(content_type), Err(Error::NoBoundary));
    }
}
