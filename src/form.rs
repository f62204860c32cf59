use bytes::Bytes;
use futures_util::stream::Stream;
use mime::Mime;

use crate::multipart::MultipartReader;
use crate::part::Part;

/// A fully decoded `multipart/form-data` body: ordered `(name, value)`
/// entries, one per part.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use formpart::FormData;
/// use futures_util::stream::once;
/// use std::convert::Infallible;
///
/// # async fn run() {
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"comment\"\r\n\r\nhello\r\n--X-BOUNDARY--\r\n";
/// let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });
///
/// let form = FormData::from_stream(stream, "multipart/form-data; boundary=X-BOUNDARY")
///     .await
///     .unwrap();
///
/// assert_eq!(form.get("comment").unwrap().as_text(), Some("hello"));
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(run());
/// ```
#[derive(Debug)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

/// The value side of a form entry.
#[derive(Debug)]
pub enum FormValue {
    /// A plain field, decoded as text.
    Text(String),
    /// A file upload, kept as raw bytes.
    File(FormFile),
}

/// A file submitted through a form.
#[derive(Debug)]
pub struct FormFile {
    file_name: String,
    content_type: Mime,
    data: Bytes,
}

impl FormData {
    /// Decodes a whole `multipart/form-data` body into a `FormData`.
    ///
    /// The boundary is extracted from the supplied `Content-Type` value via
    /// [`parse_boundary`](crate::parse_boundary).
    pub async fn from_stream<'r, S, O, E>(stream: S, content_type: &str) -> crate::Result<FormData>
    where
        S: Stream<Item = Result<O, E>> + Send + 'r,
        O: Into<Bytes> + 'r,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'r,
    {
        let boundary = crate::parse_boundary(content_type)?;
        let parts = MultipartReader::new(stream, boundary).into_parts().await?;

        let entries = parts.into_iter().map(entry_from_part).collect();

        Ok(FormData { entries })
    }

    /// The first value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name.as_str() == name)
            .map(|(_, value)| value)
    }

    /// All entries, in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FormFile> {
        match self {
            FormValue::Text(_) => None,
            FormValue::File(file) => Some(file),
        }
    }
}

impl FormFile {
    /// The `filename` the submitter advertised.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The file's content type; `text/plain` when the part carried none.
    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    /// The raw file bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

fn entry_from_part(part: Part) -> (String, FormValue) {
    let name = part.name().to_owned();

    // A filename marks the part as a file upload.
    if let Some(file_name) = part.file_name() {
        let file = FormFile {
            file_name: file_name.to_owned(),
            content_type: part.content_type().cloned().unwrap_or(mime::TEXT_PLAIN),
            data: part.into_bytes(),
        };

        return (name, FormValue::File(file));
    }

    (name, FormValue::Text(part.text()))
}
