use http::header::{self, HeaderMap};

use crate::constants;

pub(crate) struct ContentDisposition {
    pub(crate) field_name: Option<String>,
    pub(crate) file_name: Option<String>,
}

impl ContentDisposition {
    /// Extracts `name` and `filename` from a `form-data` disposition.
    /// Dispositions of any other type carry no field metadata here and are
    /// passed over.
    pub fn parse(headers: &HeaderMap) -> ContentDisposition {
        let content_disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|val| val.to_str().ok())
            .filter(|val| is_form_data(val));

        let field_name = content_disposition
            .and_then(|val| constants::CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val))
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_owned());

        let file_name = content_disposition
            .and_then(|val| constants::CONTENT_DISPOSITION_FILE_NAME_RE.captures(val))
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_owned());

        ContentDisposition { field_name, file_name }
    }
}

fn is_form_data(value: &str) -> bool {
    value
        .split(';')
        .next()
        .map(|token| token.trim().eq_ignore_ascii_case("form-data"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use http::header::{self, HeaderMap, HeaderValue};

    use super::*;

    fn headers_with_disposition(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_parse_form_data() {
        let headers = headers_with_disposition(r#"form-data; name="comment""#);
        let parsed = ContentDisposition::parse(&headers);
        assert_eq!(parsed.field_name.as_deref(), Some("comment"));
        assert_eq!(parsed.file_name, None);
    }

    #[test]
    fn test_parse_form_data_with_filename() {
        let headers = headers_with_disposition(r#"form-data; name="upload"; filename="cat.jpg""#);
        let parsed = ContentDisposition::parse(&headers);
        assert_eq!(parsed.field_name.as_deref(), Some("upload"));
        assert_eq!(parsed.file_name.as_deref(), Some("cat.jpg"));
    }

    #[test]
    fn test_disposition_type_is_case_insensitive() {
        let headers = headers_with_disposition(r#"Form-Data; name="comment""#);
        let parsed = ContentDisposition::parse(&headers);
        assert_eq!(parsed.field_name.as_deref(), Some("comment"));
    }

    #[test]
    fn test_other_disposition_types_are_ignored() {
        let headers = headers_with_disposition(r#"attachment; name="comment"; filename="cat.jpg""#);
        let parsed = ContentDisposition::parse(&headers);
        assert_eq!(parsed.field_name, None);
        assert_eq!(parsed.file_name, None);
    }

    #[test]
    fn test_filename_alone_is_not_a_field_name() {
        let headers = headers_with_disposition(r#"form-data; filename="cat.jpg""#);
        let parsed = ContentDisposition::parse(&headers);
        assert_eq!(parsed.field_name, None);
        assert_eq!(parsed.file_name.as_deref(), Some("cat.jpg"));
    }

    #[test]
    fn test_missing_header() {
        let parsed = ContentDisposition::parse(&HeaderMap::new());
        assert_eq!(parsed.field_name, None);
        assert_eq!(parsed.file_name, None);
    }
}
