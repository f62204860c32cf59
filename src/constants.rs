use lazy_static::lazy_static;
use regex::Regex;

pub(crate) const MAX_HEADERS: usize = 32;
pub(crate) const BOUNDARY_EXT: &str = "--";
pub(crate) const CRLF: &str = "\r\n";
pub(crate) const CRLF_CRLF: &str = "\r\n\r\n";

lazy_static! {
    // `\b` keeps the field-name pattern from matching the tail of `filename="..."`.
    pub(crate) static ref CONTENT_DISPOSITION_FIELD_NAME_RE: Regex = Regex::new(r#"\bname="([^"]+)""#).unwrap();
    pub(crate) static ref CONTENT_DISPOSITION_FILE_NAME_RE: Regex = Regex::new(r#"\bfilename="([^"]+)""#).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_field_name_re() {
        let val = r#"form-data; name="product_id""#;
        let name = CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val).unwrap();
        assert_eq!(name.get(1).unwrap().as_str(), "product_id");

        let val = r#"form-data; name="a field"; filename="notes 2.txt""#;
        let name = CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val).unwrap();
        assert_eq!(name.get(1).unwrap().as_str(), "a field");

        // A filename alone must not be mistaken for a field name.
        let val = r#"form-data; filename="notes.txt""#;
        assert!(CONTENT_DISPOSITION_FIELD_NAME_RE.captures(val).is_none());
    }

    #[test]
    fn test_content_disposition_file_name_re() {
        let val = r#"form-data; name="upload"; filename="photo of cat.jpg""#;
        let file_name = CONTENT_DISPOSITION_FILE_NAME_RE.captures(val).unwrap();
        assert_eq!(file_name.get(1).unwrap().as_str(), "photo of cat.jpg");

        let val = r#"form-data; name="upload""#;
        assert!(CONTENT_DISPOSITION_FILE_NAME_RE.captures(val).is_none());
    }
}
