//! Helpers for the base64 image payload carried in a [`crate::RoastRequest`].
//!
//! Both sides of the wire use these: the client to build a data URL from a file,
//! the server to strip the header off again and check what it was given.

use base64::Engine;

/// Largest image either side will accept, in decoded bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// An image string split at its data-URL header, if it had one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePayload<'a> {
    /// Everything before the first comma, e.g. `data:image/png;base64`
    pub header: Option<&'a str>,
    /// The base64 data that gets forwarded to the vision model
    pub data: &'a str,
}

impl<'a> ImagePayload<'a> {
    /// Split off everything up to and including the first comma.
    /// Strings without a comma are taken as bare base64.
    pub fn parse(image: &'a str) -> Self {
        match image.split_once(',') {
            Some((header, data)) => Self {
                header: Some(header),
                data,
            },
            None => Self {
                header: None,
                data: image,
            },
        }
    }

    /// The MIME type named in a `data:` header, if there is one.
    pub fn mime_type(&self) -> Option<&'a str> {
        let header = self.header?.trim();
        let rest = header.strip_prefix("data:")?;
        let mime = rest.split(';').next().unwrap_or_default().trim();
        (!mime.is_empty()).then_some(mime)
    }

    /// Size the data will have once decoded, computed from the base64 length alone.
    pub fn decoded_len(&self) -> usize {
        let significant = self
            .data
            .bytes()
            .filter(|b| !b.is_ascii_whitespace() && *b != b'=')
            .count();
        significant * 3 / 4
    }
}

/// Encode bytes as a data URL.
/// For the purpose of data urls, you do NOT need to use the URL_SAFE variant.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_url_header() {
        let payload = ImagePayload::parse("data:image/png;base64,ABC123");
        assert_eq!(payload.data, "ABC123");
        assert_eq!(payload.header, Some("data:image/png;base64"));
        assert_eq!(payload.mime_type(), Some("image/png"));
    }

    #[test]
    fn bare_base64_is_forwarded_untouched() {
        let payload = ImagePayload::parse("/9j/4AAQSkZJRg==");
        assert_eq!(payload.data, "/9j/4AAQSkZJRg==");
        assert_eq!(payload.header, None);
        assert_eq!(payload.mime_type(), None);
    }

    #[test]
    fn only_the_first_comma_splits() {
        let payload = ImagePayload::parse("data:image/jpeg;base64,AAAA,BBBB");
        assert_eq!(payload.data, "AAAA,BBBB");
    }

    #[test]
    fn header_without_data_scheme_has_no_mime() {
        let payload = ImagePayload::parse("whatever,QUJD");
        assert_eq!(payload.data, "QUJD");
        assert_eq!(payload.mime_type(), None);
    }

    #[test]
    fn decoded_len_matches_real_encoding() {
        for len in [0usize, 1, 2, 3, 4, 5, 100, 1001] {
            let bytes = vec![7u8; len];
            let url = to_data_url("image/png", &bytes);
            assert_eq!(ImagePayload::parse(&url).decoded_len(), len, "len {}", len);
        }
    }

    #[test]
    fn data_url_round_trips_through_parse() {
        let url = to_data_url("image/webp", b"hello");
        let payload = ImagePayload::parse(&url);
        assert_eq!(payload.mime_type(), Some("image/webp"));
        assert_eq!(payload.data, "aGVsbG8=");
    }
}
