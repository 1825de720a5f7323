//! Extracts the model location from a page query string.
//!
//! # Examples
//! ```
//! use objzip::query::model_url_from_query;
//!
//! let url = model_url_from_query("?file=https%3A%2F%2Fexample.com%2Fchair.zip&v=2");
//! assert_eq!(url.as_deref(), Some("https://example.com/chair.zip"));
//! assert_eq!(model_url_from_query("?other=1"), None);
//! ```

/// Name of the query parameter holding the archive URL.
pub const FILE_PARAM: &str = "file";

/// Status shown when no archive was requested.
pub const USAGE_HINT: &str = "Use: ?file=URL_OF_YOUR_MODEL.zip";

/// Returns the decoded value of the first `file` parameter, unless empty.
pub fn model_url_from_query(query: &str) -> Option<String> {
    query_param(query, FILE_PARAM).filter(|v| !v.is_empty())
}

/// Returns the decoded value of the first parameter called `name`.
pub fn query_param(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode_component(key) == name)
        .map(|(_, value)| decode_component(value))
}

/// Form-urlencoded decoding: `+` is a space and `%XX` a byte. Malformed
/// escapes are kept literally and invalid UTF-8 is replaced.
pub fn decode_component(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => match (bytes.get(i + 1), bytes.get(i + 2)) {
                (Some(&hi), Some(&lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    out.push(hex_value(hi) << 4 | hex_value(lo));
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoding() {
        assert_eq!(decode_component("a+b%20c"), "a b c");
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz%4"), "%zz%4");
        assert_eq!(decode_component("caf%C3%A9"), "café");
    }

    #[test]
    fn test_first_file_param_wins() {
        assert_eq!(
            model_url_from_query("file=a.zip&file=b.zip").as_deref(),
            Some("a.zip")
        );
        assert_eq!(model_url_from_query("?file="), None);
        assert_eq!(model_url_from_query("?file"), None);
        assert_eq!(model_url_from_query(""), None);
        assert_eq!(
            model_url_from_query("?x=1&%66ile=m.zip").as_deref(),
            Some("m.zip")
        );
    }
}
