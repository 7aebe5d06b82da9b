//! Request/response types for the emulated backend, plus the small URL codec
//! the wire contract needs (query-string decoding, component encoding).

use serde::{Deserialize, Serialize};

use crate::error::WebCeeError;

/// Only paths under this prefix are answered by the simulator.
pub const API_PREFIX: &str = "/api/";

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Request {
    /// Build a request from a method and a relative or absolute URL.
    /// The method is upper-cased; an empty method means `GET`.
    pub fn new(method: &str, url: &str) -> Self {
        let method = if method.trim().is_empty() {
            "GET".to_string()
        } else {
            method.trim().to_ascii_uppercase()
        };

        let without_fragment = url.split('#').next().unwrap_or("");
        let (target, query) = match without_fragment.split_once('?') {
            Some((target, query)) => (target, query),
            None => (without_fragment, ""),
        };

        Self {
            method,
            path: path_of(target),
            query: parse_query(query),
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: &str) -> Self {
        Self::new("POST", url)
    }

    /// Parse `METHOD URL`, e.g. `POST /api/trigger?event=inc`.
    pub fn parse_line(line: &str) -> Result<Self, WebCeeError> {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(url), None) => Ok(Self::new(method, url)),
            (Some(url), None, None) if url.starts_with('/') => Ok(Self::get(url)),
            _ => Err(WebCeeError::InvalidRequest(line.to_string())),
        }
    }

    /// First value of a query parameter, decoded.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_api(&self) -> bool {
        self.path.starts_with(API_PREFIX)
    }
}

/// Strip scheme and authority from an absolute URL; relative paths get a leading `/`.
fn path_of(target: &str) -> String {
    let path = match target.find("://") {
        Some(idx) => {
            let after_scheme = &target[idx + 3..];
            match after_scheme.find('/') {
                Some(slash) => &after_scheme[slash..],
                None => "/",
            }
        }
        None => target,
    };
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl Response {
    pub fn json(body: String, status: u16) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON.to_string(),
            body,
        }
    }

    pub fn text(body: &str, status: u16) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT.to_string(),
            body: body.to_string(),
        }
    }

    pub fn ok() -> Self {
        Self::text("OK", 200)
    }

    pub fn not_found() -> Self {
        Self::text("Not Found", 404)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// URL CODEC
// ═══════════════════════════════════════════════════════════════════════════════

/// Split an `application/x-www-form-urlencoded` query into decoded pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode_component(k), decode_component(v)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Decode `+` as space and `%XX` escapes; malformed escapes are kept verbatim.
pub fn decode_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = match bytes.get(i + 1..i + 3) {
            Some(&[hi, lo]) if bytes[i] == b'%' => hex_pair(hi, lo),
            _ => None,
        };
        match (bytes[i], escaped) {
            (b'%', Some(decoded)) => {
                out.push(decoded);
                i += 2;
            }
            (b'+', _) => out.push(b' '),
            (b, _) => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parsing() {
        let req = Request::new("post", "http://localhost:8080/api/update?key=a%20b&val=1+2#frag");
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/api/update");
        assert_eq!(req.param("key"), Some("a b"));
        assert_eq!(req.param("val"), Some("1 2"));
        assert_eq!(req.param("arg"), None);
        assert!(req.is_api());
    }

    #[test]
    fn test_first_param_wins_and_empty_value() {
        let req = Request::get("/api/list?name=a&name=b&flag");
        assert_eq!(req.param("name"), Some("a"));
        assert_eq!(req.param("flag"), Some(""));
    }

    #[test]
    fn test_parse_line() {
        let req = Request::parse_line("POST /api/trigger?event=inc").unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.param("event"), Some("inc"));
        assert_eq!(Request::parse_line("/api/data").unwrap().method, "GET");
        assert!(Request::parse_line("nonsense").is_err());
    }

    #[test]
    fn test_component_codec() {
        let original = "a b&c=d/é'";
        let encoded = encode_component(original);
        assert_eq!(encoded, "a%20b%26c%3Dd%2F%C3%A9'");
        assert_eq!(decode_component(&encoded), original);
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
    }
}
