use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// An opaque authorization value obtained out of band.
///
/// The pipeline never inspects or persists a credential; it only renders it
/// into the single request header the platform expects. Values are shared
/// read-only across all workers for the lifetime of a run.
#[derive(Debug, Clone)]
pub enum Credential {
    /// A named session cookie, e.g. Bugcrowd's `_crowdcontrol_session_key`.
    SessionCookie { name: String, value: String },
    /// An HTTP Basic authorization value (already base64-encoded).
    Basic(String),
}

impl Credential {
    pub fn session_cookie(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SessionCookie {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Build a Basic credential from a username and API token.
    pub fn basic(username: &str, token: &str) -> Self {
        Self::Basic(BASE64.encode(format!("{}:{}", username, token)))
    }

    /// Render the credential as a `(header name, header value)` pair.
    /// Header names are lowercase so they can be used verbatim with reqwest.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Self::SessionCookie { name, value } => ("cookie", format!("{}={}", name, value)),
            Self::Basic(encoded) => ("authorization", format!("Basic {}", encoded)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header() {
        let cred = Credential::session_cookie("_crowdcontrol_session_key", "abc123");
        let (name, value) = cred.header();
        assert_eq!(name, "cookie");
        assert_eq!(value, "_crowdcontrol_session_key=abc123");
    }

    #[test]
    fn test_basic_header_is_base64() {
        let cred = Credential::basic("hacker", "token");
        let (name, value) = cred.header();
        assert_eq!(name, "authorization");
        // "hacker:token" base64-encoded
        assert_eq!(value, "Basic aGFja2VyOnRva2Vu");
    }
}
