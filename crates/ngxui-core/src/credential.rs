// ABOUTME: Opaque credential token presented by clients on every protected request.
// ABOUTME: Guarantees non-emptiness and keeps the token value out of Debug output and logs.

use std::fmt;

/// Where a credential was found on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSource {
    /// The raw value of the `Authorization` header.
    Header,
    /// The base64-decoded value of the `token` query parameter.
    QueryToken,
}

impl CredentialSource {
    /// Extraction order. The first source yielding a credential wins.
    pub const PRECEDENCE: [CredentialSource; 2] =
        [CredentialSource::Header, CredentialSource::QueryToken];

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Header => "header",
            CredentialSource::QueryToken => "query_token",
        }
    }
}

/// An opaque session token. Never empty.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, returning `None` when it is empty.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Wrap raw bytes (e.g. a decoded query token). Empty or non-UTF-8 input yields `None`.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        String::from_utf8(bytes).ok().and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_not_a_credential() {
        assert!(Credential::new("").is_none());
        assert!(Credential::from_bytes(Vec::new()).is_none());
    }

    #[test]
    fn non_utf8_bytes_are_not_a_credential() {
        assert!(Credential::from_bytes(vec![0xff, 0xfe, 0x00]).is_none());
    }

    #[test]
    fn credential_keeps_value_verbatim() {
        let cred = Credential::new(" abc.def ").unwrap();
        assert_eq!(cred.as_str(), " abc.def ");
    }

    #[test]
    fn debug_output_hides_token() {
        let cred = Credential::new("super-secret").unwrap();
        let rendered = format!("{:?}", cred);
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn header_precedes_query_token() {
        assert_eq!(
            CredentialSource::PRECEDENCE,
            [CredentialSource::Header, CredentialSource::QueryToken]
        );
    }
}
