use std::fmt;

/// Raw text extracted from a QR symbol
///
/// Immutable once decoded. No semantic parsing happens beyond
/// [`DecodedPayload::looks_like_url`], which exists for display only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedPayload(String);

/// Schemes that need an authority (`scheme://host`) to form a URL
const SPECIAL_SCHEMES: [&str; 6] = ["http", "https", "ws", "wss", "ftp", "file"];

impl DecodedPayload {
    /// Wrap decoded text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Borrow the decoded text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the decoded text
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the text is shaped like an absolute URL (`scheme:rest`)
    pub fn looks_like_url(&self) -> bool {
        let text = self.0.trim();
        if text.chars().any(char::is_whitespace) {
            return false;
        }
        let Some((scheme, rest)) = text.split_once(':') else {
            return false;
        };

        let mut chars = scheme.chars();
        let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return false;
        }

        let scheme = scheme.to_ascii_lowercase();
        if SPECIAL_SCHEMES.contains(&scheme.as_str()) {
            match rest.strip_prefix("//") {
                Some(authority) => scheme == "file" || !authority.is_empty(),
                None => false,
            }
        } else {
            !rest.is_empty()
        }
    }
}

impl fmt::Display for DecodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DecodedPayload {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for DecodedPayload {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl AsRef<str> for DecodedPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
