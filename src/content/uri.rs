//! Resource identifiers
//!
//! Identifiers look like `file:///abs/path` or `content:///enemies/crawler.txt`.
//! Only the `file` and `content` schemes are served; anything else still
//! parses so that each provider operation can reject it on its own.

use std::fmt;

use super::ContentError;

/// Identifier scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    /// Direct filesystem path
    File,
    /// Entry inside the content package
    Content,
    /// Anything else (rejected by every provider operation)
    Other(String),
}

impl Scheme {
    fn parse(s: &str) -> Self {
        match s {
            "file" => Scheme::File,
            "content" => Scheme::Content,
            other => Scheme::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scheme::File => "file",
            Scheme::Content => "content",
            Scheme::Other(s) => s,
        }
    }
}

/// A parsed resource identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUri {
    pub scheme: Scheme,
    /// Authority between `://` and the path (usually empty)
    pub authority: String,
    /// Path starting at the first `/` after the authority
    pub path: String,
}

impl ContentUri {
    /// Parse `scheme://authority/path`
    pub fn parse(s: &str) -> Result<Self, ContentError> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| ContentError::MalformedUri(s.to_string()))?;
        if scheme.is_empty() {
            return Err(ContentError::MalformedUri(s.to_string()));
        }
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        Ok(Self {
            scheme: Scheme::parse(scheme),
            authority: authority.to_string(),
            path: path.to_string(),
        })
    }

    /// Identifier for a plain filesystem path
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            scheme: Scheme::File,
            authority: String::new(),
            path: path.into(),
        }
    }

    /// Identifier for a content package entry (path relative to the archive root)
    pub fn content(path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') { path } else { format!("/{}", path) };
        Self {
            scheme: Scheme::Content,
            authority: String::new(),
            path,
        }
    }

    /// String form truncated at the last `/`
    pub fn base(&self) -> String {
        let s = self.to_string();
        match s.rfind('/') {
            Some(i) => s[..i].to_string(),
            None => s,
        }
    }

    /// Identifier for `name` next to this one (`base() + "/" + name`)
    pub fn sibling(&self, name: &str) -> Result<Self, ContentError> {
        Self::parse(&format!("{}/{}", self.base(), name))
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme.as_str(), self.authority, self.path)
    }
}

impl std::str::FromStr for ContentUri {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schemes() {
        let uri = ContentUri::parse("content:///enemies/crawler.txt").unwrap();
        assert_eq!(uri.scheme, Scheme::Content);
        assert_eq!(uri.path, "/enemies/crawler.txt");
        assert!(uri.authority.is_empty());

        let uri = ContentUri::parse("file:///tmp/level.txt").unwrap();
        assert_eq!(uri.scheme, Scheme::File);
        assert_eq!(uri.path, "/tmp/level.txt");

        let uri = ContentUri::parse("http://example.com/a").unwrap();
        assert_eq!(uri.scheme, Scheme::Other("http".into()));
        assert_eq!(uri.authority, "example.com");
        assert_eq!(uri.path, "/a");
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            ContentUri::parse("enemies/crawler.txt"),
            Err(ContentError::MalformedUri(_))
        ));
        assert!(ContentUri::parse("://x").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let cases = [
            "content:///enemies/crawler.txt",
            "file:///tmp/x",
            "http://host/p",
            "content://",
        ];
        for s in cases {
            assert_eq!(ContentUri::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_base_and_sibling() {
        let uri = ContentUri::parse("content:///enemies/crawler.txt").unwrap();
        assert_eq!(uri.base(), "content:///enemies");

        let sibling = uri.sibling("crawler.ron").unwrap();
        assert_eq!(sibling.to_string(), "content:///enemies/crawler.ron");
        assert_eq!(sibling.path, "/enemies/crawler.ron");

        // Entry directly under the archive root
        let uri = ContentUri::content("crawler.txt");
        assert_eq!(uri.to_string(), "content:///crawler.txt");
        assert_eq!(uri.sibling("walk.ron").unwrap().path, "/walk.ron");
    }
}
