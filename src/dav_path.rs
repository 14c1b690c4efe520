/// URL path handling for the WebDAV tree.
///
/// Paths are split into percent-decoded segments with no `.`/`..`
/// normalization; segment matching elsewhere is case-sensitive and treats
/// titles as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavPath {
    segments: Vec<String>,
}

impl DavPath {
    /// Parse a raw request path. Leading/trailing slashes are ignored, empty
    /// segments (from doubled slashes) are dropped, and each segment is
    /// percent-decoded lossily so a malformed escape never fails resolution.
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned())
            .collect();
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Canonical percent-encoded path, with a trailing slash iff the resource
    /// is a collection. The root is always `/`.
    pub fn href(&self, collection: bool) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut href = String::new();
        for segment in &self.segments {
            href.push('/');
            href.push_str(&urlencoding::encode(segment));
        }
        if collection {
            href.push('/');
        }
        href
    }
}

/// Append a child name to a collection href (which always ends in `/`).
pub fn child_href(base: &str, name: &str, collection: bool) -> String {
    let mut href = format!("{}{}", base, urlencoding::encode(name));
    if collection {
        href.push('/');
    }
    href
}

/// Split a note's URL name into (title, syntax) on the last dot.
/// Names without an extension can never denote a note.
pub fn split_note_name(name: &str) -> Option<(String, String)> {
    let (title, syntax) = name.rsplit_once('.')?;
    if title.is_empty() || syntax.is_empty() {
        return None;
    }
    Some((title.to_string(), syntax.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root() {
        assert!(DavPath::parse("/").is_root());
        assert!(DavPath::parse("").is_root());
        assert!(DavPath::parse("//").is_root());
    }

    #[test]
    fn test_parse_trims_slashes() {
        let path = DavPath::parse("/Folder/note.md/");
        assert_eq!(path.segments(), ["Folder", "note.md"]);
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        let path = DavPath::parse("/a//b");
        assert_eq!(path.segments(), ["a", "b"]);
    }

    #[test]
    fn test_parse_percent_decodes() {
        let path = DavPath::parse("/My%20Folder/My%20Note.md");
        assert_eq!(path.segments(), ["My Folder", "My Note.md"]);
    }

    #[test]
    fn test_no_dot_normalization() {
        let path = DavPath::parse("/a/../b");
        assert_eq!(path.segments(), ["a", "..", "b"]);
    }

    #[test]
    fn test_href_round_trip() {
        let path = DavPath::parse("/My%20Folder");
        assert_eq!(path.href(true), "/My%20Folder/");
        assert_eq!(path.href(false), "/My%20Folder");
        assert_eq!(DavPath::parse("/").href(true), "/");
    }

    #[test]
    fn test_child_href() {
        assert_eq!(child_href("/", "Sub Folder", true), "/Sub%20Folder/");
        assert_eq!(child_href("/Top/", "note.md", false), "/Top/note.md");
    }

    #[test]
    fn test_split_note_name() {
        assert_eq!(
            split_note_name("note.md"),
            Some(("note".to_string(), "md".to_string()))
        );
        assert_eq!(
            split_note_name("a.b.md"),
            Some(("a.b".to_string(), "md".to_string()))
        );
        assert_eq!(split_note_name("noextension"), None);
        assert_eq!(split_note_name(".hidden"), None);
        assert_eq!(split_note_name("trailing."), None);
    }
}
