use std::fmt;

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Absolute path inside the namespace, stored as its segments.
///
/// Empty segments are dropped while parsing, so `"/a/b"`, `"a/b"` and
/// `"/a//b/"` all name the same node. The empty path names the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FsPath {
    segments: Vec<String>,
}

impl FsPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split(SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Splits the path into the segments of its parent and its own name.
    /// Returns `None` for the root.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.segments
            .split_last()
            .map(|(name, parent)| (parent, name.as_str()))
    }

    /// Whether `self` lies strictly below `ancestor`
    pub fn is_strict_descendant_of(&self, ancestor: &FsPath) -> bool {
        self.segments.len() > ancestor.segments.len()
            && self.segments.starts_with(&ancestor.segments)
    }

    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "{SEPARATOR}");
        }
        for segment in &self.segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a/b", &["a", "b"])]
    #[case("a/b", &["a", "b"])]
    #[case("/a//b/", &["a", "b"])]
    #[case("/", &[])]
    #[case("", &[])]
    #[case("name.txt", &["name.txt"])]
    fn parse_drops_empty_segments(#[case] raw: &str, #[case] expected: &[&str]) {
        let path = FsPath::parse(raw);
        assert_eq!(path.segments(), expected);
    }

    #[rstest]
    #[case("/", "/")]
    #[case("a", "/a")]
    #[case("//a///b", "/a/b")]
    fn display_renders_canonical_form(#[case] raw: &str, #[case] rendered: &str) {
        assert_eq!(FsPath::parse(raw).to_string(), rendered);
    }

    #[test]
    fn split_last_separates_parent_and_name() {
        let path = FsPath::parse("/a/b/c");
        let (parent, name) = path.split_last().unwrap();
        assert_eq!(parent, ["a", "b"]);
        assert_eq!(name, "c");
        assert!(FsPath::root().split_last().is_none());
    }

    #[rstest]
    #[case("/a/b", "/a", true)]
    #[case("/a/b/c", "/a", true)]
    #[case("/a", "/a", false)]
    #[case("/ab", "/a", false)]
    #[case("/b/a", "/a", false)]
    #[case("/a", "/", true)]
    fn strict_descendant_compares_whole_segments(
        #[case] path: &str,
        #[case] ancestor: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            FsPath::parse(path).is_strict_descendant_of(&FsPath::parse(ancestor)),
            expected
        );
    }

    #[test]
    fn join_appends_a_segment() {
        assert_eq!(FsPath::root().join("a").join("b"), FsPath::parse("/a/b"));
    }
}
