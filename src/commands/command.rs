use snafu::Snafu;

use crate::commands::CommandOutcome;
use crate::filesystem::{FsPath, NodeKind, TreeStore};

/// Lines starting with this prefix are ignored
const COMMENT_PREFIX: char = '#';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { path: FsPath, kind: NodeKind },
    Lookup { path: FsPath },
    Delete { path: FsPath },
    Move { src: FsPath, dst: FsPath },
}

/// A command together with the input line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCommand {
    pub line_number: usize,
    pub command: Command,
}

impl Command {
    /// Parses one input line.
    ///
    /// Returns `Ok(None)` for comments. A line without any token is a
    /// [`ParseError::BlankLine`].
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&tag, args)) = tokens.split_first() else {
            return Err(ParseError::BlankLine);
        };
        if tag.starts_with(COMMENT_PREFIX) {
            return Ok(None);
        }

        let command = match tag {
            "c" => {
                let [path, kind] = expect_args::<2>(tag, args)?;
                Command::Create {
                    path: FsPath::parse(path),
                    kind: parse_kind(kind)?,
                }
            }
            "l" => {
                let [path] = expect_args::<1>(tag, args)?;
                Command::Lookup {
                    path: FsPath::parse(path),
                }
            }
            "d" => {
                let [path] = expect_args::<1>(tag, args)?;
                Command::Delete {
                    path: FsPath::parse(path),
                }
            }
            "m" => {
                let [src, dst] = expect_args::<2>(tag, args)?;
                Command::Move {
                    src: FsPath::parse(src),
                    dst: FsPath::parse(dst),
                }
            }
            _ => {
                return Err(ParseError::UnknownCommand {
                    tag: tag.to_string(),
                });
            }
        };

        Ok(Some(command))
    }

    /// Applies the command to the tree. Tree errors become part of the
    /// outcome rather than failing the run.
    pub fn apply(self, tree: &TreeStore) -> CommandOutcome {
        match self {
            Command::Create { path, kind } => {
                let result = tree.create(&path, kind);
                CommandOutcome::Create { path, kind, result }
            }
            Command::Lookup { path } => {
                let found = tree.lookup(&path);
                CommandOutcome::Lookup { path, found }
            }
            Command::Delete { path } => {
                let result = tree.delete(&path);
                CommandOutcome::Delete { path, result }
            }
            Command::Move { src, dst } => {
                let result = tree.move_node(&src, &dst);
                CommandOutcome::Move { src, dst, result }
            }
        }
    }
}

fn expect_args<'a, const N: usize>(
    tag: &str,
    args: &[&'a str],
) -> Result<[&'a str; N], ParseError> {
    <[&'a str; N]>::try_from(args).map_err(|_| ParseError::WrongArgumentCount {
        tag: tag.to_string(),
        expected: N,
        found: args.len(),
    })
}

fn parse_kind(raw: &str) -> Result<NodeKind, ParseError> {
    match raw {
        "f" => Ok(NodeKind::File),
        "d" => Ok(NodeKind::Directory),
        _ => Err(ParseError::InvalidNodeKind {
            kind: raw.to_string(),
        }),
    }
}

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[snafu(display("Blank line where a command was expected"))]
    BlankLine,
    #[snafu(display("Unknown command '{}'", tag))]
    UnknownCommand { tag: String },
    #[snafu(display(
        "Command '{}' expects {} argument(s) but got {}",
        tag,
        expected,
        found
    ))]
    WrongArgumentCount {
        tag: String,
        expected: usize,
        found: usize,
    },
    #[snafu(display("Invalid node type '{}', expected 'f' or 'd'", kind))]
    InvalidNodeKind { kind: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("c /a f", Command::Create { path: FsPath::parse("/a"), kind: NodeKind::File })]
    #[case("c /a/b d", Command::Create { path: FsPath::parse("/a/b"), kind: NodeKind::Directory })]
    #[case("l /a", Command::Lookup { path: FsPath::parse("/a") })]
    #[case("d /a", Command::Delete { path: FsPath::parse("/a") })]
    #[case("m /a /b", Command::Move { src: FsPath::parse("/a"), dst: FsPath::parse("/b") })]
    #[case("  m\t/a   /b  \n", Command::Move { src: FsPath::parse("/a"), dst: FsPath::parse("/b") })]
    fn parses_valid_lines(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(line), Ok(Some(expected)));
    }

    #[rstest]
    #[case("# a comment")]
    #[case("#c /a f")]
    #[case("   # indented comment")]
    fn skips_comments(#[case] line: &str) {
        assert_eq!(Command::parse(line), Ok(None));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("   \t ")]
    #[case("\n")]
    #[case("  \n")]
    fn rejects_blank_lines(#[case] line: &str) {
        assert_eq!(Command::parse(line), Err(ParseError::BlankLine));
    }

    #[rstest]
    #[case("x /a")]
    #[case("create /a f")]
    #[case("C /a f")]
    fn rejects_unknown_commands(#[case] line: &str) {
        assert!(matches!(
            Command::parse(line),
            Err(ParseError::UnknownCommand { .. })
        ));
    }

    #[rstest]
    #[case("c /a", 2, 1)]
    #[case("c /a f extra", 2, 3)]
    #[case("l", 1, 0)]
    #[case("l /a /b", 1, 2)]
    #[case("d", 1, 0)]
    #[case("m /a", 2, 1)]
    #[case("m /a /b /c", 2, 3)]
    fn rejects_wrong_argument_count(
        #[case] line: &str,
        #[case] expected: usize,
        #[case] found: usize,
    ) {
        match Command::parse(line) {
            Err(ParseError::WrongArgumentCount {
                expected: e,
                found: f,
                ..
            }) => {
                assert_eq!((e, f), (expected, found));
            }
            other => panic!("Expected WrongArgumentCount, got {other:?}"),
        }
    }

    #[rstest]
    #[case("c /a x")]
    #[case("c /a file")]
    #[case("c /a D")]
    fn rejects_invalid_node_kind(#[case] line: &str) {
        assert!(matches!(
            Command::parse(line),
            Err(ParseError::InvalidNodeKind { .. })
        ));
    }

    #[test]
    fn apply_reports_tree_errors_as_outcomes() {
        let tree = TreeStore::default();
        let create = Command::parse("c /a f").unwrap().unwrap();

        assert!(create.clone().apply(&tree).is_success());
        let repeated = create.apply(&tree);
        assert!(!repeated.is_success());
        assert_eq!(repeated.to_string(), "Create file: /a (failed: already exists)");
    }

    #[rstest]
    #[case("l a", "Search: /a found")]
    #[case("l //a/", "Search: /a found")]
    #[case("l a/missing", "Search: /a/missing not found")]
    fn status_lines_use_normalized_paths(#[case] line: &str, #[case] status: &str) {
        let tree = TreeStore::default();
        tree.create(&FsPath::parse("/a"), NodeKind::Directory).unwrap();

        let outcome = Command::parse(line).unwrap().unwrap().apply(&tree);
        assert_eq!(outcome.to_string(), status);
    }
}
