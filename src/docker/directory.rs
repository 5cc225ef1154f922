use serde::{Deserialize, Serialize};

/// Source and destination of a `COPY --from=builder` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMapping {
    pub source: String,
    pub destination: String,
}

/// Parses a `src[:dst]` directory token.
///
/// Exactly one `:` splits the token into source and destination. Any other
/// separator count (none, or more than one as in `a:b:c`) is not a mapping:
/// the token is used verbatim on both sides.
pub fn parse_directory(token: &str) -> DirectoryMapping {
    let parts: Vec<&str> = token.split(':').collect();
    match parts.as_slice() {
        [source, destination] => DirectoryMapping {
            source: source.to_string(),
            destination: destination.to_string(),
        },
        _ => DirectoryMapping {
            source: token.to_string(),
            destination: token.to_string(),
        },
    }
}
