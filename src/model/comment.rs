//! Documentation values attached to declarations.
//!
//! A declaration's documentation is always one of three things: absent,
//! parsed, or a parse failure. Failures are kept as data so that a broken
//! comment is reported by whatever renders the model instead of vanishing.

use crate::location::Location;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Doc {
    #[default]
    Absent,
    Parsed(Comment),
    Failed(DocError),
}

/// A parsed documentation comment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Comment {
    pub elements: Vec<DocElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocElement {
    Paragraph(String),
    CodeBlock(String),
    Tag(Tag),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Author(String),
    /// `@before version text`
    Before(String, String),
    Canonical(String),
    Deprecated(String),
    /// `@param name text`
    Param(String, String),
    /// `@raise Exn text`
    Raise(String, String),
    Return(String),
    See(String),
    Since(String),
    Version(String),
    /// Render an include's content in place.
    Inline,
    /// Render an include expanded.
    Open,
    /// Render an include collapsed.
    Closed,
}

/// A documentation comment that could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{location}: {message}")]
pub struct DocError {
    pub message: String,
    pub location: Location,
}

/// A comment standing between declarations.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentItem {
    Docs(Doc),
    /// `(**/**)`: toggles visibility of the declarations that follow.
    Stop,
}

impl Doc {
    pub fn is_absent(&self) -> bool {
        matches!(self, Doc::Absent)
    }

    pub fn comment(&self) -> Option<&Comment> {
        match self {
            Doc::Parsed(c) => Some(c),
            _ => None,
        }
    }

    /// Concatenate two documentation values in order.
    ///
    /// Absent is the unit; the first failure is kept over anything after it.
    pub fn append(self, other: Doc) -> Doc {
        match (self, other) {
            (Doc::Absent, d) | (d, Doc::Absent) => d,
            (Doc::Failed(e), _) | (_, Doc::Failed(e)) => Doc::Failed(e),
            (Doc::Parsed(mut a), Doc::Parsed(b)) => {
                a.elements.extend(b.elements);
                Doc::Parsed(a)
            }
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.comment()
            .into_iter()
            .flat_map(|c| c.elements.iter())
            .filter_map(|e| match e {
                DocElement::Tag(t) => Some(t),
                _ => None,
            })
    }

    /// Target of a `@canonical` tag, if present.
    pub fn canonical(&self) -> Option<&str> {
        self.tags().find_map(|t| match t {
            Tag::Canonical(p) => Some(p.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(s: &str) -> Doc {
        Doc::Parsed(Comment {
            elements: vec![DocElement::Paragraph(s.to_string())],
        })
    }

    fn failed(msg: &str) -> Doc {
        Doc::Failed(DocError {
            message: msg.to_string(),
            location: Location::none(),
        })
    }

    #[test]
    fn test_append_concatenates() {
        let doc = para("a").append(Doc::Absent).append(para("b"));
        assert_eq!(doc.comment().map(|c| c.elements.len()), Some(2));
        assert_eq!(Doc::Absent.append(Doc::Absent), Doc::Absent);
    }

    #[test]
    fn test_append_keeps_first_failure() {
        let doc = para("a").append(failed("first")).append(failed("second"));
        match doc {
            Doc::Failed(e) => assert_eq!(e.message, "first"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_canonical() {
        let doc = Doc::Parsed(Comment {
            elements: vec![
                DocElement::Paragraph("x".into()),
                DocElement::Tag(Tag::Canonical("Lib.M".into())),
            ],
        });
        assert_eq!(doc.canonical(), Some("Lib.M"));
        assert_eq!(para("x").canonical(), None);
    }
}
