//! Documentation attributes.
//!
//! Doc comments reach the loader as attributes: `(** ... *)` before or after
//! a declaration becomes an `ocaml.doc` attribute on it, and a comment
//! standing on its own becomes an `ocaml.text` signature item. Parsing the
//! comment text is delegated to a [`DocParser`].

use super::LoadContext;
use crate::location::Location;
use crate::model::{Comment, CommentItem, Doc, DocElement, DocError, Identifier, Tag};
use crate::types::{Attribute, AttributePayload, Attributes};

/// Payload of the `(**/**)` marker.
const STOP_PAYLOAD: &str = "/*";

/// Turns the text of one doc comment into a structured comment.
pub trait DocParser {
    fn parse(&self, text: &str, loc: &Location) -> Result<Comment, DocError>;
}

/// A minimal comment parser: paragraphs, `{[ ... ]}` code blocks and
/// `@tag` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDocParser;

impl PlainDocParser {
    fn parse_tag(line: &str, loc: Location) -> Result<Tag, DocError> {
        let line = line.trim_start_matches('@');
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        let named = |make: fn(String, String) -> Tag| match arg.split_once(char::is_whitespace) {
            Some((target, text)) => Ok(make(target.to_string(), text.trim().to_string())),
            None if !arg.is_empty() => Ok(make(arg.to_string(), String::new())),
            None => Err(DocError {
                message: format!("@{} expects a name", name),
                location: loc.clone(),
            }),
        };
        let tag = match name {
            "author" => Tag::Author(arg.to_string()),
            "before" => named(Tag::Before)?,
            "param" => named(Tag::Param)?,
            "raise" | "raises" => named(Tag::Raise)?,
            "return" | "returns" => Tag::Return(arg.to_string()),
            "version" => Tag::Version(arg.to_string()),
            "canonical" if !arg.is_empty() => Tag::Canonical(arg.to_string()),
            "canonical" => {
                return Err(DocError {
                    message: "@canonical expects a path".to_string(),
                    location: loc,
                });
            }
            "deprecated" => Tag::Deprecated(arg.to_string()),
            "see" => Tag::See(arg.to_string()),
            "since" => Tag::Since(arg.to_string()),
            "inline" => Tag::Inline,
            "open" => Tag::Open,
            "closed" => Tag::Closed,
            _ => {
                return Err(DocError {
                    message: format!("unknown tag '@{}'", name),
                    location: loc,
                });
            }
        };
        Ok(tag)
    }
}

impl DocParser for PlainDocParser {
    fn parse(&self, text: &str, loc: &Location) -> Result<Comment, DocError> {
        let mut elements = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut code: Option<(usize, Vec<&str>)> = None;

        let flush = |paragraph: &mut Vec<&str>, elements: &mut Vec<DocElement>| {
            if !paragraph.is_empty() {
                elements.push(DocElement::Paragraph(paragraph.join(" ")));
                paragraph.clear();
            }
        };

        for (n, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if let Some((_, body)) = code.as_mut() {
                match trimmed.strip_suffix("]}") {
                    Some(last) => {
                        if !last.trim().is_empty() {
                            body.push(last.trim_end());
                        }
                        if let Some((_, body)) = code.take() {
                            elements.push(DocElement::CodeBlock(body.join("\n")));
                        }
                    }
                    None => body.push(line),
                }
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix("{[") {
                flush(&mut paragraph, &mut elements);
                match rest.trim_end().strip_suffix("]}") {
                    Some(inline) => elements.push(DocElement::CodeBlock(inline.trim().to_string())),
                    None => {
                        let first = rest.trim();
                        code = Some((n, if first.is_empty() { vec![] } else { vec![first] }));
                    }
                }
            } else if trimmed.starts_with('@') {
                flush(&mut paragraph, &mut elements);
                let tag = Self::parse_tag(trimmed, loc.nth_line(n))?;
                elements.push(DocElement::Tag(tag));
            } else if trimmed.is_empty() {
                flush(&mut paragraph, &mut elements);
            } else {
                paragraph.push(trimmed);
            }
        }

        if let Some((start, _)) = code {
            return Err(DocError {
                message: "unterminated code block".to_string(),
                location: loc.nth_line(start),
            });
        }
        flush(&mut paragraph, &mut elements);
        Ok(Comment { elements })
    }
}

fn payload_text(attr: &Attribute) -> Option<&str> {
    match &attr.attr_payload {
        AttributePayload::Str(s) => Some(s),
        _ => None,
    }
}

fn parse(cx: &LoadContext<'_>, text: &str, loc: &Location, target: &dyn std::fmt::Display) -> Doc {
    match cx.docs.parse(text, loc) {
        Ok(comment) => Doc::Parsed(comment),
        Err(err) => {
            log::warn!("Keeping unparsable documentation of {}: {}", target, err);
            Doc::Failed(err)
        }
    }
}

/// Documentation attached to the declaration `id`.
///
/// Several doc attributes are concatenated in order.
pub fn read_doc(cx: &LoadContext<'_>, id: &Identifier, attrs: &Attributes) -> Doc {
    attrs
        .iter()
        .filter(|attr| cx.config.is_doc_attribute(attr.name()))
        .filter_map(|attr| match payload_text(attr) {
            Some(text) => Some(parse(cx, text, &attr.attr_loc, id)),
            None => {
                log::trace!("Ignoring non-string doc attribute on {}", id);
                None
            }
        })
        .fold(Doc::Absent, Doc::append)
}

/// Documentation of something without an identifier of its own, such as a
/// polymorphic variant tag.
pub fn read_anonymous_doc(cx: &LoadContext<'_>, name: &str, attrs: &Attributes) -> Doc {
    attrs
        .iter()
        .filter(|attr| cx.config.is_doc_attribute(attr.name()))
        .filter_map(|attr| payload_text(attr).map(|text| parse(cx, text, &attr.attr_loc, &name)))
        .fold(Doc::Absent, Doc::append)
}

/// A standalone comment, if `attr` is one.
pub fn read_standalone(cx: &LoadContext<'_>, attr: &Attribute) -> Option<CommentItem> {
    if !cx.config.is_text_attribute(attr.name()) {
        return None;
    }
    let text = payload_text(attr)?;
    if text == STOP_PAYLOAD {
        return Some(CommentItem::Stop);
    }
    Some(CommentItem::Docs(parse(cx, text, &attr.attr_loc, &"standalone comment")))
}

/// Standalone comments carried by a declaration's attributes, in order.
pub fn read_standalone_comments(cx: &LoadContext<'_>, attrs: &Attributes) -> Vec<CommentItem> {
    attrs
        .iter()
        .filter_map(|attr| read_standalone(cx, attr))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn plain(text: &str) -> Result<Comment, DocError> {
        PlainDocParser.parse(text, &Location::in_file("a.mli"))
    }

    #[test]
    fn test_paragraphs() {
        let comment = plain("First line\ncontinued.\n\nSecond paragraph.").unwrap();
        assert_eq!(
            comment.elements,
            vec![
                DocElement::Paragraph("First line continued.".to_string()),
                DocElement::Paragraph("Second paragraph.".to_string()),
            ]
        );
    }

    #[test]
    fn test_code_blocks() {
        let comment = plain("Example:\n{[\n  let x = 1\n  let y = 2\n]}\n{[ f x ]}").unwrap();
        assert_eq!(comment.elements.len(), 3);
        assert_eq!(
            comment.elements[1],
            DocElement::CodeBlock("  let x = 1\n  let y = 2".to_string())
        );
        assert_eq!(comment.elements[2], DocElement::CodeBlock("f x".to_string()));
    }

    #[test]
    fn test_tags() {
        let comment = plain("Text.\n@since 1.2\n@canonical Lib.M\n@inline").unwrap();
        assert_eq!(
            comment.elements[1..],
            [
                DocElement::Tag(Tag::Since("1.2".to_string())),
                DocElement::Tag(Tag::Canonical("Lib.M".to_string())),
                DocElement::Tag(Tag::Inline),
            ]
        );
    }

    #[test]
    fn test_standard_tags() {
        let comment = plain(
            "Find a key.\n@param key the key\n@raise Not_found if absent\n@return the value\n\
             @version 2.0\n@before 3.0 took a list",
        )
        .unwrap();
        assert_eq!(
            comment.elements[1..],
            [
                DocElement::Tag(Tag::Param("key".to_string(), "the key".to_string())),
                DocElement::Tag(Tag::Raise("Not_found".to_string(), "if absent".to_string())),
                DocElement::Tag(Tag::Return("the value".to_string())),
                DocElement::Tag(Tag::Version("2.0".to_string())),
                DocElement::Tag(Tag::Before("3.0".to_string(), "took a list".to_string())),
            ]
        );

        let comment = plain("@param x").unwrap();
        assert_eq!(
            comment.elements,
            vec![DocElement::Tag(Tag::Param("x".to_string(), String::new()))]
        );
        assert!(plain("@param").is_err());
    }

    #[test]
    fn test_failures() {
        let err = plain("ok\n@frobnicate now").unwrap_err();
        assert!(err.message.contains("@frobnicate"));
        assert_eq!(err.location.start_line(), 2);

        let err = plain("{[ never closed").unwrap_err();
        assert_eq!(err.message, "unterminated code block");

        assert!(plain("@canonical").is_err());
    }

    #[test]
    fn test_read_doc_concatenates_and_keeps_failure() {
        with_context(|cx| {
            let root = root();
            let attrs = vec![doc_attr("One."), doc_attr("Two.")];
            let doc = read_doc(cx, &root, &attrs);
            assert_eq!(doc.comment().map(|c| c.elements.len()), Some(2));

            let attrs = vec![doc_attr("One."), doc_attr("@bogus"), doc_attr("Three.")];
            assert!(matches!(read_doc(cx, &root, &attrs), Doc::Failed(_)));

            assert!(read_doc(cx, &root, &vec![text_attr("standalone")]).is_absent());
        });
    }

    #[test]
    fn test_read_standalone() {
        with_context(|cx| {
            assert_eq!(read_standalone(cx, &text_attr("/*")), Some(CommentItem::Stop));
            assert!(matches!(
                read_standalone(cx, &text_attr("Section")),
                Some(CommentItem::Docs(Doc::Parsed(_)))
            ));
            assert_eq!(read_standalone(cx, &doc_attr("attached")), None);
        });
    }
}
