//! C-style string literals: `"..."` with escapes and octal `\NNN`
//! codes, where adjacent literals separated by white space concatenate
//! into one string.
//!
//! The parsed bytes carry an explicit length, so an embedded `\0` is a
//! real byte of the string, not a terminator.

use crate::grammar::Grammar;
use crate::grammars::{char_lit::unescape, fmt_literal_byte};
use crate::text::TextPosition;
use crate::value::{pass_to_sequence, use_sequence_result, Value, ValueData};
use std::any::Any;
use std::fmt;

/// Accumulator carrying the string bytes and the partial octal code.
struct StringAccum {
    bytes: Vec<u8>,
    octal: u8,
    pos: TextPosition,
}

impl ValueData for StringAccum {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("string accum")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `set_pos` callback on an opening quote. Only the first literal of a
/// concatenation opens the accumulator; later ones keep extending it.
pub fn string_open(value: &mut Value, pos: TextPosition) {
    if value.is_none() {
        *value = Value::new(StringAccum {
            bytes: Vec::new(),
            octal: 0,
            pos,
        });
    }
}

fn extend(prev: &Value, push: Option<u8>, octal: u8) -> Option<Value> {
    let accum = prev.downcast_ref::<StringAccum>()?;
    let mut bytes = accum.bytes.clone();
    if let Some(b) = push {
        bytes.push(b);
    }
    Some(Value::new(StringAccum {
        bytes,
        octal,
        pos: accum.pos,
    }))
}

/// `add_char` callback appending a plain byte.
pub fn add_normal_char(prev: &Value, ch: u8) -> Option<Value> {
    extend(prev, Some(ch), 0)
}

/// `add_char` callback appending the byte named by an escape.
pub fn add_escaped_char(prev: &Value, ch: u8) -> Option<Value> {
    extend(prev, Some(unescape(ch)), 0)
}

/// `add_char` callbacks assembling an octal `\NNN` code.
pub fn add_first_octal(prev: &Value, ch: u8) -> Option<Value> {
    extend(prev, None, (ch - b'0') << 6)
}

pub fn add_second_octal(prev: &Value, ch: u8) -> Option<Value> {
    let octal = prev.downcast_ref::<StringAccum>()?.octal;
    extend(prev, None, octal | (ch - b'0') << 3)
}

pub fn add_third_octal(prev: &Value, ch: u8) -> Option<Value> {
    let octal = prev.downcast_ref::<StringAccum>()?.octal;
    extend(prev, Some(octal | (ch - b'0')), 0)
}

/// A parsed string literal, possibly concatenated from several
/// adjacent literals.
pub struct StringNode {
    bytes: Vec<u8>,
    pos: TextPosition,
}

impl StringNode {
    /// The string contents. The length is explicit; embedded NUL bytes
    /// count.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn position(&self) -> TextPosition {
        self.pos
    }
}

impl ValueData for StringNode {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("string \"")?;
        for b in &self.bytes {
            fmt_literal_byte(f, *b)?;
        }
        f.write_str("\"")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Rule end callback turning the accumulator into a [`StringNode`].
pub fn create_string_node(rule_result: &Value) -> Option<Value> {
    let accum = rule_result.downcast_ref::<StringAccum>()?;
    Some(Value::new(StringNode {
        bytes: accum.bytes.clone(),
        pos: accum.pos,
    }))
}

/// Installs the `string` non-terminal. Expects a `white_space`
/// non-terminal beside it for the concatenation chain.
pub fn grammar(grammar: &mut Grammar) {
    grammar.define("string", |nt| {
        nt.rule(|r| {
            r.group(|alt| {
                alt.rule(|r| {
                    r.ch(b'"').set_pos(string_open);
                    r.group(|alt| {
                        // Octal code.
                        alt.rule(|r| {
                            r.ch(b'\\');
                            r.charset(|s| {
                                s.add(b'0').add(b'1');
                            })
                            .add_char(add_first_octal);
                            r.charset(|s| {
                                s.add_range(b'0', b'7');
                            })
                            .add_char(add_second_octal);
                            r.charset(|s| {
                                s.add_range(b'0', b'7');
                            })
                            .add_char(add_third_octal);
                        });
                        // Escaped character.
                        alt.rule(|r| {
                            r.ch(b'\\');
                            r.charset(|s| {
                                s.add(b'0')
                                    .add(b'\'')
                                    .add(b'"')
                                    .add(b'\\')
                                    .add(b'n')
                                    .add(b'r');
                            })
                            .add_char(add_escaped_char);
                        });
                        // Normal character.
                        alt.rule(|r| {
                            r.charset(|s| {
                                s.add_range(b' ', b'~').remove(b'\\').remove(b'"');
                            })
                            .add_char(add_normal_char);
                        });
                    })
                    .sequence()
                    .begin_seq(pass_to_sequence)
                    .add_seq(use_sequence_result)
                    .optional();
                    r.ch(b'"');
                });
            })
            .sequence()
            .begin_seq(pass_to_sequence)
            .add_seq(use_sequence_result)
            .chain(|c| {
                c.nt("white_space");
            });
            r.end(create_string_node);
        });
    });
}

#[cfg(test)]
mod test {
    use super::StringNode;
    use crate::grammars::{string_lit, white_space};
    use crate::{DenseCache, Grammar, Parser, TextBuffer};

    fn parse_string(input: &str) -> Option<Vec<u8>> {
        let mut grammar = Grammar::new();
        white_space::grammar(&mut grammar);
        string_lit::grammar(&mut grammar);
        let text = TextBuffer::new(input);
        let mut parser =
            Parser::new(&grammar, text).with_cache(DenseCache::new(input.len()));
        let value = parser.parse("string").ok()?;
        Some(value.downcast_ref::<StringNode>()?.as_bytes().to_vec())
    }

    #[test]
    fn plain_string() {
        assert_eq!(parse_string("\"abc\"").as_deref(), Some(&b"abc"[..]));
        assert_eq!(parse_string("\"\"").as_deref(), Some(&b""[..]));
    }

    #[test]
    fn escapes_and_octal_codes() {
        assert_eq!(parse_string("\"\\n\"").as_deref(), Some(&b"\n"[..]));
        assert_eq!(parse_string("\"\\'\"").as_deref(), Some(&b"'"[..]));
        assert_eq!(parse_string("\"\\101\"").as_deref(), Some(&b"A"[..]));
    }

    #[test]
    fn embedded_nul_keeps_the_length() {
        assert_eq!(parse_string("\"\\0\"").as_deref(), Some(&[0u8][..]));
    }

    #[test]
    fn adjacent_literals_concatenate() {
        assert_eq!(
            parse_string("\"abc\" /* */ \"def\"").as_deref(),
            Some(&b"abcdef"[..])
        );
        assert_eq!(
            parse_string("\"a\"\"b\"").as_deref(),
            Some(&b"ab"[..])
        );
    }

    #[test]
    fn unterminated_string_is_rejected() {
        assert_eq!(parse_string("\"abc"), None);
    }
}
