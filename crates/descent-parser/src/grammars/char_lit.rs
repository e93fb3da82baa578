//! C-style character literals: `'c'`, with the usual backslash
//! escapes.

use crate::grammar::Grammar;
use crate::grammars::fmt_literal_byte;
use crate::text::TextPosition;
use crate::value::{Value, ValueData};
use std::any::Any;
use std::fmt;

/// Accumulator opened on the leading quote.
struct CharAccum {
    ch: u8,
    pos: TextPosition,
}

impl ValueData for CharAccum {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("char '")?;
        fmt_literal_byte(f, self.ch)?;
        f.write_str("'")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `set_pos` callback on the opening quote, starting the accumulator.
pub fn char_open(value: &mut Value, pos: TextPosition) {
    *value = Value::new(CharAccum { ch: 0, pos });
}

/// `add_char` callback storing a plain character.
pub fn normal_char(prev: &Value, ch: u8) -> Option<Value> {
    let accum = prev.downcast_ref::<CharAccum>()?;
    Some(Value::new(CharAccum {
        ch,
        pos: accum.pos,
    }))
}

/// `add_char` callback storing the character named by an escape.
pub fn escaped_char(prev: &Value, ch: u8) -> Option<Value> {
    normal_char(prev, unescape(ch))
}

pub(crate) fn unescape(ch: u8) -> u8 {
    match ch {
        b'0' => 0,
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0B,
        other => other,
    }
}

/// A parsed character literal.
pub struct CharNode {
    ch: u8,
    pos: TextPosition,
}

impl CharNode {
    pub fn ch(&self) -> u8 {
        self.ch
    }

    pub fn position(&self) -> TextPosition {
        self.pos
    }
}

impl ValueData for CharNode {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("char '")?;
        fmt_literal_byte(f, self.ch)?;
        f.write_str("'")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Rule end callback turning the accumulator into a [`CharNode`].
pub fn create_char_node(rule_result: &Value) -> Option<Value> {
    let accum = rule_result.downcast_ref::<CharAccum>()?;
    Some(Value::new(CharNode {
        ch: accum.ch,
        pos: accum.pos,
    }))
}

pub fn grammar(grammar: &mut Grammar) {
    grammar.define("char", |nt| {
        nt.rule(|r| {
            r.ch(b'\'').set_pos(char_open);
            r.group(|alt| {
                // Escaped character.
                alt.rule(|r| {
                    r.ch(b'\\');
                    r.charset(|s| {
                        s.add(b'0')
                            .add(b'"')
                            .add(b'\'')
                            .add(b'\\')
                            .add(b'a')
                            .add(b'b')
                            .add(b'f')
                            .add(b'n')
                            .add(b'r')
                            .add(b't')
                            .add(b'v');
                    })
                    .add_char(escaped_char);
                });
                // Normal character.
                alt.rule(|r| {
                    r.charset(|s| {
                        s.add_range(b' ', b'~').remove(b'\\').remove(b'\'');
                    })
                    .add_char(normal_char);
                });
            });
            r.ch(b'\'');
            r.end(create_char_node);
        });
    });
}

#[cfg(test)]
mod test {
    use super::CharNode;
    use crate::grammars::char_lit;
    use crate::{DenseCache, Grammar, Parser, TextBuffer};

    fn parse_char(input: &str) -> Option<u8> {
        let mut grammar = Grammar::new();
        char_lit::grammar(&mut grammar);
        let text = TextBuffer::new(input);
        let mut parser =
            Parser::new(&grammar, text).with_cache(DenseCache::new(input.len()));
        let value = parser.parse("char").ok()?;
        Some(value.downcast_ref::<CharNode>()?.ch())
    }

    #[test]
    fn plain_characters() {
        assert_eq!(parse_char("'c'"), Some(b'c'));
        assert_eq!(parse_char("' '"), Some(b' '));
    }

    #[test]
    fn escapes() {
        assert_eq!(parse_char("'\\0'"), Some(0));
        assert_eq!(parse_char("'\\''"), Some(b'\''));
        assert_eq!(parse_char("'\\\\'"), Some(b'\\'));
        assert_eq!(parse_char("'\\n'"), Some(b'\n'));
        assert_eq!(parse_char("'\\t'"), Some(b'\t'));
    }

    #[test]
    fn rejects_bare_quote_and_backslash() {
        assert_eq!(parse_char("'''"), None);
        assert_eq!(parse_char("'\\'"), None);
        assert_eq!(parse_char("'ab'"), None);
    }

    #[test]
    fn records_the_start_position() {
        let mut grammar = Grammar::new();
        char_lit::grammar(&mut grammar);
        let mut parser = Parser::new(&grammar, TextBuffer::new("'x'"));
        let value = parser.parse("char").unwrap();
        let node = value.downcast_ref::<CharNode>().unwrap();
        assert_eq!((node.position().line, node.position().column), (1, 1));
    }
}
