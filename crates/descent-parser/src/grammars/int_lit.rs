//! C-style integer literals: signed decimal, octal (`0...`), and
//! hexadecimal (`0x...`), with an optional `U`/`L`/`L` suffix.
//!
//! One `add_char` callback implements a small state machine over the
//! incoming bytes; the grammar only decides which characters may
//! arrive. Overflow wraps silently.

use crate::grammar::Grammar;
use crate::text::TextPosition;
use crate::value::{pass_to_sequence, use_sequence_result, Value, ValueData};
use std::any::Any;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing seen, or only the sign.
    Start,
    /// A leading zero; `x` switches to hex, octal digits continue.
    AfterZero,
    /// Inside hexadecimal digits.
    Hex,
    /// Inside octal digits.
    Octal,
    /// Inside decimal digits.
    Decimal,
}

/// Accumulator for the integer state machine.
#[derive(Clone, Copy)]
struct IntAccum {
    value: i64,
    sign: i64,
    state: State,
    pos: Option<TextPosition>,
}

impl IntAccum {
    fn start() -> Self {
        IntAccum {
            value: 0,
            sign: 1,
            state: State::Start,
            pos: None,
        }
    }
}

impl ValueData for IntAccum {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "int {}", self.sign.wrapping_mul(self.value))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The single `add_char` callback behind every digit element of the
/// `int` grammar.
pub fn int_add_char(prev: &Value, ch: u8) -> Option<Value> {
    let mut accum = prev
        .downcast_ref::<IntAccum>()
        .copied()
        .unwrap_or_else(IntAccum::start);

    match accum.state {
        State::Start => match ch {
            b'-' => accum.sign = -1,
            b'0' => accum.state = State::AfterZero,
            b'1'..=b'9' => {
                accum.value = i64::from(ch - b'0');
                accum.state = State::Decimal;
            }
            _ => return None,
        },
        State::AfterZero => match ch {
            b'x' => accum.state = State::Hex,
            b'0'..=b'7' => {
                accum.value = i64::from(ch - b'0');
                accum.state = State::Octal;
            }
            _ => return None,
        },
        State::Hex => {
            let digit = match ch {
                b'0'..=b'9' => i64::from(ch - b'0'),
                b'A'..=b'F' => i64::from(ch - b'A') + 10,
                b'a'..=b'f' => i64::from(ch - b'a') + 10,
                _ => return None,
            };
            accum.value = accum.value.wrapping_mul(16).wrapping_add(digit);
        }
        State::Octal => match ch {
            b'0'..=b'7' => {
                accum.value = accum.value.wrapping_mul(8).wrapping_add(i64::from(ch - b'0'));
            }
            _ => return None,
        },
        State::Decimal => match ch {
            b'0'..=b'9' => {
                accum.value = accum.value.wrapping_mul(10).wrapping_add(i64::from(ch - b'0'));
            }
            _ => return None,
        },
    }
    Some(Value::new(accum))
}

/// `set_pos` callback recording the literal's start once.
pub fn int_set_pos(value: &mut Value, pos: TextPosition) {
    if let Some(accum) = value.downcast_ref::<IntAccum>() {
        if accum.pos.is_none() {
            let mut updated = *accum;
            updated.pos = Some(pos);
            *value = Value::new(updated);
        }
    }
}

/// A parsed integer literal.
pub struct IntNode {
    value: i64,
    pos: TextPosition,
}

impl IntNode {
    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn position(&self) -> TextPosition {
        self.pos
    }
}

impl ValueData for IntNode {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "int {}", self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Rule end callback applying the sign and building an [`IntNode`].
pub fn create_int_node(rule_result: &Value) -> Option<Value> {
    let accum = rule_result.downcast_ref::<IntAccum>()?;
    Some(Value::new(IntNode {
        value: accum.sign.wrapping_mul(accum.value),
        pos: accum.pos.unwrap_or_default(),
    }))
}

pub fn grammar(grammar: &mut Grammar) {
    grammar.define("int", |nt| {
        nt.rule(|r| {
            r.ch(b'-')
                .add_char(int_add_char)
                .optional()
                .set_pos(int_set_pos);
            r.group(|alt| {
                // Hexadecimal representation.
                alt.rule(|r| {
                    r.ch(b'0').add_char(int_add_char).set_pos(int_set_pos);
                    r.ch(b'x').add_char(int_add_char);
                    r.charset(|s| {
                        s.add_range(b'0', b'9')
                            .add_range(b'A', b'F')
                            .add_range(b'a', b'f');
                    })
                    .add_char(int_add_char)
                    .sequence()
                    .begin_seq(pass_to_sequence)
                    .add_seq(use_sequence_result);
                });
                // Octal representation.
                alt.rule(|r| {
                    r.ch(b'0').add_char(int_add_char).set_pos(int_set_pos);
                    r.charset(|s| {
                        s.add_range(b'0', b'7');
                    })
                    .add_char(int_add_char)
                    .sequence()
                    .begin_seq(pass_to_sequence)
                    .add_seq(use_sequence_result)
                    .optional();
                });
                // Decimal representation.
                alt.rule(|r| {
                    r.charset(|s| {
                        s.add_range(b'1', b'9');
                    })
                    .add_char(int_add_char)
                    .set_pos(int_set_pos);
                    r.charset(|s| {
                        s.add_range(b'0', b'9');
                    })
                    .add_char(int_add_char)
                    .sequence()
                    .begin_seq(pass_to_sequence)
                    .add_seq(use_sequence_result)
                    .optional();
                });
            });
            r.ch(b'U').optional();
            r.ch(b'L').optional();
            r.ch(b'L').optional();
            r.end(create_int_node);
        });
    });
}

#[cfg(test)]
mod test {
    use super::IntNode;
    use crate::grammars::int_lit;
    use crate::{DenseCache, Grammar, Parser, TextBuffer};

    fn parse_int(input: &str) -> Option<i64> {
        let mut grammar = Grammar::new();
        int_lit::grammar(&mut grammar);
        let text = TextBuffer::new(input);
        let mut parser =
            Parser::new(&grammar, text).with_cache(DenseCache::new(input.len()));
        let value = parser.parse("int").ok()?;
        Some(value.downcast_ref::<IntNode>()?.value())
    }

    #[test]
    fn decimal() {
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("1"), Some(1));
        assert_eq!(parse_int("46464664"), Some(46464664));
    }

    #[test]
    fn negative() {
        assert_eq!(parse_int("-1"), Some(-1));
        assert_eq!(parse_int("-23"), Some(-23));
    }

    #[test]
    fn octal() {
        assert_eq!(parse_int("077"), Some(0o77));
        assert_eq!(parse_int("010"), Some(8));
    }

    #[test]
    fn hexadecimal() {
        assert_eq!(parse_int("0xAbc"), Some(0xABC));
        assert_eq!(parse_int("0xff"), Some(255));
    }

    #[test]
    fn suffixes() {
        assert_eq!(parse_int("1234L"), Some(1234));
        assert_eq!(parse_int("7UL"), Some(7));
        assert_eq!(parse_int("1ULL"), Some(1));
    }

    #[test]
    fn rejects_malformed_literals() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("12x"), None);
    }

    #[test]
    fn position_starts_at_the_sign() {
        let mut grammar = Grammar::new();
        int_lit::grammar(&mut grammar);
        let mut parser = Parser::new(&grammar, TextBuffer::new("-42"));
        let value = parser.parse("int").unwrap();
        let node = value.downcast_ref::<IntNode>().unwrap();
        assert_eq!(node.position().column, 1);
    }
}
