//! Identifiers: a letter or underscore followed by letters, digits,
//! and underscores, interned at rule end with the keyword state of the
//! moment.
//!
//! Only the first 64 bytes of an identifier are significant; further
//! bytes still match but do not reach the interner.

use crate::grammar::Grammar;
use crate::intern::{Interner, Symbol};
use crate::text::TextPosition;
use crate::value::{pass_to_sequence, use_sequence_result, Value, ValueData};
use std::any::Any;
use std::fmt;

const SIGNIFICANT_BYTES: usize = 64;

/// Accumulator for the matched identifier bytes.
struct IdentAccum {
    text: String,
    pos: TextPosition,
}

impl ValueData for IdentAccum {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ident \"{}\"", self.text)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `add_char` callback growing the identifier, ignoring bytes past the
/// significant prefix.
pub fn ident_add_char(prev: &Value, ch: u8) -> Option<Value> {
    let accum = match prev.downcast_ref::<IdentAccum>() {
        None => IdentAccum {
            text: String::from(ch as char),
            pos: TextPosition::default(),
        },
        Some(accum) => {
            let mut text = accum.text.clone();
            if text.len() < SIGNIFICANT_BYTES {
                text.push(ch as char);
            }
            IdentAccum {
                text,
                pos: accum.pos,
            }
        }
    };
    Some(Value::new(accum))
}

/// `set_pos` callback recording where the identifier started.
pub fn ident_set_pos(value: &mut Value, pos: TextPosition) {
    if let Some(accum) = value.downcast_ref::<IdentAccum>() {
        *value = Value::new(IdentAccum {
            text: accum.text.clone(),
            pos,
        });
    }
}

/// An interned identifier with its start position and whether it was a
/// keyword when the rule finished.
pub struct IdentNode {
    name: Symbol,
    pos: TextPosition,
    keyword: bool,
}

impl IdentNode {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn symbol(&self) -> &Symbol {
        &self.name
    }

    pub fn position(&self) -> TextPosition {
        self.pos
    }

    pub fn is_keyword(&self) -> bool {
        self.keyword
    }
}

impl ValueData for IdentNode {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Rule end callback interning the accumulated identifier.
pub fn create_ident(interner: Interner) -> impl Fn(&Value) -> Option<Value> {
    move |rule_result| {
        let accum = rule_result.downcast_ref::<IdentAccum>()?;
        let name = interner.intern(&accum.text);
        let keyword = name.is_keyword();
        Some(Value::new(IdentNode {
            name,
            pos: accum.pos,
            keyword,
        }))
    }
}

/// Condition callback accepting only identifiers that are not
/// keywords.
pub fn not_a_keyword(value: &Value) -> bool {
    value
        .downcast_ref::<IdentNode>()
        .is_some_and(|ident| !ident.is_keyword())
}

pub fn grammar(grammar: &mut Grammar, interner: &Interner) {
    let interner = interner.clone();
    grammar.define("ident", |nt| {
        nt.rule(|r| {
            r.charset(|s| {
                s.add_range(b'a', b'z').add_range(b'A', b'Z').add(b'_');
            })
            .add_char(ident_add_char)
            .set_pos(ident_set_pos);
            r.charset(|s| {
                s.add_range(b'a', b'z')
                    .add_range(b'A', b'Z')
                    .add(b'_')
                    .add_range(b'0', b'9');
            })
            .add_char(ident_add_char)
            .sequence()
            .begin_seq(pass_to_sequence)
            .add_seq(use_sequence_result)
            .optional();
            r.end(create_ident(interner));
        });
    });
}
