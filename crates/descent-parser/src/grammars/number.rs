//! A positive whole number: a sequence of decimal digits folded into a
//! numeric payload one digit at a time.

use crate::grammar::Grammar;
use crate::value::{use_sequence_result, Value, ValueData};
use std::any::Any;
use std::fmt;

/// The numeric payload built while digits are consumed.
pub struct NumberValue {
    value: i64,
}

impl NumberValue {
    pub fn value(&self) -> i64 {
        self.value
    }
}

impl ValueData for NumberValue {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "number {}", self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `add_char` callback appending a decimal digit.
pub fn add_digit(prev: &Value, ch: u8) -> Option<Value> {
    let so_far = prev.downcast_ref::<NumberValue>().map_or(0, |n| n.value);
    Some(Value::new(NumberValue {
        value: so_far.wrapping_mul(10).wrapping_add(i64::from(ch - b'0')),
    }))
}

pub fn grammar(grammar: &mut Grammar) {
    grammar.define("number", |nt| {
        nt.rule(|r| {
            r.charset(|s| {
                s.add_range(b'0', b'9');
            })
            .add_char(add_digit)
            .sequence()
            .add_seq(use_sequence_result);
        });
    });
}
