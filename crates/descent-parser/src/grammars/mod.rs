//! Sample grammars exercising the engine, with the result builders
//! they assemble their output with.
//!
//! Each module exposes a `grammar` function that installs its
//! non-terminals into a [`Grammar`][crate::grammar::Grammar]. Grammars
//! compose by sharing one dictionary: the string literal grammar, for
//! example, chains its literals on the `white_space` non-terminal, so
//! a complete parser installs [`white_space::grammar`] beside
//! [`string_lit::grammar`]. The [`c`] module wires everything into a
//! grammar for a subset of C.

pub mod c;
pub mod char_lit;
pub mod ident;
pub mod int_lit;
pub mod number;
pub mod string_lit;
pub mod white_space;

use std::fmt;

/// Write a byte the way it would appear in a literal, escaping the
/// quote, backslash, NUL, and newline.
pub(crate) fn fmt_literal_byte(f: &mut fmt::Formatter<'_>, b: u8) -> fmt::Result {
    match b {
        0 => f.write_str("\\0"),
        b'\'' => f.write_str("\\'"),
        b'\n' => f.write_str("\\n"),
        b'\\' => f.write_str("\\\\"),
        b => write!(f, "{}", b as char),
    }
}
