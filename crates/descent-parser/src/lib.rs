#![doc = include_str!("../README.md")]

mod cache;
mod error;
mod expect;
pub mod grammar;
mod intern;
mod limit;
mod parser;
mod text;
pub mod tree;
mod value;

pub mod grammars;

pub use crate::cache::{CacheOutcome, DenseCache, ParseCache};
pub use crate::error::ParseError;
pub use crate::expect::ExpectReport;
pub use crate::grammar::{CharSet, Grammar, NtId};
pub use crate::intern::{IdentEntry, Interner, Symbol};
pub use crate::limit::LimitTracker;
pub use crate::parser::Parser;
pub use crate::text::{TextBuffer, TextPosition};
pub use crate::value::{pass_to_sequence, use_sequence_result, Value, ValueData};
