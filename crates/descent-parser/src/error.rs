use crate::expect::ExpectReport;
use crate::text::TextPosition;
use thiserror::Error;

/// Failure of a whole parse, as reported by [`Parser::parse`].
///
/// Rule mismatches inside the engine are not errors; they are the
/// ordinary mechanics of back-tracking and never surface. A
/// `ParseError` only exists when the top-level non-terminal could not
/// be matched against the complete input.
///
/// [`Parser::parse`]: crate::Parser::parse
#[derive(Debug, Error)]
pub enum ParseError {
    /// The requested start non-terminal does not exist in the grammar.
    #[error("no non-terminal named `{0}` in the grammar")]
    UnknownNonTerminal(String),

    /// The non-terminal recursion budget was exhausted, usually a sign
    /// of a malformed grammar.
    #[error("recursion limit of {limit} exceeded")]
    RecursionLimitReached { limit: usize },

    /// The start non-terminal did not match.
    #[error("{report}")]
    Unexpected { report: ExpectReport },

    /// The start non-terminal matched a prefix of the input.
    #[error("input not fully consumed at {position}\n{report}")]
    TrailingInput {
        position: TextPosition,
        report: ExpectReport,
    },
}
