//! Tracking of the deepest failure position and the terminal elements
//! that were expected there.
//!
//! The tracker runs beside result assembly and costs nothing on the
//! success path. Whenever a terminal element (character, character
//! set, end of input, user terminal) fails to match, the failure is
//! recorded together with a snapshot of the non-terminal call stack:
//! failures before the deepest position seen so far are ignored, a
//! failure past it resets the set, and failures at it are deduplicated
//! on stack and element identity. After a failed parse the collected
//! set renders into the report a user sees.

use crate::grammar::{print::element_description, Element, Grammar};
use crate::text::TextPosition;
use std::fmt;
use std::rc::Rc;

/// One frame of the non-terminal call stack, linked towards the root.
pub(crate) struct Frame<'g> {
    pub(crate) name: &'g str,
    pub(crate) pos: TextPosition,
    pub(crate) parent: Option<Rc<Frame<'g>>>,
}

struct Expectation<'g> {
    stack: Option<Rc<Frame<'g>>>,
    element: &'g Element,
}

/// Upper bound on recorded expectations at one position.
const MAX_EXPECTATIONS: usize = 200;

pub(crate) struct Expectations<'g> {
    highest: TextPosition,
    entries: Vec<Expectation<'g>>,
}

fn same_stack(a: &Option<Rc<Frame<'_>>>, b: &Option<Rc<Frame<'_>>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

impl<'g> Expectations<'g> {
    pub(crate) fn new() -> Self {
        Expectations {
            highest: TextPosition::start(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn record(
        &mut self,
        pos: TextPosition,
        stack: &Option<Rc<Frame<'g>>>,
        element: &'g Element,
    ) {
        if pos.offset < self.highest.offset {
            return;
        }
        if pos.offset > self.highest.offset {
            self.highest = pos;
            self.entries.clear();
        }
        let seen = self.entries.iter().any(|entry| {
            same_stack(&entry.stack, stack) && std::ptr::eq(entry.element, element)
        });
        if seen || self.entries.len() >= MAX_EXPECTATIONS {
            return;
        }
        self.entries.push(Expectation {
            stack: stack.clone(),
            element,
        });
    }

    /// Materialize the collected set into an owned, printable report.
    pub(crate) fn report(&self, grammar: &Grammar) -> ExpectReport {
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                let mut stack = Vec::new();
                let mut frame = entry.stack.as_deref();
                while let Some(cur) = frame {
                    stack.push((cur.name.to_owned(), cur.pos));
                    frame = cur.parent.as_deref();
                }
                ReportEntry {
                    expecting: element_description(grammar, entry.element),
                    stack,
                }
            })
            .collect();
        ExpectReport {
            position: self.highest,
            entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReportEntry {
    expecting: String,
    /// Non-terminal names with entry positions, innermost first.
    stack: Vec<(String, TextPosition)>,
}

/// What the parser expected at the deepest position it reached.
///
/// Rendered via [`Display`][fmt::Display]:
///
/// ```text
/// Expect at 1.5:
/// - expect ';'
///   in statement at 1.1
///   in root at 1.1
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectReport {
    /// The deepest position reached.
    pub position: TextPosition,
    entries: Vec<ReportEntry>,
}

impl ExpectReport {
    /// Descriptions of the expected elements, in recording order.
    pub fn expected(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.expecting.as_str())
    }
}

impl fmt::Display for ExpectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Expect at {}:", self.position)?;
        for entry in &self.entries {
            writeln!(f, "- expect {}", entry.expecting)?;
            for (name, pos) in &entry.stack {
                writeln!(f, "  in {name} at {pos}")?;
            }
        }
        Ok(())
    }
}
