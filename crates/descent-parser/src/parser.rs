//! The back-tracking interpreter that drives a grammar over a text
//! buffer.
//!
//! Four mutually recursive functions do all the work. `parse_nt`
//! consults the cache and tries a non-terminal's rules, then iterates
//! its left-recursive rules. `parse_rule` walks an element chain,
//! handling the optional/avoid orderings and sequences. `parse_seq`
//! enumerates sequence lengths for back-tracking sequences.
//! `parse_element` dispatches on the element kind and applies the
//! element's callbacks. Every failing function restores the buffer
//! position it was entered with, so an abandoned alternative leaves no
//! trace beyond the expectation tracker.

use crate::cache::{CacheOutcome, ParseCache};
use crate::error::ParseError;
use crate::expect::{ExpectReport, Expectations, Frame};
use crate::grammar::{Element, ElementKind, Grammar, NtId, Rule};
use crate::limit::LimitTracker;
use crate::text::TextBuffer;
use crate::value::Value;
use log::trace;
use std::rc::Rc;

const DEFAULT_RECURSION_LIMIT: usize = 4_096;

/// Parses a text buffer against a [`Grammar`].
///
/// ## Example
///
/// ```
/// use descent_parser::grammar::Grammar;
/// use descent_parser::{Parser, TextBuffer};
///
/// let mut grammar = Grammar::new();
/// grammar.define("ab", |nt| {
///     nt.rule(|r| {
///         r.ch(b'a');
///         r.ch(b'b').sequence();
///     });
/// });
///
/// let mut parser = Parser::new(&grammar, TextBuffer::new("abbb"));
/// let result = parser.parse("ab").unwrap();
/// assert!(result.is_none()); // no callbacks, no result
/// ```
pub struct Parser<'g, 'i> {
    grammar: &'g Grammar,
    text: TextBuffer<'i>,
    cache: Option<Box<dyn ParseCache>>,
    stack: Option<Rc<Frame<'g>>>,
    expectations: Expectations<'g>,
    recursion: LimitTracker,
    /// Whether some branch of the current parse was cut short by the
    /// recursion budget. Only consulted when the parse comes back
    /// incomplete; a branch that overran and was then abandoned for a
    /// successful alternative leaves no trace in the result.
    limited: bool,
}

impl<'g, 'i> Parser<'g, 'i> {
    pub fn new(grammar: &'g Grammar, text: TextBuffer<'i>) -> Self {
        Parser {
            grammar,
            text,
            cache: None,
            stack: None,
            expectations: Expectations::new(),
            recursion: LimitTracker::new(DEFAULT_RECURSION_LIMIT),
            limited: false,
        }
    }

    /// Memoize non-terminal outcomes in `cache`.
    pub fn with_cache(mut self, cache: impl ParseCache + 'static) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    /// Configure the non-terminal recursion limit.
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion = LimitTracker::new(limit);
        self
    }

    /// The text buffer, for inspecting the cursor position.
    pub fn text(&self) -> &TextBuffer<'i> {
        &self.text
    }

    /// High-water mark of the recursion budget.
    pub fn recursion_usage(&self) -> LimitTracker {
        self.recursion
    }

    /// Parse the complete input as non-terminal `name`.
    ///
    /// A recursion-limit error is reported only when the parse did not
    /// come back complete: an overrun inside an alternative that was
    /// later abandoned is forgotten once another alternative matches
    /// the whole input.
    pub fn parse(&mut self, name: &str) -> Result<Value, ParseError> {
        let Some(id) = self.grammar.lookup(name) else {
            return Err(ParseError::UnknownNonTerminal(name.to_owned()));
        };
        self.limited = false;
        match self.parse_nt(id) {
            Some(value) if self.text.at_end() => Ok(value),
            // The parse failed or stopped short; if the budget ran out
            // along the way, the outcome cannot be trusted and the
            // overrun is the error to report.
            _ if self.limited => Err(ParseError::RecursionLimitReached {
                limit: self.recursion.limit,
            }),
            Some(_) => Err(ParseError::TrailingInput {
                position: self.text.position(),
                report: self.expect_report(),
            }),
            None => Err(ParseError::Unexpected {
                report: self.expect_report(),
            }),
        }
    }

    /// Parse non-terminal `name` at the current position, advancing the
    /// cursor on success. Returns `None` on mismatch; the cursor is
    /// then unchanged. Use this to parse a prefix or to resume after a
    /// previous call.
    pub fn parse_non_terminal(&mut self, name: &str) -> Option<Value> {
        let id = self.grammar.lookup(name)?;
        self.parse_nt(id)
    }

    /// The expectations collected at the deepest position reached so
    /// far.
    pub fn expect_report(&self) -> ExpectReport {
        self.expectations.report(self.grammar)
    }

    fn parse_nt(&mut self, id: NtId) -> Option<Value> {
        let grammar = self.grammar;
        let nt = grammar.nt(id);
        let start = self.text.position();
        trace!("enter {} at {start}", nt.name());

        if let Some(cache) = self.cache.as_mut() {
            match cache.lookup(start.offset, id) {
                CacheOutcome::Success(value, next) => {
                    trace!("cache success {} at {start}", nt.name());
                    self.text.set_position(&next);
                    return Some(value);
                }
                CacheOutcome::Fail => {
                    trace!("cache fail {} at {start}", nt.name());
                    return None;
                }
                CacheOutcome::FirstVisit => {}
            }
        }

        if !self.recursion.enter() {
            self.limited = true;
            return None;
        }

        let parent = self.stack.take();
        self.stack = Some(Rc::new(Frame {
            name: nt.name(),
            pos: start,
            parent,
        }));

        let mut matched = None;
        for rule in &nt.normal {
            if let Some(value) = self.parse_rule(&rule.elements, &Value::none(), Some(rule)) {
                matched = Some(value);
                break;
            }
        }

        let Some(mut result) = matched else {
            trace!("fail {} at {start}", nt.name());
            self.pop_frame();
            self.recursion.exit();
            return None;
        };

        // A normal rule matched; keep folding left-recursive rules over
        // the result until a full pass matches none of them.
        loop {
            let mut extended = false;
            for rule in &nt.recursive {
                let start_result = match rule.rec_start {
                    Some(rec_start) => match rec_start(&result) {
                        Some(value) => value,
                        None => continue,
                    },
                    None => Value::none(),
                };
                if let Some(value) = self.parse_rule(&rule.elements, &start_result, Some(rule)) {
                    result = value;
                    extended = true;
                    break;
                }
            }
            if !extended {
                break;
            }
        }

        if let Some(cache) = self.cache.as_mut() {
            cache.store(start.offset, id, result.clone(), self.text.position());
        }
        trace!("leave {} = {result}", nt.name());
        self.pop_frame();
        self.recursion.exit();
        Some(result)
    }

    fn pop_frame(&mut self) {
        let current = self.stack.take();
        self.stack = current.and_then(|frame| frame.parent.clone());
    }

    /// Parse the remainder of a rule. `rule` carries the end callback
    /// to run when the chain is exhausted; it is `None` for chain
    /// rules.
    fn parse_rule(
        &mut self,
        elements: &'g [Element],
        prev: &Value,
        rule: Option<&'g Rule>,
    ) -> Option<Value> {
        let Some((element, rest)) = elements.split_first() else {
            return match rule.and_then(|rule| rule.end.as_ref()) {
                Some(end) => end(prev),
                None => Some(prev.clone()),
            };
        };

        // An optional element marked avoid: try the rest of the rule
        // without it first.
        if element.optional && element.avoid {
            let skipped = skipped_value(element, prev)?;
            if let Some(result) = self.parse_rule(rest, &skipped, rule) {
                return Some(result);
            }
        }

        let entry = self.text.position();

        if element.sequence {
            let seq_begin = match element.begin_seq {
                Some(begin_seq) => begin_seq(prev),
                None => Value::none(),
            };
            if let Some(first) = self.parse_element(element, &seq_begin) {
                let result = if element.back_tracking {
                    self.parse_seq(element, rest, &first, prev, rule)
                } else {
                    self.parse_greedy_seq(element, rest, first, prev, rule)
                };
                if let Some(result) = result {
                    return Some(result);
                }
            }
        } else if let Some(folded) = self.parse_element(element, prev) {
            if let Some(result) = self.parse_rule(rest, &folded, rule) {
                return Some(result);
            }
        }

        self.text.set_position(&entry);

        // An optional element without avoid: everything else failed, so
        // try the rest of the rule with the element skipped.
        if element.optional && !element.avoid {
            let skipped = skipped_value(element, prev)?;
            if let Some(result) = self.parse_rule(rest, &skipped, rule) {
                return Some(result);
            }
        }

        None
    }

    /// Greedily extend a sequence, then hand the accumulator to the
    /// rest of the rule. With avoid, termination is attempted before
    /// every extension instead.
    fn parse_greedy_seq(
        &mut self,
        element: &'g Element,
        rest: &'g [Element],
        mut seq: Value,
        prev: &Value,
        rule: Option<&'g Rule>,
    ) -> Option<Value> {
        loop {
            if element.avoid {
                match fold_sequence(element, prev, &seq) {
                    Some(folded) => {
                        if let Some(result) = self.parse_rule(rest, &folded, rule) {
                            return Some(result);
                        }
                    }
                    None => break,
                }
            }

            let before = self.text.position();
            if !element.chain.is_empty()
                && self.parse_rule(&element.chain, &Value::none(), None).is_none()
            {
                break;
            }
            match self.parse_element(element, &seq) {
                Some(extended) => seq = extended,
                None => {
                    // The chain may have consumed input.
                    self.text.set_position(&before);
                    break;
                }
            }
        }

        let folded = fold_sequence(element, prev, &seq)?;
        self.parse_rule(rest, &folded, rule)
    }

    /// Enumerate sequence lengths for a back-tracking sequence: commit
    /// to one more element, recurse, and fall back to terminating the
    /// sequence when the longer parse fails (the other way around with
    /// avoid).
    fn parse_seq(
        &mut self,
        element: &'g Element,
        rest: &'g [Element],
        seq: &Value,
        prev: &Value,
        rule: Option<&'g Rule>,
    ) -> Option<Value> {
        if element.avoid {
            let folded = fold_sequence(element, prev, seq)?;
            if let Some(result) = self.parse_rule(rest, &folded, rule) {
                return Some(result);
            }
        }

        let entry = self.text.position();
        let chain_ok = element.chain.is_empty()
            || self.parse_rule(&element.chain, &Value::none(), None).is_some();
        if chain_ok {
            if let Some(extended) = self.parse_element(element, seq) {
                if let Some(result) = self.parse_seq(element, rest, &extended, prev, rule) {
                    return Some(result);
                }
            }
        }
        self.text.set_position(&entry);

        if !element.avoid {
            let folded = fold_sequence(element, prev, seq)?;
            if let Some(result) = self.parse_rule(rest, &folded, rule) {
                return Some(result);
            }
        }

        None
    }

    /// Parse one element, ignoring its optional/sequence modifiers.
    /// On failure the cursor is back at the entry position.
    fn parse_element(&mut self, element: &'g Element, prev: &Value) -> Option<Value> {
        let entry = self.text.position();
        match self.parse_element_kind(element, prev) {
            Some(mut value) => {
                if let Some(set_pos) = element.set_pos {
                    set_pos(&mut value, entry);
                }
                Some(value)
            }
            None => {
                self.text.set_position(&entry);
                None
            }
        }
    }

    fn parse_element_kind(&mut self, element: &'g Element, prev: &Value) -> Option<Value> {
        match &element.kind {
            ElementKind::NonTerminal(id) => {
                let nt_result = self.parse_nt(*id)?;
                if let Some(condition) = &element.condition {
                    if !condition(&nt_result) {
                        return None;
                    }
                }
                match element.add {
                    Some(add) => add(prev, &nt_result),
                    None => Some(prev.clone()),
                }
            }
            ElementKind::Group(rules) => {
                // Each alternative starts from the previous result and
                // runs its own end callback.
                let mut matched = None;
                for rule in rules {
                    let start = prev.clone();
                    if let Some(value) = self.parse_rule(&rule.elements, &start, Some(rule)) {
                        matched = Some(value);
                        break;
                    }
                }
                let group_result = matched?;
                match element.add {
                    Some(add) => add(prev, &group_result),
                    None => Some(group_result),
                }
            }
            ElementKind::End => {
                if !self.text.at_end() {
                    self.expect_failed(element);
                    return None;
                }
                Some(prev.clone())
            }
            ElementKind::Char(b) => {
                if self.text.current() != Some(*b) {
                    self.expect_failed(element);
                    return None;
                }
                self.text.next();
                match element.add_char {
                    Some(add_char) => add_char(prev, *b),
                    None => Some(prev.clone()),
                }
            }
            ElementKind::CharSet(set) => {
                let matched = self.text.current().filter(|b| set.contains(*b));
                let Some(b) = matched else {
                    self.expect_failed(element);
                    return None;
                };
                self.text.next();
                match element.add_char {
                    Some(add_char) => add_char(prev, b),
                    None => Some(prev.clone()),
                }
            }
            ElementKind::Terminal(terminal) => {
                match terminal(self.text.remaining()) {
                    Some((consumed, value)) if consumed > 0 => {
                        // Advance byte by byte to keep line and column
                        // tracking true.
                        for _ in 0..consumed {
                            self.text.next();
                        }
                        Some(value)
                    }
                    _ => {
                        self.expect_failed(element);
                        None
                    }
                }
            }
        }
    }

    fn expect_failed(&mut self, element: &'g Element) {
        let pos = self.text.position();
        self.expectations.record(pos, &self.stack, element);
    }
}

fn skipped_value(element: &Element, prev: &Value) -> Option<Value> {
    if let Some(add_skip) = element.add_skip {
        add_skip(prev)
    } else if let Some(add) = element.add {
        add(prev, &Value::none())
    } else {
        Some(prev.clone())
    }
}

fn fold_sequence(element: &Element, prev: &Value, seq: &Value) -> Option<Value> {
    match element.add_seq {
        Some(add_seq) => add_seq(prev, seq),
        None => Some(prev.clone()),
    }
}
