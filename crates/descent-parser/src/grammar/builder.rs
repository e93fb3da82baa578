//! Closure-based builders for assembling a grammar graph in memory.
//!
//! ```
//! use descent_parser::grammar::Grammar;
//!
//! let mut grammar = Grammar::new();
//! grammar.define("digits", |nt| {
//!     nt.rule(|r| {
//!         r.charset(|s| {
//!             s.add_range(b'0', b'9');
//!         })
//!         .sequence();
//!     });
//! });
//! ```

use super::{
    AddCharFn, AddFn, AddSeqFn, AddSkipFn, BeginSeqFn, CharSet, Element, ElementKind, Grammar,
    NtId, RecStartFn, Rule, SetPosFn, TerminalFn,
};
use crate::value::Value;
use std::rc::Rc;

/// Adds rules to one non-terminal. Obtained from [`Grammar::define`].
pub struct NonTerminalBuilder<'g> {
    grammar: &'g mut Grammar,
    id: NtId,
}

impl<'g> NonTerminalBuilder<'g> {
    pub(super) fn new(grammar: &'g mut Grammar, id: NtId) -> Self {
        NonTerminalBuilder { grammar, id }
    }

    /// Append a rule to the normal rule list.
    pub fn rule(&mut self, build: impl FnOnce(&mut RuleBuilder)) -> &mut Self {
        let rule = build_rule(self.grammar, build);
        self.grammar.nt_mut(self.id).normal.push(rule);
        self
    }

    /// Append a rule to the left-recursive rule list. The rule is
    /// stored without the leading self-reference; set a
    /// [`rec_start`][RuleBuilder::rec_start] callback to fold the
    /// already-parsed left part into the rule's start result.
    pub fn recursive_rule(&mut self, build: impl FnOnce(&mut RuleBuilder)) -> &mut Self {
        let rule = build_rule(self.grammar, build);
        self.grammar.nt_mut(self.id).recursive.push(rule);
        self
    }
}

fn build_rule(grammar: &mut Grammar, build: impl FnOnce(&mut RuleBuilder)) -> Rule {
    let mut builder = RuleBuilder {
        grammar,
        rule: Rule::default(),
    };
    build(&mut builder);
    builder.rule
}

/// Appends elements to a rule and sets their modifiers and callbacks.
///
/// Element methods (`ch`, `charset`, `nt`, `group`, `end_of_input`,
/// `terminal`) append a new element; modifier and callback methods
/// apply to the element appended last.
pub struct RuleBuilder<'g> {
    grammar: &'g mut Grammar,
    rule: Rule,
}

impl RuleBuilder<'_> {
    fn push(&mut self, kind: ElementKind) -> &mut Self {
        self.rule.elements.push(Element::new(kind));
        self
    }

    fn last(&mut self) -> &mut Element {
        self.rule
            .elements
            .last_mut()
            .expect("modifier applied before any element was added")
    }

    /// Append a literal byte element.
    pub fn ch(&mut self, b: u8) -> &mut Self {
        self.push(ElementKind::Char(b))
    }

    /// Append a character-set element.
    pub fn charset(&mut self, build: impl FnOnce(&mut CharSet)) -> &mut Self {
        let mut set = CharSet::new();
        build(&mut set);
        self.push(ElementKind::CharSet(set))
    }

    /// Append a reference to a non-terminal, creating it if needed.
    pub fn nt(&mut self, name: &str) -> &mut Self {
        let id = self.grammar.non_terminal(name);
        self.push(ElementKind::NonTerminal(id))
    }

    /// Append an end-of-input element.
    pub fn end_of_input(&mut self) -> &mut Self {
        self.push(ElementKind::End)
    }

    /// Append a user terminal element.
    pub fn terminal(&mut self, f: TerminalFn) -> &mut Self {
        self.push(ElementKind::Terminal(f))
    }

    /// Append a grouping of nested alternative rules.
    pub fn group(&mut self, build: impl FnOnce(&mut GroupBuilder)) -> &mut Self {
        let mut group = GroupBuilder {
            grammar: &mut *self.grammar,
            rules: Vec::new(),
        };
        build(&mut group);
        let rules = group.rules;
        self.push(ElementKind::Group(rules))
    }

    /// Make the last element optional.
    pub fn optional(&mut self) -> &mut Self {
        self.last().optional = true;
        self
    }

    /// Make the last element a sequence (one or more repetitions).
    pub fn sequence(&mut self) -> &mut Self {
        self.last().sequence = true;
        self
    }

    /// Enumerate sequence lengths by back-tracking instead of greedily.
    pub fn back_tracking(&mut self) -> &mut Self {
        self.last().back_tracking = true;
        self
    }

    /// Prefer skipping or terminating the last element over consuming
    /// more input.
    pub fn avoid(&mut self) -> &mut Self {
        self.last().avoid = true;
        self
    }

    /// Set the chain rule parsed between two items of a sequence.
    pub fn chain(&mut self, build: impl FnOnce(&mut RuleBuilder)) -> &mut Self {
        let chain = build_rule(self.grammar, build).elements;
        self.last().chain = chain;
        self
    }

    pub fn add_char(&mut self, f: AddCharFn) -> &mut Self {
        self.last().add_char = Some(f);
        self
    }

    /// Guard the last element on a predicate over its parsed result.
    pub fn condition(&mut self, f: impl Fn(&Value) -> bool + 'static) -> &mut Self {
        self.last().condition = Some(Rc::new(f));
        self
    }

    pub fn add(&mut self, f: AddFn) -> &mut Self {
        self.last().add = Some(f);
        self
    }

    pub fn add_skip(&mut self, f: AddSkipFn) -> &mut Self {
        self.last().add_skip = Some(f);
        self
    }

    pub fn begin_seq(&mut self, f: BeginSeqFn) -> &mut Self {
        self.last().begin_seq = Some(f);
        self
    }

    pub fn add_seq(&mut self, f: AddSeqFn) -> &mut Self {
        self.last().add_seq = Some(f);
        self
    }

    pub fn set_pos(&mut self, f: SetPosFn) -> &mut Self {
        self.last().set_pos = Some(f);
        self
    }

    /// Override the description of the last element in expectation
    /// reports.
    pub fn expected(&mut self, message: &'static str) -> &mut Self {
        self.last().expected = Some(message);
        self
    }

    /// Set the rule's end callback, run after every element matched.
    pub fn end(&mut self, f: impl Fn(&Value) -> Option<Value> + 'static) -> &mut Self {
        self.rule.end = Some(Rc::new(f));
        self
    }

    /// Set the recursion-start callback. Only meaningful on rules added
    /// with [`NonTerminalBuilder::recursive_rule`].
    pub fn rec_start(&mut self, f: RecStartFn) -> &mut Self {
        self.rule.rec_start = Some(f);
        self
    }
}

/// Adds alternative rules to a grouping element.
pub struct GroupBuilder<'g> {
    grammar: &'g mut Grammar,
    rules: Vec<Rule>,
}

impl GroupBuilder<'_> {
    /// Append an alternative to the grouping.
    pub fn rule(&mut self, build: impl FnOnce(&mut RuleBuilder)) -> &mut Self {
        let rule = build_rule(self.grammar, build);
        self.rules.push(rule);
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn define_appends_rules_in_order() {
        let mut grammar = Grammar::new();
        let id = grammar.define("letter", |nt| {
            nt.rule(|r| {
                r.ch(b'a');
            });
            nt.rule(|r| {
                r.ch(b'b');
            });
        });
        grammar.define("letter", |nt| {
            nt.rule(|r| {
                r.ch(b'c');
            });
        });
        assert_eq!(grammar.nt(id).normal.len(), 3);
    }

    #[test]
    fn nested_references_create_non_terminals() {
        let mut grammar = Grammar::new();
        grammar.define("outer", |nt| {
            nt.rule(|r| {
                r.group(|alt| {
                    alt.rule(|r| {
                        r.nt("inner");
                    });
                });
            });
        });
        assert!(grammar.lookup("inner").is_some());
    }

    #[test]
    #[should_panic(expected = "modifier applied before any element")]
    fn modifier_without_element_panics() {
        let mut grammar = Grammar::new();
        grammar.define("bad", |nt| {
            nt.rule(|r| {
                r.optional();
            });
        });
    }
}
