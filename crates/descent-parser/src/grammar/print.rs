//! Rendering of grammar rules in a compact BNF-like notation, used by
//! expectation reports and for introspection while debugging a
//! grammar.

use super::{CharSet, Element, ElementKind, Grammar, NtId, Rule};
use std::fmt;

impl Grammar {
    /// Display the rules of a non-terminal, alternatives separated by
    /// `|`.
    pub fn display_rules(&self, id: NtId) -> impl fmt::Display + '_ {
        RulesDisplay {
            grammar: self,
            rules: &self.nt(id).normal,
        }
    }

    /// Display the left-recursive rules of a non-terminal.
    pub fn display_recursive_rules(&self, id: NtId) -> impl fmt::Display + '_ {
        RulesDisplay {
            grammar: self,
            rules: &self.nt(id).recursive,
        }
    }
}

struct RulesDisplay<'g> {
    grammar: &'g Grammar,
    rules: &'g [Rule],
}

impl fmt::Display for RulesDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_rules(f, self.grammar, self.rules)
    }
}

/// The description of an element used in expectation reports: the
/// explicit `expected` message when one was set, the rendered element
/// otherwise.
pub(crate) fn element_description(grammar: &Grammar, element: &Element) -> String {
    match element.expected {
        Some(message) => message.to_owned(),
        None => ElementDisplay { grammar, element }
            .to_string()
            .trim_end()
            .to_owned(),
    }
}

struct ElementDisplay<'g> {
    grammar: &'g Grammar,
    element: &'g Element,
}

impl fmt::Display for ElementDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_element(f, self.grammar, self.element)
    }
}

pub(crate) fn fmt_rules(f: &mut fmt::Formatter<'_>, grammar: &Grammar, rules: &[Rule]) -> fmt::Result {
    for (i, rule) in rules.iter().enumerate() {
        if i > 0 {
            f.write_str("|")?;
        }
        fmt_chain(f, grammar, &rule.elements)?;
    }
    Ok(())
}

fn fmt_chain(f: &mut fmt::Formatter<'_>, grammar: &Grammar, elements: &[Element]) -> fmt::Result {
    for element in elements {
        fmt_element(f, grammar, element)?;
    }
    Ok(())
}

fn fmt_element(f: &mut fmt::Formatter<'_>, grammar: &Grammar, element: &Element) -> fmt::Result {
    match &element.kind {
        ElementKind::NonTerminal(id) => write!(f, "{} ", grammar.name(*id))?,
        ElementKind::Group(rules) => {
            f.write_str("(")?;
            fmt_rules(f, grammar, rules)?;
            f.write_str(")")?;
        }
        ElementKind::Char(b) => {
            f.write_str("'")?;
            fmt_set_char(f, *b)?;
            f.write_str("' ")?;
        }
        ElementKind::CharSet(set) => {
            fmt_char_set(f, set)?;
            f.write_str(" ")?;
        }
        ElementKind::End => f.write_str("<eof> ")?,
        ElementKind::Terminal(_) => f.write_str("<term> ")?,
    }

    if element.sequence {
        if element.chain.is_empty() {
            f.write_str("SEQ ")?;
        } else {
            f.write_str("CHAIN (")?;
            fmt_chain(f, grammar, &element.chain)?;
            f.write_str(")")?;
        }
        if element.back_tracking {
            f.write_str("BACK_TRACKING ")?;
        }
    }
    if element.optional {
        f.write_str("OPT ")?;
    }
    if element.avoid {
        f.write_str("AVOID ")?;
    }
    Ok(())
}

fn fmt_char_set(f: &mut fmt::Formatter<'_>, set: &CharSet) -> fmt::Result {
    f.write_str("[")?;
    let mut run: Option<(u8, u8)> = None;
    for b in 0..=255u8 {
        match (set.contains(b), run) {
            (true, None) => run = Some((b, b)),
            (true, Some((first, _))) => run = Some((first, b)),
            (false, Some(range)) => {
                fmt_run(f, range)?;
                run = None;
            }
            (false, None) => {}
        }
    }
    if let Some(range) = run {
        fmt_run(f, range)?;
    }
    f.write_str("]")
}

fn fmt_run(f: &mut fmt::Formatter<'_>, (first, last): (u8, u8)) -> fmt::Result {
    fmt_set_char(f, first)?;
    if last > first {
        if last > first + 1 {
            f.write_str("-")?;
        }
        fmt_set_char(f, last)?;
    }
    Ok(())
}

fn fmt_set_char(f: &mut fmt::Formatter<'_>, b: u8) -> fmt::Result {
    match b {
        0 => f.write_str("\\0"),
        0x07 => f.write_str("\\a"),
        0x08 => f.write_str("\\b"),
        b'\n' => f.write_str("\\n"),
        b'\r' => f.write_str("\\r"),
        b'\t' => f.write_str("\\t"),
        0x0B => f.write_str("\\v"),
        b'\\' => f.write_str("\\\\"),
        b'-' => f.write_str("\\-"),
        b']' => f.write_str("\\]"),
        b'\'' => f.write_str("\\'"),
        b if b < b' ' || b > b'~' => write!(f, "\\{b:03o}"),
        b => write!(f, "{}", b as char),
    }
}

#[cfg(test)]
mod test {
    use crate::grammar::Grammar;
    use expect_test::expect;

    #[test]
    fn renders_rules_in_grammar_notation() {
        let mut grammar = Grammar::new();
        let id = grammar.define("item", |nt| {
            nt.rule(|r| {
                r.ch(b'x');
                r.charset(|s| {
                    s.add_range(b'0', b'9');
                    s.add(b'_');
                })
                .sequence()
                .optional()
                .avoid();
            });
            nt.rule(|r| {
                r.group(|alt| {
                    alt.rule(|r| {
                        r.nt("item");
                    });
                    alt.rule(|r| {
                        r.end_of_input();
                    });
                })
                .sequence()
                .chain(|c| {
                    c.ch(b',');
                });
            });
        });

        let rendered = grammar.display_rules(id).to_string();
        expect![[r#"'x' [0-9_] SEQ OPT AVOID |(item |<eof> )CHAIN (',' )"#]]
            .assert_eq(&rendered);
    }
}
