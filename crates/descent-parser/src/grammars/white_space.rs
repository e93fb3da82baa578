//! White space: blanks, tabs, newlines, `//` line comments, and
//! traditional `/* */` comments.
//!
//! White space carries no result, so no element here sets a callback.
//! The block-comment body is a non-greedy sequence (`avoid`): the
//! closing `*/` must win from the body consuming the `*`.

use crate::grammar::Grammar;

pub fn grammar(grammar: &mut Grammar) {
    grammar.define("white_space", |nt| {
        nt.rule(|r| {
            r.group(|alt| {
                // The usual white space characters.
                alt.rule(|r| {
                    r.charset(|s| {
                        s.add(b' ').add(b'\t').add(b'\n');
                    });
                });
                // Single line comment, closed by a newline.
                alt.rule(|r| {
                    r.ch(b'/');
                    r.ch(b'/');
                    r.charset(|s| {
                        s.add_range(b' ', 255).add(b'\t');
                    })
                    .sequence()
                    .optional();
                    r.ch(b'\n');
                });
                // Traditional C comment.
                alt.rule(|r| {
                    r.ch(b'/');
                    r.ch(b'*');
                    r.charset(|s| {
                        s.add_range(b' ', 255).add(b'\t').add(b'\n');
                    })
                    .sequence()
                    .optional()
                    .avoid();
                    r.ch(b'*');
                    r.ch(b'/');
                });
            })
            .sequence()
            .optional();
        });
    });
}

#[cfg(test)]
mod test {
    use crate::grammars::white_space;
    use crate::{DenseCache, Grammar, Parser, TextBuffer};

    fn parses(input: &str) -> bool {
        let mut grammar = Grammar::new();
        white_space::grammar(&mut grammar);
        let text = TextBuffer::new(input);
        let mut parser =
            Parser::new(&grammar, text).with_cache(DenseCache::new(input.len()));
        parser.parse("white_space").is_ok()
    }

    #[test]
    fn plain_white_space() {
        assert!(parses(" "));
        assert!(parses("  \t\n "));
        assert!(parses(""));
    }

    #[test]
    fn comments() {
        assert!(parses("/* */"));
        assert!(parses("// a comment\n"));
        assert!(parses(" /* * / ** */ // trailing\n\t"));
    }

    #[test]
    fn unterminated_comment_is_rejected() {
        assert!(!parses("/* "));
        assert!(!parses("// no newline"));
        assert!(!parses("x"));
    }
}
