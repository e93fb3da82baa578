//! A grammar for a subset of C: the expression ladder with full
//! operator precedence (via direct left recursion), declarations,
//! statements, and struct/union/enum specifiers.
//!
//! Keywords share the lexical shape of identifiers. They are told
//! apart through the interner: every keyword is interned and marked
//! while the grammar is built, keyword elements guard on pointer
//! equality with the marked symbol, and plain identifier elements
//! guard on [`ident::not_a_keyword`].
//!
//! Results are built with the [`tree`] accumulator; parsing `a*b` as
//! `expr` prints as `list(times(a,b))`.

use crate::grammar::{Grammar, RuleBuilder};
use crate::grammars::{char_lit, ident, int_lit, string_lit, white_space};
use crate::grammars::ident::IdentNode;
use crate::intern::Interner;
use crate::tree;

fn ws(r: &mut RuleBuilder) {
    r.nt("white_space");
}

fn ch_ws(r: &mut RuleBuilder, b: u8) {
    r.ch(b);
    ws(r);
}

/// `NT`: parse a non-terminal and append its result as a child.
fn child(r: &mut RuleBuilder, name: &str) {
    r.nt(name).add(tree::add_child);
}

/// `NTP`: parse a non-terminal and make its result the running result.
fn pass(r: &mut RuleBuilder, name: &str) {
    r.nt(name).add(tree::take_child);
}

fn keyword(r: &mut RuleBuilder, interner: &Interner, word: &str) {
    let keyword = interner.intern(word);
    keyword.mark_keyword();
    r.nt("ident").condition(move |value| {
        value
            .downcast_ref::<IdentNode>()
            .is_some_and(|ident| ident.symbol() == &keyword)
    });
    ws(r);
}

fn ident_child(r: &mut RuleBuilder) {
    r.nt("ident")
        .condition(ident::not_a_keyword)
        .add(tree::add_child);
    ws(r);
}

fn ident_child_opt(r: &mut RuleBuilder) {
    r.nt("ident")
        .condition(ident::not_a_keyword)
        .add(tree::add_child)
        .optional();
    ws(r);
}

/// Install the C grammar and the lexical grammars it builds on. The
/// `double` non-terminal is referenced but deliberately left without
/// rules.
pub fn grammar(grammar: &mut Grammar, interner: &Interner) {
    white_space::grammar(grammar);
    ident::grammar(grammar, interner);
    char_lit::grammar(grammar);
    string_lit::grammar(grammar);
    int_lit::grammar(grammar);

    let kw = interner;

    grammar.define("primary_expr", |nt| {
        nt.rule(|r| {
            ident_child(r);
            r.end(tree::pass_tree);
        });
        nt.rule(|r| {
            pass(r, "int");
            ws(r);
        });
        nt.rule(|r| {
            pass(r, "double");
            ws(r);
        });
        nt.rule(|r| {
            pass(r, "char");
            ws(r);
        });
        nt.rule(|r| {
            pass(r, "string");
            ws(r);
        });
        nt.rule(|r| {
            ch_ws(r, b'(');
            pass(r, "expr");
            ch_ws(r, b')');
        });
    });

    grammar.define("postfix_expr", |nt| {
        nt.rule(|r| {
            pass(r, "primary_expr");
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            ch_ws(r, b'[');
            child(r, "expr");
            ch_ws(r, b']');
            r.end(tree::make_tree("arrayexp"));
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            ch_ws(r, b'(');
            child(r, "assignment_expr");
            r.sequence().add_seq(tree::add_seq_as_list).chain(|c| {
                ch_ws(c, b',');
            });
            r.optional();
            ch_ws(r, b')');
            r.end(tree::make_tree("call"));
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            ch_ws(r, b'.');
            ident_child(r);
            r.end(tree::make_tree("field"));
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            r.ch(b'-');
            ch_ws(r, b'>');
            ident_child(r);
            r.end(tree::make_tree("fieldderef"));
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            r.ch(b'+');
            ch_ws(r, b'+');
            r.end(tree::make_tree("post_inc"));
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            r.ch(b'-');
            ch_ws(r, b'-');
            r.end(tree::make_tree("post_dec"));
        });
    });

    grammar.define("unary_expr", |nt| {
        nt.rule(|r| {
            r.ch(b'+');
            ch_ws(r, b'+');
            child(r, "unary_expr");
            r.end(tree::make_tree("pre_inc"));
        });
        nt.rule(|r| {
            r.ch(b'-');
            ch_ws(r, b'-');
            child(r, "unary_expr");
            r.end(tree::make_tree("pre_dec"));
        });
        for (op, name) in [
            (b'&', "address_of"),
            (b'*', "deref"),
            (b'+', "plus"),
            (b'-', "min"),
            (b'~', "invert"),
            (b'!', "not"),
        ] {
            nt.rule(move |r| {
                ch_ws(r, op);
                child(r, "cast_expr");
                r.end(tree::make_tree(name));
            });
        }
        nt.rule(|r| {
            keyword(r, kw, "sizeof");
            r.group(|alt| {
                alt.rule(|r| {
                    ch_ws(r, b'(');
                    child(r, "sizeof_type");
                    ch_ws(r, b')');
                    r.end(tree::make_tree("sizeof"));
                });
                alt.rule(|r| {
                    child(r, "unary_expr");
                    r.end(tree::make_tree("sizeof_expr"));
                });
            });
        });
        nt.rule(|r| {
            pass(r, "postfix_expr");
        });
    });

    grammar.define("sizeof_type", |nt| {
        for word in ["char", "short", "int", "long"] {
            nt.rule(move |r| {
                keyword(r, kw, word);
                r.end(tree::make_tree(word));
            });
        }
        for word in ["signed", "unsigned"] {
            nt.rule(move |r| {
                keyword(r, kw, word);
                child(r, "sizeof_type");
                r.end(tree::make_tree(word));
            });
        }
        nt.rule(|r| {
            keyword(r, kw, "float");
            r.end(tree::make_tree("float"));
        });
        nt.rule(|r| {
            keyword(r, kw, "double");
            child(r, "sizeof_type");
            r.optional();
            r.end(tree::make_tree("double"));
        });
        for word in ["const", "volatile"] {
            nt.rule(move |r| {
                keyword(r, kw, word);
                child(r, "sizeof_type");
                r.end(tree::make_tree(word));
            });
        }
        nt.rule(|r| {
            keyword(r, kw, "void");
            r.end(tree::make_tree("void"));
        });
        nt.rule(|r| {
            keyword(r, kw, "struct");
            ident_child(r);
            r.end(tree::make_tree("structdecl"));
        });
        nt.rule(|r| {
            ident_child(r);
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            ws(r);
            ch_ws(r, b'*');
            r.end(tree::make_tree("pointdecl"));
        });
    });

    grammar.define("cast_expr", |nt| {
        nt.rule(|r| {
            ch_ws(r, b'(');
            child(r, "abstract_declaration");
            ch_ws(r, b')');
            child(r, "cast_expr");
            r.end(tree::make_tree("cast"));
        });
        nt.rule(|r| {
            pass(r, "unary_expr");
        });
    });

    // The precedence ladder, each level left-recursive in itself.
    const LADDER: [(&str, &str, &[(&[u8], &str)]); 9] = [
        ("l_expr1", "cast_expr", &[(b"*", "times"), (b"/", "div"), (b"%", "mod")]),
        ("l_expr2", "l_expr1", &[(b"+", "add"), (b"-", "sub")]),
        ("l_expr3", "l_expr2", &[(b"<<", "ls"), (b">>", "rs")]),
        (
            "l_expr4",
            "l_expr3",
            &[
                (b"<=", "le"),
                (b">=", "ge"),
                (b"<", "lt"),
                (b">", "gt"),
                (b"==", "eq"),
                (b"!=", "ne"),
            ],
        ),
        ("l_expr5", "l_expr4", &[(b"^", "bexor")]),
        ("l_expr6", "l_expr5", &[(b"&", "land")]),
        ("l_expr7", "l_expr6", &[(b"|", "lor")]),
        ("l_expr8", "l_expr7", &[(b"&&", "and")]),
        ("l_expr9", "l_expr8", &[(b"||", "or")]),
    ];
    for (level, below, operators) in LADDER {
        grammar.define(level, |nt| {
            nt.rule(move |r| {
                pass(r, below);
            });
            for &(op, name) in operators {
                nt.recursive_rule(move |r| {
                    r.rec_start(tree::rec_add_child);
                    ws(r);
                    let (last, head) = op.split_last().expect("operator spelling");
                    for b in head {
                        r.ch(*b);
                    }
                    ch_ws(r, *last);
                    child(r, below);
                    r.end(tree::make_tree(name));
                });
            }
        });
    }

    grammar.define("conditional_expr", |nt| {
        nt.rule(|r| {
            child(r, "l_expr9");
            ws(r);
            ch_ws(r, b'?');
            child(r, "l_expr9");
            ws(r);
            ch_ws(r, b':');
            child(r, "conditional_expr");
            r.end(tree::make_tree("if_expr"));
        });
        nt.rule(|r| {
            pass(r, "l_expr9");
        });
    });

    grammar.define("assignment_expr", |nt| {
        nt.rule(|r| {
            child(r, "unary_expr");
            ws(r);
            child(r, "assignment_operator");
            ws(r);
            child(r, "assignment_expr");
            r.end(tree::make_tree("assignment"));
        });
        nt.rule(|r| {
            pass(r, "conditional_expr");
        });
    });

    grammar.define("assignment_operator", |nt| {
        nt.rule(|r| {
            ch_ws(r, b'=');
            r.end(tree::make_tree("ass"));
        });
        for (op, name) in [
            (b'*', "times_ass"),
            (b'/', "div_ass"),
            (b'%', "mod_ass"),
            (b'+', "add_ass"),
            (b'-', "sub_ass"),
        ] {
            nt.rule(move |r| {
                r.ch(op);
                ch_ws(r, b'=');
                r.end(tree::make_tree(name));
            });
        }
        nt.rule(|r| {
            r.ch(b'<');
            r.ch(b'<');
            ch_ws(r, b'=');
            r.end(tree::make_tree("sl_ass"));
        });
        nt.rule(|r| {
            r.ch(b'>');
            r.ch(b'>');
            ch_ws(r, b'=');
            r.end(tree::make_tree("sr_ass"));
        });
        for (op, name) in [(b'&', "and_ass"), (b'|', "or_ass"), (b'^', "exor_ass")] {
            nt.rule(move |r| {
                r.ch(op);
                ch_ws(r, b'=');
                r.end(tree::make_tree(name));
            });
        }
    });

    grammar.define("expr", |nt| {
        nt.rule(|r| {
            child(r, "assignment_expr");
            r.sequence().add_seq(tree::add_seq_as_list).chain(|c| {
                ch_ws(c, b',');
            });
            r.end(tree::pass_tree);
        });
    });

    grammar.define("constant_expr", |nt| {
        nt.rule(|r| {
            child(r, "conditional_expr");
            r.end(tree::pass_tree);
        });
    });

    grammar.define("declaration", |nt| {
        nt.rule(|r| {
            r.group(|alt| {
                alt.rule(|r| {
                    child(r, "storage_class_specifier");
                });
                alt.rule(|r| {
                    child(r, "type_specifier");
                });
            })
            .sequence()
            .add_seq(tree::add_seq_as_list)
            .optional()
            .avoid();
            r.group(|alt| {
                // New style function definition.
                alt.rule(|r| {
                    child(r, "func_declarator");
                    ch_ws(r, b'(');
                    r.group(|alt| {
                        alt.rule(|r| {
                            child(r, "parameter_declaration_list");
                            r.optional();
                        });
                        alt.rule(|r| {
                            keyword(r, kw, "void");
                            r.end(tree::make_tree("void"));
                        });
                    });
                    ch_ws(r, b')');
                    r.group(|alt| {
                        alt.rule(|r| {
                            ch_ws(r, b';');
                        });
                        alt.rule(|r| {
                            ch_ws(r, b'{');
                            child(r, "decl_or_stat");
                            ch_ws(r, b'}');
                        });
                    });
                    r.end(tree::make_tree("new_style"));
                    ws(r);
                });
                // Old style function definition.
                alt.rule(|r| {
                    child(r, "func_declarator");
                    ch_ws(r, b'(');
                    child(r, "ident_list");
                    r.optional();
                    ch_ws(r, b')');
                    child(r, "declaration");
                    r.sequence().add_seq(tree::add_seq_as_list).optional();
                    ch_ws(r, b'{');
                    child(r, "decl_or_stat");
                    ch_ws(r, b'}');
                    r.end(tree::make_tree("old_style"));
                });
                // Plain declarator list.
                alt.rule(|r| {
                    r.group(|alt| {
                        alt.rule(|r| {
                            child(r, "declarator");
                            r.group(|alt| {
                                alt.rule(|r| {
                                    ws(r);
                                    ch_ws(r, b'=');
                                    child(r, "initializer");
                                });
                            })
                            .optional();
                        });
                    })
                    .sequence()
                    .add_seq(tree::add_seq_as_list)
                    .chain(|c| {
                        ch_ws(c, b',');
                    })
                    .optional();
                    ch_ws(r, b';');
                    r.end(tree::make_tree("decl"));
                });
            });
        });
    });

    grammar.define("storage_class_specifier", |nt| {
        for word in ["typedef", "extern", "inline", "static", "auto", "register"] {
            nt.rule(move |r| {
                keyword(r, kw, word);
                r.end(tree::make_tree(word));
            });
        }
    });

    grammar.define("type_specifier", |nt| {
        for word in [
            "char", "short", "int", "long", "signed", "unsigned", "float", "double", "const",
            "volatile", "void",
        ] {
            nt.rule(move |r| {
                keyword(r, kw, word);
                r.end(tree::make_tree(word));
            });
        }
        nt.rule(|r| {
            child(r, "struct_or_union_specifier");
        });
        nt.rule(|r| {
            child(r, "enum_specifier");
        });
        nt.rule(|r| {
            ident_child(r);
        });
    });

    grammar.define("struct_or_union_specifier", |nt| {
        for (word, with_name, tree_name) in [
            ("struct", true, "struct_d"),
            ("struct", false, "struct_n"),
            ("union", true, "union_d"),
            ("union", false, "union_n"),
        ] {
            nt.rule(move |r| {
                keyword(r, kw, word);
                if with_name {
                    ident_child(r);
                }
                ch_ws(r, b'{');
                r.group(|alt| {
                    alt.rule(|r| {
                        child(r, "struct_declaration_or_anon");
                    });
                })
                .sequence()
                .add_seq(tree::add_seq_as_list);
                ch_ws(r, b'}');
                r.end(tree::make_tree(tree_name));
            });
        }
        nt.rule(|r| {
            keyword(r, kw, "struct");
            ident_child(r);
            r.end(tree::make_tree("struct"));
        });
        nt.rule(|r| {
            keyword(r, kw, "union");
            ident_child(r);
            r.end(tree::make_tree("union"));
        });
    });

    grammar.define("struct_declaration_or_anon", |nt| {
        nt.rule(|r| {
            child(r, "struct_or_union_specifier");
            ch_ws(r, b';');
        });
        nt.rule(|r| {
            child(r, "struct_declaration");
        });
    });

    grammar.define("struct_declaration", |nt| {
        nt.rule(|r| {
            child(r, "type_specifier");
            child(r, "struct_declaration");
            r.end(tree::make_tree("type"));
        });
        nt.rule(|r| {
            child(r, "struct_declarator");
            r.sequence().add_seq(tree::add_seq_as_list).chain(|c| {
                ch_ws(c, b',');
            });
            ch_ws(r, b';');
            r.end(tree::make_tree("strdec"));
        });
    });

    grammar.define("struct_declarator", |nt| {
        nt.rule(|r| {
            child(r, "declarator");
            r.group(|alt| {
                alt.rule(|r| {
                    ch_ws(r, b':');
                    child(r, "constant_expr");
                });
            })
            .optional();
            r.end(tree::make_tree("record_field"));
        });
    });

    grammar.define("enum_specifier", |nt| {
        nt.rule(|r| {
            keyword(r, kw, "enum");
            ident_child_opt(r);
            r.group(|alt| {
                alt.rule(|r| {
                    ch_ws(r, b'{');
                    child(r, "enumerator");
                    r.sequence().add_seq(tree::add_seq_as_list).chain(|c| {
                        ch_ws(c, b',');
                    });
                    ch_ws(r, b'}');
                });
            });
            r.end(tree::make_tree("enum"));
        });
    });

    grammar.define("enumerator", |nt| {
        nt.rule(|r| {
            ident_child(r);
            r.group(|alt| {
                alt.rule(|r| {
                    ch_ws(r, b'=');
                    child(r, "constant_expr");
                });
            })
            .optional();
            r.end(tree::make_tree("enumerator"));
        });
    });

    grammar.define("func_declarator", |nt| {
        nt.rule(|r| {
            ch_ws(r, b'*');
            r.group(|alt| {
                alt.rule(|r| {
                    keyword(r, kw, "const");
                    r.end(tree::make_tree("const"));
                });
            })
            .optional();
            child(r, "func_declarator");
            r.end(tree::make_tree("pointdecl"));
        });
        nt.rule(|r| {
            ch_ws(r, b'(');
            child(r, "func_declarator");
            ch_ws(r, b')');
        });
        nt.rule(|r| {
            ident_child(r);
        });
    });

    grammar.define("declarator", |nt| {
        nt.rule(|r| {
            ch_ws(r, b'*');
            r.group(|alt| {
                alt.rule(|r| {
                    keyword(r, kw, "const");
                    r.end(tree::make_tree("const"));
                });
            })
            .optional();
            child(r, "declarator");
            r.end(tree::make_tree("pointdecl"));
        });
        nt.rule(|r| {
            ch_ws(r, b'(');
            child(r, "declarator");
            ch_ws(r, b')');
            r.end(tree::make_tree("brackets"));
        });
        nt.rule(|r| {
            ws(r);
            ident_child(r);
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            ch_ws(r, b'[');
            child(r, "constant_expr");
            r.optional();
            ch_ws(r, b']');
            r.end(tree::make_tree("array"));
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            ch_ws(r, b'(');
            child(r, "abstract_declaration_list");
            r.optional();
            ch_ws(r, b')');
            r.end(tree::make_tree("function"));
        });
    });

    for (list, item) in [
        ("abstract_declaration_list", Some("abstract_declaration")),
        ("parameter_declaration_list", Some("parameter_declaration")),
        ("ident_list", None),
    ] {
        grammar.define(list, |nt| {
            nt.rule(move |r| {
                match item {
                    Some(item) => child(r, item),
                    None => ident_child(r),
                }
                r.group(|alt| {
                    alt.rule(|r| {
                        ch_ws(r, b',');
                        r.group(|alt| {
                            alt.rule(|r| {
                                r.ch(b'.');
                                r.ch(b'.');
                                ch_ws(r, b'.');
                                r.end(tree::make_tree("varargs"));
                            });
                            alt.rule(move |r| {
                                child(r, list);
                            });
                        });
                    });
                })
                .optional();
            });
        });
    }

    grammar.define("parameter_declaration", |nt| {
        nt.rule(|r| {
            child(r, "type_specifier");
            child(r, "parameter_declaration");
            r.end(tree::make_tree("type"));
        });
        nt.rule(|r| {
            child(r, "declarator");
        });
        nt.rule(|r| {
            child(r, "abstract_declarator");
        });
    });

    grammar.define("abstract_declaration", |nt| {
        nt.rule(|r| {
            child(r, "type_specifier");
            child(r, "parameter_declaration");
            r.end(tree::make_tree("type"));
        });
        nt.rule(|r| {
            child(r, "abstract_declarator");
        });
    });

    grammar.define("abstract_declarator", |nt| {
        nt.rule(|r| {
            ch_ws(r, b'*');
            r.group(|alt| {
                alt.rule(|r| {
                    keyword(r, kw, "const");
                    r.end(tree::make_tree("const"));
                });
            })
            .optional();
            child(r, "abstract_declarator");
            r.end(tree::make_tree("abs_pointdecl"));
        });
        nt.rule(|r| {
            ch_ws(r, b'(');
            child(r, "abstract_declarator");
            ch_ws(r, b')');
            r.end(tree::make_tree("abs_brackets"));
        });
        // An abstract declarator may be empty.
        nt.rule(|_r| {});
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            ch_ws(r, b'[');
            child(r, "constant_expr");
            r.optional();
            ch_ws(r, b']');
            r.end(tree::make_tree("abs_array"));
        });
        nt.recursive_rule(|r| {
            r.rec_start(tree::rec_add_child);
            ch_ws(r, b'(');
            child(r, "parameter_declaration_list");
            ch_ws(r, b')');
            r.end(tree::make_tree("abs_func"));
        });
    });

    grammar.define("initializer", |nt| {
        nt.rule(|r| {
            child(r, "assignment_expr");
        });
        nt.rule(|r| {
            ch_ws(r, b'{');
            child(r, "initializer");
            r.sequence().add_seq(tree::add_seq_as_list).chain(|c| {
                ch_ws(c, b',');
            });
            r.ch(b',').optional();
            ws(r);
            ch_ws(r, b'}');
            r.end(tree::make_tree("initializer"));
        });
    });

    grammar.define("decl_or_stat", |nt| {
        nt.rule(|r| {
            child(r, "declaration");
            r.sequence().add_seq(tree::add_seq_as_list).optional();
            child(r, "statement");
            r.sequence().add_seq(tree::add_seq_as_list).optional();
        });
    });

    grammar.define("statement", |nt| {
        nt.rule(|r| {
            r.group(|alt| {
                alt.rule(|r| {
                    r.group(|alt| {
                        alt.rule(|r| {
                            ident_child(r);
                        });
                        alt.rule(|r| {
                            keyword(r, kw, "case");
                            child(r, "constant_expr");
                        });
                        alt.rule(|r| {
                            keyword(r, kw, "default");
                        });
                    });
                    ch_ws(r, b':');
                    child(r, "statement");
                    r.end(tree::make_tree("label"));
                });
                alt.rule(|r| {
                    ch_ws(r, b'{');
                    child(r, "decl_or_stat");
                    ch_ws(r, b'}');
                    r.end(tree::make_tree("brackets"));
                });
            });
        });
        nt.rule(|r| {
            r.group(|alt| {
                alt.rule(|r| {
                    child(r, "expr");
                    r.optional();
                    ch_ws(r, b';');
                });
                alt.rule(|r| {
                    keyword(r, kw, "if");
                    ws(r);
                    ch_ws(r, b'(');
                    child(r, "expr");
                    ch_ws(r, b')');
                    child(r, "statement");
                    r.group(|alt| {
                        alt.rule(|r| {
                            keyword(r, kw, "else");
                            child(r, "statement");
                        });
                    })
                    .optional();
                    r.end(tree::make_tree("if"));
                });
                alt.rule(|r| {
                    keyword(r, kw, "switch");
                    ws(r);
                    ch_ws(r, b'(');
                    child(r, "expr");
                    ch_ws(r, b')');
                    child(r, "statement");
                    r.end(tree::make_tree("switch"));
                });
                alt.rule(|r| {
                    keyword(r, kw, "while");
                    ws(r);
                    ch_ws(r, b'(');
                    child(r, "expr");
                    ch_ws(r, b')');
                    child(r, "statement");
                    r.end(tree::make_tree("while"));
                });
                alt.rule(|r| {
                    keyword(r, kw, "do");
                    child(r, "statement");
                    keyword(r, kw, "while");
                    ws(r);
                    ch_ws(r, b'(');
                    child(r, "expr");
                    ch_ws(r, b')');
                    ch_ws(r, b';');
                    r.end(tree::make_tree("do"));
                });
                alt.rule(|r| {
                    keyword(r, kw, "for");
                    ws(r);
                    ch_ws(r, b'(');
                    child(r, "expr");
                    r.optional();
                    ch_ws(r, b';');
                    r.group(|alt| {
                        alt.rule(|r| {
                            ws(r);
                            child(r, "expr");
                        });
                    })
                    .optional();
                    ch_ws(r, b';');
                    r.group(|alt| {
                        alt.rule(|r| {
                            ws(r);
                            child(r, "expr");
                        });
                    })
                    .optional();
                    ch_ws(r, b')');
                    child(r, "statement");
                    r.end(tree::make_tree("for"));
                });
                alt.rule(|r| {
                    keyword(r, kw, "goto");
                    ident_child(r);
                    ch_ws(r, b';');
                    r.end(tree::make_tree("goto"));
                });
                alt.rule(|r| {
                    keyword(r, kw, "continue");
                    ch_ws(r, b';');
                    r.end(tree::make_tree("cont"));
                });
                alt.rule(|r| {
                    keyword(r, kw, "break");
                    ch_ws(r, b';');
                    r.end(tree::make_tree("break"));
                });
                alt.rule(|r| {
                    keyword(r, kw, "return");
                    child(r, "expr");
                    r.optional();
                    ch_ws(r, b';');
                    r.end(tree::make_tree("ret"));
                });
            });
        });
    });

    grammar.define("root", |nt| {
        nt.rule(|r| {
            ws(r);
            r.group(|alt| {
                alt.rule(|r| {
                    child(r, "declaration");
                });
            })
            .sequence()
            .add_seq(tree::add_seq_as_list)
            .optional();
            r.end_of_input();
        });
    });
}

#[cfg(test)]
mod test {
    use crate::grammars::c;
    use crate::{DenseCache, Grammar, Interner, Parser, TextBuffer};
    use pretty_assertions::assert_eq;

    fn parse_to_string(start: &str, input: &str) -> Result<String, String> {
        let interner = Interner::new();
        let mut grammar = Grammar::new();
        c::grammar(&mut grammar, &interner);
        let text = TextBuffer::new(input);
        let mut parser =
            Parser::new(&grammar, text).with_cache(DenseCache::new(input.len()));
        match parser.parse(start) {
            Ok(value) => Ok(value.to_string()),
            Err(err) => Err(err.to_string()),
        }
    }

    #[test]
    fn single_identifier_expression() {
        assert_eq!(parse_to_string("expr", "a").as_deref(), Ok("list(a)"));
    }

    #[test]
    fn multiplication_builds_a_times_tree() {
        assert_eq!(
            parse_to_string("expr", "a*b").as_deref(),
            Ok("list(times(a,b))")
        );
    }

    #[test]
    fn precedence_groups_products_under_sums() {
        assert_eq!(
            parse_to_string("expr", "a+b*c").as_deref(),
            Ok("list(add(a,times(b,c)))")
        );
    }

    #[test]
    fn left_recursion_associates_left() {
        assert_eq!(
            parse_to_string("expr", "a-b-c").as_deref(),
            Ok("list(sub(sub(a,b),c))")
        );
    }

    #[test]
    fn literals_in_expressions() {
        assert_eq!(
            parse_to_string("expr", "x + 12").as_deref(),
            Ok("list(add(x,int 12))")
        );
        assert_eq!(
            parse_to_string("expr", "f('c')").as_deref(),
            Ok("list(call(f,list(char 'c')))")
        );
    }

    #[test]
    fn call_and_field_chains() {
        assert_eq!(
            parse_to_string("expr", "f(a, b).x").as_deref(),
            Ok("list(field(call(f,list(a,b)),x))")
        );
    }

    #[test]
    fn keywords_do_not_parse_as_identifiers() {
        assert!(parse_to_string("expr", "while").is_err());
        assert_eq!(
            parse_to_string("expr", "whilst").as_deref(),
            Ok("list(whilst)")
        );
    }

    #[test]
    fn sizeof_expression() {
        assert_eq!(
            parse_to_string("expr", "sizeof(int)").as_deref(),
            Ok("list(sizeof(int()))")
        );
    }

    #[test]
    fn a_small_program_parses_as_root() {
        let program = "
            int max(int a, int b)
            {
                if (a > b) return a;
                else return b;
            }
        ";
        assert!(parse_to_string("root", program).is_ok());
    }

    #[test]
    fn a_declaration_parses_as_root() {
        assert!(parse_to_string("root", "int x = 0;").is_ok());
        assert!(parse_to_string("root", "struct point { int x; int y; };").is_ok());
    }

    #[test]
    fn garbage_is_rejected_with_expectations() {
        let err = parse_to_string("root", "int x = ;").unwrap_err();
        assert!(err.contains("Expect at"), "{err}");
    }
}
