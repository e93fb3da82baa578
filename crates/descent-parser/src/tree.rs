//! Reference-counted tree nodes and the child-list accumulator used to
//! assemble them from rule results.
//!
//! While a rule is being parsed, `add_child` folds every element
//! result into a chain of links that share structure across
//! back-tracking attempts. At the end of the rule
//! [`make_tree`] materializes the chain into a [`TreeNode`] with the
//! children in declaration order, and [`pass_tree`] forwards a single
//! accumulated child instead.

use crate::text::TextPosition;
use crate::value::{Value, ValueData};
use std::any::Any;
use std::cell::Cell;
use std::fmt;

/// A tree node with a type name and a list of child results.
pub struct TreeNode {
    kind: &'static str,
    pos: Cell<TextPosition>,
    children: Vec<Value>,
}

impl TreeNode {
    pub fn new(kind: &'static str, children: Vec<Value>) -> Self {
        TreeNode {
            kind,
            pos: Cell::new(TextPosition::default()),
            children,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn position(&self) -> TextPosition {
        self.pos.get()
    }

    pub fn children(&self) -> &[Value] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Value> {
        self.children.get(index)
    }
}

impl ValueData for TreeNode {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind)?;
        f.write_str("(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `set_pos` callback annotating a [`TreeNode`] with its start
/// position.
pub fn set_tree_pos(value: &mut Value, pos: TextPosition) {
    if let Some(node) = value.downcast_ref::<TreeNode>() {
        node.pos.set(pos);
    }
}

/// One link of the child accumulator: the previous links plus one
/// child. Links are shared, never mutated, so a back-tracked
/// alternative cannot disturb the chain its siblings grew from.
struct ChildLink {
    prev: Value,
    child: Value,
}

impl ValueData for ChildLink {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<children>")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `add` callback appending the element result to the child chain.
pub fn add_child(prev: &Value, elem: &Value) -> Option<Value> {
    Some(Value::new(ChildLink {
        prev: prev.clone(),
        child: elem.clone(),
    }))
}

/// `rec_start` callback seeding a left-recursive rule's chain with the
/// result parsed so far.
pub fn rec_add_child(rec: &Value) -> Option<Value> {
    Some(Value::new(ChildLink {
        prev: Value::none(),
        child: rec.clone(),
    }))
}

/// `add` callback keeping only the element result.
pub fn take_child(_prev: &Value, elem: &Value) -> Option<Value> {
    Some(elem.clone())
}

/// Children accumulated in `list`, in declaration order.
fn collect_children(list: &Value) -> Vec<Value> {
    let mut children = Vec::new();
    let mut link = list.downcast_ref::<ChildLink>();
    while let Some(current) = link {
        children.push(current.child.clone());
        link = current.prev.downcast_ref();
    }
    children.reverse();
    children
}

/// Rule end callback building a [`TreeNode`] named `kind` from the
/// accumulated children.
pub fn make_tree(kind: &'static str) -> impl Fn(&Value) -> Option<Value> {
    move |rule_result| {
        Some(Value::new(TreeNode::new(
            kind,
            collect_children(rule_result),
        )))
    }
}

/// Rule end callback forwarding the single accumulated child.
pub fn pass_tree(rule_result: &Value) -> Option<Value> {
    match rule_result.downcast_ref::<ChildLink>() {
        Some(link) => Some(link.child.clone()),
        None => Some(Value::none()),
    }
}

/// `add_seq` callback folding a sequence of children into a `list`
/// tree appended to the previous chain.
pub fn add_seq_as_list(prev: &Value, seq: &Value) -> Option<Value> {
    let list = Value::new(TreeNode::new("list", collect_children(seq)));
    Some(Value::new(ChildLink {
        prev: prev.clone(),
        child: list,
    }))
}

#[cfg(test)]
mod test {
    use super::*;

    struct Leaf(&'static str);

    impl ValueData for Leaf {
        fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn children_come_out_in_declaration_order() {
        let mut acc = Value::none();
        for name in ["a", "b", "c"] {
            acc = add_child(&acc, &Value::new(Leaf(name))).unwrap();
        }
        let tree = make_tree("seq")(&acc).unwrap();
        assert_eq!(tree.to_string(), "seq(a,b,c)");
    }

    #[test]
    fn chains_share_structure_across_alternatives() {
        let base = add_child(&Value::none(), &Value::new(Leaf("x"))).unwrap();
        let left = add_child(&base, &Value::new(Leaf("l"))).unwrap();
        let right = add_child(&base, &Value::new(Leaf("r"))).unwrap();
        assert_eq!(make_tree("t")(&left).unwrap().to_string(), "t(x,l)");
        assert_eq!(make_tree("t")(&right).unwrap().to_string(), "t(x,r)");
    }

    #[test]
    fn pass_tree_forwards_the_only_child() {
        let acc = add_child(&Value::none(), &Value::new(Leaf("only"))).unwrap();
        assert_eq!(pass_tree(&acc).unwrap().to_string(), "only");
        assert!(pass_tree(&Value::none()).unwrap().is_none());
    }

    #[test]
    fn sequences_fold_into_list_trees() {
        let mut seq = Value::none();
        for name in ["a", "b"] {
            seq = add_child(&seq, &Value::new(Leaf(name))).unwrap();
        }
        let folded = add_seq_as_list(&Value::none(), &seq).unwrap();
        assert_eq!(pass_tree(&folded).unwrap().to_string(), "list(a,b)");
    }
}
