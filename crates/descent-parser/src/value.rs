use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Payload stored inside a [`Value`].
///
/// The engine never looks at a payload; it only clones and drops the
/// reference-counted handle while rules are tried and abandoned.
/// Callbacks that do care downcast through [`as_any`][ValueData::as_any].
pub trait ValueData: Any {
    /// Render the payload for diagnostics and tests.
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// The payload as [`Any`], for checked downcasts.
    fn as_any(&self) -> &dyn Any;
}

/// An opaque result carrier threaded through grammar callbacks.
///
/// A `Value` is either empty or a shared, reference-counted payload.
/// Cloning is cheap and is how intermediate results survive
/// back-tracking: every alternative folds the previous result into a
/// fresh `Value`, and abandoning the alternative simply drops it.
#[derive(Clone, Default)]
pub struct Value(Option<Rc<dyn ValueData>>);

impl Value {
    /// The empty value.
    pub const fn none() -> Self {
        Value(None)
    }

    /// Wrap a payload in a fresh reference-counted value.
    pub fn new(data: impl ValueData) -> Self {
        Value(Some(Rc::new(data)))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    /// Borrow the payload if it has type `T`.
    pub fn downcast_ref<T: ValueData>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|data| data.as_any().downcast_ref())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("<>"),
            Some(data) => data.print(f),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// `begin_seq` callback that seeds the sequence accumulator with the
/// result of the preceding elements.
pub fn pass_to_sequence(prev: &Value) -> Value {
    prev.clone()
}

/// `add_seq` callback that makes the sequence result the rule result,
/// discarding the previous one.
pub fn use_sequence_result(_prev: &Value, seq: &Value) -> Option<Value> {
    Some(seq.clone())
}

#[cfg(test)]
mod test {
    use super::*;

    struct Num(i64);

    impl ValueData for Num {
        fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "num {}", self.0)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn empty_value_prints_angle_brackets() {
        assert_eq!(Value::none().to_string(), "<>");
    }

    #[test]
    fn downcast_checks_the_payload_type() {
        let value = Value::new(Num(7));
        assert_eq!(value.downcast_ref::<Num>().unwrap().0, 7);

        struct Other;
        impl ValueData for Other {
            fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("other")
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
        assert!(value.downcast_ref::<Other>().is_none());
    }

    #[test]
    fn clones_share_the_payload() {
        let value = Value::new(Num(1));
        let copy = value.clone();
        drop(value);
        assert_eq!(copy.to_string(), "num 1");
    }
}
