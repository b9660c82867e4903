use std::fmt::{self, Display};
use std::rc::Rc;

use crate::environment::{Env, EnvError};
use crate::params::ParamList;
use crate::symbol::Symbol;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    String(String),
    Symbol(Symbol),
    List(Rc<Vec<Value>>),
    Closure(Rc<Closure>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Closure(closure) => write!(f, "#<fn ({})>", closure.params),
        }
    }
}

/// A function value together with the frame it was defined in.
#[derive(Clone)]
pub struct Closure {
    pub params: ParamList,
    pub body: Value,
    pub env: Env,
}

impl Closure {
    pub fn new(params: ParamList, body: Value, env: &Env) -> Self {
        Closure {
            params,
            body,
            env: env.clone(),
        }
    }

    /// The frame a call evaluates the body in. Its parent is the defining
    /// frame, not the caller's.
    pub fn bind(&self, args: &[Value]) -> Result<Env, EnvError> {
        Env::new(Some(&self.env), &self.params, args)
    }
}

impl fmt::Debug for Closure {
    // Skips `env`, which may well contain this closure.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;

    fn sym(name: &str) -> Symbol {
        Symbol::from(name)
    }

    #[test]
    fn displays_nested_lists() {
        let value = Value::list(vec![
            Value::Integer(1),
            Value::list(vec![Value::Symbol(sym("a")), Value::Nil]),
            Value::String("hi".to_string()),
        ]);
        assert_eq!(value.to_string(), r#"(1 (a nil) "hi")"#);
    }

    #[test]
    fn closures_compare_by_identity() {
        let env = Env::root();
        let params = ParamList::parse(&[sym("x")]).unwrap();
        let a = Rc::new(Closure::new(params.clone(), Value::Nil, &env));
        let b = Rc::new(Closure::new(params, Value::Nil, &env));

        assert_eq!(Value::Closure(a.clone()), Value::Closure(a.clone()));
        assert_ne!(Value::Closure(a), Value::Closure(b));
    }

    #[test]
    fn closure_call_frame_parent_is_defining_frame() {
        let defining = Env::root();
        defining.set(sym("k"), Value::Integer(10));
        let caller = Env::root();
        caller.set(sym("k"), Value::Integer(-1));

        let params = ParamList::parse(&[sym("x")]).unwrap();
        let closure = Closure::new(params, Value::Symbol(sym("k")), &defining);
        let frame = closure.bind(&[Value::Integer(3)]).unwrap();

        assert!(frame.outer().unwrap().ptr_eq(&defining));
        assert_eq!(frame.get(&sym("k")), Ok(Value::Integer(10)));
        assert_eq!(frame.get(&sym("x")), Ok(Value::Integer(3)));
    }

    #[test]
    fn closure_sees_later_definitions() {
        let defining = Env::root();
        let closure = Closure::new(ParamList::default(), Value::Nil, &defining);
        defining.set(sym("late"), Value::Bool(true));

        let frame = closure.bind(&[]).unwrap();
        assert_eq!(frame.get(&sym("late")), Ok(Value::Bool(true)));
    }

    #[test]
    fn closure_debug_and_display() {
        let params = ParamList::parse(&[sym("a"), sym("&"), sym("more")]).unwrap();
        let closure = Closure::new(params, Value::Nil, &Env::root());
        let value = Value::Closure(Rc::new(closure));

        assert_eq!(value.to_string(), "#<fn (a & more)>");
        assert!(format!("{value:?}").contains("Closure"));
    }
}
