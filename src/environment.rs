use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::params::{Arity, Param, ParamList};
use crate::symbol::Symbol;
use crate::values::Value;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvError {
    #[error("'{0}' not found")]
    Unbound(Symbol),
    #[error("expected {expected} arguments, but received {got}")]
    Arity { expected: Arity, got: usize },
}

/// The lookup and mutation protocol the evaluator resolves names through.
pub trait Environment {
    /// The nearest frame, starting at `self` and walking outward, that binds `key`.
    fn find(&self, key: &Symbol) -> Option<Env>;

    /// The value of `key` in the nearest frame that binds it.
    fn get(&self, key: &Symbol) -> Result<Value, EnvError>;

    /// Binds `key` in this frame only, replacing any previous value here.
    fn set(&self, key: Symbol, value: Value) -> Value;
}

/// The bindings owned by a single frame.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    map: HashMap<Symbol, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Symbol, value: Value) -> Option<Value> {
        self.map.insert(key, value)
    }

    // `None` means not bound here; a bound `nil` is `Some(&Value::Nil)`
    pub fn get(&self, key: &Symbol) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &Symbol) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All bindings ordered by name.
    pub fn sorted(&self) -> Vec<(&Symbol, &Value)> {
        let mut entries: Vec<_> = self.map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl FromIterator<(Symbol, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (Symbol, Value)>>(iter: I) -> Self {
        Bindings {
            map: iter.into_iter().collect(),
        }
    }
}

struct Frame {
    outer: Option<Env>,
    data: RefCell<Bindings>,
}

impl Drop for Frame {
    // Unlinks the parent chain in a loop so dropping a deep chain does not
    // recurse once per frame.
    fn drop(&mut self) {
        let mut outer = self.outer.take();
        while let Some(Env(frame)) = outer {
            match Rc::try_unwrap(frame) {
                Ok(mut frame) => outer = frame.outer.take(),
                Err(_) => break,
            }
        }
    }
}

/// A shared handle to one lexical frame.
///
/// Cloning the handle does not copy the frame: every clone observes `set`
/// calls made through any other. The parent link is fixed at construction, so
/// chains are always finite and acyclic.
#[derive(Clone)]
pub struct Env(Rc<Frame>);

impl Env {
    /// The global frame, with no parent.
    pub fn root() -> Self {
        Self::with_bindings(std::iter::empty())
    }

    /// A global frame seeded with `bindings`, e.g. a primitive table.
    pub fn with_bindings(bindings: impl IntoIterator<Item = (Symbol, Value)>) -> Self {
        Env(Rc::new(Frame {
            outer: None,
            data: RefCell::new(bindings.into_iter().collect()),
        }))
    }

    /// Builds the frame for a call or local binding form.
    ///
    /// Arguments are matched to `params` by position. A rest parameter takes
    /// the remaining arguments as a single list, which is empty if nothing is
    /// left. On an argument count mismatch no frame is built.
    pub fn new(
        outer: Option<&Env>,
        params: &ParamList,
        args: &[Value],
    ) -> Result<Self, EnvError> {
        params.arity().check(args.len())?;

        let mut data = Bindings::new();
        for (i, param) in params.params().iter().enumerate() {
            match param {
                Param::Positional(name) => {
                    data.put(name.clone(), args[i].clone());
                }
                Param::Rest(name) => {
                    data.put(name.clone(), Value::list(args[i..].to_vec()));
                    break;
                }
            }
        }

        log::debug!("new frame ({params}) with {} bindings", data.len());

        Ok(Env(Rc::new(Frame {
            outer: outer.cloned(),
            data: RefCell::new(data),
        })))
    }

    /// An empty child frame of `self`.
    pub fn spawn(&self) -> Self {
        Env(Rc::new(Frame {
            outer: Some(self.clone()),
            data: RefCell::new(Bindings::new()),
        }))
    }

    pub fn outer(&self) -> Option<&Env> {
        self.0.outer.as_ref()
    }

    pub fn data(&self) -> Ref<'_, Bindings> {
        self.0.data.borrow()
    }

    /// Number of frames above this one.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.outer();
        while let Some(env) = current {
            depth += 1;
            current = env.outer();
        }
        depth
    }

    pub fn ptr_eq(&self, other: &Env) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Environment for Env {
    fn find(&self, key: &Symbol) -> Option<Env> {
        let mut current = Some(self);
        while let Some(env) = current {
            if env.data().contains(key) {
                return Some(env.clone());
            }
            current = env.outer();
        }

        log::trace!("'{key}' is not bound in any of {} frames", self.depth() + 1);
        None
    }

    fn get(&self, key: &Symbol) -> Result<Value, EnvError> {
        let env = self.find(key).ok_or_else(|| EnvError::Unbound(key.clone()))?;
        let value = env.data().get(key).cloned();
        value.ok_or_else(|| EnvError::Unbound(key.clone()))
    }

    fn set(&self, key: Symbol, value: Value) -> Value {
        log::debug!("set {key} = {value}");
        self.0.data.borrow_mut().put(key, value.clone());
        value
    }
}

impl fmt::Debug for Env {
    // Only names: values may be closures holding this very frame.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        let names: Vec<_> = data.sorted().into_iter().map(|(k, _)| k).collect();
        f.debug_struct("Env")
            .field("depth", &self.depth())
            .field("names", &names)
            .finish()
    }
}
