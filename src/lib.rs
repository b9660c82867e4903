//! Lexically scoped environments for a tree-walking Lisp interpreter.

pub mod environment;
pub mod params;
pub mod reserved;
pub mod script;
pub mod symbol;
pub mod values;

pub use environment::{Bindings, Env, EnvError, Environment};
pub use params::{Arity, Param, ParamError, ParamList};
pub use symbol::Symbol;
pub use values::{Closure, Value};
