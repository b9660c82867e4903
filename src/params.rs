use std::collections::HashSet;
use std::fmt;

use derive_more::Display;
use thiserror::Error;

use crate::reserved::Reserved;
use crate::environment::EnvError;
use crate::symbol::Symbol;

/// One entry of a parameter list.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Param {
    #[display("{}", _0)]
    Positional(Symbol),

    /// Collects every remaining argument into one list value.
    #[display("& {}", _0)]
    Rest(Symbol),
}

impl Param {
    pub fn name(&self) -> &Symbol {
        match self {
            Param::Positional(name) | Param::Rest(name) => name,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("expected at most one '&' in a parameter list, found {0}")]
    TooManyRestMarkers(usize),
    #[error("'&' must be followed by a parameter name")]
    MissingRestName,
    #[error("'&' must be the second to last parameter")]
    RestMarkerNotPenultimate,
    #[error("parameter '{0}' appears more than once")]
    DuplicateName(Symbol),
}

/// How many arguments a parameter list accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn contains(&self, n: usize) -> bool {
        match *self {
            Arity::Exactly(expected) => n == expected,
            Arity::AtLeast(min) => n >= min,
        }
    }

    pub fn check(&self, got: usize) -> Result<(), EnvError> {
        if self.contains(got) {
            Ok(())
        } else {
            Err(EnvError::Arity {
                expected: *self,
                got,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// An ordered parameter list. A [`Param::Rest`] entry, if present, is last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    pub fn new(positional: Vec<Symbol>, rest: Option<Symbol>) -> Result<Self, ParamError> {
        let mut params: Vec<Param> = positional.into_iter().map(Param::Positional).collect();
        if let Some(rest) = rest {
            params.push(Param::Rest(rest));
        }

        let mut seen = HashSet::new();
        for param in &params {
            if !seen.insert(param.name()) {
                return Err(ParamError::DuplicateName(param.name().clone()));
            }
        }

        Ok(ParamList { params })
    }

    /// Reads the surface form `a b & rest`, where `&` tags the final name as
    /// the rest parameter.
    pub fn parse(symbols: &[Symbol]) -> Result<Self, ParamError> {
        let marker = Reserved::Rest.as_str();
        let markers: Vec<usize> = symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name() == marker)
            .map(|(i, _)| i)
            .collect();

        match markers.as_slice() {
            [] => ParamList::new(symbols.to_vec(), None),
            [i] if *i + 1 == symbols.len() => Err(ParamError::MissingRestName),
            [i] if *i + 2 != symbols.len() => Err(ParamError::RestMarkerNotPenultimate),
            [i] => ParamList::new(symbols[..*i].to_vec(), Some(symbols[*i + 1].clone())),
            _ => Err(ParamError::TooManyRestMarkers(markers.len())),
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn rest(&self) -> Option<&Symbol> {
        match self.params.last() {
            Some(Param::Rest(name)) => Some(name),
            _ => None,
        }
    }

    pub fn positional_len(&self) -> usize {
        self.params.len() - usize::from(self.rest().is_some())
    }

    pub fn arity(&self) -> Arity {
        match self.rest() {
            Some(_) => Arity::AtLeast(self.positional_len()),
            None => Arity::Exactly(self.positional_len()),
        }
    }
}

impl fmt::Display for ParamList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{param}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn symbols(names: &str) -> Vec<Symbol> {
        names.split_whitespace().map(Symbol::from).collect()
    }

    #[test]
    fn parses_positional_only() {
        let params = ParamList::parse(&symbols("a b c")).unwrap();
        assert_eq!(params.arity(), Arity::Exactly(3));
        assert_eq!(params.rest(), None);
    }

    #[test]
    fn parses_rest_marker_into_tagged_entry() {
        let params = ParamList::parse(&symbols("a & rest")).unwrap();
        assert_eq!(
            params.params(),
            &[
                Param::Positional(Symbol::from("a")),
                Param::Rest(Symbol::from("rest")),
            ]
        );
        assert_eq!(params.arity(), Arity::AtLeast(1));
        assert_eq!(params.to_string(), "a & rest");
    }

    #[test]
    fn rest_only_accepts_zero_arguments() {
        let params = ParamList::parse(&symbols("& xs")).unwrap();
        assert_eq!(params.positional_len(), 0);
        assert!(params.arity().contains(0));
    }

    #[test]
    fn rejects_malformed_markers() {
        assert_eq!(
            ParamList::parse(&symbols("a &")),
            Err(ParamError::MissingRestName)
        );
        assert_eq!(
            ParamList::parse(&symbols("& a b")),
            Err(ParamError::RestMarkerNotPenultimate)
        );
        assert_eq!(
            ParamList::parse(&symbols("a & b & c")),
            Err(ParamError::TooManyRestMarkers(2))
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        assert_eq!(
            ParamList::parse(&symbols("a b a")),
            Err(ParamError::DuplicateName(Symbol::from("a")))
        );
        assert_eq!(
            ParamList::parse(&symbols("a & a")),
            Err(ParamError::DuplicateName(Symbol::from("a")))
        );
    }

    #[test]
    fn arity_check_reports_mismatch() {
        assert!(Arity::Exactly(2).check(2).is_ok());
        let err = Arity::Exactly(2).check(1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected exactly 2 arguments, but received 1"
        );
        assert!(Arity::AtLeast(1).check(5).is_ok());
    }
}
