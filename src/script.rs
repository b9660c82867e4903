use anyhow::{anyhow, Result};

use crate::environment::{Env, Environment};
use crate::reserved::Reserved;
use crate::symbol::Symbol;
use crate::values::Value;

/// Reads a single atom: integers, the reserved constants, `"strings"`, and
/// anything else as a symbol. Atoms never contain whitespace, so a string atom
/// cannot hold a space.
pub fn parse_atom(text: &str) -> Value {
    match Reserved::try_from(text) {
        Ok(Reserved::Nil) => return Value::Nil,
        Ok(Reserved::True) => return Value::Bool(true),
        Ok(Reserved::False) => return Value::Bool(false),
        _ => {}
    }

    if let Ok(n) = text.parse::<i64>() {
        return Value::Integer(n);
    }

    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Value::String(text[1..text.len() - 1].to_string());
    }

    Value::Symbol(Symbol::from(text))
}

/// A chain of frames, outermost first, one frame per line of `name=value`
/// pairs. Lines starting with `#` are comments.
#[derive(Debug, Default)]
pub struct ScopeScript {
    frames: Vec<Vec<(Symbol, Value)>>,
}

impl ScopeScript {
    pub fn parse(source: &str) -> Result<Self> {
        let mut frames = Vec::new();

        for (index, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line_number = index + 1;
            let mut frame = Vec::new();
            for pair in line.split_whitespace() {
                let (name, value) = pair.split_once('=').ok_or_else(|| {
                    anyhow!("[line {line_number}] Expected name=value, found {pair}")
                })?;

                if name.is_empty() || Reserved::try_from(name).is_ok() {
                    return Err(anyhow!("[line {line_number}] Invalid binding name '{name}'"));
                }

                if value.starts_with('"') && (value.len() < 2 || !value.ends_with('"')) {
                    return Err(anyhow!(
                        "[line {line_number}] Unterminated string for '{name}' (no spaces allowed)"
                    ));
                }

                frame.push((Symbol::from(name), parse_atom(value)));
            }

            frames.push(frame);
        }

        log::debug!("parsed scope script with {} frames", frames.len());
        Ok(ScopeScript { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Builds the frames below `root`, returning the innermost.
    pub fn build(&self, root: &Env) -> Env {
        let mut env = root.clone();
        for frame in &self.frames {
            env = env.spawn();
            for (name, value) in frame {
                env.set(name.clone(), value.clone());
            }
        }
        env
    }
}
