//! Scope stack implementation
//!
//! This module provides name resolution for running programs:
//! - [`Stack`]: the global scope plus the active call frames
//! - [`StackFrame`]: a single function's activation record, itself a stack of
//!   block scopes
//! - [`LocalVar`]: a variable's current value and declared type
//!
//! # Resolution Order
//!
//! A name is looked up in the current frame's block scopes, innermost first,
//! then in the global scope. Frames below the current one are never
//! consulted: a callee cannot see its caller's locals.
//!
//! Every successful lookup yields a [`Binding`] naming the exact frame and
//! scope, which is what a [`Place`](super::value::Place) holds on to.

use super::value::{Binding, Value};
use crate::parser::ast::Type;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Name resolution failures, located by the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("'{0}' is already declared in this scope")]
    Duplicate(String),
    #[error("'{0}' is not declared")]
    Unbound(String),
}

/// A declared variable
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub value: Value,
    pub var_type: Type,
}

impl LocalVar {
    pub fn new(var_type: Type, value: Value) -> Self {
        LocalVar { value, var_type }
    }
}

/// One block's variables, tagged with an id no other scope ever reuses
#[derive(Debug, Clone, Default)]
struct Scope {
    id: u64,
    vars: FxHashMap<String, LocalVar>,
}

/// Activation record for a function call
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub function_name: String,
    scopes: Vec<Scope>,
}

/// Globals plus the call stack
#[derive(Debug, Clone, Default)]
pub struct Stack {
    globals: FxHashMap<String, LocalVar>,
    frames: Vec<StackFrame>,
    next_scope_id: u64,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_scope(&mut self) -> Scope {
        self.next_scope_id += 1;
        Scope {
            id: self.next_scope_id,
            vars: FxHashMap::default(),
        }
    }

    /// Push a new stack frame
    pub fn push_frame(&mut self, function_name: String) {
        let scope = self.fresh_scope();
        self.frames.push(StackFrame {
            function_name,
            scopes: vec![scope],
        });
    }

    /// Pop the top stack frame
    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    /// Enter a block scope in the current frame (no-op at global level)
    pub fn push_scope(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        let scope = self.fresh_scope();
        if let Some(frame) = self.frames.last_mut() {
            frame.scopes.push(scope);
        }
    }

    /// Leave the innermost block scope of the current frame
    pub fn pop_scope(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.scopes.pop();
        }
    }

    /// Get the depth of the call stack
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost scope (the global scope when no call is active)
    pub fn declare(&mut self, name: &str, var: LocalVar) -> Result<Binding, ScopeError> {
        let frame_index = self.frames.len().checked_sub(1);
        let (vars, binding) = match frame_index {
            Some(frame) => {
                let scopes = &mut self.frames[frame].scopes;
                let scope = scopes.len() - 1;
                let scope_id = scopes[scope].id;
                (
                    &mut scopes[scope].vars,
                    Binding::Local {
                        frame,
                        scope,
                        scope_id,
                        name: name.to_string(),
                    },
                )
            }
            None => (&mut self.globals, Binding::Global(name.to_string())),
        };

        if vars.contains_key(name) {
            return Err(ScopeError::Duplicate(name.to_string()));
        }
        vars.insert(name.to_string(), var);
        Ok(binding)
    }

    /// Find the binding `name` refers to from the current position
    pub fn resolve(&self, name: &str) -> Option<Binding> {
        if let Some((frame_index, frame)) = self.frames.iter().enumerate().next_back() {
            for (scope_index, scope) in frame.scopes.iter().enumerate().rev() {
                if scope.vars.contains_key(name) {
                    return Some(Binding::Local {
                        frame: frame_index,
                        scope: scope_index,
                        scope_id: scope.id,
                        name: name.to_string(),
                    });
                }
            }
        }
        self.globals
            .contains_key(name)
            .then(|| Binding::Global(name.to_string()))
    }

    /// The variable a binding names, if it is still alive
    ///
    /// A scope that has been popped never comes back: a later scope at the
    /// same position carries a different id, so old bindings stay dead.
    pub fn var(&self, binding: &Binding) -> Option<&LocalVar> {
        match binding {
            Binding::Global(name) => self.globals.get(name),
            Binding::Local {
                frame,
                scope,
                scope_id,
                name,
            } => {
                let scope = self.frames.get(*frame)?.scopes.get(*scope)?;
                if scope.id != *scope_id {
                    return None;
                }
                scope.vars.get(name)
            }
        }
    }

    pub fn var_mut(&mut self, binding: &Binding) -> Option<&mut LocalVar> {
        match binding {
            Binding::Global(name) => self.globals.get_mut(name),
            Binding::Local {
                frame,
                scope,
                scope_id,
                name,
            } => {
                let scope = self.frames.get_mut(*frame)?.scopes.get_mut(*scope)?;
                if scope.id != *scope_id {
                    return None;
                }
                scope.vars.get_mut(name)
            }
        }
    }

    /// Resolve and read a variable
    pub fn lookup(&self, name: &str) -> Result<&LocalVar, ScopeError> {
        self.resolve(name)
            .and_then(|binding| self.var(&binding))
            .ok_or_else(|| ScopeError::Unbound(name.to_string()))
    }

    /// Overwrite a variable in its nearest defining scope
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), ScopeError> {
        let binding = self
            .resolve(name)
            .ok_or_else(|| ScopeError::Unbound(name.to_string()))?;
        let var = self
            .var_mut(&binding)
            .ok_or_else(|| ScopeError::Unbound(name.to_string()))?;
        var.value = value;
        Ok(())
    }

    /// Read a global directly, ignoring any locals that shadow it
    pub fn global(&self, name: &str) -> Option<&LocalVar> {
        self.globals.get(name)
    }
}
