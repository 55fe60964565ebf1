//! Loop statement execution (`while`, `do-while`, `for`).
//!
//! Adds `impl Interpreter` methods for the three loop forms supported by the
//! C subset. `break` and `continue` are folded into [`LoopBodyResult`] so the
//! loop driver can react without inspecting the raw [`ControlFlow`].
//!
//! A `return` inside a loop body yields [`LoopBodyResult::Exit`], which
//! unwinds the loop and hands the signal back to the enclosing statement.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::{AstNode, SourceLocation};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`; the loop should iterate again.
    Continue,
    /// `break` was encountered; the loop should exit cleanly.
    Break,
    /// `return` was executed; the loop driver should propagate this signal.
    Exit(ControlFlow),
}

impl Interpreter {
    /// Executes all statements in `body` inside a fresh scope.
    pub(crate) fn execute_loop_body(
        &mut self,
        body: &[AstNode],
    ) -> Result<LoopBodyResult, RuntimeError> {
        Ok(match self.execute_block(body)? {
            ControlFlow::Normal | ControlFlow::Continue(_) => LoopBodyResult::Continue,
            ControlFlow::Break(_) => LoopBodyResult::Break,
            flow @ ControlFlow::Return(_) => LoopBodyResult::Exit(flow),
        })
    }

    /// Executes a `while (condition) { body }` loop.
    ///
    /// The condition is evaluated before each iteration.
    pub(crate) fn execute_while(
        &mut self,
        condition: &AstNode,
        body: &[AstNode],
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        loop {
            if !self.evaluate_condition(condition, location)? {
                break;
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(flow) => return Ok(flow),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
        }

        Ok(ControlFlow::Normal)
    }

    /// Executes a `do { body } while (condition)` loop.
    ///
    /// The body always runs at least once; the condition is checked after each
    /// iteration, `continue` included.
    pub(crate) fn execute_do_while(
        &mut self,
        body: &[AstNode],
        condition: &AstNode,
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        loop {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(flow) => return Ok(flow),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }

            if !self.evaluate_condition(condition, location)? {
                break;
            }
        }

        Ok(ControlFlow::Normal)
    }

    /// Executes a `for (init; condition; increment) { body }` loop.
    ///
    /// `init`, `condition`, and `increment` are all optional, matching C semantics.
    /// A missing condition is treated as always-true. The initializer lives in
    /// a scope enclosing the whole loop; `continue` still runs the increment.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        self.in_scope(|interp| {
            if let Some(init_stmt) = init {
                interp.execute_statement(init_stmt)?;
            }

            loop {
                if let Some(cond) = condition {
                    if !interp.evaluate_condition(cond, location)? {
                        break;
                    }
                }

                match interp.execute_loop_body(body)? {
                    LoopBodyResult::Exit(flow) => return Ok(flow),
                    LoopBodyResult::Break => break,
                    LoopBodyResult::Continue => {}
                }

                if let Some(inc) = increment {
                    interp.evaluate_expr(inc)?;
                }
            }

            Ok(ControlFlow::Normal)
        })
    }
}
