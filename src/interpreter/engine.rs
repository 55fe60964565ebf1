use crate::interpreter::config::InterpreterConfig;
use crate::interpreter::errors::RuntimeError;
use crate::io::{Console, IoChannel, StdConsole};
use crate::memory::stack::Stack;
use crate::memory::value::Value;
use crate::memory::{contains_itself, AggregateTable};
use crate::parser::ast::{AggregateDef, AstNode, FunctionDef, Program, SourceLocation};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::{info, trace};

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Normal,
    Break(SourceLocation),
    Continue(SourceLocation),
    Return(Option<Value>),
}

/// The main interpreter that executes a C program
pub struct Interpreter {
    /// Global scope and call frames
    pub(crate) stack: Stack,

    /// Function definitions (name -> FunctionDef)
    pub(crate) functions: FxHashMap<String, Rc<FunctionDef>>,

    /// Struct and union definitions (tag -> AggregateDef)
    pub(crate) aggregates: AggregateTable,

    /// Console the program reads from and prints to
    pub(crate) io: IoChannel,

    pub(crate) config: InterpreterConfig,
}

impl Interpreter {
    /// Load `program` against the process's standard streams
    pub fn new(program: Program, config: InterpreterConfig) -> Result<Self, RuntimeError> {
        Self::with_console(program, config, StdConsole::new())
    }

    /// Load `program` against `console`
    ///
    /// Aggregate and function definitions are registered first, then globals
    /// are declared in source order with their initializers evaluated.
    pub fn with_console(
        program: Program,
        config: InterpreterConfig,
        console: impl Console + 'static,
    ) -> Result<Self, RuntimeError> {
        let mut interpreter = Interpreter {
            stack: Stack::new(),
            functions: FxHashMap::default(),
            aggregates: AggregateTable::default(),
            io: IoChannel::new(Box::new(console)),
            config,
        };
        interpreter.load(program)?;
        Ok(interpreter)
    }

    fn load(&mut self, program: Program) -> Result<(), RuntimeError> {
        let mut globals = Vec::new();
        let mut aggregate_sites = Vec::new();

        for node in program.nodes {
            match node {
                AstNode::AggregateDef {
                    kind,
                    name,
                    fields,
                    location,
                } => {
                    if self.aggregates.contains_key(&name) {
                        return Err(RuntimeError::DuplicateDeclaration { name, location });
                    }
                    aggregate_sites.push((name.clone(), location));
                    self.aggregates
                        .insert(name.clone(), AggregateDef { kind, name, fields });
                }
                AstNode::FunctionDef {
                    name,
                    params,
                    body,
                    return_type,
                    location,
                } => {
                    if self.functions.contains_key(&name) {
                        return Err(RuntimeError::DuplicateDeclaration { name, location });
                    }
                    self.functions.insert(
                        name.clone(),
                        Rc::new(FunctionDef {
                            name,
                            params,
                            body,
                            return_type,
                            location,
                        }),
                    );
                }
                other => globals.push(other),
            }
        }

        for (name, location) in aggregate_sites {
            if contains_itself(&name, &self.aggregates) {
                return Err(RuntimeError::type_mismatch(
                    format!("'{}' contains itself by value", name),
                    location,
                ));
            }
        }

        for global in &globals {
            match global {
                AstNode::VarDecl {
                    name,
                    var_type,
                    init,
                    location,
                } => self.execute_var_decl(name, var_type, init.as_deref(), *location)?,
                other => {
                    return Err(RuntimeError::type_mismatch(
                        "only declarations may appear at file scope",
                        other.location(),
                    ))
                }
            }
        }

        info!(
            functions = self.functions.len(),
            aggregates = self.aggregates.len(),
            globals = globals.len(),
            "program loaded"
        );
        Ok(())
    }

    /// Run `main` to completion and return its exit status
    pub fn run(&mut self) -> Result<i32, RuntimeError> {
        if !self.functions.contains_key("main") {
            return Err(RuntimeError::NoMainFunction);
        }

        info!("running main");
        let status = match self.call_function("main", Vec::new())? {
            Value::Int(n) => n,
            Value::Char(c) => i32::from(c),
            _ => 0,
        };
        info!(status, "main returned");
        Ok(status)
    }

    /// Call a user function with already evaluated arguments
    pub fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let function = self.functions.get(name).cloned().ok_or_else(|| {
            RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location: SourceLocation::default(),
            }
        })?;
        let location = function.location;
        self.invoke(function, args, location)
    }

    /// Current value of a global variable
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.stack.global(name).map(|var| &var.value)
    }

    pub fn console(&self) -> &dyn Console {
        self.io.console()
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Number of calls currently active
    pub fn call_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Run `f` inside a fresh block scope, popping it however `f` ends
    pub(crate) fn in_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        self.stack.push_scope();
        let result = f(self);
        self.stack.pop_scope();
        result
    }

    /// Run `f` inside a fresh call frame, popping it however `f` ends
    pub(crate) fn in_frame<T>(
        &mut self,
        function_name: &str,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        self.stack.push_frame(function_name.to_string());
        let result = f(self);
        if let Some(frame) = self.stack.pop_frame() {
            trace!(function = %frame.function_name, ok = result.is_ok(), "frame popped");
        }
        result
    }

    /// Execute a single statement
    pub(crate) fn execute_statement(&mut self, stmt: &AstNode) -> Result<ControlFlow, RuntimeError> {
        let location = stmt.location();
        trace!(line = location.line, column = location.column, "statement");

        match stmt {
            AstNode::VarDecl {
                name,
                var_type,
                init,
                location,
            } => {
                self.execute_var_decl(name, var_type, init.as_deref(), *location)?;
                Ok(ControlFlow::Normal)
            }

            AstNode::Return { expr, location } => self.execute_return(expr.as_deref(), *location),

            AstNode::If {
                condition,
                then_branch,
                else_branch,
                location,
            } => self.execute_if(condition, then_branch, else_branch.as_deref(), *location),

            AstNode::While {
                condition,
                body,
                location,
            } => self.execute_while(condition, body, *location),

            AstNode::DoWhile {
                body,
                condition,
                location,
            } => self.execute_do_while(body, condition, *location),

            AstNode::For {
                init,
                condition,
                increment,
                body,
                location,
            } => self.execute_for(
                init.as_deref(),
                condition.as_deref(),
                increment.as_deref(),
                body,
                *location,
            ),

            AstNode::Switch {
                expr,
                cases,
                location,
            } => self.execute_switch(expr, cases, *location),

            AstNode::Break { location } => Ok(ControlFlow::Break(*location)),

            AstNode::Continue { location } => Ok(ControlFlow::Continue(*location)),

            AstNode::Block { statements, .. } => self.execute_block(statements),

            AstNode::ExpressionStatement { expr, .. } => {
                self.evaluate_expr(expr)?;
                Ok(ControlFlow::Normal)
            }

            AstNode::FunctionDef { .. } | AstNode::AggregateDef { .. } => Err(
                RuntimeError::type_mismatch("definitions are only allowed at file scope", location),
            ),

            expr => {
                self.evaluate_expr(expr)?;
                Ok(ControlFlow::Normal)
            }
        }
    }

    /// Execute statements in order, stopping at the first non-normal signal
    pub(crate) fn execute_statements(
        &mut self,
        statements: &[AstNode],
    ) -> Result<ControlFlow, RuntimeError> {
        for stmt in statements {
            let flow = self.execute_statement(stmt)?;
            if flow != ControlFlow::Normal {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// Execute statements in their own block scope
    pub(crate) fn execute_block(&mut self, statements: &[AstNode]) -> Result<ControlFlow, RuntimeError> {
        self.in_scope(|interp| interp.execute_statements(statements))
    }
}
