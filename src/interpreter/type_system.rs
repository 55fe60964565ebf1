//! Conversions, initialization and static types
//!
//! Every store (declaration, assignment, parameter binding, return) goes
//! through [`Interpreter::coerce_value_to_type`] so a value's tag always
//! matches the declared type of the slot holding it:
//!
//! - `int`, `char`, `float`, `double` convert between each other the way C's
//!   implicit conversions do. `float` values are rounded to single precision.
//! - Arrays are copied element by element into the target's length, padding
//!   with zeros. A character buffer that cannot hold the text plus its
//!   terminator is a [`RuntimeError::BufferOverflow`].
//! - Structs and unions only accept a value of the same aggregate type.
//!
//! # Type Inference Rules
//!
//! `sizeof(expr)` never evaluates `expr`; [`Interpreter::infer_expr_type`]
//! derives its type instead:
//!
//! - Literals have their natural type (`int`, `double`, `char`, `char[N]`)
//! - Variables use their declared type
//! - Arithmetic follows C's usual arithmetic conversions
//! - Member access yields the field's type; `*p` the pointee type

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{StructValue, UnionValue, Value};
use crate::memory::{aggregate_def, default_value, sizeof_type};
use crate::parser::ast::*;
use tracing::warn;

/// Numeric conversion between scalar values, `None` when `value` is not numeric
///
/// Floating to integral conversion truncates toward zero and saturates at the
/// target's range; NaN becomes zero.
pub(crate) fn convert_scalar(value: &Value, base: &BaseType) -> Option<Value> {
    let as_f64 = |v: &Value| match v {
        Value::Int(n) => Some(f64::from(*n)),
        Value::Char(c) => Some(f64::from(*c)),
        Value::Float(v) => Some(*v),
        _ => None,
    };

    match (base, value) {
        (BaseType::Int, Value::Int(n)) => Some(Value::Int(*n)),
        (BaseType::Int, Value::Char(c)) => Some(Value::Int(i32::from(*c))),
        (BaseType::Int, Value::Float(v)) => Some(Value::Int(*v as i32)),
        (BaseType::Char, Value::Int(n)) => Some(Value::Char(*n as i8)),
        (BaseType::Char, Value::Char(c)) => Some(Value::Char(*c)),
        (BaseType::Char, Value::Float(v)) => Some(Value::Char(*v as i32 as i8)),
        (BaseType::Float, v) => as_f64(v).map(|x| Value::Float(x as f32 as f64)),
        (BaseType::Double, v) => as_f64(v).map(Value::Float),
        _ => None,
    }
}

/// Whether converting `value` to an integral type loses information
fn is_lossy_float(value: &Value) -> bool {
    match value {
        Value::Float(v) => v.fract() != 0.0 || *v < f64::from(i32::MIN) || *v > f64::from(i32::MAX),
        _ => false,
    }
}

impl Interpreter {
    /// Convert `value` for storage in a slot of type `target`
    pub(crate) fn coerce_value_to_type(
        &self,
        value: Value,
        target: &Type,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if !value.is_initialized() {
            return Ok(value);
        }

        if target.is_array() || target.is_char_buffer() {
            return self.coerce_array(value, target, location);
        }

        if target.pointer_depth > 0 {
            return match value {
                Value::Pointer(_) | Value::Function(_) => Ok(value),
                other => Err(RuntimeError::type_mismatch(
                    format!("cannot store {} in '{}'", other.kind_name(), target),
                    location,
                )),
            };
        }

        match &target.base {
            BaseType::Struct(name) => match value {
                Value::Struct(ref s) if &s.name == name => Ok(value),
                other => Err(self.aggregate_mismatch(&other, target, location)),
            },
            BaseType::Union(name) => match value {
                Value::Union(ref u) if &u.name == name => Ok(value),
                other => Err(self.aggregate_mismatch(&other, target, location)),
            },
            BaseType::Void => Err(RuntimeError::type_mismatch(
                "cannot store a value in 'void'",
                location,
            )),
            base => {
                if matches!(base, BaseType::Int | BaseType::Char) && is_lossy_float(&value) {
                    warn!(
                        value = %value,
                        target = %target,
                        line = location.line,
                        "implicit conversion truncates floating value"
                    );
                }
                convert_scalar(&value, base).ok_or_else(|| {
                    RuntimeError::type_mismatch(
                        format!("cannot convert {} to '{}'", value.kind_name(), target),
                        location,
                    )
                })
            }
        }
    }

    fn aggregate_mismatch(&self, value: &Value, target: &Type, location: SourceLocation) -> RuntimeError {
        let found = match value {
            Value::Struct(s) => format!("struct {}", s.name),
            Value::Union(u) => format!("union {}", u.name),
            other => other.kind_name().to_string(),
        };
        RuntimeError::type_mismatch(format!("cannot assign {} to '{}'", found, target), location)
    }

    fn coerce_array(
        &self,
        value: Value,
        target: &Type,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let Value::Array(elements) = value else {
            return Err(RuntimeError::type_mismatch(
                format!("cannot store {} in '{}'", value.kind_name(), target),
                location,
            ));
        };

        let capacity = match target.array_dims.first() {
            Some(dim) => *dim,
            None => Some(self.config.string_capacity),
        };
        if let Some(capacity) = capacity {
            if elements.len() > capacity {
                if target.is_char_buffer() {
                    let text = Value::Array(elements).as_c_string().unwrap_or_default();
                    if text.len() + 1 > capacity {
                        return Err(RuntimeError::BufferOverflow {
                            len: text.len(),
                            capacity,
                            location,
                        });
                    }
                    return self.coerce_array(
                        Value::c_string(&text, capacity).unwrap_or_default(),
                        target,
                        location,
                    );
                }
                return Err(RuntimeError::type_mismatch(
                    format!(
                        "{} elements do not fit '{}'",
                        elements.len(),
                        target
                    ),
                    location,
                ));
            }
        }

        let element_type = target.element_type();
        let mut coerced = Vec::with_capacity(capacity.unwrap_or(elements.len()));
        for element in elements {
            coerced.push(self.coerce_value_to_type(element, &element_type, location)?);
        }
        if let Some(capacity) = capacity {
            let padding = self.zero_value(&element_type, location)?;
            coerced.resize(capacity, padding);
        }
        Ok(Value::Array(coerced))
    }

    /// Value of a zero-initialized object of type `t`
    pub(crate) fn zero_value(&self, t: &Type, location: SourceLocation) -> Result<Value, RuntimeError> {
        if t.is_array() || t.is_char_buffer() {
            let len = match t.array_dims.first() {
                Some(dim) => dim.ok_or_else(|| {
                    RuntimeError::type_mismatch(format!("size of '{}' is not known", t), location)
                })?,
                None => self.config.string_capacity,
            };
            let element = self.zero_value(&t.element_type(), location)?;
            return Ok(Value::Array(vec![element; len]));
        }
        if t.pointer_depth > 0 {
            return Ok(Value::Uninitialized);
        }

        match &t.base {
            BaseType::Int => Ok(Value::Int(0)),
            BaseType::Char => Ok(Value::Char(0)),
            BaseType::Float | BaseType::Double => Ok(Value::Float(0.0)),
            BaseType::Void | BaseType::String => Ok(Value::Void),
            BaseType::Struct(_) | BaseType::Union(_) => {
                let def = aggregate_def(&t.base, &self.aggregates)
                    .map_err(|e| RuntimeError::from_layout(e, location))?;
                let Some(def) = def else {
                    return Ok(Value::Uninitialized);
                };
                match def.kind {
                    AggregateKind::Struct => {
                        let mut fields = Vec::with_capacity(def.fields.len());
                        for field in &def.fields {
                            fields.push((field.name.clone(), self.zero_value(&field.field_type, location)?));
                        }
                        Ok(Value::Struct(StructValue {
                            name: def.name.clone(),
                            fields,
                        }))
                    }
                    AggregateKind::Union => {
                        let active = match def.fields.first() {
                            Some(first) => Some((
                                first.name.clone(),
                                self.zero_value(&first.field_type, location)?,
                            )),
                            None => None,
                        };
                        Ok(Value::Union(Box::new(UnionValue {
                            name: def.name.clone(),
                            active,
                        })))
                    }
                }
            }
        }
    }

    /// Value of a declaration of type `t` without an initializer
    pub(crate) fn declared_default(&self, t: &Type, location: SourceLocation) -> Result<Value, RuntimeError> {
        default_value(t, &self.aggregates, self.config.string_capacity)
            .map_err(|e| RuntimeError::from_layout(e, location))
    }

    /// Evaluate a declaration initializer against the declared type
    ///
    /// Brace lists fill arrays element by element, structs field by field in
    /// declaration order and unions through their first member; whatever the
    /// list leaves out is zero.
    pub(crate) fn evaluate_initializer(
        &mut self,
        init: &AstNode,
        target: &Type,
    ) -> Result<Value, RuntimeError> {
        let location = init.location();
        let AstNode::InitList { elements, .. } = init else {
            let value = self.evaluate_expr(init)?;
            return self.coerce_value_to_type(value, target, location);
        };

        if target.is_array() || target.is_char_buffer() {
            let element_type = target.element_type();
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(self.evaluate_initializer(element, &element_type)?);
            }
            return self.coerce_value_to_type(Value::Array(values), target, location);
        }

        if target.pointer_depth == 0 {
            if let Some(def) = aggregate_def(&target.base, &self.aggregates)
                .map_err(|e| RuntimeError::from_layout(e, location))?
            {
                let def = def.clone();
                let limit = match def.kind {
                    AggregateKind::Struct => def.fields.len(),
                    AggregateKind::Union => 1,
                };
                if elements.len() > limit {
                    return Err(RuntimeError::type_mismatch(
                        format!("too many initializers for '{}'", target),
                        location,
                    ));
                }

                return match def.kind {
                    AggregateKind::Struct => {
                        let mut fields = Vec::with_capacity(def.fields.len());
                        for (i, field) in def.fields.iter().enumerate() {
                            let value = match elements.get(i) {
                                Some(element) => self.evaluate_initializer(element, &field.field_type)?,
                                None => self.zero_value(&field.field_type, location)?,
                            };
                            fields.push((field.name.clone(), value));
                        }
                        Ok(Value::Struct(StructValue { name: def.name, fields }))
                    }
                    AggregateKind::Union => match (elements.first(), def.fields.first()) {
                        (Some(element), Some(member)) => {
                            let value = self.evaluate_initializer(element, &member.field_type)?;
                            Ok(Value::Union(Box::new(UnionValue {
                                name: def.name,
                                active: Some((member.name.clone(), value)),
                            })))
                        }
                        _ => self.zero_value(target, location),
                    },
                };
            }
        }

        match elements.as_slice() {
            [] => self.zero_value(target, location),
            [single] => self.evaluate_initializer(single, target),
            _ => Err(RuntimeError::type_mismatch(
                format!("too many initializers for '{}'", target),
                location,
            )),
        }
    }

    /// Convert a value to a boolean (for conditionals)
    #[inline]
    pub(crate) fn value_to_bool(val: &Value, location: SourceLocation) -> Result<bool, RuntimeError> {
        match val {
            Value::Int(n) => Ok(*n != 0),
            Value::Char(c) => Ok(*c != 0),
            Value::Float(v) => Ok(*v != 0.0),
            Value::Pointer(_) | Value::Function(_) => Ok(true),
            other => Err(RuntimeError::type_mismatch(
                format!("{} used as a condition", other.kind_name()),
                location,
            )),
        }
    }

    pub(crate) fn evaluate_condition(
        &mut self,
        condition: &AstNode,
        location: SourceLocation,
    ) -> Result<bool, RuntimeError> {
        let value = self.evaluate_expr(condition)?;
        Self::value_to_bool(&value, location)
    }

    /// Size in bytes of a type
    pub(crate) fn size_of(&self, t: &Type, location: SourceLocation) -> Result<usize, RuntimeError> {
        sizeof_type(t, &self.aggregates, self.config.string_capacity)
            .map_err(|e| RuntimeError::from_layout(e, location))
    }

    /// Declared type of member `member` of aggregate type `base`
    pub(crate) fn field_type(
        &self,
        base: &BaseType,
        member: &str,
        location: SourceLocation,
    ) -> Result<Type, RuntimeError> {
        let def = aggregate_def(base, &self.aggregates)
            .map_err(|e| RuntimeError::from_layout(e, location))?
            .ok_or_else(|| {
                RuntimeError::type_mismatch(
                    format!("request for member '{}' in something of type '{}'", member, base),
                    location,
                )
            })?;
        def.field(member)
            .map(|field| field.field_type.clone())
            .ok_or_else(|| RuntimeError::MissingField {
                aggregate: base.to_string(),
                field: member.to_string(),
                location,
            })
    }

    /// Infer the type of an expression without evaluating it
    pub(crate) fn infer_expr_type(&self, expr: &AstNode) -> Result<Type, RuntimeError> {
        match expr {
            AstNode::IntLiteral(..) | AstNode::SizeofType { .. } | AstNode::SizeofExpr { .. } => {
                Ok(Type::new(BaseType::Int))
            }

            AstNode::FloatLiteral(..) => Ok(Type::new(BaseType::Double)),

            AstNode::CharLiteral(..) => Ok(Type::new(BaseType::Char)),

            AstNode::StringLiteral(text, _) => {
                Ok(Type::new(BaseType::Char).with_array(Some(text.len() + 1)))
            }

            AstNode::Variable(name, location) => match self.stack.lookup(name) {
                Ok(var) => Ok(var.var_type.clone()),
                Err(err) => Err(RuntimeError::from_scope(err, *location)),
            },

            AstNode::BinaryOp {
                op, left, right, ..
            } => match op {
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                    let left_type = self.infer_expr_type(left)?;
                    let right_type = self.infer_expr_type(right)?;
                    let rank = |t: &Type| match t.base {
                        BaseType::Double => 2,
                        BaseType::Float => 1,
                        _ => 0,
                    };
                    Ok(match rank(&left_type).max(rank(&right_type)) {
                        2 => Type::new(BaseType::Double),
                        1 => Type::new(BaseType::Float),
                        _ => Type::new(BaseType::Int),
                    })
                }
                _ => Ok(Type::new(BaseType::Int)),
            },

            AstNode::UnaryOp {
                op,
                operand,
                location,
            } => match op {
                UnOp::Deref => {
                    let operand_type = self.infer_expr_type(operand)?;
                    if !operand_type.is_pointer() {
                        return Err(RuntimeError::type_mismatch(
                            format!("cannot dereference '{}'", operand_type),
                            *location,
                        ));
                    }
                    Ok(operand_type.pointee())
                }
                UnOp::AddrOf => Ok(self.infer_expr_type(operand)?.with_pointer()),
                UnOp::Not => Ok(Type::new(BaseType::Int)),
                UnOp::Neg | UnOp::BitNot => {
                    let operand_type = self.infer_expr_type(operand)?;
                    if matches!(operand_type.base, BaseType::Float | BaseType::Double) {
                        Ok(operand_type)
                    } else {
                        Ok(Type::new(BaseType::Int))
                    }
                }
                UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                    self.infer_expr_type(operand)
                }
            },

            AstNode::Assignment { lhs, .. } | AstNode::CompoundAssignment { lhs, .. } => {
                self.infer_expr_type(lhs)
            }

            AstNode::TernaryOp { true_expr, .. } => self.infer_expr_type(true_expr),

            AstNode::FunctionCall { name, location, .. } => match self.functions.get(name) {
                Some(function) => Ok(function.return_type.clone()),
                None => match name.as_str() {
                    "printf" | "scanf" | "puts" => Ok(Type::new(BaseType::Int)),
                    "gets" => Ok(Type::new(BaseType::Char).with_pointer()),
                    _ => Err(RuntimeError::UndefinedFunction {
                        name: name.clone(),
                        location: *location,
                    }),
                },
            },

            AstNode::ArrayAccess { array, location, .. } => {
                let array_type = self.infer_expr_type(array)?;
                if array_type.is_array() || array_type.is_char_buffer() {
                    Ok(array_type.element_type())
                } else if array_type.is_pointer() {
                    Ok(array_type.pointee())
                } else {
                    Err(RuntimeError::type_mismatch(
                        format!("subscripted value of type '{}' is not an array", array_type),
                        *location,
                    ))
                }
            }

            AstNode::MemberAccess {
                object,
                member,
                location,
            } => {
                let object_type = self.infer_expr_type(object)?;
                if object_type.pointer_depth > 0 || object_type.is_array() {
                    return Err(RuntimeError::type_mismatch(
                        format!("'{}' has no members", object_type),
                        *location,
                    ));
                }
                self.field_type(&object_type.base, member, *location)
            }

            AstNode::PointerMemberAccess {
                object,
                member,
                location,
            } => {
                let pointer_type = self.infer_expr_type(object)?;
                if !pointer_type.is_pointer() {
                    return Err(RuntimeError::type_mismatch(
                        format!("'->' applied to non-pointer type '{}'", pointer_type),
                        *location,
                    ));
                }
                self.field_type(&pointer_type.base, member, *location)
            }

            AstNode::Cast { target_type, .. } => Ok(target_type.clone()),

            other => Err(RuntimeError::type_mismatch(
                "expression has no type",
                other.location(),
            )),
        }
    }
}
