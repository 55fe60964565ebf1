//! Places: reading and writing through variables, elements and members
//!
//! An assignable expression (`x`, `a[i]`, `s.f`, `p->f`, `*p`) resolves to a
//! [`Place`]: the variable's [`Binding`](crate::memory::value::Binding) plus a
//! path of field names and indices. Reads and writes walk that path through
//! the variable's value.
//!
//! Unions hold only their last-written member. Writing a member makes it
//! active; reading another member converts the stored value to that member's
//! type.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system::convert_scalar;
use crate::memory::value::{PathSegment, Place, Value};
use crate::memory::{default_value, AggregateTable};
use crate::parser::ast::{AstNode, BaseType, SourceLocation, Type, UnOp};

fn stale(place: &Place, location: SourceLocation) -> RuntimeError {
    RuntimeError::InvalidReference {
        message: format!("'{}' no longer exists", place.binding.name()),
        location,
    }
}

fn not_indexable(value: &Value, location: SourceLocation) -> RuntimeError {
    RuntimeError::type_mismatch(
        format!("{} value cannot be subscripted", value.kind_name()),
        location,
    )
}

/// Write `value` at `path` below `slot`
fn store(
    slot: &mut Value,
    path: &[PathSegment],
    value: Value,
    aggregates: &AggregateTable,
    string_capacity: usize,
    location: SourceLocation,
) -> Result<(), RuntimeError> {
    let Some((segment, rest)) = path.split_first() else {
        *slot = value;
        return Ok(());
    };

    match (segment, slot) {
        (PathSegment::Index(i), Value::Array(elements)) => {
            let len = elements.len();
            let element = elements
                .get_mut(*i)
                .ok_or(RuntimeError::IndexOutOfRange {
                    index: *i as i64,
                    len,
                    location,
                })?;
            store(element, rest, value, aggregates, string_capacity, location)
        }
        (PathSegment::Field(name), Value::Struct(s)) => {
            let aggregate = format!("struct {}", s.name);
            let field = s.field_mut(name).ok_or_else(|| RuntimeError::MissingField {
                aggregate,
                field: name.clone(),
                location,
            })?;
            store(field, rest, value, aggregates, string_capacity, location)
        }
        (PathSegment::Field(name), Value::Union(u)) => {
            let is_active = matches!(&u.active, Some((active, _)) if active == name);
            if !is_active {
                // Writing below a member that is not active starts it fresh
                let fresh = if rest.is_empty() {
                    Value::Uninitialized
                } else {
                    let member_type = aggregates
                        .get(&u.name)
                        .and_then(|def| def.field(name))
                        .map(|field| field.field_type.clone())
                        .ok_or_else(|| RuntimeError::MissingField {
                            aggregate: format!("union {}", u.name),
                            field: name.clone(),
                            location,
                        })?;
                    default_value(&member_type, aggregates, string_capacity)
                        .map_err(|e| RuntimeError::from_layout(e, location))?
                };
                u.active = Some((name.clone(), fresh));
            }
            match u.active.as_mut() {
                Some((_, stored)) => store(stored, rest, value, aggregates, string_capacity, location),
                None => Ok(()),
            }
        }
        (PathSegment::Index(_), other) => Err(not_indexable(other, location)),
        (PathSegment::Field(name), other) => Err(RuntimeError::type_mismatch(
            format!("request for member '{}' in {} value", name, other.kind_name()),
            location,
        )),
    }
}

impl Interpreter {
    /// Whether `node` designates storage that can be resolved to a [`Place`]
    pub(crate) fn is_lvalue(&self, node: &AstNode) -> bool {
        match node {
            AstNode::Variable(name, _) => self.stack.resolve(name).is_some(),
            AstNode::ArrayAccess { array, .. } => self.is_lvalue(array),
            AstNode::MemberAccess { object, .. } => self.is_lvalue(object),
            AstNode::PointerMemberAccess { .. } => true,
            AstNode::UnaryOp { op: UnOp::Deref, .. } => true,
            _ => false,
        }
    }

    /// Resolve an assignable expression to its place and declared type
    pub(crate) fn resolve_place(&mut self, node: &AstNode) -> Result<(Place, Type), RuntimeError> {
        match node {
            AstNode::Variable(name, location) => {
                let binding = self.stack.resolve(name).ok_or_else(|| RuntimeError::UnboundName {
                    name: name.clone(),
                    location: *location,
                })?;
                let var_type = self
                    .stack
                    .var(&binding)
                    .map(|var| var.var_type.clone())
                    .ok_or_else(|| RuntimeError::UnboundName {
                        name: name.clone(),
                        location: *location,
                    })?;
                Ok((Place::new(binding), var_type))
            }

            AstNode::ArrayAccess {
                array,
                index,
                location,
            } => {
                let (place, array_type) = if self.is_lvalue(array) {
                    self.resolve_place(array)?
                } else {
                    let value = self.evaluate_expr(array)?;
                    return match value {
                        Value::Pointer(target) => {
                            self.require_zero_index(index, *location)?;
                            let target_type = self.place_type(&target, *location)?;
                            Ok((target, target_type))
                        }
                        other => Err(RuntimeError::type_mismatch(
                            format!("{} value is not assignable", other.kind_name()),
                            *location,
                        )),
                    };
                };

                if array_type.is_pointer() {
                    let target = match self.read_place(&place, *location)? {
                        Value::Pointer(target) => target,
                        _ => {
                            return Err(RuntimeError::UninitializedRead {
                                var: place.to_string(),
                                location: *location,
                            })
                        }
                    };
                    self.require_zero_index(index, *location)?;
                    let target_type = self.place_type(&target, *location)?;
                    return Ok((target, target_type));
                }
                if !array_type.is_array() && !array_type.is_char_buffer() {
                    return Err(RuntimeError::type_mismatch(
                        format!("subscripted value of type '{}' is not an array", array_type),
                        *location,
                    ));
                }

                let index_value = self.evaluate_expr(index)?;
                let i = self.coerce_to_int(&index_value).ok_or_else(|| {
                    RuntimeError::type_mismatch("array subscript is not an integer", *location)
                })?;
                let len = self.place_len(&place, *location)?;
                if i < 0 || i as usize >= len {
                    return Err(RuntimeError::IndexOutOfRange {
                        index: i64::from(i),
                        len,
                        location: *location,
                    });
                }
                Ok((place.index(i as usize), array_type.element_type()))
            }

            AstNode::MemberAccess {
                object,
                member,
                location,
            } => {
                let (place, object_type) = self.resolve_place(object)?;
                if object_type.pointer_depth > 0 {
                    return Err(RuntimeError::type_mismatch(
                        format!(
                            "'{}' is a pointer; use '->' to reach member '{}'",
                            object_type, member
                        ),
                        *location,
                    ));
                }
                if object_type.is_array() {
                    return Err(RuntimeError::type_mismatch(
                        format!("'{}' has no members", object_type),
                        *location,
                    ));
                }
                let field_type = self.field_type(&object_type.base, member, *location)?;
                Ok((place.field(member.clone()), field_type))
            }

            AstNode::PointerMemberAccess {
                object,
                member,
                location,
            } => {
                let target = self.evaluate_pointer(object, *location)?;
                let target_type = self.place_type(&target, *location)?;
                if target_type.pointer_depth > 0 || target_type.is_array() {
                    return Err(RuntimeError::type_mismatch(
                        format!("'->' applied to a pointer to '{}'", target_type),
                        *location,
                    ));
                }
                let field_type = self.field_type(&target_type.base, member, *location)?;
                Ok((target.field(member.clone()), field_type))
            }

            AstNode::UnaryOp {
                op: UnOp::Deref,
                operand,
                location,
            } => {
                let target = self.evaluate_pointer(operand, *location)?;
                let target_type = self.place_type(&target, *location)?;
                Ok((target, target_type))
            }

            other => Err(RuntimeError::type_mismatch(
                "expression is not assignable",
                other.location(),
            )),
        }
    }

    /// Evaluate `node` to the place a pointer value refers to
    pub(crate) fn evaluate_pointer(
        &mut self,
        node: &AstNode,
        location: SourceLocation,
    ) -> Result<Place, RuntimeError> {
        match self.evaluate_expr(node)? {
            Value::Pointer(target) => {
                if self.stack.var(&target.binding).is_none() {
                    return Err(stale(&target, location));
                }
                Ok(target)
            }
            other => Err(RuntimeError::type_mismatch(
                format!("cannot dereference {} value", other.kind_name()),
                location,
            )),
        }
    }

    fn require_zero_index(&mut self, index: &AstNode, location: SourceLocation) -> Result<(), RuntimeError> {
        let index_value = self.evaluate_expr(index)?;
        match self.coerce_to_int(&index_value) {
            Some(0) => Ok(()),
            Some(_) => Err(RuntimeError::InvalidReference {
                message: "pointer arithmetic is not supported".to_string(),
                location,
            }),
            None => Err(RuntimeError::type_mismatch(
                "array subscript is not an integer",
                location,
            )),
        }
    }

    /// Declared type of the storage a place names
    pub(crate) fn place_type(&self, place: &Place, location: SourceLocation) -> Result<Type, RuntimeError> {
        let var = self
            .stack
            .var(&place.binding)
            .ok_or_else(|| stale(place, location))?;
        let mut t = var.var_type.clone();
        for segment in &place.path {
            t = match segment {
                PathSegment::Field(name) => self.field_type(&t.base, name, location)?,
                PathSegment::Index(_) => t.element_type(),
            };
        }
        Ok(t)
    }

    /// Current length of the array stored at `place`
    pub(crate) fn place_len(&self, place: &Place, location: SourceLocation) -> Result<usize, RuntimeError> {
        let len_of = |value: &Value| match value {
            Value::Array(elements) => Ok(elements.len()),
            other => Err(not_indexable(other, location)),
        };
        match self.peek_place(place) {
            Some(value) => len_of(value),
            None => len_of(&self.read_place(place, location)?),
        }
    }

    /// Borrow the value at `place` when no conversion is needed to reach it
    fn peek_place(&self, place: &Place) -> Option<&Value> {
        let mut current = &self.stack.var(&place.binding)?.value;
        for segment in &place.path {
            current = match (segment, current) {
                (PathSegment::Index(i), Value::Array(elements)) => elements.get(*i)?,
                (PathSegment::Field(name), Value::Struct(s)) => s.field(name)?,
                (PathSegment::Field(name), Value::Union(u)) => match &u.active {
                    Some((active, stored)) if active == name => stored,
                    _ => return None,
                },
                _ => return None,
            };
        }
        Some(current)
    }

    /// Read the value stored at `place`
    pub(crate) fn read_place(&self, place: &Place, location: SourceLocation) -> Result<Value, RuntimeError> {
        let var = self
            .stack
            .var(&place.binding)
            .ok_or_else(|| stale(place, location))?;
        self.project(&var.value, &place.path, location)
    }

    /// Follow `path` below `value`, converting through inactive union members
    pub(crate) fn project(
        &self,
        value: &Value,
        path: &[PathSegment],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let Some((segment, rest)) = path.split_first() else {
            return Ok(value.clone());
        };

        match (segment, value) {
            (_, Value::Uninitialized) => Ok(Value::Uninitialized),
            (PathSegment::Index(i), Value::Array(elements)) => match elements.get(*i) {
                Some(element) => self.project(element, rest, location),
                None => Err(RuntimeError::IndexOutOfRange {
                    index: *i as i64,
                    len: elements.len(),
                    location,
                }),
            },
            (PathSegment::Field(name), Value::Struct(s)) => {
                let field = s.field(name).ok_or_else(|| RuntimeError::MissingField {
                    aggregate: format!("struct {}", s.name),
                    field: name.clone(),
                    location,
                })?;
                self.project(field, rest, location)
            }
            (PathSegment::Field(name), Value::Union(u)) => {
                let member_type = self.field_type(&BaseType::Union(u.name.clone()), name, location)?;
                match &u.active {
                    Some((active, stored)) if active == name => self.project(stored, rest, location),
                    Some((active, stored)) => {
                        let converted = if member_type.is_numeric() {
                            convert_scalar(stored, &member_type.base)
                        } else {
                            None
                        };
                        let converted = converted.ok_or_else(|| {
                            RuntimeError::type_mismatch(
                                format!(
                                    "union {} holds '{}'; it cannot be read as '{}'",
                                    u.name, active, name
                                ),
                                location,
                            )
                        })?;
                        self.project(&converted, rest, location)
                    }
                    None => Ok(Value::Uninitialized),
                }
            }
            (PathSegment::Index(_), other) => Err(not_indexable(other, location)),
            (PathSegment::Field(name), other) => Err(RuntimeError::type_mismatch(
                format!("request for member '{}' in {} value", name, other.kind_name()),
                location,
            )),
        }
    }

    /// Store an already converted value at `place`
    pub(crate) fn write_place(
        &mut self,
        place: &Place,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let string_capacity = self.config.string_capacity;
        let var = self
            .stack
            .var_mut(&place.binding)
            .ok_or_else(|| stale(place, location))?;
        store(
            &mut var.value,
            &place.path,
            value,
            &self.aggregates,
            string_capacity,
            location,
        )
    }

    /// Read an element or member in value context
    ///
    /// Reading an uninitialized scalar is an error; aggregates may still hold
    /// uninitialized parts.
    pub(crate) fn evaluate_access(&mut self, node: &AstNode) -> Result<Value, RuntimeError> {
        let location = node.location();

        if self.is_lvalue(node) {
            let (place, _) = self.resolve_place(node)?;
            let value = self.read_place(&place, location)?;
            if !value.is_initialized() {
                return Err(RuntimeError::UninitializedRead {
                    var: place.to_string(),
                    location,
                });
            }
            return Ok(value);
        }

        let (container, segment) = match node {
            AstNode::ArrayAccess { array, index, .. } => {
                let array_value = self.evaluate_expr(array)?;
                let index_value = self.evaluate_expr(index)?;
                let i = self.coerce_to_int(&index_value).ok_or_else(|| {
                    RuntimeError::type_mismatch("array subscript is not an integer", location)
                })?;
                let len = match &array_value {
                    Value::Array(elements) => elements.len(),
                    other => return Err(not_indexable(other, location)),
                };
                if i < 0 || i as usize >= len {
                    return Err(RuntimeError::IndexOutOfRange {
                        index: i64::from(i),
                        len,
                        location,
                    });
                }
                (array_value, PathSegment::Index(i as usize))
            }
            AstNode::MemberAccess { object, member, .. } => {
                (self.evaluate_expr(object)?, PathSegment::Field(member.clone()))
            }
            other => {
                return Err(RuntimeError::type_mismatch(
                    "expression is not assignable",
                    other.location(),
                ))
            }
        };

        let value = self.project(&container, &[segment], location)?;
        if !value.is_initialized() {
            return Err(RuntimeError::type_mismatch(
                "read of an uninitialized member of a temporary",
                location,
            ));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::test_support::{run_error, run_source};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_union_last_write_wins() {
        let output = run_source(
            r#"
            union Data { int i; float f; };
            int main() {
                union Data d;
                d.i = 100;
                printf("%d ", d.i);
                d.f = 3.14;
                printf("%f ", d.f);
                printf("%d", d.i);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "100 3.140000 3");
    }

    #[test]
    fn test_nested_members_and_elements() {
        let output = run_source(
            r#"
            struct Point { int x; int y; };
            struct Shape { struct Point corners[2]; char tag; };
            int main() {
                struct Shape s;
                s.corners[1].y = 9;
                s.tag = 'q';
                printf("%d %c", s.corners[1].y, s.tag);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "9 q");
    }

    #[test]
    fn test_index_out_of_range() {
        let err = run_error("int main() { int a[3]; a[3] = 1; return 0; }");
        assert!(matches!(
            err,
            RuntimeError::IndexOutOfRange { index: 3, len: 3, .. }
        ));
        let err = run_error("int main() { int a[3]; int i = -1; return a[i]; }");
        assert!(matches!(
            err,
            RuntimeError::IndexOutOfRange { index: -1, len: 3, .. }
        ));
    }

    #[test]
    fn test_pointer_to_struct_member() {
        let output = run_source(
            r#"
            struct Counter { int hits; };
            void bump(struct Counter *c) { c->hits = c->hits + 1; }
            int main() {
                struct Counter c;
                c.hits = 0;
                bump(&c);
                bump(&c);
                printf("%d", c.hits);
                return 0;
            }
            "#,
        );
        assert_eq!(output, "2");
    }

    #[test]
    fn test_uninitialized_member_read() {
        let err = run_error(
            r#"
            struct P { int age; };
            int main() { struct P p; return p.age; }
            "#,
        );
        match err {
            RuntimeError::UninitializedRead { var, .. } => assert_eq!(var, "p.age"),
            other => panic!("Expected UninitializedRead, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field() {
        let err = run_error(
            r#"
            struct P { int age; };
            int main() { struct P p; p.height = 3; return 0; }
            "#,
        );
        assert!(matches!(err, RuntimeError::MissingField { .. }));
    }
}
