//! Memory model for the C interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (scalars, aggregates, places)
//! - [`stack`]: Global scope, call frames and block scopes
//!
//! # Type Sizes
//!
//! Unlike real C, this interpreter uses fixed, platform-independent sizes:
//! - `int`: 4 bytes
//! - `float`: 4 bytes, `double`: 8 bytes
//! - `char`: 1 byte
//! - `pointer`: 8 bytes (regardless of pointee type)
//! - `struct`: sum of field sizes (no padding or alignment)
//! - `union`: size of the largest member
//! - `string`: its configured capacity

pub mod stack;
pub mod value;

use crate::parser::ast::{AggregateDef, AggregateKind, BaseType, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use value::{StructValue, UnionValue, Value};

/// Aggregate definitions by tag name
pub type AggregateTable = FxHashMap<String, AggregateDef>;

/// Failures computing a type's layout or default value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("unknown {0} '{1}'")]
    UnknownAggregate(&'static str, String),
    #[error("array dimension of '{0}' is not known")]
    UnsizedArray(Type),
}

fn aggregate_keyword(base: &BaseType) -> &'static str {
    match base {
        BaseType::Union(_) => "union",
        _ => "struct",
    }
}

/// Look up the definition behind a struct/union base type
pub fn aggregate_def<'a>(
    base: &BaseType,
    aggregates: &'a AggregateTable,
) -> Result<Option<&'a AggregateDef>, LayoutError> {
    let (name, kind) = match base {
        BaseType::Struct(name) => (name, AggregateKind::Struct),
        BaseType::Union(name) => (name, AggregateKind::Union),
        _ => return Ok(None),
    };
    match aggregates.get(name) {
        Some(def) if def.kind == kind => Ok(Some(def)),
        _ => Err(LayoutError::UnknownAggregate(
            aggregate_keyword(base),
            name.clone(),
        )),
    }
}

/// Whether aggregate `name` holds itself by value, directly or through
/// other aggregates' fields
///
/// Such a type has no finite size. Pointers break the chain.
pub fn contains_itself(name: &str, aggregates: &AggregateTable) -> bool {
    let mut seen = FxHashSet::default();
    let mut pending = vec![name];
    while let Some(current) = pending.pop() {
        let Some(def) = aggregates.get(current) else {
            continue;
        };
        for field in &def.fields {
            if field.field_type.pointer_depth > 0 {
                continue;
            }
            let (BaseType::Struct(inner) | BaseType::Union(inner)) = &field.field_type.base else {
                continue;
            };
            if inner == name {
                return true;
            }
            if seen.insert(inner.as_str()) {
                pending.push(inner);
            }
        }
    }
    false
}

/// Calculate the size of a type in bytes
pub fn sizeof_type(
    t: &Type,
    aggregates: &AggregateTable,
    string_capacity: usize,
) -> Result<usize, LayoutError> {
    let base_size = if t.pointer_depth > 0 {
        8
    } else {
        match &t.base {
            BaseType::Int | BaseType::Float => 4,
            BaseType::Double => 8,
            BaseType::Char => 1,
            BaseType::Void => 0,
            BaseType::String => string_capacity,
            BaseType::Struct(_) | BaseType::Union(_) => {
                let def = aggregate_def(&t.base, aggregates)?
                    .ok_or_else(|| LayoutError::UnknownAggregate("struct", t.base.to_string()))?;
                let mut sizes = Vec::with_capacity(def.fields.len());
                for field in &def.fields {
                    sizes.push(sizeof_type(&field.field_type, aggregates, string_capacity)?);
                }
                match def.kind {
                    AggregateKind::Struct => sizes.iter().sum(),
                    AggregateKind::Union => sizes.into_iter().max().unwrap_or(0),
                }
            }
        }
    };

    t.array_dims.iter().try_fold(base_size, |size, dim| match dim {
        Some(n) => Ok(size * n),
        None => Err(LayoutError::UnsizedArray(t.clone())),
    })
}

/// Default value of a freshly declared variable of type `t`
///
/// Scalars start [`Value::Uninitialized`]; structs get every field defaulted;
/// unions start with no active member; arrays hold default elements.
pub fn default_value(
    t: &Type,
    aggregates: &AggregateTable,
    string_capacity: usize,
) -> Result<Value, LayoutError> {
    if let Some((dim, rest)) = t.array_dims.split_first() {
        let len = dim.ok_or_else(|| LayoutError::UnsizedArray(t.clone()))?;
        let mut element_type = t.clone();
        element_type.array_dims = rest.to_vec();
        let element = default_value(&element_type, aggregates, string_capacity)?;
        return Ok(Value::Array(vec![element; len]));
    }
    if t.pointer_depth > 0 {
        return Ok(Value::Uninitialized);
    }

    match &t.base {
        BaseType::String => Ok(Value::Array(vec![Value::Uninitialized; string_capacity])),
        BaseType::Struct(_) | BaseType::Union(_) => {
            let Some(def) = aggregate_def(&t.base, aggregates)? else {
                return Ok(Value::Uninitialized);
            };
            match def.kind {
                AggregateKind::Struct => {
                    let mut fields = Vec::with_capacity(def.fields.len());
                    for field in &def.fields {
                        let value = default_value(&field.field_type, aggregates, string_capacity)?;
                        fields.push((field.name.clone(), value));
                    }
                    Ok(Value::Struct(StructValue {
                        name: def.name.clone(),
                        fields,
                    }))
                }
                AggregateKind::Union => Ok(Value::Union(Box::new(UnionValue {
                    name: def.name.clone(),
                    active: None,
                }))),
            }
        }
        _ => Ok(Value::Uninitialized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Field;

    fn table() -> AggregateTable {
        let mut aggregates = AggregateTable::default();
        aggregates.insert(
            "Person".to_string(),
            AggregateDef {
                kind: AggregateKind::Struct,
                name: "Person".to_string(),
                fields: vec![
                    Field {
                        name: "age".to_string(),
                        field_type: Type::new(BaseType::Int),
                    },
                    Field {
                        name: "initial".to_string(),
                        field_type: Type::new(BaseType::Char),
                    },
                ],
            },
        );
        aggregates.insert(
            "Data".to_string(),
            AggregateDef {
                kind: AggregateKind::Union,
                name: "Data".to_string(),
                fields: vec![
                    Field {
                        name: "i".to_string(),
                        field_type: Type::new(BaseType::Int),
                    },
                    Field {
                        name: "d".to_string(),
                        field_type: Type::new(BaseType::Double),
                    },
                ],
            },
        );
        aggregates
    }

    #[test]
    fn test_sizes() {
        let aggregates = table();
        let size = |t: Type| sizeof_type(&t, &aggregates, 256).unwrap();

        assert_eq!(size(Type::new(BaseType::Int)), 4);
        assert_eq!(size(Type::new(BaseType::Double)), 8);
        assert_eq!(size(Type::new(BaseType::Char).with_pointer()), 8);
        assert_eq!(size(Type::new(BaseType::Struct("Person".to_string()))), 5);
        assert_eq!(size(Type::new(BaseType::Union("Data".to_string()))), 8);
        assert_eq!(size(Type::new(BaseType::Int).with_array(Some(10))), 40);
        assert_eq!(size(Type::new(BaseType::String)), 256);
    }

    #[test]
    fn test_struct_tag_is_not_a_union_tag() {
        let aggregates = table();
        let t = Type::new(BaseType::Union("Person".to_string()));
        assert!(matches!(
            sizeof_type(&t, &aggregates, 256),
            Err(LayoutError::UnknownAggregate("union", _))
        ));
    }

    #[test]
    fn test_default_values() {
        let aggregates = table();
        let person = default_value(
            &Type::new(BaseType::Struct("Person".to_string())),
            &aggregates,
            256,
        )
        .unwrap();
        match person {
            Value::Struct(s) => {
                assert_eq!(s.fields.len(), 2);
                assert_eq!(s.field("age"), Some(&Value::Uninitialized));
            }
            other => panic!("Expected struct, got {}", other),
        }

        let grid = default_value(
            &Type::new(BaseType::Int).with_array(Some(2)).with_array(Some(3)),
            &aggregates,
            256,
        )
        .unwrap();
        match grid {
            Value::Array(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(matches!(&rows[0], Value::Array(cols) if cols.len() == 3));
            }
            other => panic!("Expected array, got {}", other),
        }
    }

    #[test]
    fn test_contains_itself() {
        let mut aggregates = table();
        let by_value = |name: &str| Field {
            name: "next".to_string(),
            field_type: Type::new(BaseType::Struct(name.to_string())),
        };
        aggregates.insert(
            "Node".to_string(),
            AggregateDef {
                kind: AggregateKind::Struct,
                name: "Node".to_string(),
                fields: vec![Field {
                    name: "next".to_string(),
                    field_type: Type::new(BaseType::Struct("Node".to_string())).with_pointer(),
                }],
            },
        );
        aggregates.insert(
            "A".to_string(),
            AggregateDef {
                kind: AggregateKind::Struct,
                name: "A".to_string(),
                fields: vec![by_value("B")],
            },
        );
        aggregates.insert(
            "B".to_string(),
            AggregateDef {
                kind: AggregateKind::Struct,
                name: "B".to_string(),
                fields: vec![by_value("A")],
            },
        );

        assert!(!contains_itself("Person", &aggregates));
        assert!(!contains_itself("Node", &aggregates));
        assert!(contains_itself("A", &aggregates));
        assert!(contains_itself("B", &aggregates));
    }
}
