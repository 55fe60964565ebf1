//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime values
//! in the C interpreter. Unlike C's raw memory model, values are tagged and type-safe.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 32-bit signed integer
//! - [`Value::Float`]: `float` and `double`; a `float` is stored already
//!   rounded to single precision
//! - [`Value::Char`]: 8-bit signed character
//! - [`Value::Struct`]: fields in declaration order
//! - [`Value::Union`]: the most recently written member, if any
//! - [`Value::Array`]: Fixed-size array of values
//! - [`Value::Function`]: reference to a named function
//! - [`Value::Pointer`]: reference to a [`Place`] produced by `&`
//! - [`Value::Void`]: result of a call to a function that returns nothing
//! - [`Value::Uninitialized`]: Marker for uninitialized memory
//!
//! # Copy Semantics
//!
//! Aggregates own their contents, so `Clone` is a deep copy. Assignment and
//! parameter passing both clone, which gives C's by-value behavior for
//! structs, unions and arrays.

use std::fmt;

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Int(i32),
    Float(f64),
    Char(i8),
    Struct(StructValue),
    Union(Box<UnionValue>),
    Array(Vec<Value>),
    Function(String),
    Pointer(Place),
    Void,
    #[default]
    Uninitialized, // Special marker for uninitialized memory
}

/// A struct instance: type name plus fields in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// A union instance: one storage cell holding the last-written member
#[derive(Debug, Clone, PartialEq)]
pub struct UnionValue {
    pub name: String,
    pub active: Option<(String, Value)>,
}

/// Where a variable lives
///
/// `scope_id` pins a local binding to one activation of its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Global(String),
    Local {
        frame: usize,
        scope: usize,
        scope_id: u64,
        name: String,
    },
}

impl Binding {
    pub fn name(&self) -> &str {
        match self {
            Binding::Global(name) | Binding::Local { name, .. } => name,
        }
    }
}

/// One step from a variable into its contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// An assignable location: a variable plus a field/index path into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub binding: Binding,
    pub path: Vec<PathSegment>,
}

impl Place {
    pub fn new(binding: Binding) -> Self {
        Place {
            binding,
            path: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.path.push(PathSegment::Field(name.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.path.push(PathSegment::Index(index));
        self
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binding.name())?;
        for segment in &self.path {
            match segment {
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

impl Value {
    /// Check if this value is initialized
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Value::Uninitialized)
    }

    /// Short name of the value's kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "floating",
            Value::Char(_) => "char",
            Value::Struct(_) => "struct",
            Value::Union(_) => "union",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Pointer(_) => "pointer",
            Value::Void => "void",
            Value::Uninitialized => "uninitialized",
        }
    }

    /// Build a NUL-terminated char array of `capacity` elements holding `text`.
    ///
    /// Returns `None` when `text` plus its terminator does not fit.
    pub fn c_string(text: &str, capacity: usize) -> Option<Value> {
        let bytes = text.as_bytes();
        if bytes.len() + 1 > capacity {
            return None;
        }
        let mut elements: Vec<Value> = bytes.iter().map(|b| Value::Char(*b as i8)).collect();
        elements.push(Value::Char(0));
        elements.resize(capacity, Value::Uninitialized);
        Some(Value::Array(elements))
    }

    /// Read a char array up to its first NUL (or its end)
    pub fn as_c_string(&self) -> Option<String> {
        let Value::Array(elements) = self else {
            return None;
        };
        let mut bytes = Vec::new();
        for element in elements {
            match element {
                Value::Char(0) => break,
                Value::Char(c) => bytes.push(*c as u8),
                _ => break,
            }
        }
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(v) => write!(f, "{}", v),
            Value::Char(c) => write!(f, "'{}'", *c as u8 as char),
            Value::Struct(s) => {
                write!(f, "struct {} {{", s.name)?;
                for (i, (name, value)) in s.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " .{} = {}", name, value)?;
                }
                write!(f, " }}")
            }
            Value::Union(u) => match &u.active {
                Some((member, value)) => write!(f, "union {} {{ .{} = {} }}", u.name, member, value),
                None => write!(f, "union {} {{ }}", u.name),
            },
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Function(name) => write!(f, "<function {}>", name),
            Value::Pointer(place) => write!(f, "&{}", place),
            Value::Void => write!(f, "void"),
            Value::Uninitialized => write!(f, "<uninitialized>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_string_fits_with_terminator() {
        let value = Value::c_string("hey", 4).expect("fits exactly");
        assert_eq!(value.as_c_string().as_deref(), Some("hey"));
        assert!(Value::c_string("hey!", 4).is_none());
    }

    #[test]
    fn test_struct_clone_is_deep() {
        let original = Value::Struct(StructValue {
            name: "Person".to_string(),
            fields: vec![("age".to_string(), Value::Int(25))],
        });
        let mut copy = original.clone();
        if let Value::Struct(s) = &mut copy {
            *s.field_mut("age").expect("field exists") = Value::Int(30);
        }
        match original {
            Value::Struct(s) => assert_eq!(s.field("age"), Some(&Value::Int(25))),
            other => panic!("Expected struct, got {}", other),
        }
    }

    #[test]
    fn test_union_holding_a_union_copies_deeply() {
        let inner = Value::Union(Box::new(UnionValue {
            name: "Cell".to_string(),
            active: Some(("i".to_string(), Value::Int(1))),
        }));
        let original = Value::Union(Box::new(UnionValue {
            name: "Outer".to_string(),
            active: Some(("cell".to_string(), inner)),
        }));
        let mut copy = original.clone();
        if let Value::Union(u) = &mut copy {
            u.active = None;
        }
        assert_eq!(original.to_string(), "union Outer { .cell = union Cell { .i = 1 } }");
        assert_eq!(copy.to_string(), "union Outer { }");
    }

    #[test]
    fn test_place_display() {
        let place = Place::new(Binding::Global("people".to_string()))
            .index(2)
            .field("age");
        assert_eq!(place.to_string(), "people[2].age");
    }
}
