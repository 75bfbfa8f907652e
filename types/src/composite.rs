use smallvec::SmallVec;

use crate::store::HeapType;
use crate::value::ValType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    Const,
    Var,
}

/// Storage of a struct field or array element: a full value type or one of
/// the packed integer forms that only exist inside composites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    I8,
    I16,
    Val(ValType),
}

impl Storage {
    pub fn heap_type(&self) -> Option<HeapType> {
        match self {
            Storage::I8 | Storage::I16 => None,
            Storage::Val(v) => v.heap_type(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub storage: Storage,
    pub mutability: Mutability,
}

impl Field {
    pub fn immutable(v: ValType) -> Self {
        Self {
            storage: Storage::Val(v),
            mutability: Mutability::Const,
        }
    }

    pub fn mutable(v: ValType) -> Self {
        Self {
            storage: Storage::Val(v),
            mutability: Mutability::Var,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructDef {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayDef {
    pub element: Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SigDef {
    pub params: Vec<ValType>,
    pub results: Vec<ValType>,
}

/// The definition of one heap type: the shape that a type-section entry
/// encodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Composite {
    Struct(StructDef),
    Array(ArrayDef),
    Signature(SigDef),
}

impl Composite {
    /// The heap types reachable one structural level down: field, element,
    /// param, and result heap types, in declaration order.
    pub fn heap_type_children(&self) -> SmallVec<[HeapType; 4]> {
        let mut children = SmallVec::new();
        let mut push = |ht: Option<HeapType>| {
            if let Some(ht) = ht {
                children.push(ht);
            }
        };
        match self {
            Composite::Struct(s) => {
                for field in &s.fields {
                    push(field.storage.heap_type());
                }
            }
            Composite::Array(a) => push(a.element.storage.heap_type()),
            Composite::Signature(sig) => {
                for param in &sig.params {
                    push(param.heap_type());
                }
                for result in &sig.results {
                    push(result.heap_type());
                }
            }
        }
        children
    }
}
