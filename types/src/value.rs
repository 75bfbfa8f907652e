use smallvec::SmallVec;

use crate::store::HeapType;

/// A reference to a heap type, possibly nullable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefType {
    pub nullable: bool,
    pub heap: HeapType,
}

impl RefType {
    pub fn nullable(heap: HeapType) -> Self {
        Self {
            nullable: true,
            heap,
        }
    }

    pub fn non_nullable(heap: HeapType) -> Self {
        Self {
            nullable: false,
            heap,
        }
    }
}

/// A runtime type descriptor value. `depth` is the subtyping depth when the
/// descriptor came from a `rtt.sub` chain; canonical descriptors leave it
/// unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rtt {
    pub depth: Option<u32>,
    pub heap: HeapType,
}

/// A single value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValType {
    I32,
    I64,
    F32,
    F64,
    V128,
    Ref(RefType),
    Rtt(Rtt),
}

impl ValType {
    pub fn is_ref(&self) -> bool {
        matches!(self, ValType::Ref(_))
    }

    /// The heap type this value type carries, for references and RTTs.
    pub fn heap_type(&self) -> Option<HeapType> {
        match self {
            ValType::Ref(r) => Some(r.heap),
            ValType::Rtt(rtt) => Some(rtt.heap),
            _ => None,
        }
    }
}

pub type TupleTypes = SmallVec<[ValType; 2]>;

/// The type of an expression: nothing, unreachable, a single value, or a
/// tuple of values (multivalue results).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    None,
    Unreachable,
    Val(ValType),
    Tuple(TupleTypes),
}

impl Type {
    pub fn is_tuple(&self) -> bool {
        matches!(self, Type::Tuple(_))
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, Type::Val(v) if v.is_ref())
    }

    /// The heap type of a single reference or RTT value.
    pub fn heap_type(&self) -> Option<HeapType> {
        match self {
            Type::Val(v) => v.heap_type(),
            _ => None,
        }
    }

    /// Calls `f` for every heap type mentioned one level down: the heap type
    /// of a reference or RTT value, or of each element of a tuple.
    pub fn for_each_heap_type(&self, mut f: impl FnMut(HeapType)) {
        match self {
            Type::None | Type::Unreachable => {}
            Type::Val(v) => {
                if let Some(ht) = v.heap_type() {
                    f(ht);
                }
            }
            Type::Tuple(elems) => {
                for elem in elems {
                    if let Some(ht) = elem.heap_type() {
                        f(ht);
                    }
                }
            }
        }
    }

    /// The heap types mentioned one level down, collected.
    pub fn heap_type_children(&self) -> SmallVec<[HeapType; 2]> {
        let mut children = SmallVec::new();
        self.for_each_heap_type(|ht| children.push(ht));
        children
    }
}

impl From<ValType> for Type {
    fn from(v: ValType) -> Self {
        Type::Val(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TypeStore, TypeSystem};
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    #[test]
    fn test_heap_type_children() {
        let store = TypeStore::new(TypeSystem::Isorecursive);
        let a = store.signature(&[], &[]);
        let b = store.signature(&[ValType::I32], &[]);

        assert!(Type::None.heap_type_children().is_empty());
        assert!(Type::Val(ValType::I64).heap_type_children().is_empty());
        assert_eq!(
            Type::Val(ValType::Ref(RefType::nullable(a)))
                .heap_type_children()
                .as_slice(),
            &[a]
        );
        assert_eq!(
            Type::Val(ValType::Rtt(Rtt {
                depth: Some(1),
                heap: b
            }))
            .heap_type_children()
            .as_slice(),
            &[b]
        );

        let tuple = Type::Tuple(smallvec![
            ValType::I32,
            ValType::Ref(RefType::non_nullable(a)),
            ValType::Ref(RefType::nullable(b)),
        ]);
        assert_eq!(tuple.heap_type_children().as_slice(), &[a, b]);
    }

    #[test]
    fn test_single_ref_helpers() {
        let store = TypeStore::new(TypeSystem::Nominal);
        let sig = store.signature(&[], &[]);
        let ty = Type::Val(ValType::Ref(RefType::non_nullable(sig)));

        assert!(ty.is_ref());
        assert!(!ty.is_tuple());
        assert_eq!(ty.heap_type(), Some(sig));
        assert_eq!(Type::Unreachable.heap_type(), None);
    }
}
