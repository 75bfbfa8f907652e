//! Karst type system: value types, composite (heap) type definitions, and
//! the interning store that backs them.
//!
//! # Structure
//!
//! - **Value types**: [`ValType`], [`RefType`], [`Rtt`], and [`Type`], the
//!   types expressions and locals carry.
//! - **Composite definitions**: [`Composite`] and its struct/array/signature
//!   payloads, the shapes that occupy entries in a module's type section.
//! - **The store**: [`TypeStore`] interns composite definitions and hands out
//!   compact [`HeapType`] identifiers. Identity (not structure) is what makes
//!   two heap types equal, so identifiers are cheap to copy, compare, and
//!   hash. Mutually recursive definitions go through [`RecGroupBuilder`],
//!   which reserves a whole recursion group up front so members can refer to
//!   each other before any of them is complete.
//!
//! # Example
//!
//! ```
//! use karst_types::{Field, RefType, TypeStore, TypeSystem, ValType};
//!
//! let store = TypeStore::new(TypeSystem::Isorecursive);
//! let sig = store.signature(&[ValType::I32], &[ValType::I32]);
//!
//! let mut group = store.rec_group(2);
//! let a = group.member(0);
//! let b = group.member(1);
//! group.define_struct(0, vec![Field::immutable(ValType::Ref(RefType::nullable(b)))])?;
//! group.define_struct(1, vec![Field::immutable(ValType::Ref(RefType::nullable(a)))])?;
//! let members = group.finish()?;
//!
//! assert_eq!(store.heap_type_children(members[0]).as_slice(), &[b]);
//! assert!(!sig.is_basic());
//! # Ok::<(), karst_types::TypeError>(())
//! ```

mod composite;
mod store;
mod value;

pub use composite::{ArrayDef, Composite, Field, Mutability, SigDef, Storage, StructDef};
pub use store::{
    DefinedType, HeapType, RecGroup, RecGroupBuilder, TypeError, TypeStore, TypeSystem,
};
pub use value::{RefType, Rtt, TupleTypes, Type, ValType};
