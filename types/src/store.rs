use std::sync::RwLock;

use hashbrown::HashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::composite::{ArrayDef, Composite, Field, SigDef, StructDef};
use crate::value::ValType;

/// The policy governing how recursive type equivalence and supertyping are
/// interpreted. Selected by the embedder when the store is created; passes
/// read it to pick strategies but never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSystem {
    /// Structural equivalence with no recursion-group structure.
    Equirecursive,
    /// Recursion groups with structural inter-group references.
    Isorecursive,
    /// Single-parent declared subtyping; every type is its own group.
    Nominal,
}

/// Index of a defined (non-basic) heap type in its [`TypeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefinedType(u32);

impl DefinedType {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A heap type: one of the abstract built-ins, or a composite defined in a
/// [`TypeStore`]. Compared and hashed by identity, never by structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapType {
    Func,
    Extern,
    Any,
    Eq,
    I31,
    Data,
    None,
    Defined(DefinedType),
}

static_assertions::assert_eq_size!(HeapType, [u32; 2]);

impl HeapType {
    /// Whether this is one of the abstract built-in heap types. Basic types
    /// never occupy a type-section entry and are never tracked by passes.
    pub fn is_basic(&self) -> bool {
        !matches!(self, HeapType::Defined(_))
    }
}

/// A recursion group: a contiguous run of defined types that must be emitted
/// together. Compared and hashed by identity. Singleton definitions get a
/// group of size 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecGroup {
    start: u32,
    len: u32,
}

static_assertions::assert_eq_size!(RecGroup, u64);

impl RecGroup {
    pub fn size(self) -> usize {
        self.len as usize
    }

    /// Members in their inherent (declaration) order.
    pub fn members(self) -> impl Iterator<Item = HeapType> {
        (self.start..self.start + self.len).map(|i| HeapType::Defined(DefinedType(i)))
    }
}

/// Errors from defining types. Everything downstream of store construction
/// assumes a validated module and panics on inconsistencies instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("recursion group member {0} was never defined")]
    UndefinedMember(usize),
    #[error("member index {0} out of range for recursion group of size {1}")]
    MemberOutOfRange(usize, usize),
    #[error("supertype must be a defined composite type")]
    UnsupportedSupertype,
}

struct TypeDef {
    // None while the slot is reserved by an unfinished RecGroupBuilder.
    composite: Option<Composite>,
    supertype: Option<DefinedType>,
    group: RecGroup,
}

struct StoreInner {
    defs: Vec<TypeDef>,
    // Deduplicates singleton signatures so structurally equal ones (declared
    // or synthesized) share one identity. Group-defined signatures stay
    // identity-distinct.
    sig_intern: HashMap<SigDef, DefinedType>,
}

/// Interning store for composite heap types.
///
/// The store is internally synchronized, so `&TypeStore` can be shared across
/// threads and [`TypeStore::signature`] may be called concurrently with
/// lookups. Definitions are append-only; a [`HeapType`] handed out once stays
/// valid for the life of the store.
pub struct TypeStore {
    system: TypeSystem,
    inner: RwLock<StoreInner>,
}

impl TypeStore {
    pub fn new(system: TypeSystem) -> Self {
        Self {
            system,
            inner: RwLock::new(StoreInner {
                defs: Vec::new(),
                sig_intern: HashMap::new(),
            }),
        }
    }

    pub fn type_system(&self) -> TypeSystem {
        self.system
    }

    /// Number of defined types, reserved slots included.
    pub fn defined_count(&self) -> usize {
        self.read().defs.len()
    }

    /// Gets or interns the singleton signature `params -> results`.
    ///
    /// Structurally equal singleton signatures always yield the same
    /// [`HeapType`], which is what lets a signature synthesized for a
    /// multivalue block coincide with a declared function type.
    pub fn signature(&self, params: &[ValType], results: &[ValType]) -> HeapType {
        let key = SigDef {
            params: params.to_vec(),
            results: results.to_vec(),
        };
        if let Some(&id) = self.read().sig_intern.get(&key) {
            return HeapType::Defined(id);
        }
        let mut inner = self.write();
        // Raced interns resolve to whichever writer got there first.
        if let Some(&id) = inner.sig_intern.get(&key) {
            return HeapType::Defined(id);
        }
        let id = push_singleton(&mut inner, Composite::Signature(key.clone()));
        inner.sig_intern.insert(key, id);
        HeapType::Defined(id)
    }

    /// Defines a fresh struct type in its own singleton recursion group.
    pub fn struct_type(&self, fields: Vec<Field>) -> HeapType {
        let id = push_singleton(&mut self.write(), Composite::Struct(StructDef { fields }));
        HeapType::Defined(id)
    }

    /// Defines a fresh array type in its own singleton recursion group.
    pub fn array_type(&self, element: Field) -> HeapType {
        let id = push_singleton(&mut self.write(), Composite::Array(ArrayDef { element }));
        HeapType::Defined(id)
    }

    /// Reserves a recursion group of `size` mutually-visible slots.
    ///
    /// The returned builder exposes each member's [`HeapType`] before it is
    /// defined, so members can reference one another; nothing outside the
    /// builder may navigate them until [`RecGroupBuilder::finish`] succeeds.
    pub fn rec_group(&self, size: usize) -> RecGroupBuilder<'_> {
        let mut inner = self.write();
        let group = RecGroup {
            start: inner.defs.len() as u32,
            len: size as u32,
        };
        for _ in 0..size {
            inner.defs.push(TypeDef {
                composite: None,
                supertype: None,
                group,
            });
        }
        drop(inner);
        RecGroupBuilder {
            store: self,
            group,
            members: vec![(None, None); size],
        }
    }

    /// The composite definition of `ht`.
    ///
    /// # Panics
    ///
    /// Panics if `ht` is basic or its group is not yet finished.
    pub fn composite(&self, ht: HeapType) -> Composite {
        self.with_def(ht, |composite, _| composite.clone())
    }

    /// The heap types reachable one structural level down from `ht`.
    ///
    /// # Panics
    ///
    /// Panics if `ht` is basic or its group is not yet finished.
    pub fn heap_type_children(&self, ht: HeapType) -> SmallVec<[HeapType; 4]> {
        self.with_def(ht, |composite, _| composite.heap_type_children())
    }

    /// The heap types `ht` depends on for grouping purposes: its structural
    /// children plus its declared supertype, if any.
    ///
    /// # Panics
    ///
    /// Panics if `ht` is basic or its group is not yet finished.
    pub fn referenced_heap_types(&self, ht: HeapType) -> SmallVec<[HeapType; 4]> {
        self.with_def(ht, |composite, supertype| {
            let mut referenced = composite.heap_type_children();
            if let Some(sup) = supertype {
                referenced.push(HeapType::Defined(sup));
            }
            referenced
        })
    }

    /// The declared supertype of `ht`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `ht` is basic.
    pub fn super_type(&self, ht: HeapType) -> Option<HeapType> {
        let id = defined(ht);
        let inner = self.read();
        inner.defs[id.0 as usize].supertype.map(HeapType::Defined)
    }

    /// The recursion group `ht` belongs to.
    ///
    /// # Panics
    ///
    /// Panics if `ht` is basic.
    pub fn rec_group_of(&self, ht: HeapType) -> RecGroup {
        let id = defined(ht);
        self.read().defs[id.0 as usize].group
    }

    fn with_def<R>(&self, ht: HeapType, f: impl FnOnce(&Composite, Option<DefinedType>) -> R) -> R {
        let id = defined(ht);
        let inner = self.read();
        let def = &inner.defs[id.0 as usize];
        let composite = def
            .composite
            .as_ref()
            .expect("navigated a reserved type slot before its group was finished");
        f(composite, def.supertype)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreInner> {
        self.inner.read().expect("type store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().expect("type store lock poisoned")
    }
}

fn defined(ht: HeapType) -> DefinedType {
    match ht {
        HeapType::Defined(id) => id,
        _ => panic!("heap type navigation on basic type {ht:?}"),
    }
}

fn push_singleton(inner: &mut StoreInner, composite: Composite) -> DefinedType {
    let idx = inner.defs.len() as u32;
    inner.defs.push(TypeDef {
        composite: Some(composite),
        supertype: None,
        group: RecGroup { start: idx, len: 1 },
    });
    DefinedType(idx)
}

/// Two-phase definition of a recursion group. Reserve slots with
/// [`TypeStore::rec_group`], define every member, then [`finish`] to install
/// the group atomically.
///
/// [`finish`]: RecGroupBuilder::finish
pub struct RecGroupBuilder<'s> {
    store: &'s TypeStore,
    group: RecGroup,
    members: Vec<(Option<Composite>, Option<DefinedType>)>,
}

impl RecGroupBuilder<'_> {
    /// The heap type of member `index`, usable in other members' definitions
    /// before `index` itself is defined.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the group.
    pub fn member(&self, index: usize) -> HeapType {
        assert!(
            index < self.group.size(),
            "member index {index} out of range for recursion group of size {}",
            self.group.size()
        );
        HeapType::Defined(DefinedType(self.group.start + index as u32))
    }

    pub fn define_struct(&mut self, index: usize, fields: Vec<Field>) -> Result<(), TypeError> {
        self.slot_mut(index)?.0 = Some(Composite::Struct(StructDef { fields }));
        Ok(())
    }

    pub fn define_array(&mut self, index: usize, element: Field) -> Result<(), TypeError> {
        self.slot_mut(index)?.0 = Some(Composite::Array(ArrayDef { element }));
        Ok(())
    }

    pub fn define_signature(
        &mut self,
        index: usize,
        params: &[ValType],
        results: &[ValType],
    ) -> Result<(), TypeError> {
        self.slot_mut(index)?.0 = Some(Composite::Signature(SigDef {
            params: params.to_vec(),
            results: results.to_vec(),
        }));
        Ok(())
    }

    /// Declares `supertype` as the single supertype of member `index`. The
    /// supertype may be another member of this group or any previously
    /// defined type; basic heap types are not valid supertypes.
    pub fn set_supertype(&mut self, index: usize, supertype: HeapType) -> Result<(), TypeError> {
        let HeapType::Defined(sup) = supertype else {
            return Err(TypeError::UnsupportedSupertype);
        };
        self.slot_mut(index)?.1 = Some(sup);
        Ok(())
    }

    /// Validates that every member was defined and installs the group.
    /// Returns the members' heap types in group order.
    pub fn finish(self) -> Result<Vec<HeapType>, TypeError> {
        for (i, (composite, _)) in self.members.iter().enumerate() {
            if composite.is_none() {
                return Err(TypeError::UndefinedMember(i));
            }
        }
        let mut inner = self.store.write();
        for (i, (composite, supertype)) in self.members.into_iter().enumerate() {
            let def = &mut inner.defs[self.group.start as usize + i];
            def.composite = composite;
            def.supertype = supertype;
        }
        Ok(self.group.members().collect())
    }

    fn slot_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut (Option<Composite>, Option<DefinedType>), TypeError> {
        let size = self.group.size();
        self.members
            .get_mut(index)
            .ok_or(TypeError::MemberOutOfRange(index, size))
    }
}
