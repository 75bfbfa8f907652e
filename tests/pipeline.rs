//! End-to-end checks of the collection pipeline through the public API.

use bumpalo::Bump;
use karst::{
    Builder, Field, Function, HeapType, Module, RefType, Table, Tag, Type, TypeStore, TypeSystem,
    ValType, collect_heap_types, optimized_heap_type_indices,
};
use pretty_assertions::assert_eq;

/// A linked list of trees and a tree of lists: two mutually recursive
/// structs in one group, plus the signatures that traffic in them.
fn build_module(system: TypeSystem) -> (Module<'static>, Vec<HeapType>) {
    let store = TypeStore::new(system);

    let mut group = store.rec_group(2);
    let list = group.member(0);
    let tree = group.member(1);
    group
        .define_struct(
            0,
            vec![
                Field::immutable(ValType::Ref(RefType::nullable(tree))),
                Field::immutable(ValType::Ref(RefType::nullable(list))),
            ],
        )
        .unwrap();
    group
        .define_struct(
            1,
            vec![
                Field::immutable(ValType::I32),
                Field::mutable(ValType::Ref(RefType::nullable(list))),
            ],
        )
        .unwrap();
    group.finish().unwrap();

    let make_list = store.signature(&[], &[ValType::Ref(RefType::nullable(list))]);
    let consume = store.signature(&[ValType::Ref(RefType::nullable(tree))], &[]);

    let mut module = Module::new(store);
    module.tags.push(Tag { sig: consume });
    module.tables.push(Table {
        elem: RefType::nullable(HeapType::Func),
    });
    module.functions.push(Function {
        sig: make_list,
        vars: vec![ValType::Ref(RefType::nullable(list))],
        body: None,
    });
    (module, vec![list, tree, make_list, consume])
}

#[test]
fn test_universe_is_complete_and_unique() {
    for system in [
        TypeSystem::Equirecursive,
        TypeSystem::Isorecursive,
        TypeSystem::Nominal,
    ] {
        let (module, expected) = build_module(system);
        let universe = collect_heap_types(&module);

        assert_eq!(universe.len(), expected.len());
        for ty in &expected {
            assert!(universe.contains(ty), "missing {ty:?} under {system:?}");
        }
        assert!(universe.iter().all(|ty| !ty.is_basic()));
    }
}

#[test]
fn test_indices_are_contiguous_and_consistent() {
    for system in [
        TypeSystem::Equirecursive,
        TypeSystem::Isorecursive,
        TypeSystem::Nominal,
    ] {
        let (module, _) = build_module(system);
        let universe = collect_heap_types(&module);
        let indexed = optimized_heap_type_indices(&module);

        assert_eq!(indexed.types.len(), universe.len());
        assert_eq!(indexed.indices.len(), universe.len());
        for (i, ty) in indexed.types.iter().enumerate() {
            assert_eq!(indexed.indices[ty], i as u32);
        }
    }
}

#[test]
fn test_grouped_systems_keep_groups_adjacent() {
    let (module, expected) = build_module(TypeSystem::Isorecursive);
    let (list, tree) = (expected[0], expected[1]);

    let indexed = optimized_heap_type_indices(&module);
    let list_index = indexed.indices[&list];
    let tree_index = indexed.indices[&tree];
    assert_eq!(tree_index, list_index + 1, "group order is declaration order");
}

#[test]
fn test_signatures_referencing_group_come_after_it() {
    let (module, expected) = build_module(TypeSystem::Isorecursive);
    let indexed = optimized_heap_type_indices(&module);

    let group_max = indexed.indices[&expected[0]].max(indexed.indices[&expected[1]]);
    for sig in &expected[2..] {
        assert!(indexed.indices[sig] > group_max);
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let (module, _) = build_module(TypeSystem::Isorecursive);
    let first = optimized_heap_type_indices(&module);
    for _ in 0..3 {
        assert_eq!(optimized_heap_type_indices(&module), first);
    }
}

#[test]
fn test_builder_round_trip_through_expressions() {
    let store = TypeStore::new(TypeSystem::Equirecursive);
    let sig = store.signature(&[], &[]);
    let boxed = store.struct_type(vec![Field::mutable(ValType::I32)]);

    let arena = Bump::new();
    let b = Builder::new(&arena);
    let mut module = Module::new(store);
    module.functions.push(Function {
        sig,
        vars: vec![],
        body: Some(b.block(
            Type::None,
            &[
                b.drop(b.struct_new(boxed, &[], None)),
                b.struct_set(0, b.ref_null(boxed), b.i32_const(3)),
            ],
        )),
    });

    let indexed = optimized_heap_type_indices(&module);
    // The struct is mentioned several times, the signature once.
    assert_eq!(indexed.types, vec![boxed, sig]);
}
