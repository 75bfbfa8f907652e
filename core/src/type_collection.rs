//! Heap-type collection and type-section index assignment.
//!
//! This pass answers two questions for a downstream binary encoder: which
//! composite types does this module use anywhere, and in what order should
//! the type section declare them. Collection walks every place a heap type
//! can be mentioned, saturates the result over structural children,
//! supertypes, and recursion-group co-members, and finally orders the
//! universe with a strategy keyed on the store's [`TypeSystem`]:
//!
//! - a flat (equirecursive) store sorts by use count, most used first, ties
//!   broken by discovery order so indices stay small for hot types;
//! - a grouping (isorecursive or nominal) store topologically sorts whole
//!   recursion groups, dependency-first, seeding the sort by average use
//!   count so frequently used groups come as early as their dependencies
//!   allow.
//!
//! The pass never mutates the module, and its output is deterministic for a
//! given module regardless of how many workers scan function bodies.

use hashbrown::{HashMap, HashSet};
use karst_insert_ordered::{InsertOrderedMap, InsertOrderedSet};
use karst_topo_sort::topological_sort;
use karst_types::{HeapType, RecGroup, Type, TypeStore, TypeSystem, ValType};

use crate::expr::{BrOnOp, ExprKind, ExprRef};
use crate::module::Module;
use crate::parallel::analyze_functions;
use crate::visitor::{Visitor, walk_expr, walk_module_code};

/// The final type-section layout: types in serialization order plus the
/// index of each. `indices[types[i]] == i` for every `i`, and indices are
/// contiguous from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedHeapTypes {
    pub types: Vec<HeapType>,
    pub indices: HashMap<HeapType, u32>,
}

impl IndexedHeapTypes {
    fn from_types(types: Vec<HeapType>) -> Self {
        let indices = types
            .iter()
            .enumerate()
            .map(|(i, &ty)| (ty, i as u32))
            .collect();
        Self { types, indices }
    }
}

/// Heap types and how often each is used, in discovery order. Basic heap
/// types are never tracked.
#[derive(Default)]
struct Counts(InsertOrderedMap<HeapType, usize>);

impl Counts {
    fn note(&mut self, ty: HeapType) {
        if !ty.is_basic() {
            *self.0.get_or_insert_with(ty, || 0) += 1;
        }
    }

    fn note_val(&mut self, ty: ValType) {
        if let Some(heap) = ty.heap_type() {
            self.note(heap);
        }
    }

    fn note_type(&mut self, ty: &Type) {
        ty.for_each_heap_type(|heap| self.note(heap));
    }

    /// Ensures a type is present without increasing its count.
    fn include(&mut self, ty: HeapType) {
        if !ty.is_basic() {
            self.0.get_or_insert_with(ty, || 0);
        }
    }

    fn contains(&self, ty: HeapType) -> bool {
        self.0.contains_key(&ty)
    }
}

struct CodeScanner<'m> {
    store: &'m TypeStore,
    counts: &'m mut Counts,
}

impl<'a> Visitor<'a> for CodeScanner<'_> {
    fn visit_expr(&mut self, expr: ExprRef<'a>) {
        match expr.kind {
            ExprKind::CallIndirect { sig, .. } => self.counts.note(sig),
            ExprKind::RefNull => self.counts.note_type(&expr.ty),
            ExprKind::RttCanon | ExprKind::RttSub { .. } => {
                if let Type::Val(ValType::Rtt(rtt)) = &expr.ty {
                    self.counts.note(rtt.heap);
                }
            }
            ExprKind::StructNew { rtt, .. }
            | ExprKind::ArrayNew { rtt, .. }
            | ExprKind::ArrayInit { rtt, .. } => {
                // The constructed type is only encoded when the operation is
                // static; with an RTT operand the RTT supplies it.
                if rtt.is_none() && expr.ty != Type::Unreachable {
                    if let Some(heap) = expr.ty.heap_type() {
                        self.counts.note(heap);
                    }
                }
            }
            ExprKind::RefTest { intended, rtt, .. } | ExprKind::RefCast { intended, rtt, .. } => {
                if rtt.is_none() {
                    self.counts.note(intended);
                }
            }
            ExprKind::BrOn {
                op: BrOnOp::Cast(intended) | BrOnOp::CastFail(intended),
                rtt,
                ..
            } => {
                if rtt.is_none() {
                    self.counts.note(intended);
                }
            }
            ExprKind::StructGet { object, .. } => self.counts.note_type(&object.ty),
            ExprKind::StructSet { object, .. } => self.counts.note_type(&object.ty),
            ExprKind::LocalGet { .. } | ExprKind::LocalSet { .. } => {
                // A local's type can be refined ahead of the enclosing
                // function's signature while a signature update is in
                // flight. Include, rather than note, so the type is
                // represented even when this is its only appearance, without
                // distorting frequency order.
                if expr.ty.is_ref() {
                    if let Some(heap) = expr.ty.heap_type() {
                        self.counts.include(heap);
                    }
                }
            }
            ExprKind::Block { .. } | ExprKind::Loop { .. } | ExprKind::If { .. } => {
                match &expr.ty {
                    // A tuple result is encoded as a signature with no
                    // params, so the type section needs that signature.
                    Type::Tuple(elems) => {
                        let sig = self.store.signature(&[], elems);
                        self.counts.note(sig);
                    }
                    ty => self.counts.note_type(ty),
                }
            }
            _ => {}
        }
    }
}

/// Counts every direct mention of a heap type, then saturates the map so
/// everything the type section must encode is present.
fn heap_type_counts(module: &Module<'_>) -> Counts {
    let mut counts = Counts::default();

    // Module-level code and declarations, scanned sequentially.
    let mut scanner = CodeScanner {
        store: &module.store,
        counts: &mut counts,
    };
    walk_module_code(&mut scanner, module);
    for tag in &module.tags {
        counts.note(tag.sig);
    }
    for table in &module.tables {
        counts.note(table.elem.heap);
    }
    for segment in &module.element_segments {
        counts.note(segment.elem.heap);
    }

    // Function bodies in parallel, each into a private map.
    let function_counts = analyze_functions(module, |func| {
        let mut counts = Counts::default();
        counts.note(func.sig);
        for &var in &func.vars {
            counts.note_val(var);
        }
        if let Some(body) = func.body {
            let mut scanner = CodeScanner {
                store: &module.store,
                counts: &mut counts,
            };
            walk_expr(&mut scanner, body);
        }
        counts
    });

    // Merge in declaration order; together with the order-preserving collect
    // above this keeps the result independent of scheduling.
    for function_counts in function_counts {
        for &(ty, count) in function_counts.0.iter() {
            *counts.0.get_or_insert_with(ty, || 0) += count;
        }
    }
    tracing::debug!(direct = counts.0.len(), "scanned heap type uses");

    // Each counted type may pull in more types: children appear in the type
    // section as part of the parent's entry, a recursion group is emitted
    // whole, and declared supertypes need entries of their own. Iterate to a
    // fixpoint; the processed-group set keeps one large group from being
    // rescanned per member.
    let mut new_types: InsertOrderedSet<HeapType> = counts.0.keys().copied().collect();
    let mut included_groups: HashSet<RecGroup> = HashSet::new();
    while let Some(ty) = new_types.pop_front() {
        for child in module.store.heap_type_children(ty) {
            if !child.is_basic() {
                if !counts.contains(child) {
                    new_types.insert(child);
                }
                counts.note(child);
            }
        }

        if let Some(sup) = module.store.super_type(ty) {
            if !counts.contains(sup) {
                new_types.insert(sup);
                // TODO: count supertypes like any other child once output
                // orderings no longer need to stay comparable across type
                // systems.
                counts.include(sup);
            }
        }

        let group = module.store.rec_group_of(ty);
        if included_groups.insert(group) {
            for member in group.members() {
                if !counts.contains(member) {
                    new_types.insert(member);
                    counts.include(member);
                }
            }
        }
    }
    counts
}

/// The saturated universe of heap types this module uses, in discovery
/// order. Every distinct non-basic type appears exactly once.
pub fn collect_heap_types(module: &Module<'_>) -> Vec<HeapType> {
    heap_type_counts(module).0.keys().copied().collect()
}

/// The saturated universe ordered for serialization, with final contiguous
/// indices. The strategy is keyed on the store's [`TypeSystem`].
pub fn optimized_heap_type_indices(module: &Module<'_>) -> IndexedHeapTypes {
    let system = module.store.type_system();
    let counts = heap_type_counts(module);
    tracing::debug!(types = counts.0.len(), ?system, "assigning type indices");

    if system == TypeSystem::Equirecursive {
        // Sort by frequency; the sort is stable, so ties keep discovery
        // order.
        let mut sorted: Vec<(HeapType, usize)> = counts.0.iter().copied().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        return IndexedHeapTypes::from_types(sorted.into_iter().map(|(ty, _)| ty).collect());
    }

    grouped_heap_type_indices(module, system, counts)
}

struct GroupInfo {
    /// First-encounter position, the deterministic tie-break.
    index: usize,
    use_count: f64,
    preds: HashSet<RecGroup>,
    sorted_preds: Vec<RecGroup>,
}

/// Arranges types into topologically ordered recursion groups. Under
/// isorecursive typing every referenced group constrains the order; under
/// nominal typing only supertypes do.
fn grouped_heap_type_indices(
    module: &Module<'_>,
    system: TypeSystem,
    counts: Counts,
) -> IndexedHeapTypes {
    let store = &module.store;

    let mut infos: InsertOrderedMap<RecGroup, GroupInfo> = InsertOrderedMap::new();
    for &(ty, count) in counts.0.iter() {
        let group = store.rec_group_of(ty);
        let next_index = infos.len();
        let info = infos.get_or_insert_with(group, || GroupInfo {
            index: next_index,
            use_count: 0.0,
            preds: HashSet::new(),
            sorted_preds: Vec::new(),
        });
        info.use_count += count as f64;
        match system {
            TypeSystem::Isorecursive => {
                for child in store.referenced_heap_types(ty) {
                    if !child.is_basic() {
                        let other = store.rec_group_of(child);
                        if other != group {
                            info.preds.insert(other);
                        }
                    }
                }
            }
            TypeSystem::Nominal => {
                if let Some(sup) = store.super_type(ty) {
                    info.preds.insert(store.rec_group_of(sup));
                }
            }
            TypeSystem::Equirecursive => {
                unreachable!("equirecursive stores have no recursion groups to arrange")
            }
        }
    }

    // Use counts become averages so a group's priority is commensurate with
    // the index space it occupies. Nominal groups always have size 1.
    if system != TypeSystem::Nominal {
        for (group, info) in infos.iter_mut() {
            info.use_count /= group.size() as f64;
        }
    }

    // Priority: most used first, then first-encountered first.
    let priority: HashMap<RecGroup, (f64, usize)> = infos
        .iter()
        .map(|(group, info)| (*group, (info.use_count, info.index)))
        .collect();
    let by_priority = |a: &RecGroup, b: &RecGroup| {
        let (count_a, index_a) = priority[a];
        let (count_b, index_b) = priority[b];
        count_b.total_cmp(&count_a).then(index_a.cmp(&index_b))
    };

    for (_, info) in infos.iter_mut() {
        let mut preds: Vec<RecGroup> = info.preds.drain().collect();
        preds.sort_by(by_priority);
        info.sorted_preds = preds;
    }

    let mut seeds: Vec<RecGroup> = infos.keys().copied().collect();
    seeds.sort_by(by_priority);

    let order = topological_sort(seeds, |group| {
        infos
            .get(&group)
            .expect("predecessor groups are counted before sorting")
            .sorted_preds
            .clone()
    });

    let mut types = Vec::with_capacity(counts.0.len());
    for group in order {
        types.extend(group.members());
    }
    IndexedHeapTypes::from_types(types)
}

#[cfg(test)]
#[path = "type_collection_test.rs"]
mod type_collection_test;
