//! Parallel per-function analysis.
//!
//! Functions are analyzed concurrently against read-only module state; each
//! invocation of the closure owns its accumulator, so there is no shared
//! mutable state during the parallel phase. Results come back indexed by
//! declaration order regardless of task completion order, which keeps any
//! downstream merge deterministic under arbitrary worker counts.

use rayon::prelude::*;

use crate::module::{Function, Module};

/// Runs `analyze` over every function in parallel and collects the results
/// in function declaration order.
pub fn analyze_functions<'a, T, F>(module: &Module<'a>, analyze: F) -> Vec<T>
where
    T: Send,
    F: Fn(&Function<'a>) -> T + Sync + Send,
{
    module.functions.par_iter().map(analyze).collect()
}
