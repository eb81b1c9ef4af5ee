//! VirtualService reference resolution
//!
//! Resolution is split in two: [`build_virtual_service_reference_convert_fn`]
//! captures a snapshot of resolved VirtualServices and returns a lookup
//! closure, which callers then apply to each reference on its own. A failing
//! reference never affects the others; aggregation is up to the caller.

use std::collections::HashMap;

use crate::crd::{VirtualService, VirtualServiceReference};
use crate::error::{Error, Result};

/// VirtualServices resolved by an upstream lookup, keyed by the reference as written
pub type VirtualServicesByRef = HashMap<VirtualServiceReference, VirtualService>;

/// Build a closure converting a reference into the mesh name of its VirtualService
///
/// The closure performs no I/O and holds no mutable state, so it may be called
/// any number of times and from several threads.
pub fn build_virtual_service_reference_convert_fn(
    vs_by_ref: &VirtualServicesByRef,
) -> impl Fn(&VirtualServiceReference) -> Result<String> + Send + Sync + '_ {
    move |reference| {
        vs_by_ref
            .get(reference)
            .and_then(|vs| vs.spec.aws_name.as_deref())
            .filter(|aws_name| !aws_name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::UnresolvedReference {
                reference: reference.clone(),
            })
    }
}

/// Outcome of resolving a single reference
#[derive(Debug)]
pub struct ResolutionOutcome {
    pub reference: VirtualServiceReference,
    pub result: Result<String>,
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        self.result.is_ok()
    }
}

/// Apply `convert` to every reference, keeping one outcome per reference in order
pub fn resolve_references<'a, I, F>(references: I, convert: F) -> Vec<ResolutionOutcome>
where
    I: IntoIterator<Item = &'a VirtualServiceReference>,
    F: Fn(&VirtualServiceReference) -> Result<String>,
{
    references
        .into_iter()
        .map(|reference| ResolutionOutcome {
            reference: reference.clone(),
            result: convert(reference),
        })
        .collect()
}

/// Collect resolved names, or fail naming every reference that did not resolve
///
/// The convert closure only fails with [`Error::UnresolvedReference`], so the
/// aggregated error keeps the references and drops the identical reasons.
pub fn ensure_resolved(outcomes: Vec<ResolutionOutcome>) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(outcomes.len());
    let mut unresolved = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(name) => names.push(name),
            Err(_) => unresolved.push(outcome.reference),
        }
    }

    if unresolved.is_empty() {
        Ok(names)
    } else {
        Err(Error::UnresolvedReferences(unresolved))
    }
}
