use serde_json::Value;

/// Hard cap on pointer walk depth. Pointers only address schema
/// definitions, but the cap guarantees termination on any input; exceeding
/// it resolves to nothing, same as an unresolvable pointer.
pub const MAX_REF_DEPTH: usize = 64;

/// Resolve an internal `#/segment/segment` pointer against the
/// specification body.
///
/// Total: malformed pointers, missing keys, non-object terminals and
/// over-deep pointers all yield `None`, never an error.
pub fn resolve_ref<'a>(body: &'a Value, pointer: &str) -> Option<&'a Value> {
    let rest = pointer.strip_prefix("#/")?;

    let mut node = body;
    for (hops, segment) in rest.split('/').enumerate() {
        if hops >= MAX_REF_DEPTH {
            return None;
        }
        node = node.as_object()?.get(segment)?;
    }

    node.is_object().then_some(node)
}
