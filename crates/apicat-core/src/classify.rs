/// Prefix marking reference (lookup) entity paths.
pub const REFERENCE_PREFIX: &str = "Reference_";

/// Collection-suffix token stripped from entity identifiers.
const COLLECTION_SUFFIX: &str = "Set";

/// The category an operation's path pattern falls into. Exactly one
/// applies, decided by precedence: action > function > reference > nested
/// > primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Action,
    Function,
    ReferenceEntity,
    NestedEntity,
    PrimaryEntity,
}

/// Classification of one path pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: ClassKind,
    /// Owning entity: the child entity for nested paths, the first path
    /// segment's entity otherwise.
    pub entity_name: String,
    /// Parent entity, for nested paths only.
    pub parent_entity: Option<String>,
    /// Invoked behavior name, for actions and functions only.
    pub action_name: Option<String>,
}

/// Classify a URL path pattern. First match wins; the primary-entity
/// fallback means every path lands somewhere.
pub fn classify_path(path: &str) -> Classification {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let first = segments.first().copied().unwrap_or("");

    if namespaced_call_segment(path).is_some() {
        let kind = if path.ends_with(')') {
            ClassKind::Function
        } else {
            ClassKind::Action
        };
        return Classification {
            kind,
            entity_name: entity_label(first),
            parent_entity: None,
            action_name: action_name_from_path(path),
        };
    }

    if first.starts_with(REFERENCE_PREFIX) {
        return Classification {
            kind: ClassKind::ReferenceEntity,
            entity_name: entity_label(first),
            parent_entity: None,
            action_name: None,
        };
    }

    // A parameterized segment that is not the last one means the path
    // addresses a child collection of that segment's entity.
    let is_nested = segments
        .iter()
        .enumerate()
        .any(|(i, seg)| seg.contains('(') && i + 1 < segments.len());

    if is_nested {
        let last = segments.last().copied().unwrap_or("");
        return Classification {
            kind: ClassKind::NestedEntity,
            entity_name: entity_label(last),
            parent_entity: Some(entity_label(first)),
            action_name: None,
        };
    }

    Classification {
        kind: ClassKind::PrimaryEntity,
        entity_name: entity_label(first),
        parent_entity: None,
        action_name: None,
    }
}

/// Entity identifier of a path segment: parameter list and trailing
/// collection suffix stripped (`OrderSet(OrderNo)` -> `Order`).
pub fn entity_label(segment: &str) -> String {
    let bare = strip_params(segment);
    let stripped = match bare.strip_suffix(COLLECTION_SUFFIX) {
        Some(prefix) if !prefix.is_empty() => prefix,
        _ => bare,
    };
    stripped.to_string()
}

/// The invoked behavior name: the trailing identifier after the last
/// underscore of the namespaced call segment, parameter list stripped.
pub fn action_name_from_path(path: &str) -> Option<String> {
    let segment = namespaced_call_segment(path)?;
    let bare = strip_params(segment);
    let (_, name) = bare.rsplit_once('_')?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Last path segment of the form `Namespace.Rest` where the namespace is
/// an uppercase-led identifier — the shape of a bound method call.
fn namespaced_call_segment(path: &str) -> Option<&str> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .rev()
        .find(|seg| is_namespaced(seg))
}

fn is_namespaced(segment: &str) -> bool {
    match segment.split_once('.') {
        Some((namespace, rest)) => {
            !namespace.is_empty()
                && !rest.is_empty()
                && namespace
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_uppercase())
                && namespace.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

fn strip_params(segment: &str) -> &str {
    match segment.find('(') {
        Some(pos) => &segment[..pos],
        None => segment,
    }
}
