use crate::method::HttpMethod;

/// Insert a space before every internal uppercase letter; the first
/// character is untouched. The sole readability transform — applied
/// everywhere a raw identifier becomes user-facing text.
///
/// `CalculateOrderDiscount` -> `Calculate Order Discount`
pub fn spaced_words(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 8);
    for (i, ch) in ident.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Synthesize the human-readable operation name from verb semantics and
/// call shape.
pub fn operation_name(
    method: HttpMethod,
    entity: &str,
    path_param_keys: &[String],
    action_name: Option<&str>,
    nested_resource: Option<&str>,
) -> String {
    let primary_key = path_param_keys.first().map(String::as_str);

    let mut label = spaced_words(entity);
    if let Some(nested) = nested_resource {
        label = format!("{label} {}", spaced_words(nested));
    }

    // An invoked behavior names itself; path parameters distinguish
    // item-scoped calls from collection-scoped ones.
    if let Some(action) = action_name {
        let readable = spaced_words(action);
        return match primary_key {
            Some(key) => format!("{readable} by {key}"),
            None => readable,
        };
    }

    match (method, primary_key) {
        (HttpMethod::Get, Some(key)) => format!("Get {label} by {key}"),
        (HttpMethod::Get, None) => format!("List {label}"),
        (HttpMethod::Post, _) => format!("Create {label}"),
        (HttpMethod::Patch, Some(key)) => format!("Update {label} by {key}"),
        (HttpMethod::Patch, None) => format!("Update {label}"),
        (HttpMethod::Put, Some(key)) => format!("Replace {label} by {key}"),
        (HttpMethod::Put, None) => format!("Replace {label}"),
        (HttpMethod::Delete, Some(key)) => format!("Delete {label} by {key}"),
        (HttpMethod::Delete, None) => format!("Delete {label}"),
    }
}
