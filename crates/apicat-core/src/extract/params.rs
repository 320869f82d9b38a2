use serde::Serialize;
use serde_json::Value;

use super::schema::MAX_ENUM_VALUES;

/// Protocol filter keywords. Query parameters with one of these names are
/// copied into the `filters` bucket in addition to `query_params`.
pub const FILTER_KEYWORDS: [&str; 6] = [
    "$filter", "$select", "$orderby", "$top", "$skip", "$count",
];

/// One extracted parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub required: bool,

    #[serde(rename = "type")]
    pub param_type: String,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_count: Option<usize>,
}

/// An operation's parameters, bucketed by declared location.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParameterBuckets {
    pub path_params: Vec<ParameterInfo>,
    pub query_params: Vec<ParameterInfo>,
    pub header_params: Vec<ParameterInfo>,
    pub filters: Vec<ParameterInfo>,
}

/// Bucket a merged parameter list (path-level entries first, then
/// operation-level; both kept).
pub fn extract_parameters<'a>(
    params: impl IntoIterator<Item = &'a Value>,
) -> ParameterBuckets {
    let mut buckets = ParameterBuckets::default();

    for param in params {
        let info = parameter_info(param);
        let location = param
            .get("in")
            .and_then(Value::as_str)
            .unwrap_or("query");

        match location {
            "path" => buckets.path_params.push(info),
            "header" => buckets.header_params.push(info),
            "query" => {
                if FILTER_KEYWORDS.contains(&info.name.as_str()) {
                    buckets.filters.push(info.clone());
                }
                buckets.query_params.push(info);
            }
            _ => {}
        }
    }

    buckets
}

fn parameter_info(param: &Value) -> ParameterInfo {
    let schema = param.get("schema").unwrap_or(&Value::Null);

    let mut info = ParameterInfo {
        name: param
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        description: param
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        required: param
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        param_type: schema
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("string")
            .to_string(),
        enum_values: None,
        enum_count: None,
    };

    // Enumerations may sit on the schema directly or on its items.
    let enum_values = schema
        .get("enum")
        .or_else(|| schema.pointer("/items/enum"))
        .and_then(Value::as_array);

    if let Some(values) = enum_values {
        info.enum_values = Some(values.iter().take(MAX_ENUM_VALUES).cloned().collect());
        info.enum_count = Some(values.len());
    }

    info
}
