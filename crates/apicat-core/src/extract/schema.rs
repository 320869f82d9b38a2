use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::resolve::resolve_ref;

/// How many enumeration values a descriptor keeps; the full count is
/// recorded separately.
pub const MAX_ENUM_VALUES: usize = 10;

/// A flat description of one schema property. Absent attributes are
/// omitted from output, never serialized as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    #[serde(rename = "type")]
    pub prop_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_target: Option<String>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_count: Option<usize>,
}

/// The flattened fields of one resolved schema.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaFields {
    pub required: Vec<String>,
    pub properties: IndexMap<String, PropertyDescriptor>,
}

/// Request payload schema: the resolved fields plus the pointer they came
/// from, when the schema was a `$ref` wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct PayloadSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,

    #[serde(flatten)]
    pub fields: SchemaFields,
}

/// One response variant, keyed by status code in the owning map.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseSchema {
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_array: bool,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertyDescriptor>,
}

/// Flatten a schema fragment into its required list and property
/// descriptors, resolving a `$ref` wrapper first. Unresolvable fragments
/// degrade to empty fields.
pub fn schema_fields(body: &Value, schema: &Value) -> SchemaFields {
    let schema = deref(body, schema);

    let mut fields = SchemaFields {
        required: string_list(schema.get("required")),
        properties: IndexMap::new(),
    };

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return fields;
    };

    for (name, prop) in properties {
        fields
            .properties
            .insert(name.clone(), property_descriptor(prop));
    }

    fields
}

fn property_descriptor(prop: &Value) -> PropertyDescriptor {
    let mut descriptor = PropertyDescriptor {
        prop_type: prop
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        description: owned_str(prop.get("description")),
        max_length: prop.get("maxLength").and_then(Value::as_u64),
        format: owned_str(prop.get("format")),
        maximum: prop
            .get("maximum")
            .and_then(Value::as_number)
            .cloned(),
        example: prop.get("example").cloned(),
        ref_target: None,
        enum_values: None,
        enum_count: None,
    };

    if let Some(values) = prop.get("enum").and_then(Value::as_array) {
        descriptor.enum_values = Some(values.iter().take(MAX_ENUM_VALUES).cloned().collect());
        descriptor.enum_count = Some(values.len());
    }

    // A referenced property is opaque here; downstream consumers follow the
    // pointer when they need the target's shape.
    if let Some(target) = prop.get("$ref").and_then(Value::as_str) {
        descriptor.ref_target = Some(target.to_string());
        descriptor.prop_type = "enum/reference".to_string();
    }

    descriptor
}

/// Extract the request payload schema from an operation's `requestBody`.
pub fn payload_schema(body: &Value, request_body: Option<&Value>) -> Option<PayloadSchema> {
    let mut request_body = request_body.filter(|rb| rb.is_object())?;

    if let Some(pointer) = request_body.get("$ref").and_then(Value::as_str) {
        match resolve_ref(body, pointer) {
            Some(resolved) => request_body = resolved,
            // Keep the dangling pointer visible; the fields stay empty.
            None => {
                return Some(PayloadSchema {
                    schema_ref: Some(pointer.to_string()),
                    schema_name: last_segment(pointer),
                    fields: SchemaFields::default(),
                });
            }
        }
    }

    let schema = request_body
        .pointer("/content/application~1json/schema")
        .unwrap_or(&Value::Null);

    if let Some(pointer) = schema.get("$ref").and_then(Value::as_str) {
        let resolved = resolve_ref(body, pointer).unwrap_or(&Value::Null);
        return Some(PayloadSchema {
            schema_ref: Some(pointer.to_string()),
            schema_name: last_segment(pointer),
            fields: schema_fields(body, resolved),
        });
    }

    Some(PayloadSchema {
        schema_ref: None,
        schema_name: None,
        fields: schema_fields(body, schema),
    })
}

/// Extract per-status response schemas, resolving response and schema
/// references and detecting the inline `value.items` array shape.
pub fn response_schemas(
    body: &Value,
    responses: Option<&Value>,
) -> IndexMap<String, ResponseSchema> {
    let mut result = IndexMap::new();

    let Some(responses) = responses.and_then(Value::as_object) else {
        return result;
    };

    for (status, response) in responses {
        let response = deref(body, response);

        let mut info = ResponseSchema {
            description: response
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            schema_ref: None,
            schema_name: None,
            is_array: false,
            properties: IndexMap::new(),
        };

        let schema = response
            .pointer("/content/application~1json/schema")
            .unwrap_or(&Value::Null);

        if let Some(pointer) = schema.get("$ref").and_then(Value::as_str) {
            info.schema_ref = Some(pointer.to_string());
            info.schema_name = last_segment(pointer);
            if let Some(resolved) = resolve_ref(body, pointer) {
                info.properties = schema_fields(body, resolved).properties;
            }
        } else if let Some(items_ref) = schema
            .pointer("/properties/value/items/$ref")
            .and_then(Value::as_str)
        {
            // Collection responses wrap the element schema in a `value` array.
            info.schema_ref = Some(items_ref.to_string());
            info.schema_name = last_segment(items_ref);
            info.is_array = true;
            if let Some(resolved) = resolve_ref(body, items_ref) {
                info.properties = schema_fields(body, resolved).properties;
            }
        }

        result.insert(status.clone(), info);
    }

    result
}

/// Follow a `$ref` wrapper if present; unresolvable targets become null.
fn deref<'a>(body: &'a Value, node: &'a Value) -> &'a Value {
    match node.get("$ref").and_then(Value::as_str) {
        Some(pointer) => resolve_ref(body, pointer).unwrap_or(&Value::Null),
        None => node,
    }
}

fn last_segment(pointer: &str) -> Option<String> {
    pointer.rsplit('/').next().map(str::to_string)
}

fn owned_str(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
