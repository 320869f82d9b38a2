use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::aggregate::{aggregate, Aggregate, ApiOperation};
use crate::classify::ClassKind;
use crate::dedupe::resolve_duplicate_names;
use crate::document::SpecDocument;
use crate::extract::schema::{PayloadSchema, ResponseSchema};
use crate::method::HttpMethod;
use crate::naming::operation_name;

/// API metadata carried on the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiInfo {
    pub title: String,
    pub description: String,
    pub base_url: String,
}

/// A path parameter with its data type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathParam {
    pub key: String,

    #[serde(rename = "type")]
    pub param_type: String,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

/// One payload or response field. `required` is carried for payload
/// fields only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
}

/// The externally visible operation record.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub method: HttpMethod,
    pub description: String,
    pub url: String,

    #[serde(rename = "pathParams", skip_serializing_if = "Option::is_none")]
    pub path_params: Option<Vec<PathParam>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<String>>,

    #[serde(rename = "payloadFields", skip_serializing_if = "Option::is_none")]
    pub payload_fields: Option<Vec<FieldEntry>>,

    #[serde(rename = "responseFields", skip_serializing_if = "Option::is_none")]
    pub response_fields: Option<Vec<FieldEntry>>,

    #[serde(rename = "nestedEntities", skip_serializing_if = "Option::is_none")]
    pub nested_entities: Option<VerbBuckets>,
}

/// Catalog entries grouped by verb, serialized under the wire verb names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerbBuckets {
    #[serde(rename = "GET")]
    pub get: Vec<CatalogEntry>,
    #[serde(rename = "POST")]
    pub post: Vec<CatalogEntry>,
    #[serde(rename = "PATCH")]
    pub patch: Vec<CatalogEntry>,
    #[serde(rename = "PUT")]
    pub put: Vec<CatalogEntry>,
    #[serde(rename = "DELETE")]
    pub delete: Vec<CatalogEntry>,
}

impl VerbBuckets {
    pub fn bucket(&self, method: HttpMethod) -> &[CatalogEntry] {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Post => &self.post,
            HttpMethod::Patch => &self.patch,
            HttpMethod::Put => &self.put,
            HttpMethod::Delete => &self.delete,
        }
    }

    pub fn bucket_mut(&mut self, method: HttpMethod) -> &mut Vec<CatalogEntry> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        HttpMethod::CATALOG_ORDER
            .iter()
            .all(|m| self.bucket(*m).is_empty())
    }
}

/// The verb-partitioned, sorted, id-stamped catalog. A freshly built
/// output tree — the source document is never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub api_info: ApiInfo,

    #[serde(flatten)]
    pub buckets: VerbBuckets,
}

impl Catalog {
    /// Direct lookup by id over top-level and nested entries. Built as a
    /// separate mapping instead of stamping ids back onto source nodes.
    pub fn id_index(&self) -> BTreeMap<u32, &CatalogEntry> {
        let mut index = BTreeMap::new();
        for method in HttpMethod::CATALOG_ORDER {
            for entry in self.buckets.bucket(method) {
                index.insert(entry.id, entry);
                if let Some(nested) = &entry.nested_entities {
                    for nested_method in HttpMethod::CATALOG_ORDER {
                        for nested_entry in nested.bucket(nested_method) {
                            index.insert(nested_entry.id, nested_entry);
                        }
                    }
                }
            }
        }
        index
    }

    /// Total entry count, nested entries included.
    pub fn total_entries(&self) -> usize {
        self.id_index().len()
    }
}

/// Run the whole pipeline: aggregate the document, then project the
/// catalog.
pub fn build_catalog(doc: &SpecDocument) -> Catalog {
    let agg = aggregate(doc);
    project(doc, &agg)
}

/// Assemble the final catalog from aggregated category groups: attach
/// nested buckets to their parents, disambiguate and sort every bucket,
/// then assign ids.
pub fn project(doc: &SpecDocument, agg: &Aggregate) -> Catalog {
    let base_url = doc.base_url();

    // Parent entity -> per-verb nested entries.
    let mut parent_to_nested: IndexMap<String, VerbBuckets> = IndexMap::new();
    for group in agg.nested.values() {
        let nested_buckets = parent_to_nested
            .entry(group.parent_entity.clone())
            .or_default();
        for op in &group.operations {
            nested_buckets
                .bucket_mut(op.method)
                .push(entry_from_operation(op, base_url));
        }
    }

    let mut buckets = VerbBuckets::default();

    // Top level: primary entities (nested attached), then reference
    // entities, actions and functions.
    for (entity, ops) in &agg.entities {
        let nested = parent_to_nested
            .get(entity)
            .filter(|nested| !nested.is_empty())
            .cloned();
        for op in ops {
            let mut entry = entry_from_operation(op, base_url);
            entry.nested_entities = nested.clone();
            buckets.bucket_mut(op.method).push(entry);
        }
    }
    let flat_groups = [&agg.reference_entities, &agg.actions, &agg.functions];
    for group in flat_groups {
        for ops in group.values() {
            for op in ops {
                buckets
                    .bucket_mut(op.method)
                    .push(entry_from_operation(op, base_url));
            }
        }
    }

    // Disambiguate and sort, top-level and nested buckets independently.
    for method in HttpMethod::CATALOG_ORDER {
        let bucket = buckets.bucket_mut(method);
        resolve_duplicate_names(bucket);
        sort_bucket(bucket);

        for entry in bucket.iter_mut() {
            if let Some(nested) = entry.nested_entities.as_mut() {
                for nested_method in HttpMethod::CATALOG_ORDER {
                    let nested_bucket = nested.bucket_mut(nested_method);
                    resolve_duplicate_names(nested_bucket);
                    sort_bucket(nested_bucket);
                }
            }
        }
    }

    assign_ids(&mut buckets);

    Catalog {
        api_info: ApiInfo {
            title: doc.title().to_string(),
            description: doc.description().to_string(),
            base_url: base_url.to_string(),
        },
        buckets,
    }
}

fn sort_bucket(bucket: &mut [CatalogEntry]) {
    // Stable, so input order breaks ties deterministically.
    bucket.sort_by_cached_key(|entry| entry.name.to_lowercase());
}

/// The id-assignment contract: walk verbs in fixed order, visit each
/// top-level entry and then immediately its nested entries (also in fixed
/// verb order) before the next top-level entry.
fn assign_ids(buckets: &mut VerbBuckets) {
    let mut next_id = 1u32;
    for method in HttpMethod::CATALOG_ORDER {
        for entry in buckets.bucket_mut(method) {
            entry.id = next_id;
            next_id += 1;
            if let Some(nested) = entry.nested_entities.as_mut() {
                for nested_method in HttpMethod::CATALOG_ORDER {
                    for nested_entry in nested.bucket_mut(nested_method) {
                        nested_entry.id = next_id;
                        next_id += 1;
                    }
                }
            }
        }
    }
}

fn entry_from_operation(op: &ApiOperation, base_url: &str) -> CatalogEntry {
    let path_params: Vec<PathParam> = op
        .parameters
        .path_params
        .iter()
        .map(|param| PathParam {
            key: param.name.clone(),
            param_type: param.param_type.clone(),
            enum_values: param.enum_values.clone(),
        })
        .collect();
    let param_keys: Vec<String> = path_params.iter().map(|p| p.key.clone()).collect();

    let class = &op.classification;
    let (entity, nested_resource) = match class.kind {
        ClassKind::NestedEntity => (
            class.parent_entity.as_deref().unwrap_or_default(),
            Some(class.entity_name.as_str()),
        ),
        _ => (class.entity_name.as_str(), None),
    };

    let name = operation_name(
        op.method,
        entity,
        &param_keys,
        class.action_name.as_deref(),
        nested_resource,
    );

    let filters: Vec<String> = op
        .parameters
        .filters
        .iter()
        .map(|filter| filter.name.clone())
        .collect();

    let payload_fields = op
        .request_body
        .as_ref()
        .map(payload_field_list)
        .filter(|fields| !fields.is_empty());
    let response_fields = response_field_list(&op.responses);

    CatalogEntry {
        id: 0, // assigned after sorting
        name,
        method: op.method,
        description: op.summary.clone(),
        url: format!("{base_url}{}", op.path),
        path_params: (!path_params.is_empty()).then_some(path_params),
        filters: (!filters.is_empty()).then_some(filters),
        payload_fields,
        response_fields: (!response_fields.is_empty()).then_some(response_fields),
        nested_entities: None,
    }
}

fn payload_field_list(payload: &PayloadSchema) -> Vec<FieldEntry> {
    let required: HashSet<&str> = payload
        .fields
        .required
        .iter()
        .map(String::as_str)
        .collect();

    payload
        .fields
        .properties
        .iter()
        .map(|(key, prop)| FieldEntry {
            key: key.clone(),
            required: Some(required.contains(key.as_str())),
            field_type: prop.prop_type.clone(),
            max_length: prop.max_length,
            format: prop.format.clone(),
            maximum: prop.maximum.clone(),
        })
        .collect()
}

/// Response fields come from the first success status carrying resolved
/// properties.
fn response_field_list(responses: &IndexMap<String, ResponseSchema>) -> Vec<FieldEntry> {
    for status in ["200", "201"] {
        if let Some(response) = responses.get(status) {
            if response.properties.is_empty() {
                continue;
            }
            return response
                .properties
                .iter()
                .map(|(key, prop)| FieldEntry {
                    key: key.clone(),
                    required: None,
                    field_type: prop.prop_type.clone(),
                    max_length: prop.max_length,
                    format: prop.format.clone(),
                    maximum: prop.maximum.clone(),
                })
                .collect();
        }
    }
    Vec::new()
}
