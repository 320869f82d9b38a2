use indexmap::IndexMap;
use serde_json::Value;

use crate::classify::{classify_path, ClassKind, Classification};
use crate::document::SpecDocument;
use crate::extract::params::{extract_parameters, ParameterBuckets};
use crate::extract::schema::{payload_schema, response_schemas, PayloadSchema, ResponseSchema};
use crate::method::HttpMethod;

/// One HTTP verb bound to one path pattern. Built once during the walk and
/// never mutated afterward.
#[derive(Debug, Clone)]
pub struct ApiOperation {
    pub path: String,
    pub method: HttpMethod,
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub parameters: ParameterBuckets,
    pub request_body: Option<PayloadSchema>,
    pub responses: IndexMap<String, ResponseSchema>,
    pub classification: Classification,
}

/// Operations on a child collection of one parent entity.
#[derive(Debug, Clone)]
pub struct NestedGroup {
    pub parent_entity: String,
    pub nested_entity: String,
    pub path_pattern: String,
    pub operations: Vec<ApiOperation>,
}

/// Observational counters for one document. Threaded through the walk as
/// an explicit accumulator so batch documents never share state.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub total_endpoints: usize,
    pub total_entities: usize,
    pub total_nested_entities: usize,
    pub total_reference_entities: usize,
    pub total_actions: usize,
    pub total_functions: usize,
    pub methods_count: IndexMap<HttpMethod, usize>,
}

/// Every operation in the document, filed into exactly one of five
/// category groups.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub entities: IndexMap<String, Vec<ApiOperation>>,
    pub reference_entities: IndexMap<String, Vec<ApiOperation>>,
    /// Keyed by `"parent/child"`.
    pub nested: IndexMap<String, NestedGroup>,
    pub actions: IndexMap<String, Vec<ApiOperation>>,
    pub functions: IndexMap<String, Vec<ApiOperation>>,
    pub summary: Summary,
}

/// Walk every path x declared verb and aggregate the document's
/// operations into category groups.
pub fn aggregate(doc: &SpecDocument) -> Aggregate {
    let body = doc.body();
    let mut agg = Aggregate::default();

    let Some(paths) = doc.paths() else {
        return agg;
    };

    for (path, path_item) in paths {
        let classification = classify_path(path);
        let path_level_params = path_item
            .get("parameters")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for method in HttpMethod::CATALOG_ORDER {
            let Some(operation) = path_item.get(method.path_item_key()) else {
                continue;
            };

            agg.summary.total_endpoints += 1;
            *agg.summary.methods_count.entry(method).or_default() += 1;

            let op_level_params = operation
                .get("parameters")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            let op = ApiOperation {
                path: path.clone(),
                method,
                summary: str_field(operation, "summary"),
                description: str_field(operation, "description"),
                tags: tag_list(operation),
                // Path-level parameters first, operation-level appended.
                parameters: extract_parameters(
                    path_level_params.iter().chain(op_level_params),
                ),
                request_body: payload_schema(body, operation.get("requestBody")),
                responses: response_schemas(body, operation.get("responses")),
                classification: classification.clone(),
            };

            file_operation(&mut agg, op);
        }
    }

    agg.summary.total_entities = agg.entities.len();
    agg.summary.total_nested_entities = agg.nested.len();
    agg.summary.total_reference_entities = agg.reference_entities.len();

    log::info!(
        "aggregated '{}': {} endpoints, {} entities, {} nested, {} reference, {} actions, {} functions",
        doc.title(),
        agg.summary.total_endpoints,
        agg.summary.total_entities,
        agg.summary.total_nested_entities,
        agg.summary.total_reference_entities,
        agg.summary.total_actions,
        agg.summary.total_functions,
    );

    agg
}

fn file_operation(agg: &mut Aggregate, op: ApiOperation) {
    let class = &op.classification;
    match class.kind {
        ClassKind::Action => {
            agg.summary.total_actions += 1;
            agg.actions
                .entry(class.entity_name.clone())
                .or_default()
                .push(op);
        }
        ClassKind::Function => {
            agg.summary.total_functions += 1;
            agg.functions
                .entry(class.entity_name.clone())
                .or_default()
                .push(op);
        }
        ClassKind::ReferenceEntity => {
            agg.reference_entities
                .entry(class.entity_name.clone())
                .or_default()
                .push(op);
        }
        ClassKind::NestedEntity => {
            let parent = class.parent_entity.clone().unwrap_or_default();
            let child = class.entity_name.clone();
            let key = format!("{parent}/{child}");
            agg.nested
                .entry(key)
                .or_insert_with(|| NestedGroup {
                    parent_entity: parent,
                    nested_entity: child,
                    path_pattern: op.path.clone(),
                    operations: Vec::new(),
                })
                .operations
                .push(op);
        }
        ClassKind::PrimaryEntity => {
            agg.entities
                .entry(class.entity_name.clone())
                .or_default()
                .push(op);
        }
    }
}

fn str_field(node: &Value, key: &str) -> String {
    node.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn tag_list(node: &Value) -> Vec<String> {
    node.get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
