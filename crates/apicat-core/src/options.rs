use serde::Serialize;

use crate::method::HttpMethod;
use crate::project::Catalog;

/// The navigation index: a compact name/id/method projection of the
/// catalog for menu-style browsing.
#[derive(Debug, Clone, Serialize)]
pub struct OptionsIndex {
    pub api: String,
    pub entities: Vec<MethodGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodGroup {
    pub method: HttpMethod,
    pub items: Vec<OptionItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionItem {
    pub name: String,
    pub id: u32,

    #[serde(rename = "nestedEntities", skip_serializing_if = "Option::is_none")]
    pub nested_entities: Option<Vec<NestedOption>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NestedOption {
    pub method: HttpMethod,
    pub name: String,
    pub id: u32,
}

impl OptionsIndex {
    /// Derive the index from an id-stamped catalog. A pure projection: ids
    /// are read from the catalog, never recomputed.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut entities = Vec::new();

        for method in HttpMethod::CATALOG_ORDER {
            let bucket = catalog.buckets.bucket(method);
            if bucket.is_empty() {
                continue;
            }

            let items = bucket
                .iter()
                .map(|entry| {
                    let nested: Vec<NestedOption> = entry
                        .nested_entities
                        .iter()
                        .flat_map(|buckets| {
                            HttpMethod::CATALOG_ORDER.into_iter().flat_map(|nm| {
                                buckets.bucket(nm).iter().map(move |nested_entry| {
                                    NestedOption {
                                        method: nm,
                                        name: nested_entry.name.clone(),
                                        id: nested_entry.id,
                                    }
                                })
                            })
                        })
                        .collect();

                    OptionItem {
                        name: entry.name.clone(),
                        id: entry.id,
                        nested_entities: (!nested.is_empty()).then_some(nested),
                    }
                })
                .collect();

            entities.push(MethodGroup { method, items });
        }

        OptionsIndex {
            api: catalog.api_info.title.clone(),
            entities,
        }
    }
}
