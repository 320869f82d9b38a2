use apicat_core::method::HttpMethod;
use apicat_core::options::OptionsIndex;
use apicat_core::project::build_catalog;
use apicat_core::SpecDocument;
use serde_json::{json, Value};

fn doc(paths: Value) -> SpecDocument {
    SpecDocument::from_value(json!({
        "info": {"title": "Orders"},
        "servers": [{"url": "https://host/orders.svc"}],
        "paths": paths
    }))
    .unwrap()
}

fn order_no() -> Value {
    json!({"name": "OrderNo", "in": "path", "required": true, "schema": {"type": "string"}})
}

#[test]
fn order_set_scenario() {
    let doc = doc(json!({
        "/OrderSet(OrderNo='{OrderNo}')": {
            "parameters": [order_no()],
            "get": {"summary": "one"},
            "patch": {"summary": "update"}
        },
        "/OrderSet": {
            "get": {"summary": "list"}
        },
        "/OrderSet(OrderNo='{OrderNo}')/Lines": {
            "parameters": [order_no()],
            "get": {"summary": "lines"}
        }
    }));
    let catalog = build_catalog(&doc);

    let get_names: Vec<&str> = catalog.buckets.get.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(get_names, vec!["Get Order by OrderNo", "List Order"]);
    assert_eq!(catalog.buckets.patch[0].name, "Update Order by OrderNo");

    let nested = catalog.buckets.get[0].nested_entities.as_ref().unwrap();
    assert_eq!(nested.get[0].name, "Get Order Lines by OrderNo");
}

#[test]
fn colliding_action_names_get_entity_prefixes() {
    let doc = doc(json!({
        "/OrderASet/App.Pkg.OrderA_Calculate": {
            "post": {"summary": "calc a"}
        },
        "/OrderBSet/App.Pkg.OrderB_Calculate": {
            "post": {"summary": "calc b"}
        }
    }));
    let catalog = build_catalog(&doc);

    let post_names: Vec<&str> =
        catalog.buckets.post.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(post_names, vec!["Order A - Calculate", "Order B - Calculate"]);
}

#[test]
fn second_pass_uses_second_path_parameter() {
    let doc = doc(json!({
        "/OrderSet(OrderNo='{OrderNo}')/App.Pkg.Order_Calculate": {
            "parameters": [order_no()],
            "post": {"summary": "order level"}
        },
        "/OrderSet(OrderNo='{OrderNo}',LineNo='{LineNo}')/App.Pkg.Order_Calculate": {
            "parameters": [
                order_no(),
                {"name": "LineNo", "in": "path", "required": true, "schema": {"type": "integer"}}
            ],
            "post": {"summary": "line level"}
        }
    }));
    let catalog = build_catalog(&doc);

    let post_names: Vec<&str> =
        catalog.buckets.post.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        post_names,
        vec![
            "Order - Calculate by OrderNo",
            "Order - Calculate by OrderNo, LineNo"
        ]
    );
}

#[test]
fn pipeline_is_deterministic() {
    let paths = json!({
        "/OrderSet": {"get": {"summary": "list"}, "post": {"summary": "create"}},
        "/OrderSet(OrderNo='{OrderNo}')": {
            "parameters": [order_no()],
            "get": {"summary": "one"},
            "delete": {"summary": "remove"}
        },
        "/OrderSet(OrderNo='{OrderNo}')/Lines": {
            "parameters": [order_no()],
            "get": {"summary": "lines"}
        },
        "/Reference_StateSet": {"get": {"summary": "states"}}
    });

    let first = serde_json::to_string(&build_catalog(&doc(paths.clone()))).unwrap();
    let second = serde_json::to_string(&build_catalog(&doc(paths))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn declaration_order_does_not_change_names_or_ids() {
    let forward = doc(json!({
        "/AlphaSet": {"get": {"summary": "a"}},
        "/BetaSet": {"get": {"summary": "b"}},
        "/GammaSet": {"get": {"summary": "c"}}
    }));
    let shuffled = doc(json!({
        "/GammaSet": {"get": {"summary": "c"}},
        "/AlphaSet": {"get": {"summary": "a"}},
        "/BetaSet": {"get": {"summary": "b"}}
    }));

    let forward = build_catalog(&forward);
    let shuffled = build_catalog(&shuffled);

    let pairs = |catalog: &apicat_core::Catalog| -> Vec<(String, u32)> {
        catalog
            .buckets
            .get
            .iter()
            .map(|e| (e.name.clone(), e.id))
            .collect()
    };
    assert_eq!(pairs(&forward), pairs(&shuffled));
}

#[test]
fn every_bucket_is_sorted_case_insensitively() {
    let doc = doc(json!({
        "/ZuluSet": {"get": {"summary": "z"}},
        "/alphaSet": {"get": {"summary": "a"}},
        "/MikeSet": {"get": {"summary": "m"}},
        "/OrderSet(OrderNo='{OrderNo}')": {
            "parameters": [order_no()],
            "get": {"summary": "one"}
        },
        "/OrderSet(OrderNo='{OrderNo}')/BLines": {
            "parameters": [order_no()],
            "get": {"summary": "b lines"}
        },
        "/OrderSet(OrderNo='{OrderNo}')/aLines": {
            "parameters": [order_no()],
            "get": {"summary": "a lines"}
        }
    }));
    let catalog = build_catalog(&doc);

    let assert_sorted = |bucket: &[apicat_core::project::CatalogEntry]| {
        let lowered: Vec<String> = bucket.iter().map(|e| e.name.to_lowercase()).collect();
        let mut sorted = lowered.clone();
        sorted.sort();
        assert_eq!(lowered, sorted);
    };

    for method in HttpMethod::CATALOG_ORDER {
        let bucket = catalog.buckets.bucket(method);
        assert_sorted(bucket);
        for entry in bucket {
            if let Some(nested) = &entry.nested_entities {
                for nested_method in HttpMethod::CATALOG_ORDER {
                    assert_sorted(nested.bucket(nested_method));
                }
            }
        }
    }
}

#[test]
fn ids_stay_dense_when_nested_buckets_duplicate_across_parents() {
    // Both the GET and PATCH entries of the parent carry a copy of the
    // nested bucket; every copy gets its own id.
    let doc = doc(json!({
        "/OrderSet(OrderNo='{OrderNo}')": {
            "parameters": [order_no()],
            "get": {"summary": "one"},
            "patch": {"summary": "update"}
        },
        "/OrderSet(OrderNo='{OrderNo}')/Lines": {
            "parameters": [order_no()],
            "get": {"summary": "lines"}
        }
    }));
    let catalog = build_catalog(&doc);

    assert_eq!(catalog.total_entries(), 4);
    let ids: Vec<u32> = catalog.id_index().keys().copied().collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    assert_eq!(catalog.buckets.get[0].id, 1);
    assert_eq!(
        catalog.buckets.get[0].nested_entities.as_ref().unwrap().get[0].id,
        2
    );
    assert_eq!(catalog.buckets.patch[0].id, 3);
    assert_eq!(
        catalog.buckets.patch[0].nested_entities.as_ref().unwrap().get[0].id,
        4
    );
}

#[test]
fn options_index_never_diverges_from_catalog_ids() {
    let doc = doc(json!({
        "/OrderSet": {"get": {"summary": "list"}, "post": {"summary": "create"}},
        "/OrderSet(OrderNo='{OrderNo}')": {
            "parameters": [order_no()],
            "get": {"summary": "one"}
        },
        "/OrderSet(OrderNo='{OrderNo}')/Lines": {
            "parameters": [order_no()],
            "get": {"summary": "lines"}
        }
    }));
    let catalog = build_catalog(&doc);
    let index = OptionsIndex::from_catalog(&catalog);

    let by_id = catalog.id_index();
    for group in &index.entities {
        for item in &group.items {
            assert_eq!(by_id[&item.id].name, item.name);
            for nested in item.nested_entities.iter().flatten() {
                assert_eq!(by_id[&nested.id].name, nested.name);
                assert_eq!(by_id[&nested.id].method, nested.method);
            }
        }
    }
}

#[test]
fn unresolvable_references_never_abort_the_pipeline() {
    let doc = doc(json!({
        "/OrderSet": {
            "post": {
                "summary": "create",
                "requestBody": {
                    "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Missing"}}}
                },
                "responses": {
                    "201": {"content": {"application/json": {"schema": {"$ref": "not a pointer"}}}}
                }
            }
        }
    }));
    let catalog = build_catalog(&doc);

    let create = &catalog.buckets.post[0];
    assert_eq!(create.name, "Create Order");
    // Dangling references degrade to empty field sets, omitted on output.
    assert!(create.payload_fields.is_none());
    assert!(create.response_fields.is_none());
}
