// Copyright 2025 The Keyfetch Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::codec::NULL_SENTINEL;
use crate::connection::{self, Connection};
use crate::dispatch::dispatch;
use crate::in_memory_store::{InMemoryStore, InMemoryStoreFactory};
use crate::models::{
    Action, ActionKind, ActionMeta, ActionPayload, IdSelector, Response, ResponseData,
    ResponseStatus, SourceConfig,
};

// --- Test helpers ---

fn test_config() -> SourceConfig {
    SourceConfig::new("store", "memory://")
}

async fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .seed(
            "store:article:art1",
            vec![
                ("title".to_string(), "Article 1".to_string()),
                ("description".to_string(), "The first article".to_string()),
                ("publishedAt".to_string(), NULL_SENTINEL.to_string()),
                (
                    "author".to_string(),
                    r#"{"id":"johnf","name":"John F."}"#.to_string(),
                ),
            ],
        )
        .await;
    store
        .seed(
            "store:article:art2",
            vec![
                ("title".to_string(), "Article 2".to_string()),
                ("description".to_string(), "The second article".to_string()),
            ],
        )
        .await;
    store
        .seed(
            "store:article:art3",
            vec![
                ("title".to_string(), "Article 3".to_string()),
                ("description".to_string(), "The third article".to_string()),
            ],
        )
        .await;
    store
}

async fn connected(store: &InMemoryStore) -> (Connection, Arc<InMemoryStoreFactory>) {
    let factory = store.factory();
    let connection = connection::connect(&test_config(), factory.clone(), None).await;
    (connection, factory)
}

fn get_by_id(id: IdSelector) -> Action {
    Action::get(
        ActionPayload::ById {
            entity_type: "article".to_string(),
            id,
        },
        test_config(),
    )
}

fn get_by_pattern(pattern: &str, only_ids: bool) -> Action {
    Action::get(
        ActionPayload::ByPattern {
            pattern: pattern.to_string(),
            only_ids,
        },
        test_config(),
    )
}

fn record_ids(response: &Response) -> Vec<String> {
    match &response.data {
        Some(ResponseData::Many(records)) => records
            .iter()
            .map(|r| match r.get("id") {
                Some(crate::models::RecordValue::String(id)) => id.clone(),
                other => panic!("missing id field: {:?}", other),
            })
            .collect(),
        other => panic!("expected record array, got {:?}", other),
    }
}

// --- Scenarios ---

#[tokio::test]
async fn get_single_id_decodes_sentinel_and_nested_author() {
    let store = seeded_store().await;
    let (connection, _) = connected(&store).await;

    let response = dispatch(&get_by_id(IdSelector::One("art1".to_string())), &connection).await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "status": "ok",
            "data": {
                "id": "art1",
                "title": "Article 1",
                "description": "The first article",
                "publishedAt": null,
                "author": {"id": "johnf", "name": "John F."}
            }
        })
    );
}

#[tokio::test]
async fn get_id_list_preserves_request_order() {
    let store = seeded_store().await;
    let (connection, _) = connected(&store).await;

    let action = get_by_id(IdSelector::Many(vec![
        "art1".to_string(),
        "art3".to_string(),
    ]));
    let response = dispatch(&action, &connection).await;
    assert_eq!(response.status, ResponseStatus::Ok);
    assert_eq!(record_ids(&response), vec!["art1", "art3"]);

    // Reversed request, reversed result; never store order.
    let action = get_by_id(IdSelector::Many(vec![
        "art3".to_string(),
        "art1".to_string(),
    ]));
    let response = dispatch(&action, &connection).await;
    assert_eq!(record_ids(&response), vec!["art3", "art1"]);
}

#[tokio::test]
async fn get_id_list_omits_missing_keys() {
    let store = seeded_store().await;
    let (connection, _) = connected(&store).await;

    let action = get_by_id(IdSelector::Many(vec![
        "art1".to_string(),
        "missing".to_string(),
        "art3".to_string(),
    ]));
    let response = dispatch(&action, &connection).await;
    assert_eq!(response.status, ResponseStatus::Ok);
    assert_eq!(record_ids(&response), vec!["art1", "art3"]);
}

#[tokio::test]
async fn get_single_missing_id_yields_ok_without_data() {
    let store = seeded_store().await;
    let (connection, _) = connected(&store).await;

    let response = dispatch(
        &get_by_id(IdSelector::One("missing".to_string())),
        &connection,
    )
    .await;
    assert_eq!(response.status, ResponseStatus::Ok);
    assert_eq!(response.data, None);
    assert_eq!(response.error, None);
}

#[tokio::test]
async fn pattern_without_type_keeps_type_segment_in_ids() {
    let store = seeded_store().await;
    let (connection, _) = connected(&store).await;

    let response = dispatch(&get_by_pattern("article", false), &connection).await;
    assert_eq!(response.status, ResponseStatus::Ok);
    assert_eq!(
        record_ids(&response),
        vec!["article:art1", "article:art2", "article:art3"]
    );
}

#[tokio::test]
async fn pattern_with_only_ids_matches_full_variant_count_and_order() {
    let store = seeded_store().await;
    let (connection, _) = connected(&store).await;

    let full = dispatch(&get_by_pattern("article", false), &connection).await;
    let ids_only = dispatch(&get_by_pattern("article", true), &connection).await;

    let ids = match &ids_only.data {
        Some(ResponseData::Ids(ids)) => ids.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
        other => panic!("expected id-only array, got {:?}", other),
    };
    assert_eq!(ids, record_ids(&full));
    assert_eq!(
        serde_json::to_value(&ids_only).unwrap()["data"],
        json!([
            {"id": "article:art1"},
            {"id": "article:art2"},
            {"id": "article:art3"}
        ])
    );
}

#[tokio::test]
async fn unsupported_action_type_is_rejected() {
    let store = seeded_store().await;
    let (connection, _) = connected(&store).await;

    let action = Action {
        kind: ActionKind::Unknown,
        payload: ActionPayload::ById {
            entity_type: "article".to_string(),
            id: IdSelector::One("art1".to_string()),
        },
        meta: ActionMeta {
            options: test_config(),
        },
    };
    let response = dispatch(&action, &connection).await;
    assert_eq!(response.status, ResponseStatus::Error);
    assert!(response
        .error
        .as_deref()
        .unwrap()
        .contains("unsupported action type"));
}

#[tokio::test]
async fn dispatch_without_client_fails_with_no_connection() {
    let store = seeded_store().await;
    let factory = store.factory();

    // Never connected.
    let connection = Connection::new(factory.clone(), Duration::from_secs(1));
    let response = dispatch(&get_by_id(IdSelector::One("art1".to_string())), &connection).await;
    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.error.as_deref(), Some("no connection"));
}

#[tokio::test]
async fn dispatch_after_idle_expiry_fails_then_reconnect_recovers() {
    let store = seeded_store().await;
    let factory = store.factory();
    let mut config = test_config();
    config.connection_timeout = Some(50);

    let connection = connection::connect(&config, factory.clone(), None).await;
    let response = dispatch(&get_by_id(IdSelector::One("art1".to_string())), &connection).await;
    assert_eq!(response.status, ResponseStatus::Ok);

    tokio::time::sleep(Duration::from_millis(200)).await;

    // Expired and not reconnected: no connection, but not an error state.
    let response = dispatch(&get_by_id(IdSelector::One("art1".to_string())), &connection).await;
    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.error.as_deref(), Some("no connection"));

    // The next connect call re-establishes a new session.
    let connection = connection::connect(&config, factory.clone(), Some(connection)).await;
    let response = dispatch(&get_by_id(IdSelector::One("art1".to_string())), &connection).await;
    assert_eq!(response.status, ResponseStatus::Ok);
    assert_eq!(factory.connect_count(), 2);
}

#[tokio::test]
async fn dispatch_against_failed_connection_cites_connect_reason() {
    let store = seeded_store().await;
    let factory = store.factory();
    factory.set_available(false);

    let connection = connection::connect(&test_config(), factory.clone(), None).await;
    let response = dispatch(&get_by_id(IdSelector::One("art1".to_string())), &connection).await;
    assert_eq!(response.status, ResponseStatus::Error);
    assert!(response
        .error
        .as_deref()
        .unwrap()
        .contains("store connect failed"));
}

#[tokio::test]
async fn action_json_shape_round_trips() {
    let action: Action = serde_json::from_value(json!({
        "type": "get",
        "payload": {"type": "article", "id": ["art1", "art3"]},
        "meta": {"options": {"prefix": "store", "url": "memory://"}}
    }))
    .unwrap();

    assert_eq!(action.kind, ActionKind::Get);
    match &action.payload {
        ActionPayload::ById {
            entity_type,
            id: IdSelector::Many(ids),
        } => {
            assert_eq!(entity_type, "article");
            assert_eq!(ids, &vec!["art1".to_string(), "art3".to_string()]);
        }
        other => panic!("unexpected payload: {:?}", other),
    }

    let pattern: Action = serde_json::from_value(json!({
        "type": "get",
        "payload": {"pattern": "article", "onlyIds": true},
        "meta": {"options": {"prefix": "store", "url": "memory://", "connectionTimeout": 5000}}
    }))
    .unwrap();

    assert_eq!(
        pattern.payload,
        ActionPayload::ByPattern {
            pattern: "article".to_string(),
            only_ids: true
        }
    );
    assert_eq!(
        pattern.meta.options.idle_timeout(),
        Duration::from_millis(5000)
    );
}
