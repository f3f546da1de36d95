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

use crate::codec;
use crate::connection::{Connection, ConnectionStatus};
use crate::interface::{SourceError, StoreClient};
use crate::keys::KeyFormatter;
use crate::models::{
    Action, ActionKind, ActionPayload, IdRecord, IdSelector, Record, Response, ResponseData,
};

/// Executes one action against a connection and resolves to a response.
///
/// Every failure path resolves to `{status: error}`; this function never
/// raises. A successful dispatch marks the connection as used, which re-arms
/// its idle-expiry timer.
#[tracing::instrument(skip_all)]
pub async fn dispatch(action: &Action, connection: &Connection) -> Response {
    match dispatch_internal(action, connection).await {
        Ok(data) => {
            connection.touch().await;
            Response::ok(data)
        }
        Err(e) => {
            log::warn!("dispatch failed: {}", e);
            Response::error(e.to_string())
        }
    }
}

async fn dispatch_internal(
    action: &Action,
    connection: &Connection,
) -> Result<Option<ResponseData>, SourceError> {
    if action.kind != ActionKind::Get {
        return Err(SourceError::InvalidAction(action.kind.to_string()));
    }

    let client = match connection.client().await {
        Some(client) => client,
        None => {
            return Err(match connection.status().await {
                ConnectionStatus::Error(reason) => SourceError::ConnectionFailed(reason),
                ConnectionStatus::Ok => SourceError::NoConnection,
            });
        }
    };

    let formatter = KeyFormatter::new(&action.meta.options.prefix);

    match &action.payload {
        ActionPayload::ById {
            entity_type,
            id: IdSelector::One(id),
        } => {
            let record =
                read_record(client.as_ref(), &formatter, Some(entity_type.as_str()), id).await?;
            Ok(record.map(ResponseData::One))
        }
        ActionPayload::ById {
            entity_type,
            id: IdSelector::Many(ids),
        } => {
            let mut records = Vec::with_capacity(ids.len());
            for id in ids {
                // Non-existent keys are omitted; caller-supplied order is
                // preserved for the rest.
                if let Some(record) =
                    read_record(client.as_ref(), &formatter, Some(entity_type.as_str()), id).await?
                {
                    records.push(record);
                }
            }
            Ok(Some(ResponseData::Many(records)))
        }
        ActionPayload::ByPattern { pattern, only_ids } => {
            let keys = client.keys(&formatter.pattern_key(pattern)).await?;
            if *only_ids {
                let ids = keys
                    .iter()
                    .map(|key| IdRecord {
                        id: formatter.extract_id(None, key).to_string(),
                    })
                    .collect();
                return Ok(Some(ResponseData::Ids(ids)));
            }
            let mut records = Vec::with_capacity(keys.len());
            for key in &keys {
                let fields = client.hash_get_all(key).await?;
                if fields.is_empty() {
                    continue;
                }
                let mut record = codec::decode(&fields);
                record.set_id(formatter.extract_id(None, key));
                records.push(record);
            }
            Ok(Some(ResponseData::Many(records)))
        }
    }
}

async fn read_record(
    client: &dyn StoreClient,
    formatter: &KeyFormatter,
    entity_type: Option<&str>,
    id: &str,
) -> Result<Option<Record>, SourceError> {
    let key = formatter.record_key(entity_type, id);
    let fields = client.hash_get_all(&key).await?;
    if fields.is_empty() {
        return Ok(None);
    }
    let mut record = codec::decode(&fields);
    record.set_id(id);
    Ok(Some(record))
}
