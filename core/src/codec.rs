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

use crate::models::{Record, RecordValue};

/// Fixed string stored in place of a native null, since the store's hash-map
/// field values are always strings.
pub const NULL_SENTINEL: &str = "\\N";

/// Decodes the raw field list of one hash map into a [`Record`].
///
/// Decoding is total: a value in JSON object syntax that fails to parse stays
/// a plain string, so partially-written data never fails a read. Field order
/// is irrelevant; duplicate field names keep the last value.
pub fn decode(fields: &[(String, String)]) -> Record {
    let mut record = Record::new();
    for (name, value) in fields {
        record.insert(name, decode_value(value));
    }
    record
}

fn decode_value(value: &str) -> RecordValue {
    if value == NULL_SENTINEL {
        return RecordValue::Null;
    }
    if value.trim_start().starts_with('{') {
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(value) {
            return RecordValue::Object(map);
        }
    }
    RecordValue::String(value.to_string())
}

/// Encodes a [`Record`] into the field list written to one hash map. Inverse
/// of [`decode`]: null becomes the sentinel, nested objects become JSON text.
pub fn encode(record: &Record) -> Vec<(String, String)> {
    record
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

fn encode_value(value: &RecordValue) -> String {
    match value {
        RecordValue::Null => NULL_SENTINEL.to_string(),
        RecordValue::String(s) => s.clone(),
        RecordValue::Object(map) => serde_json::Value::Object(map.clone()).to_string(),
    }
}
