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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single stored field value after decoding. The store itself only holds
/// strings; null and nested objects exist on this side of the codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Null,
    String(String),
    Object(serde_json::Map<String, serde_json::Value>),
}

/// The flat record read from one hash-map key, plus the synthetic `id` field
/// the dispatcher attaches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, RecordValue>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, value: RecordValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&RecordValue> {
        self.values.get(name)
    }

    pub fn set_id(&mut self, id: &str) {
        self.insert("id", RecordValue::String(id.to_string()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RecordValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
