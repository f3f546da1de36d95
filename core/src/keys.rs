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

/// Builds and parses store keys from the configured prefix.
///
/// Key structure:
/// {prefix}:{type}:{id}   # record scoped to an entity type
/// {prefix}:{id}          # record without a type
/// {prefix}:{pattern}*    # glob passed to key enumeration
///
/// Segments are concatenated literally; ids and types containing the `:`
/// delimiter are not escaped or rejected.
pub struct KeyFormatter {
    prefix: String,
}

impl KeyFormatter {
    pub fn new(prefix: &str) -> Self {
        KeyFormatter {
            prefix: prefix.to_string(),
        }
    }

    pub fn record_key(&self, entity_type: Option<&str>, id: &str) -> String {
        match entity_type {
            Some(entity_type) => format!("{}:{}:{}", self.prefix, entity_type, id),
            None => format!("{}:{}", self.prefix, id),
        }
    }

    pub fn pattern_key(&self, pattern: &str) -> String {
        format!("{}:{}*", self.prefix, pattern)
    }

    /// Recovers the id portion of an enumerated key. When the lookup did not
    /// name a type, any type segment stays part of the returned id, e.g.
    /// `store:article:art1` yields `article:art1`.
    pub fn extract_id<'a>(&self, entity_type: Option<&str>, key: &'a str) -> &'a str {
        let head = match entity_type {
            Some(entity_type) => format!("{}:{}:", self.prefix, entity_type),
            None => format!("{}:", self.prefix),
        };
        key.strip_prefix(head.as_str()).unwrap_or(key)
    }
}
