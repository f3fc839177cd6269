//! Request DTOs for API endpoints

use std::fmt;

use forum_core::{CandidateInput, FieldValue};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Registration request: a flat JSON object of string or number values.
///
/// `username` is required; `email`, `password` and allow-listed profile fields are
/// optional. Keys keep the order they appear in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateUserRequest {
    pub fields: Vec<(String, FieldValue)>,
}

impl CreateUserRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn username(&self) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == "username")
            .map(|(_, v)| v)
    }

    pub fn into_candidate(self) -> CandidateInput {
        CandidateInput::from_fields(self.fields)
    }
}

impl<'de> Deserialize<'de> for CreateUserRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = CreateUserRequest;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of string or number values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, FieldValue>()? {
                    fields.push((key, value));
                }
                Ok(CreateUserRequest { fields })
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}
