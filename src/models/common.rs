//! Common types shared across Table API models.
//!
//! ServiceNow wraps every Table API payload in a `result` member. A query
//! returns a list there, a create returns a single object.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

/// Envelope for ServiceNow Table API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct TableResponse<T> {
    /// The payload of the response.
    pub result: OneOrMany<T>,
}

/// A `result` that is either a single record or a list of records.
///
/// The variant is picked from the JSON shape: an array is `Many`, an
/// object is `One`. Every record, inside a list or not, must be an object.
#[derive(Debug, Clone)]
pub enum OneOrMany<T> {
    /// A list of records, as returned by queries.
    Many(Vec<T>),
    /// A single record, as returned by creates.
    One(T),
}

impl<T> OneOrMany<T> {
    /// Returns every record, preserving the order they were received in.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }

    /// Returns the first record, if any.
    pub fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::Many(items) => items.into_iter().next(),
            OneOrMany::One(item) => Some(item),
        }
    }
}

impl<'de, T> Deserialize<'de> for OneOrMany<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OneOrManyVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for OneOrManyVisitor<T>
        where
            T: Deserialize<'de>,
        {
            type Value = OneOrMany<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a record object or an array of record objects")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(ObjectRecord(item)) = seq.next_element::<ObjectRecord<T>>()? {
                    items.push(item);
                }
                Ok(OneOrMany::Many(items))
            }

            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                T::deserialize(de::value::MapAccessDeserializer::new(map)).map(OneOrMany::One)
            }
        }

        deserializer.deserialize_any(OneOrManyVisitor(PhantomData))
    }
}

/// A record that only deserializes from a JSON object.
///
/// Derived structs also accept arrays positionally; rows never arrive that way.
struct ObjectRecord<T>(T);

impl<'de, T> Deserialize<'de> for ObjectRecord<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ObjectRecordVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for ObjectRecordVisitor<T>
        where
            T: Deserialize<'de>,
        {
            type Value = ObjectRecord<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a record object")
            }

            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                T::deserialize(de::value::MapAccessDeserializer::new(map)).map(ObjectRecord)
            }
        }

        deserializer.deserialize_map(ObjectRecordVisitor(PhantomData))
    }
}

/// What a transport hands back for a single request.
///
/// `body` is the raw JSON text; parsing is left to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code of the response.
    pub status: u16,

    /// Response body, if the server sent one.
    pub body: Option<String>,
}

impl TransportResponse {
    /// Creates a response with a body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    /// Creates a response without a body.
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    /// Returns the body if it is present and non-blank.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.trim().is_empty())
    }
}
