//! Targeted JSON field lookup.
//!
//! Walks a key path through a JSON document without building a
//! `serde_json::Value`. Each step scans one object (or array) and borrows the
//! matching member as a [`RawValue`]; sibling members are skipped with
//! [`IgnoredAny`] and never materialized.
//!
//! Path segments are object keys, except segments of the form `[n]`, which
//! index into an array.

use std::fmt;

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserializer;
use serde_json::value::RawValue;

use crate::error::HttpError;
use crate::response::Response;

/// Type tag of an extracted JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonValueType {
    /// `"..."`
    String,
    /// Integer or float
    Number,
    /// `{...}`
    Object,
    /// `[...]`
    Array,
    /// `true` or `false`
    Boolean,
    /// `null`
    Null,
}

/// Value found at a key path, borrowed from the source document
#[derive(Debug, Clone, Copy)]
pub struct JsonField<'a> {
    raw: &'a RawValue,
    value_type: JsonValueType,
}

impl<'a> JsonField<'a> {
    fn new(raw: &'a RawValue) -> Self {
        Self {
            raw,
            value_type: value_type(raw),
        }
    }

    /// Type tag of the value
    pub fn value_type(&self) -> JsonValueType {
        self.value_type
    }

    /// The value exactly as it appears in the document, quotes included
    pub fn raw(&self) -> &'a str {
        self.raw.get()
    }

    /// Value bytes: strings unquoted and unescaped, everything else verbatim
    pub fn to_bytes(&self) -> Response<Vec<u8>> {
        match self.value_type {
            JsonValueType::String => {
                let s: String = serde_json::from_str(self.raw.get())?;
                Ok(s.into_bytes())
            }
            _ => Ok(self.raw.get().as_bytes().to_vec()),
        }
    }

    /// Decode the value into `T`
    pub fn deserialize<T: de::DeserializeOwned>(&self) -> Response<T> {
        serde_json::from_str(self.raw.get()).map_err(HttpError::from)
    }
}

/// Look up the value at `key_path` in `data`.
///
/// An empty path returns the whole document.
pub fn get<'a, K: AsRef<str>>(data: &'a [u8], key_path: &[K]) -> Response<JsonField<'a>> {
    let mut current: &'a RawValue = serde_json::from_slice(data)?;

    for (depth, key) in key_path.iter().enumerate() {
        let key = key.as_ref();
        let not_found = || HttpError::KeyPathNotFound(display_path(&key_path[..=depth]));

        let text = current.get();
        let mut de = serde_json::Deserializer::from_str(text);
        let next = match (array_index(key), value_type(current)) {
            (Some(index), JsonValueType::Array) => de.deserialize_seq(NthElement { index })?,
            (None, JsonValueType::Object) => de.deserialize_map(MemberByKey { key })?,
            _ => None,
        };

        current = next.ok_or_else(not_found)?;
    }

    Ok(JsonField::new(current))
}

fn display_path<K: AsRef<str>>(key_path: &[K]) -> String {
    key_path
        .iter()
        .map(|k| k.as_ref())
        .collect::<Vec<_>>()
        .join(".")
}

fn array_index(key: &str) -> Option<usize> {
    key.strip_prefix('[')?.strip_suffix(']')?.parse().ok()
}

fn value_type(raw: &RawValue) -> JsonValueType {
    match raw.get().trim_start().as_bytes().first() {
        Some(b'"') => JsonValueType::String,
        Some(b'{') => JsonValueType::Object,
        Some(b'[') => JsonValueType::Array,
        Some(b't') | Some(b'f') => JsonValueType::Boolean,
        Some(b'n') => JsonValueType::Null,
        _ => JsonValueType::Number,
    }
}

/// Finds the first member named `key`, skipping the rest of the object.
struct MemberByKey<'k> {
    key: &'k str,
}

impl<'de, 'k> Visitor<'de> for MemberByKey<'k> {
    type Value = Option<&'de RawValue>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut found = None;
        while let Some(is_match) = map.next_key_seed(KeyEquals { key: self.key })? {
            if is_match && found.is_none() {
                found = Some(map.next_value::<&'de RawValue>()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(found)
    }
}

/// Compares an object key against `key` without allocating.
struct KeyEquals<'k> {
    key: &'k str,
}

impl<'de, 'k> DeserializeSeed<'de> for KeyEquals<'k> {
    type Value = bool;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_str(self)
    }
}

impl<'de, 'k> Visitor<'de> for KeyEquals<'k> {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object key")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        Ok(v == self.key)
    }
}

/// Picks element `index` of an array, skipping the others.
struct NthElement {
    index: usize,
}

impl<'de> Visitor<'de> for NthElement {
    type Value = Option<&'de RawValue>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut found = None;
        let mut position = 0;
        loop {
            if position == self.index {
                match seq.next_element::<&'de RawValue>()? {
                    Some(raw) => found = Some(raw),
                    None => break,
                }
            } else if seq.next_element::<IgnoredAny>()?.is_none() {
                break;
            }
            position += 1;
        }
        Ok(found)
    }
}
