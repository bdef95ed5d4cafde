#![deny(missing_docs)]

//! # Schema Model
//!
//! A Schema Object reduced to the shapes that can carry nested `$ref`s.
//!
//! A schema is exactly one [`SchemaKind`]. When a document populates several
//! structural keywords at once, the kind is picked in this order:
//! `$ref`, `properties`, `allOf`, `anyOf`, `oneOf`, `items` / `type: array`.
//! Keywords that lose out stay untouched in [`Schema::extra`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The structural shape of a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// `$ref` pointer.
    Ref(String),
    /// Object schema with named `properties`.
    Object(IndexMap<String, Schema>),
    /// `allOf` composition.
    AllOf(Vec<Schema>),
    /// `anyOf` composition.
    AnyOf(Vec<Schema>),
    /// `oneOf` composition.
    OneOf(Vec<Schema>),
    /// Array schema, with its `items` schema when present.
    Array(Option<Box<Schema>>),
    /// JSON Schema boolean form (`true` / `false`).
    Boolean(bool),
    /// Anything else: no nested schemas we follow.
    Leaf,
}

/// A Schema Object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub struct Schema {
    /// Structural shape.
    pub kind: SchemaKind,
    /// All remaining keywords, verbatim.
    pub extra: IndexMap<String, JsonValue>,
}

impl Schema {
    /// Creates a schema of the given kind with no extra keywords.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            extra: IndexMap::new(),
        }
    }

    /// `{"$ref": reference}`
    pub fn reference(reference: impl Into<String>) -> Self {
        Self::new(SchemaKind::Ref(reference.into()))
    }

    /// A schema with no nested schemas, e.g. `{"type": "string"}`.
    pub fn leaf(schema_type: &str) -> Self {
        let mut schema = Self::new(SchemaKind::Leaf);
        schema
            .extra
            .insert("type".to_string(), JsonValue::String(schema_type.to_string()));
        schema
    }

    /// An object schema from `(name, schema)` pairs.
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        let props = properties.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let mut schema = Self::new(SchemaKind::Object(props));
        schema
            .extra
            .insert("type".to_string(), JsonValue::String("object".to_string()));
        schema
    }

    /// An array schema over `items`.
    pub fn array(items: Schema) -> Self {
        let mut schema = Self::new(SchemaKind::Array(Some(Box::new(items))));
        schema
            .extra
            .insert("type".to_string(), JsonValue::String("array".to_string()));
        schema
    }

    /// Returns the `$ref` target if this schema is a reference.
    pub fn ref_location(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Ref(r) => Some(r),
            _ => None,
        }
    }
}

impl TryFrom<JsonValue> for Schema {
    type Error = String;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        let object = match value {
            JsonValue::Object(object) => object,
            JsonValue::Bool(flag) => return Ok(Schema::new(SchemaKind::Boolean(flag))),
            other => {
                return Err(format!(
                    "schema must be an object or a boolean, found `{}`",
                    other
                ))
            }
        };
        let mut extra: IndexMap<String, JsonValue> = object.into_iter().collect();

        let kind = if let Some(reference) = extra.shift_remove("$ref") {
            match reference {
                JsonValue::String(r) => SchemaKind::Ref(r),
                other => return Err(format!("`$ref` must be a string, found `{}`", other)),
            }
        } else if let Some(props) = extra.shift_remove("properties") {
            SchemaKind::Object(parse_keyword("properties", props)?)
        } else if let Some(members) = extra.shift_remove("allOf") {
            SchemaKind::AllOf(parse_keyword("allOf", members)?)
        } else if let Some(members) = extra.shift_remove("anyOf") {
            SchemaKind::AnyOf(parse_keyword("anyOf", members)?)
        } else if let Some(members) = extra.shift_remove("oneOf") {
            SchemaKind::OneOf(parse_keyword("oneOf", members)?)
        } else if let Some(items) = extra.shift_remove("items") {
            SchemaKind::Array(Some(Box::new(parse_keyword("items", items)?)))
        } else if extra.get("type").and_then(JsonValue::as_str) == Some("array") {
            SchemaKind::Array(None)
        } else {
            SchemaKind::Leaf
        };

        Ok(Schema { kind, extra })
    }
}

fn parse_keyword<T>(keyword: &str, value: JsonValue) -> Result<T, String>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(value).map_err(|e| format!("invalid `{}`: {}", keyword, e))
}

fn schemas_to_json(members: Vec<Schema>) -> JsonValue {
    JsonValue::Array(members.into_iter().map(JsonValue::from).collect())
}

impl From<Schema> for JsonValue {
    fn from(schema: Schema) -> Self {
        let mut out = serde_json::Map::new();
        let structural = match schema.kind {
            SchemaKind::Boolean(flag) if schema.extra.is_empty() => return JsonValue::Bool(flag),
            SchemaKind::Boolean(_) | SchemaKind::Leaf | SchemaKind::Array(None) => None,
            SchemaKind::Ref(r) => {
                out.insert("$ref".to_string(), JsonValue::String(r));
                None
            }
            SchemaKind::Object(props) => Some((
                "properties",
                JsonValue::Object(props.into_iter().map(|(k, v)| (k, v.into())).collect()),
            )),
            SchemaKind::AllOf(members) => Some(("allOf", schemas_to_json(members))),
            SchemaKind::AnyOf(members) => Some(("anyOf", schemas_to_json(members))),
            SchemaKind::OneOf(members) => Some(("oneOf", schemas_to_json(members))),
            SchemaKind::Array(Some(items)) => Some(("items", JsonValue::from(*items))),
        };

        out.extend(schema.extra);
        if let Some((keyword, value)) = structural {
            out.insert(keyword.to_string(), value);
        }
        JsonValue::Object(out)
    }
}
