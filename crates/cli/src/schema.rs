use anyhow::{Context, Result, bail};
use argdecode::{
    Decoder, Key, POSITIONAL_KEY, ValueDecoder, boolean, count, field, flag, float, int, list,
    positional, string, succeed,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const DEFAULT_SCHEMA_NAME: &str = "argdecode.json";

/// Declarative description of the record to decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSchema>,

    /// Collect positional arguments under `_`.
    #[serde(default)]
    pub positional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: FieldType,

    /// Accept repeated occurrences.
    #[serde(default)]
    pub list: bool,

    /// Used when the field is absent. Malformed input is still an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Json>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Int,
    Float,
    Bool,
    Flag,
    Count,
}

impl Schema {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema: {}", path.display()))?;
        let schema: Schema = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse schema JSON: {}", path.display()))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for f in &self.fields {
            let name = f.name.trim_start_matches('-');
            if name.is_empty() {
                bail!("schema error: field name must not be empty");
            }
            if name == POSITIONAL_KEY {
                bail!("schema error: '{POSITIONAL_KEY}' is reserved for positional arguments");
            }
            if !seen.insert(name) {
                bail!("schema error: duplicate field '{name}'");
            }
            if f.list && matches!(f.kind, FieldType::Flag | FieldType::Count) {
                bail!("schema error: field '{name}' cannot be both a list and a {:?}", f.kind);
            }
        }
        Ok(())
    }

    /// One decoder for the whole record; every failing field is reported.
    pub fn decoder(&self) -> Decoder<IndexMap<String, Json>> {
        let mut record = succeed(IndexMap::new());
        for f in &self.fields {
            let name = f.name.trim_start_matches('-').to_string();
            record = record
                .and(field_decoder(f))
                .map(move |(mut map, value)| {
                    map.insert(name.clone(), value);
                    map
                });
        }
        if self.positional {
            record = record.and(positional()).map(|(mut map, rest)| {
                map.insert(POSITIONAL_KEY.to_string(), Json::from(rest));
                map
            });
        }
        record
    }
}

fn value_decoder(kind: FieldType) -> ValueDecoder<Json> {
    match kind {
        FieldType::Int => int().map(Json::from),
        FieldType::Float => float().map(Json::from),
        FieldType::Bool | FieldType::Flag | FieldType::Count => boolean().map(Json::Bool),
        FieldType::String => string().map(Json::String),
    }
}

fn field_decoder(f: &FieldSchema) -> Decoder<Json> {
    let mut key = Key::new(&f.name);
    if let Some(short) = &f.short {
        key = key.short(short);
    }
    let decoder = match (f.kind, f.list) {
        (FieldType::Flag, _) => flag(key).map(Json::Bool),
        (FieldType::Count, _) => count(key).map(Json::from),
        (kind, false) => field(key, value_decoder(kind)),
        (kind, true) => list(key, value_decoder(kind)).map(Json::Array),
    };
    match &f.default {
        Some(default) => decoder.with_default(default.clone()),
        None => decoder,
    }
}
