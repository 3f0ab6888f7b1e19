use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{GenogramError, Result};

pub type MemberId = String;

/// A member document as stored by the congregation database.
///
/// Field names accept both the camelCase English spelling and the stored
/// Spanish document fields (`nombre`, `apellido`, `genograma`, ...).
/// Every field except `id` is optional and read leniently: values of the
/// wrong type are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(deserialize_with = "required_id")]
    pub id: MemberId,
    #[serde(default, alias = "nombre", deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(default, alias = "apellido", deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(default, alias = "sexo", deserialize_with = "lenient_string")]
    pub sex: Option<String>,
    #[serde(default, alias = "fechaNacimiento", deserialize_with = "lenient_string")]
    pub birth_date: Option<String>,
    #[serde(default, alias = "estadoCivil", deserialize_with = "lenient_string")]
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub photo_url: Option<String>,
    #[serde(default, alias = "genograma", deserialize_with = "lenient_relationships")]
    pub relationships: Vec<Relationship>,
}

/// One stored relationship entry. Entries are directed and unvalidated:
/// an entry on A pointing at B says nothing about B's entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default, alias = "miembroId", deserialize_with = "lenient_id")]
    pub target_id: Option<MemberId>,
    #[serde(
        default,
        alias = "relacion",
        alias = "relationLabel",
        deserialize_with = "lenient_label"
    )]
    pub label: String,
    #[serde(default, alias = "nombre", deserialize_with = "lenient_string")]
    pub target_name: Option<String>,
    #[serde(default, alias = "edad", deserialize_with = "lenient_age")]
    pub target_age: Option<u32>,
    #[serde(default, alias = "viveConElMiembro", deserialize_with = "lenient_bool")]
    pub cohabits: bool,
}

impl Member {
    pub fn new(id: impl Into<MemberId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, first: &str, last: &str) -> Self {
        self.first_name = Some(first.to_string());
        self.last_name = Some(last.to_string());
        self
    }

    pub fn with_sex(mut self, sex: &str) -> Self {
        self.sex = Some(sex.to_string());
        self
    }

    pub fn with_birth_date(mut self, date: &str) -> Self {
        self.birth_date = Some(date.to_string());
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// First and last name joined by a space, skipping empty parts.
    /// Falls back to the id when the member has no name at all.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            self.id.clone()
        } else {
            parts.join(" ")
        }
    }

    /// Ids this member points at, skipping entries without a target.
    pub fn related_ids(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter_map(|rel| rel.target_id.as_deref())
    }
}

impl Relationship {
    pub fn new(target: impl Into<MemberId>, label: &str) -> Self {
        Self {
            target_id: Some(target.into()),
            label: label.to_string(),
            ..Self::default()
        }
    }

    pub fn cohabiting(mut self) -> Self {
        self.cohabits = true;
        self
    }
}

/// Reads a member list out of an arbitrary JSON value.
///
/// Accepts an array of documents or an object keyed by document id (the
/// shape of a collection export). Returns `None` for anything else;
/// documents that cannot be read as a member are skipped.
pub fn parse_members_value(value: &Value) -> Option<Vec<Member>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(member_from_value).collect()),
        Value::Object(map) => Some(
            map.iter()
                .filter_map(|(key, doc)| member_from_keyed(key, doc))
                .collect(),
        ),
        _ => None,
    }
}

/// Reads a list of member ids. Returns `None` unless `value` is an array;
/// elements that are neither strings nor numbers are skipped.
pub fn parse_member_ids(value: &Value) -> Option<Vec<MemberId>> {
    let Value::Array(items) = value else {
        return None;
    };
    Some(items.iter().filter_map(id_from_value).collect())
}

pub fn parse_members_str(input: &str) -> Result<Vec<Member>> {
    let value: Value = serde_json::from_str(input)?;
    parse_members_value(&value).ok_or(GenogramError::NotAnArray)
}

pub fn load_members(path: &Path) -> Result<Vec<Member>> {
    let documents = load_documents(path)?;
    parse_members_value(&documents).ok_or(GenogramError::NotAnArray)
}

/// Reads a snapshot as raw JSON, for callers that write it back and must
/// keep fields and documents this crate does not model.
pub fn load_documents(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path).map_err(|source| GenogramError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let documents: Value = serde_json::from_str(&contents)?;
    match documents {
        Value::Array(_) | Value::Object(_) => Ok(documents),
        _ => Err(GenogramError::NotAnArray),
    }
}

pub(crate) fn member_from_value(value: &Value) -> Option<Member> {
    match Member::deserialize(value) {
        Ok(member) => Some(member),
        Err(err) => {
            tracing::trace!(%err, "skipping unreadable member document");
            None
        }
    }
}

/// A document from a collection export, where the key doubles as the id
/// when the document carries none.
pub(crate) fn member_from_keyed(key: &str, doc: &Value) -> Option<Member> {
    let mut doc = doc.clone();
    if let Value::Object(fields) = &mut doc {
        fields
            .entry("id")
            .or_insert_with(|| Value::String(key.to_string()));
    }
    member_from_value(&doc)
}

pub(crate) fn id_from_value(value: &Value) -> Option<MemberId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_id<'de, D>(deserializer: D) -> std::result::Result<MemberId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value).ok_or_else(|| serde::de::Error::custom("member id must be a string or number"))
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<MemberId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_from_value(&value))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_label<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn lenient_age<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "si" | "sí" | "yes"),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    })
}

fn lenient_relationships<'de, D>(deserializer: D) -> std::result::Result<Vec<Relationship>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| Relationship::deserialize(item).ok())
        .collect())
}
