use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::age::age_from_str;
use crate::error::{GenogramError, Result};
use crate::ir::{Member, member_from_keyed, member_from_value};
use crate::relation::{canonical_label, inverse_label};

const STORED_LIST: &str = "genograma";
const CAMEL_LIST: &str = "relationships";

/// Where a member's document lives inside the snapshot.
enum Slot {
    Index(usize),
    Key(String),
}

/// Field spelling of relationship entries, taken from the document itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryStyle {
    Stored,
    Camel,
}

/// Records a relationship in both directions on a raw snapshot.
///
/// `from` gets `{to, label}` and `to` gets the inverse label pointing back,
/// each entry caching the other member's display name and age on `today`.
/// Only the two relationship lists grow: every other document and field,
/// including ones no [`Member`] models, is left as it was, and entries
/// use the field names the document already uses. Existing entries are
/// never touched, so older one-sided data stays one-sided.
pub fn link_documents(
    documents: &mut Value,
    from: &str,
    to: &str,
    label: &str,
    cohabits: bool,
    today: NaiveDate,
) -> Result<()> {
    if from == to {
        return Err(GenogramError::SelfLink(from.to_string()));
    }
    let (from_slot, from_member) = locate(documents, from)?;
    let (to_slot, to_member) = locate(documents, to)?;

    let label = match canonical_label(label) {
        Some(offered) => offered.to_string(),
        None => {
            tracing::warn!(label, "relationship label is not one of the offered labels");
            label.trim().to_string()
        }
    };
    let inverse = inverse_label(&label, from_member.sex.as_deref());

    if let Some(doc) = document_mut(documents, &from_slot) {
        append_entry(doc, &to_member, &label, cohabits, today);
    }
    if let Some(doc) = document_mut(documents, &to_slot) {
        append_entry(doc, &from_member, &inverse, cohabits, today);
    }
    tracing::debug!(from, to, label = %label, inverse = %inverse, "linked members");
    Ok(())
}

/// The first readable document with `id`, matching how the snapshot is
/// read for grouping.
fn locate(documents: &Value, id: &str) -> Result<(Slot, Member)> {
    let found = match documents {
        Value::Array(items) => items.iter().enumerate().find_map(|(idx, doc)| {
            member_from_value(doc)
                .filter(|member| member.id == id)
                .map(|member| (Slot::Index(idx), member))
        }),
        Value::Object(map) => map.iter().find_map(|(key, doc)| {
            member_from_keyed(key, doc)
                .filter(|member| member.id == id)
                .map(|member| (Slot::Key(key.clone()), member))
        }),
        _ => return Err(GenogramError::NotAnArray),
    };
    found.ok_or_else(|| GenogramError::UnknownMember(id.to_string()))
}

fn document_mut<'a>(documents: &'a mut Value, slot: &Slot) -> Option<&'a mut Map<String, Value>> {
    let doc = match slot {
        Slot::Index(idx) => documents.get_mut(*idx),
        Slot::Key(key) => documents.get_mut(key.as_str()),
    }?;
    doc.as_object_mut()
}

fn append_entry(doc: &mut Map<String, Value>, target: &Member, label: &str, cohabits: bool, today: NaiveDate) {
    let list_key = if doc.contains_key(STORED_LIST) || !doc.contains_key(CAMEL_LIST) {
        STORED_LIST
    } else {
        CAMEL_LIST
    };
    let list = doc
        .entry(list_key)
        .or_insert_with(|| Value::Array(Vec::new()));
    if !list.is_array() {
        tracing::warn!(field = list_key, "replacing unreadable relationship list");
        *list = Value::Array(Vec::new());
    }
    let Value::Array(entries) = list else {
        return;
    };
    let style = entry_style(list_key, entries);
    entries.push(entry_about(target, label, cohabits, today, style));
}

/// Follows the first existing entry, else the list's own spelling.
fn entry_style(list_key: &str, entries: &[Value]) -> EntryStyle {
    for entry in entries.iter().filter_map(Value::as_object) {
        if entry.contains_key("miembroId") || entry.contains_key("relacion") {
            return EntryStyle::Stored;
        }
        if entry.contains_key("targetId") || entry.contains_key("label") {
            return EntryStyle::Camel;
        }
    }
    if list_key == STORED_LIST {
        EntryStyle::Stored
    } else {
        EntryStyle::Camel
    }
}

fn entry_about(target: &Member, label: &str, cohabits: bool, today: NaiveDate, style: EntryStyle) -> Value {
    let [id_key, label_key, name_key, age_key, cohabits_key] = match style {
        EntryStyle::Stored => ["miembroId", "relacion", "nombre", "edad", "viveConElMiembro"],
        EntryStyle::Camel => ["targetId", "label", "targetName", "targetAge", "cohabits"],
    };
    let mut entry = Map::new();
    entry.insert(id_key.to_string(), Value::String(target.id.clone()));
    entry.insert(label_key.to_string(), Value::String(label.to_string()));
    entry.insert(name_key.to_string(), Value::String(target.display_name()));
    if let Some(age) = age_from_str(target.birth_date.as_deref(), today) {
        entry.insert(age_key.to_string(), Value::from(age));
    }
    entry.insert(cohabits_key.to_string(), Value::Bool(cohabits));
    Value::Object(entry)
}
