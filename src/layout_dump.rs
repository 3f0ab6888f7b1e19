use crate::genogram::Genogram;
use serde::Serialize;
use std::io::Write;

/// JSON view of a laid-out genogram, shaped the way node-graph front ends
/// expect nodes (`type`, `data`, `position`) and edges.
#[derive(Debug, Serialize)]
pub struct GenogramDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub data: NodeData,
    pub position: Position,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    pub sex: Option<String>,
    pub marital_status: Option<String>,
    pub age: Option<u32>,
    pub photo_url: Option<String>,
    pub generation: usize,
}

#[derive(Debug, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: &'static str,
    pub label: String,
    pub animated: bool,
}

impl GenogramDump {
    pub fn from_genogram(genogram: &Genogram) -> Self {
        let nodes = genogram
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                node_type: node.shape.node_type(),
                data: NodeData {
                    label: node.label.clone(),
                    sex: node.sex.clone(),
                    marital_status: node.marital_status.clone(),
                    age: node.age,
                    photo_url: node.photo_url.clone(),
                    generation: node.generation,
                },
                position: Position { x: node.x, y: node.y },
                width: node.width,
                height: node.height,
            })
            .collect();

        let edges = genogram
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                edge_type: edge.kind.as_str(),
                label: edge.label.clone(),
                animated: edge.animated,
            })
            .collect();

        GenogramDump {
            width: genogram.width,
            height: genogram.height,
            nodes,
            edges,
        }
    }
}

pub fn to_json_value(genogram: &Genogram) -> serde_json::Value {
    serde_json::to_value(GenogramDump::from_genogram(genogram)).unwrap_or(serde_json::Value::Null)
}

pub fn write_genogram_dump(writer: impl Write, genogram: &Genogram) -> anyhow::Result<()> {
    let dump = GenogramDump::from_genogram(genogram);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::genogram::build_genogram_at;
    use crate::ir::{Member, Relationship};
    use chrono::NaiveDate;

    #[test]
    fn dump_uses_front_end_field_names() {
        let members = vec![
            Member::new("1")
                .with_name("Juan", "Pérez")
                .with_sex("M")
                .with_relationship(Relationship::new("2", "Esposa").cohabiting()),
            Member::new("2").with_name("Eva", "Soto"),
        ];
        let genogram = build_genogram_at(
            &["1".to_string(), "2".to_string()],
            &members,
            &LayoutConfig::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let value = to_json_value(&genogram);
        assert_eq!(value["nodes"][0]["type"], "maleNode");
        assert_eq!(value["nodes"][1]["type"], "femaleNode");
        assert_eq!(value["nodes"][0]["data"]["label"], "Juan Pérez");
        assert!(value["nodes"][0]["data"]["age"].is_null());
        assert_eq!(value["nodes"][0]["position"]["x"], 50.0);
        assert_eq!(value["edges"][0]["type"], "marriage");
        assert_eq!(value["edges"][0]["animated"], true);
        assert_eq!(value["edges"][0]["id"], "1-2");
    }

    #[test]
    fn writes_pretty_json() {
        let mut out = Vec::new();
        write_genogram_dump(&mut out, &Genogram::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"nodes\": []"));
    }
}
