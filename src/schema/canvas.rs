/// Canvas representation derived from a schema
///
/// The diagram editor renders nodes and edges rather than tables and
/// relations. This module derives that view from a `Schema` and writes node
/// moves made on the canvas back into the document.
///
/// Node order matters to the renderer: groups first so they sit underneath,
/// then tables, then notes on top. Tables placed in a group are emitted with
/// `parentId` and a position relative to the group's origin; the schema always
/// stores absolute positions.

use crate::schema::types::{Column, Position, Schema};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TABLE_WIDTH: f64 = 240.0;
pub const TABLE_HEADER_HEIGHT: f64 = 40.0;
pub const COLUMN_ROW_HEIGHT: f64 = 28.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Table,
    Group,
    Note,
}

/// Renderer payload of a node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeData {
    Table {
        name: String,
        color: Option<String>,
        columns: Vec<Column>,
    },
    Group {
        name: String,
        color: String,
    },
    Note {
        content: String,
        color: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Relative to the parent when `parent_id` is set, absolute otherwise
    pub position: Position,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: String,
    pub target_handle: String,
    pub label: String,
}

/// Axis-aligned rectangle in absolute canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Canvas {
    pub nodes: Vec<CanvasNode>,
    pub edges: Vec<CanvasEdge>,
}

/// A node position reported by the canvas after a drag
///
/// Positions are absolute; the editor resolves parent offsets before sending.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMove {
    pub id: String,
    pub kind: NodeKind,
    pub position: Position,
}

/// Rendered height of a table with `columns` rows
pub fn table_height(columns: usize) -> f64 {
    TABLE_HEADER_HEIGHT + columns as f64 * COLUMN_ROW_HEIGHT
}

pub fn source_handle(column_id: &str) -> String {
    format!("{column_id}-source")
}

pub fn target_handle(column_id: &str) -> String {
    format!("{column_id}-target")
}

impl Canvas {
    pub fn from_schema(schema: &Schema) -> Self {
        let group_origins: HashMap<&str, Position> = schema
            .groups
            .iter()
            .map(|g| (g.id.as_str(), g.position))
            .collect();

        let mut nodes = Vec::with_capacity(
            schema.groups.len() + schema.tables.len() + schema.notes.len(),
        );

        for group in &schema.groups {
            nodes.push(CanvasNode {
                id: group.id.clone(),
                kind: NodeKind::Group,
                position: group.position,
                width: group.width,
                height: group.height,
                parent_id: None,
                data: NodeData::Group {
                    name: group.name.clone(),
                    color: group.color.clone(),
                },
            });
        }

        for table in &schema.tables {
            // Unknown group ids render the table free-standing
            let parent = table
                .group_id
                .as_deref()
                .and_then(|id| group_origins.get(id).map(|origin| (id, *origin)));
            let (position, parent_id) = match parent {
                Some((id, origin)) => (
                    Position::new(table.position.x - origin.x, table.position.y - origin.y),
                    Some(id.to_string()),
                ),
                None => (table.position, None),
            };

            nodes.push(CanvasNode {
                id: table.id.clone(),
                kind: NodeKind::Table,
                position,
                width: TABLE_WIDTH,
                height: table_height(table.columns.len()),
                parent_id,
                data: NodeData::Table {
                    name: table.name.clone(),
                    color: table.color.clone(),
                    columns: table.columns.clone(),
                },
            });
        }

        for note in &schema.notes {
            nodes.push(CanvasNode {
                id: note.id.clone(),
                kind: NodeKind::Note,
                position: note.position,
                width: note.width,
                height: note.height,
                parent_id: None,
                data: NodeData::Note {
                    content: note.content.clone(),
                    color: note.color.clone(),
                },
            });
        }

        let edges = schema
            .relations
            .iter()
            .map(|relation| CanvasEdge {
                id: relation.id.clone(),
                source: relation.source_table_id.clone(),
                target: relation.target_table_id.clone(),
                source_handle: source_handle(&relation.source_column_id),
                target_handle: target_handle(&relation.target_column_id),
                label: relation.cardinality.label().to_string(),
            })
            .collect();

        Self { nodes, edges }
    }

    /// Bounding box of all nodes, `None` when the canvas is empty
    pub fn bounds(&self) -> Option<Bounds> {
        let origins: HashMap<&str, Position> = self
            .nodes
            .iter()
            .filter(|n| n.parent_id.is_none())
            .map(|n| (n.id.as_str(), n.position))
            .collect();

        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for node in &self.nodes {
            let offset = node
                .parent_id
                .as_deref()
                .and_then(|id| origins.get(id))
                .copied()
                .unwrap_or_default();
            let x = node.position.x + offset.x;
            let y = node.position.y + offset.y;
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x + node.width), max.1.max(y + node.height));
        }

        if self.nodes.is_empty() {
            return None;
        }
        Some(Bounds {
            x: min.0,
            y: min.1,
            width: max.0 - min.0,
            height: max.1 - min.1,
        })
    }
}

/// Write canvas moves back into the schema
///
/// Returns the ids that matched no entity of the given kind; every other move
/// is applied.
pub fn apply_moves(schema: &mut Schema, moves: &[NodeMove]) -> Vec<String> {
    let mut unknown = Vec::new();
    for node_move in moves {
        let target = match node_move.kind {
            NodeKind::Table => schema
                .tables
                .iter_mut()
                .find(|t| t.id == node_move.id)
                .map(|t| &mut t.position),
            NodeKind::Group => schema
                .groups
                .iter_mut()
                .find(|g| g.id == node_move.id)
                .map(|g| &mut g.position),
            NodeKind::Note => schema
                .notes
                .iter_mut()
                .find(|n| n.id == node_move.id)
                .map(|n| &mut n.position),
        };
        match target {
            Some(position) => *position = node_move.position,
            None => unknown.push(node_move.id.clone()),
        }
    }
    unknown
}
