/// Core schema type definitions
///
/// Defines tables, columns, relations, groups and notes as edited on the
/// canvas. These types are serialized as camelCase JSON, both on the wire and
/// in the stored project document.

use crate::schema::engine::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canvas coordinates of an entity's top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single column of a table
///
/// `nullable` defaults to the opposite of `primaryKey` when a document leaves
/// it out, so `{"primaryKey": true}` describes a NOT NULL key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ColumnDocument")]
pub struct Column {
    /// Unique column identifier within its table
    pub id: String,
    /// Column name as emitted in SQL
    pub name: String,
    /// SQL type name (e.g., "VARCHAR", "NUMERIC(10,2)")
    #[serde(rename = "type")]
    pub sql_type: String,
    pub primary_key: bool,
    pub nullable: bool,
    pub unique: bool,
    /// Default value expression, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Character length for CHAR/VARCHAR-like types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Vector dimension (pgvector-style columns)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Column as accepted from documents, before defaults are settled
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnDocument {
    id: String,
    name: String,
    #[serde(rename = "type")]
    sql_type: String,
    #[serde(default)]
    primary_key: bool,
    nullable: Option<bool>,
    #[serde(default)]
    unique: bool,
    default: Option<String>,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
    dimension: Option<u32>,
    comment: Option<String>,
}

impl From<ColumnDocument> for Column {
    fn from(doc: ColumnDocument) -> Self {
        Column {
            nullable: doc.nullable.unwrap_or(!doc.primary_key),
            id: doc.id,
            name: doc.name,
            sql_type: doc.sql_type,
            primary_key: doc.primary_key,
            unique: doc.unique,
            default: doc.default,
            length: doc.length,
            precision: doc.precision,
            scale: doc.scale,
            dimension: doc.dimension,
            comment: doc.comment,
        }
    }
}

/// A table node on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub position: Position,
    /// Header color, any CSS color string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Group this table is placed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TableData {
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }
}

/// How many rows on each side of a relation may match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    /// Short crow's-foot style label used on canvas edges
    pub fn label(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "1:1",
            Cardinality::OneToMany => "1:N",
            Cardinality::ManyToOne => "N:1",
            Cardinality::ManyToMany => "N:M",
        }
    }
}

/// Foreign key ON DELETE / ON UPDATE behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        })
    }
}

/// A foreign-key style link from a source column to a target column
///
/// The source side holds the reference, the target side is usually a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    /// Constraint name, generated at export time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source_table_id: String,
    pub source_column_id: String,
    pub target_table_id: String,
    pub target_column_id: String,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub on_delete: ReferentialAction,
    #[serde(default)]
    pub on_update: ReferentialAction,
}

impl Relation {
    /// Whether either endpoint sits on the given table
    pub fn touches_table(&self, table_id: &str) -> bool {
        self.source_table_id == table_id || self.target_table_id == table_id
    }

    /// Whether either endpoint is the given column of the given table
    pub fn touches_column(&self, table_id: &str, column_id: &str) -> bool {
        (self.source_table_id == table_id && self.source_column_id == column_id)
            || (self.target_table_id == table_id && self.target_column_id == column_id)
    }
}

/// A colored container that visually groups tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupData {
    pub id: String,
    pub name: String,
    pub color: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
}

/// A free-floating sticky note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteData {
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub color: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
}

/// A complete schema design: the document edited on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub engine: Engine,
    #[serde(default)]
    pub tables: Vec<TableData>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub groups: Vec<GroupData>,
    #[serde(default)]
    pub notes: Vec<NoteData>,
}
