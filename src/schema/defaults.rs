/// Default entities created by the editor
///
/// New tables, columns, relations, groups and notes start from these shapes.
/// Generated names take the smallest free `{prefix}_{n}` suffix so that a
/// freshly added entity never collides with an existing one.

use crate::schema::engine::Engine;
use crate::schema::types::{
    Cardinality, Column, GroupData, NoteData, Position, ReferentialAction, Relation, Schema,
    TableData,
};

pub const DEFAULT_TABLE_COLOR: &str = "#175e7a";
pub const DEFAULT_GROUP_COLOR: &str = "#9e9e9e";
pub const DEFAULT_NOTE_COLOR: &str = "#fcf7ac";
pub const DEFAULT_GROUP_WIDTH: f64 = 480.0;
pub const DEFAULT_GROUP_HEIGHT: f64 = 320.0;
pub const DEFAULT_NOTE_WIDTH: f64 = 180.0;
pub const DEFAULT_NOTE_HEIGHT: f64 = 120.0;

/// Fresh entity identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The `id` primary key column every new table starts with
pub fn default_id_column(engine: Engine) -> Column {
    Column {
        id: new_id(),
        name: "id".to_string(),
        sql_type: engine.default_id_type().to_string(),
        primary_key: true,
        nullable: false,
        unique: true,
        default: None,
        length: None,
        precision: None,
        scale: None,
        dimension: None,
        comment: None,
    }
}

/// New table named after the first free `table_N`
pub fn new_table(engine: Engine, existing: &[TableData], position: Position) -> TableData {
    let name = next_free_name("table", existing.iter().map(|t| t.name.as_str()));
    TableData {
        id: new_id(),
        name,
        columns: vec![default_id_column(engine)],
        position,
        color: Some(DEFAULT_TABLE_COLOR.to_string()),
        group_id: None,
        comment: None,
    }
}

/// New nullable text column named after the first free `column_N` in `table`
pub fn new_column(engine: Engine, table: &TableData) -> Column {
    let name = next_free_name("column", table.columns.iter().map(|c| c.name.as_str()));
    let sql_type = engine.default_text_type();
    Column {
        id: new_id(),
        name,
        sql_type: sql_type.to_string(),
        primary_key: false,
        nullable: true,
        unique: false,
        default: None,
        length: (sql_type == "VARCHAR").then_some(255),
        precision: None,
        scale: None,
        dimension: None,
        comment: None,
    }
}

/// New many-to-one relation with NO ACTION on both events
pub fn new_relation(
    source_table_id: &str,
    source_column_id: &str,
    target_table_id: &str,
    target_column_id: &str,
) -> Relation {
    Relation {
        id: new_id(),
        name: None,
        source_table_id: source_table_id.to_string(),
        source_column_id: source_column_id.to_string(),
        target_table_id: target_table_id.to_string(),
        target_column_id: target_column_id.to_string(),
        cardinality: Cardinality::ManyToOne,
        on_delete: ReferentialAction::NoAction,
        on_update: ReferentialAction::NoAction,
    }
}

pub fn new_group(existing: &[GroupData], position: Position) -> GroupData {
    GroupData {
        id: new_id(),
        name: next_free_name("group", existing.iter().map(|g| g.name.as_str())),
        color: DEFAULT_GROUP_COLOR.to_string(),
        position,
        width: DEFAULT_GROUP_WIDTH,
        height: DEFAULT_GROUP_HEIGHT,
    }
}

pub fn new_note(position: Position) -> NoteData {
    NoteData {
        id: new_id(),
        content: String::new(),
        color: DEFAULT_NOTE_COLOR.to_string(),
        position,
        width: DEFAULT_NOTE_WIDTH,
        height: DEFAULT_NOTE_HEIGHT,
    }
}

pub fn empty_schema(engine: Engine) -> Schema {
    Schema {
        engine,
        tables: Vec::new(),
        relations: Vec::new(),
        groups: Vec::new(),
        notes: Vec::new(),
    }
}

/// Smallest `{prefix}_{n}` (n >= 1) not present in `taken`, compared case-insensitively
fn next_free_name<'a>(prefix: &str, taken: impl Iterator<Item = &'a str>) -> String {
    let taken: Vec<String> = taken.map(|name| name.to_ascii_lowercase()).collect();
    (1..)
        .map(|n| format!("{prefix}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| format!("{prefix}_{}", taken.len() + 1))
}
