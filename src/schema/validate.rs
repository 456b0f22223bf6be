/// Schema validation
///
/// Walks a schema document and collects every shape and referential problem
/// instead of stopping at the first one, so the editor can mark all offending
/// fields at once. Paths use the document's own field names, e.g.
/// `tables[2].columns[0].type`.

use crate::schema::types::{ReferentialAction, Schema, TableData};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A single validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

/// All problems found in a schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Issues whose path starts with `prefix`
    pub fn issues_at<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.path.starts_with(prefix))
    }
}

/// Validate shapes and references of a schema document
pub fn validate_schema(schema: &Schema) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_ids(&mut report, "tables", schema.tables.iter().map(|t| t.id.as_str()));
    check_ids(&mut report, "relations", schema.relations.iter().map(|r| r.id.as_str()));
    check_ids(&mut report, "groups", schema.groups.iter().map(|g| g.id.as_str()));
    check_ids(&mut report, "notes", schema.notes.iter().map(|n| n.id.as_str()));

    let group_ids: HashSet<&str> = schema.groups.iter().map(|g| g.id.as_str()).collect();
    let mut table_names: HashMap<String, usize> = HashMap::new();

    for (ti, table) in schema.tables.iter().enumerate() {
        let path = format!("tables[{ti}]");

        if table.name.trim().is_empty() {
            report.push(format!("{path}.name"), "table name must not be empty");
        } else if let Some(first) = table_names.insert(table.name.trim().to_lowercase(), ti) {
            report.push(
                format!("{path}.name"),
                format!("duplicate table name '{}' (also tables[{first}])", table.name),
            );
        }

        if let Some(group_id) = &table.group_id {
            if !group_ids.contains(group_id.as_str()) {
                report.push(format!("{path}.groupId"), format!("unknown group '{group_id}'"));
            }
        }

        check_columns(&mut report, schema, table, &path);
    }

    let tables: HashMap<&str, &TableData> =
        schema.tables.iter().map(|t| (t.id.as_str(), t)).collect();

    for (ri, relation) in schema.relations.iter().enumerate() {
        let path = format!("relations[{ri}]");
        let endpoints = [
            ("source", &relation.source_table_id, &relation.source_column_id),
            ("target", &relation.target_table_id, &relation.target_column_id),
        ];
        for (side, table_id, column_id) in endpoints {
            match tables.get(table_id.as_str()) {
                None => report.push(
                    format!("{path}.{side}TableId"),
                    format!("unknown table '{table_id}'"),
                ),
                Some(table) if table.column(column_id).is_none() => report.push(
                    format!("{path}.{side}ColumnId"),
                    format!("unknown column '{column_id}' in table '{}'", table.name),
                ),
                Some(_) => {}
            }
        }

        let set_null = [
            ("onDelete", relation.on_delete),
            ("onUpdate", relation.on_update),
        ];
        let source_column = tables
            .get(relation.source_table_id.as_str())
            .and_then(|t| t.column(&relation.source_column_id));
        if let Some(column) = source_column {
            for (field, action) in set_null {
                if action == ReferentialAction::SetNull && !column.nullable {
                    report.push(
                        format!("{path}.{field}"),
                        format!("SET NULL requires nullable source column '{}'", column.name),
                    );
                }
            }
        }
    }

    for (gi, group) in schema.groups.iter().enumerate() {
        check_size(&mut report, &format!("groups[{gi}]"), group.width, group.height);
    }
    for (ni, note) in schema.notes.iter().enumerate() {
        check_size(&mut report, &format!("notes[{ni}]"), note.width, note.height);
    }

    report
}

fn check_columns(report: &mut ValidationReport, schema: &Schema, table: &TableData, table_path: &str) {
    check_ids(
        report,
        &format!("{table_path}.columns"),
        table.columns.iter().map(|c| c.id.as_str()),
    );

    let mut names: HashMap<String, usize> = HashMap::new();
    for (ci, column) in table.columns.iter().enumerate() {
        let path = format!("{table_path}.columns[{ci}]");

        if column.name.trim().is_empty() {
            report.push(format!("{path}.name"), "column name must not be empty");
        } else if let Some(first) = names.insert(column.name.trim().to_lowercase(), ci) {
            report.push(
                format!("{path}.name"),
                format!("duplicate column name '{}' (also columns[{first}])", column.name),
            );
        }

        if column.sql_type.trim().is_empty() {
            report.push(format!("{path}.type"), "column type must not be empty");
        } else if !schema.engine.supports_type(&column.sql_type) {
            report.push(
                format!("{path}.type"),
                format!("type '{}' is not supported by {}", column.sql_type, schema.engine.label()),
            );
        }

        if column.primary_key && column.nullable {
            report.push(format!("{path}.nullable"), "primary key column cannot be nullable");
        }

        for (field, value) in [
            ("length", column.length),
            ("precision", column.precision),
            ("dimension", column.dimension),
        ] {
            if value == Some(0) {
                report.push(format!("{path}.{field}"), format!("{field} must be greater than 0"));
            }
        }

        if let (Some(precision), Some(scale)) = (column.precision, column.scale) {
            if scale > precision {
                report.push(
                    format!("{path}.scale"),
                    format!("scale {scale} exceeds precision {precision}"),
                );
            }
        }
    }
}

fn check_ids<'a>(report: &mut ValidationReport, collection: &str, ids: impl Iterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for (i, id) in ids.enumerate() {
        if id.trim().is_empty() {
            report.push(format!("{collection}[{i}].id"), "id must not be empty");
        } else if !seen.insert(id) {
            report.push(format!("{collection}[{i}].id"), format!("duplicate id '{id}'"));
        }
    }
}

fn check_size(report: &mut ValidationReport, path: &str, width: f64, height: f64) {
    if !(width > 0.0) {
        report.push(format!("{path}.width"), "width must be greater than 0");
    }
    if !(height > 0.0) {
        report.push(format!("{path}.height"), "height must be greater than 0");
    }
}
