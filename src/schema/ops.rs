/// Referential-safe edits on a schema document
///
/// Removing a table or column also drops every relation that pointed at it,
/// and removing a group releases its tables, so a document edited only
/// through these methods keeps its references intact.

use crate::schema::types::{Column, Position, Schema, TableData};

impl Schema {
    pub fn table(&self, table_id: &str) -> Option<&TableData> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    pub fn table_mut(&mut self, table_id: &str) -> Option<&mut TableData> {
        self.tables.iter_mut().find(|t| t.id == table_id)
    }

    /// Remove a table and its relations; returns the removed table
    pub fn remove_table(&mut self, table_id: &str) -> Option<TableData> {
        let index = self.tables.iter().position(|t| t.id == table_id)?;
        let removed = self.tables.remove(index);
        self.relations.retain(|r| !r.touches_table(table_id));
        Some(removed)
    }

    /// Remove a column and its relations; returns the removed column
    pub fn remove_column(&mut self, table_id: &str, column_id: &str) -> Option<Column> {
        let table = self.table_mut(table_id)?;
        let index = table.columns.iter().position(|c| c.id == column_id)?;
        let removed = table.columns.remove(index);
        self.relations
            .retain(|r| !r.touches_column(table_id, column_id));
        Some(removed)
    }

    /// Remove a group and detach its tables; returns how many tables were detached
    pub fn remove_group(&mut self, group_id: &str) -> Option<usize> {
        let index = self.groups.iter().position(|g| g.id == group_id)?;
        self.groups.remove(index);
        let mut detached = 0;
        for table in self
            .tables
            .iter_mut()
            .filter(|t| t.group_id.as_deref() == Some(group_id))
        {
            table.group_id = None;
            detached += 1;
        }
        Some(detached)
    }

    /// Returns false when the table does not exist
    pub fn move_table(&mut self, table_id: &str, position: Position) -> bool {
        match self.table_mut(table_id) {
            Some(table) => {
                table.position = position;
                true
            }
            None => false,
        }
    }

    /// Returns false when the table does not exist
    pub fn rename_table(&mut self, table_id: &str, name: &str) -> bool {
        match self.table_mut(table_id) {
            Some(table) => {
                table.name = name.to_string();
                true
            }
            None => false,
        }
    }
}
