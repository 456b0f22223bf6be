/// Schema Design Layer
///
/// In-memory model of an entity-relationship design and everything derived
/// from it:
/// - Type definitions (tables, columns, relations, groups, notes)
/// - Engine type catalogs and default entities
/// - Validation and referential-safe edits
/// - Canvas nodes/edges for the diagram editor

// Target engines and their type catalogs
pub mod engine;

// Core schema type definitions
pub mod types;

// Default entities for new tables, columns, relations, groups and notes
pub mod defaults;

// Shape and reference validation
pub mod validate;

// Cascading edit helpers on Schema
pub mod ops;

// Derived canvas representation
pub mod canvas;

// Re-export commonly used types
pub use canvas::{apply_moves, Canvas, CanvasEdge, CanvasNode, NodeKind, NodeMove};
pub use engine::Engine;
pub use types::{
    Cardinality, Column, GroupData, NoteData, Position, ReferentialAction, Relation, Schema,
    TableData,
};
pub use validate::{validate_schema, ValidationIssue, ValidationReport};
