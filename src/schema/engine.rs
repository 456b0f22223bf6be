/// Target SQL engines and their column type catalogs
///
/// The catalog is the set of type names the editor offers for each engine and
/// the validator accepts. Parameterised spellings such as `VARCHAR(255)` are
/// matched on their base name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL dialect a project is designed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Postgresql,
    Mysql,
    Sqlite,
}

const POSTGRESQL_TYPES: &[&str] = &[
    "SMALLINT", "INTEGER", "INT", "BIGINT", "SERIAL", "SMALLSERIAL", "BIGSERIAL",
    "DECIMAL", "NUMERIC", "REAL", "DOUBLE PRECISION", "MONEY",
    "CHAR", "VARCHAR", "TEXT", "BYTEA",
    "BOOLEAN",
    "DATE", "TIME", "TIMETZ", "TIMESTAMP", "TIMESTAMPTZ", "INTERVAL",
    "UUID", "JSON", "JSONB", "XML",
    "INET", "CIDR", "MACADDR",
    "POINT", "LINE", "POLYGON",
    "TSVECTOR", "VECTOR",
];

const MYSQL_TYPES: &[&str] = &[
    "TINYINT", "SMALLINT", "MEDIUMINT", "INT", "INTEGER", "BIGINT",
    "DECIMAL", "NUMERIC", "FLOAT", "DOUBLE", "BIT",
    "CHAR", "VARCHAR", "BINARY", "VARBINARY",
    "TINYTEXT", "TEXT", "MEDIUMTEXT", "LONGTEXT",
    "TINYBLOB", "BLOB", "MEDIUMBLOB", "LONGBLOB",
    "ENUM", "SET", "BOOLEAN",
    "DATE", "TIME", "DATETIME", "TIMESTAMP", "YEAR",
    "JSON", "GEOMETRY", "POINT",
];

const SQLITE_TYPES: &[&str] = &[
    "INTEGER", "INT", "REAL", "NUMERIC", "TEXT", "BLOB",
    "BOOLEAN", "DATE", "DATETIME", "VARCHAR",
];

impl Engine {
    /// Every supported engine, in display order
    pub const ALL: [Engine; 3] = [Engine::Postgresql, Engine::Mysql, Engine::Sqlite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Postgresql => "postgresql",
            Engine::Mysql => "mysql",
            Engine::Sqlite => "sqlite",
        }
    }

    /// Human-readable engine name
    pub fn label(&self) -> &'static str {
        match self {
            Engine::Postgresql => "PostgreSQL",
            Engine::Mysql => "MySQL",
            Engine::Sqlite => "SQLite",
        }
    }

    /// Accepted column type names (upper-case base names)
    pub fn data_types(&self) -> &'static [&'static str] {
        match self {
            Engine::Postgresql => POSTGRESQL_TYPES,
            Engine::Mysql => MYSQL_TYPES,
            Engine::Sqlite => SQLITE_TYPES,
        }
    }

    /// Type given to the generated `id` column of a new table
    pub fn default_id_type(&self) -> &'static str {
        match self {
            Engine::Postgresql => "SERIAL",
            Engine::Mysql => "INT",
            Engine::Sqlite => "INTEGER",
        }
    }

    /// Type given to new non-key columns
    pub fn default_text_type(&self) -> &'static str {
        match self {
            Engine::Postgresql | Engine::Mysql => "VARCHAR",
            Engine::Sqlite => "TEXT",
        }
    }

    /// Whether `sql_type` names a type in this engine's catalog
    ///
    /// Case-insensitive; argument lists and repeated whitespace are ignored,
    /// so `varchar(64)` and `double  precision` match. PostgreSQL also takes
    /// array suffixes (`INTEGER[]`) and `WITH/WITHOUT TIME ZONE` on
    /// TIME/TIMESTAMP; MySQL takes `UNSIGNED`/`ZEROFILL` on numeric types.
    pub fn supports_type(&self, sql_type: &str) -> bool {
        let spelling = TypeSpelling::parse(sql_type);
        if spelling.base.is_empty() || !self.data_types().contains(&spelling.base.as_str()) {
            return false;
        }
        if (spelling.array || spelling.time_zone) && *self != Engine::Postgresql {
            return false;
        }
        if spelling.time_zone && !matches!(spelling.base.as_str(), "TIME" | "TIMESTAMP") {
            return false;
        }
        if spelling.unsigned && (*self != Engine::Mysql || !is_numeric(&spelling.base)) {
            return false;
        }
        true
    }
}

/// A column type reduced to its catalog name plus the modifiers around it
#[derive(Debug, Default, PartialEq, Eq)]
struct TypeSpelling {
    base: String,
    array: bool,
    time_zone: bool,
    unsigned: bool,
}

impl TypeSpelling {
    fn parse(sql_type: &str) -> Self {
        let mut plain = String::with_capacity(sql_type.len());
        let mut depth = 0usize;
        for ch in sql_type.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ if depth == 0 => plain.push(ch.to_ascii_uppercase()),
                _ => {}
            }
        }

        let mut spelling = TypeSpelling::default();
        let mut head = plain.trim();
        while head.ends_with(']') {
            match head.rfind('[') {
                Some(idx) => {
                    head = head[..idx].trim_end();
                    spelling.array = true;
                }
                None => break,
            }
        }

        let mut words: Vec<&str> = head.split_whitespace().collect();
        if let [.., "WITH" | "WITHOUT", "TIME", "ZONE"] = words.as_slice() {
            words.truncate(words.len() - 3);
            spelling.time_zone = true;
        }
        words.retain(|word| match *word {
            "UNSIGNED" | "ZEROFILL" => {
                spelling.unsigned = true;
                false
            }
            "SIGNED" => false,
            _ => true,
        });

        spelling.base = words.join(" ");
        spelling
    }
}

fn is_numeric(base: &str) -> bool {
    matches!(
        base,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT"
            | "DECIMAL" | "NUMERIC" | "FLOAT" | "DOUBLE"
    )
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(Engine::Postgresql),
            "mysql" => Ok(Engine::Mysql),
            "sqlite" => Ok(Engine::Sqlite),
            other => Err(anyhow::anyhow!("Unknown engine: {}", other)),
        }
    }
}
