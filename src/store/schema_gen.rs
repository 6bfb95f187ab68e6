use crate::schema::{ColumnType, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let mut parts = Vec::new();

    for col in schema.columns {
        let sql_type = match col.col_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Boolean => "INTEGER",
            ColumnType::Text | ColumnType::Date | ColumnType::Timestamp => "TEXT",
        };

        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        parts.push(format!("    {} {}{}", col.name, sql_type, null_constraint));
    }

    if !schema.primary_key.is_empty() {
        parts.push(format!(
            "    PRIMARY KEY ({})",
            schema.primary_key.join(", ")
        ));
    }

    for fk in schema.foreign_keys {
        parts.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&parts.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements: one per foreign key column plus
/// any explicit index definitions
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let mut statements: Vec<String> = schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX idx_{}_{} ON {}({})",
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect();

    for index in schema.indexes {
        let unique = if index.unique { "UNIQUE " } else { "" };
        statements.push(format!(
            "CREATE {}INDEX idx_{}_{} ON {}({})",
            unique,
            schema.name,
            index.columns.join("_"),
            schema.name,
            index.columns.join(", ")
        ));
    }

    statements
}

/// Generate the positional INSERT statement for a table schema
pub fn generate_insert(schema: &TableSchema) -> String {
    let columns = schema.column_names();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}
