//! Schema fixtures for comparison tests
//!
//! Records carry the same columns `SHOW TABLE STATUS`, `SHOW FULL COLUMNS` and
//! `SHOW INDEX` return, volatile statistics included.

use schemadrift_catalog::{MockSource, MockSourceBuilder};
use schemadrift_core::MetadataRecord;

pub fn table_status(name: &str, rows: &str, update_time: Option<&str>) -> MetadataRecord {
    let mut record = MetadataRecord::new()
        .with("Name", name)
        .with("Engine", "InnoDB")
        .with("Row_format", "Dynamic")
        .with("Rows", rows)
        .with("Data_length", "16384")
        .with("Auto_increment", rows)
        .with("Create_time", "2024-03-01 10:00:00")
        .with("Collation", "utf8mb4_general_ci")
        .with_null("Checksum")
        .with("Comment", "");
    record.insert("Update_time", update_time.map(str::to_string));
    record
}

pub fn column(name: &str, column_type: &str) -> MetadataRecord {
    MetadataRecord::new()
        .with("Field", name)
        .with("Type", column_type)
        .with("Null", "NO")
        .with("Key", "")
        .with_null("Default")
        .with("Extra", "")
}

pub fn index(table: &str, name: &str, column: &str, cardinality: &str) -> MetadataRecord {
    MetadataRecord::new()
        .with("Table", table)
        .with("Non_unique", "0")
        .with("Key_name", name)
        .with("Column_name", column)
        .with("Cardinality", cardinality)
        .with("Index_type", "BTREE")
}

/// `users` (id, email) with a primary key
pub fn users(builder: MockSourceBuilder, email_type: &str, rows: &str) -> MockSourceBuilder {
    builder
        .with_table("users", table_status("users", rows, None))
        .with_field("users", "id", column("id", "int(11)"))
        .with_field("users", "email", column("email", email_type))
        .with_index("users", "PRIMARY", index("users", "PRIMARY", "id", rows))
}

/// `orders` (id, user_id) with a primary key and a lookup index
pub fn orders(builder: MockSourceBuilder) -> MockSourceBuilder {
    builder
        .with_table("orders", table_status("orders", "40", Some("2024-05-01 12:00:00")))
        .with_field("orders", "id", column("id", "int(11)"))
        .with_field("orders", "user_id", column("user_id", "int(11)"))
        .with_index("orders", "PRIMARY", index("orders", "PRIMARY", "id", "40"))
        .with_index("orders", "idx_user", index("orders", "idx_user", "user_id", "12"))
}

/// Full shop schema: `users` and `orders`
pub fn shop(rows: &str) -> MockSource {
    orders(users(MockSourceBuilder::new(), "varchar(255)", rows)).build()
}
