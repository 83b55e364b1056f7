//! Test fixtures for schema source integration tests
//!
//! Records mirror what `SHOW TABLE STATUS`, `SHOW FULL COLUMNS` and
//! `SHOW INDEX` return, including the volatile statistics columns.

use schemadrift_catalog::{MockSource, MockSourceBuilder};
use schemadrift_core::MetadataRecord;

/// A `users` table status row
pub fn users_table() -> MetadataRecord {
    MetadataRecord::new()
        .with("Name", "users")
        .with("Engine", "InnoDB")
        .with("Version", "10")
        .with("Row_format", "Dynamic")
        .with("Rows", "1204")
        .with("Avg_row_length", "136")
        .with("Data_length", "163840")
        .with("Auto_increment", "1205")
        .with("Create_time", "2024-03-01 10:00:00")
        .with_null("Update_time")
        .with("Collation", "utf8mb4_general_ci")
        .with_null("Checksum")
        .with("Comment", "")
}

/// A `SHOW FULL COLUMNS` row
pub fn column(name: &str, column_type: &str, nullable: bool) -> MetadataRecord {
    MetadataRecord::new()
        .with("Field", name)
        .with("Type", column_type)
        .with_null("Collation")
        .with("Null", if nullable { "YES" } else { "NO" })
        .with("Key", "")
        .with_null("Default")
        .with("Extra", "")
        .with("Comment", "")
}

/// A `SHOW INDEX` row
pub fn index(table: &str, name: &str, columns: &str, unique: bool) -> MetadataRecord {
    MetadataRecord::new()
        .with("Table", table)
        .with("Non_unique", if unique { "0" } else { "1" })
        .with("Key_name", name)
        .with("Column_name", columns)
        .with("Cardinality", "1204")
        .with("Index_type", "BTREE")
}

/// A source with `users` (id, email) and `orders` (id, user_id, total)
pub fn shop_source() -> MockSource {
    MockSourceBuilder::new()
        .with_table("users", users_table())
        .with_field("users", "id", column("id", "int(11)", false))
        .with_field("users", "email", column("email", "varchar(255)", false))
        .with_index("users", "PRIMARY", index("users", "PRIMARY", "id", true))
        .with_table("orders", users_table().with("Name", "orders"))
        .with_field("orders", "id", column("id", "int(11)", false))
        .with_field("orders", "user_id", column("user_id", "int(11)", false))
        .with_field("orders", "total", column("total", "decimal(10,2)", true))
        .with_index("orders", "PRIMARY", index("orders", "PRIMARY", "id", true))
        .with_index("orders", "idx_user", index("orders", "idx_user", "user_id", false))
        .build()
}
