/// Internal primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Public, lexicographically sortable, time-ordered identifier.
///
/// UUIDv7 carries a millisecond timestamp prefix, so ids sort by creation
/// time both as bytes and as their canonical string form.
pub type PublicId = uuid::Uuid;

/// Generate a fresh public identifier.
pub fn new_public_id() -> PublicId {
    uuid::Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_ids_sort_by_creation_time() {
        let first = new_public_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = new_public_id();

        assert!(first < second);
        assert!(first.to_string() < second.to_string());
    }
}
