/// Get current timestamp in seconds since epoch
pub fn current_timestamp_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
