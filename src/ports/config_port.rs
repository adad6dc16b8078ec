//! Configuration access port trait.

/// Read-only view of sectioned `key = value` settings.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Comma separated list, trimmed, empty entries dropped.
    fn get_list(&self, section: &str, key: &str) -> Vec<String> {
        self.get_string(section, key)
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
