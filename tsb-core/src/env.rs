use std::collections::BTreeMap;

/// Read-only snapshot of a process environment.
///
/// The pipeline never reads `std::env` directly; it is handed a snapshot so
/// that every stage sees the same values and tests can supply their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessEnv {
    vars: BTreeMap<String, String>,
}

impl ProcessEnv {
    /// Capture the live environment of the current process.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Check whether a variable is set.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Iterate over all variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProcessEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_iter_and_get() {
        let env: ProcessEnv = [("API_URL", "https://x"), ("DEBUG", "1")]
            .into_iter()
            .collect();
        assert_eq!(env.get("API_URL"), Some("https://x"));
        assert!(env.contains("DEBUG"));
        assert!(!env.contains("MISSING"));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_iter_is_sorted() {
        let env: ProcessEnv = [("B", "2"), ("A", "1")].into_iter().collect();
        let names: Vec<_> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_capture_sees_process_vars() {
        // SAFETY: no other test in this crate reads or writes this variable
        unsafe { std::env::set_var("TSB_CORE_CAPTURE_TEST", "captured") };
        let env = ProcessEnv::capture();
        assert_eq!(env.get("TSB_CORE_CAPTURE_TEST"), Some("captured"));
    }
}
