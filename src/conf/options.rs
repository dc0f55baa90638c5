use std::collections::BTreeMap;

/// Options supplied by external callers (e.g. a reader's option map).
/// Keys are looked up case-insensitively while the original spelling is
/// kept for iteration. Values may be null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseInsensitiveMap {
    entries: BTreeMap<String, (String, Option<String>)>,
}

impl CaseInsensitiveMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an option, replacing any key equal ignoring case.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        self.entries.insert(key.to_lowercase(), (key, value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).and_then(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        self.entries.remove(&key.to_lowercase()).map(|(_, v)| v)
    }

    /// Iterates over the options with their original key spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.values().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for CaseInsensitiveMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut map = CaseInsensitiveMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for CaseInsensitiveMap {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().map(|(k, v)| (k, Some(v.into()))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut opts = CaseInsensitiveMap::from([("Path", "/x"), ("header", "true")]);
        assert_eq!(Some("/x"), opts.get("PATH"));
        assert!(opts.contains_key("HEADER"));

        opts.insert("HEADER", Some("false".to_string()));
        assert_eq!(2, opts.len());
        assert_eq!(Some("false"), opts.get("header"));

        let keys = opts.iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(vec!["HEADER", "Path"], keys);
    }

    #[test]
    fn test_null_values() {
        let opts = vec![("a", None), ("b", Some("1".to_string()))]
            .into_iter()
            .collect::<CaseInsensitiveMap>();
        assert!(opts.contains_key("a"));
        assert_eq!(None, opts.get("a"));
        assert_eq!(Some("1"), opts.get("B"));
    }
}
