use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::conf::options::CaseInsensitiveMap;

/// Option keys that carry locations rather than configuration and must
/// never be copied into a [`HadoopConf`].
pub const RESERVED_OPTION_KEYS: [&str; 2] = ["path", "paths"];

/// A hadoop-style key/value configuration as handed out by the execution
/// context. Values are always strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HadoopConf {
    props: BTreeMap<String, String>,
}

impl HadoopConf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.props.insert(key.into(), value.into());
    }

    pub fn unset(&mut self, key: &str) -> Option<String> {
        self.props.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HadoopConf {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        HadoopConf { props: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl From<&HashMap<String, String>> for HadoopConf {
    fn from(map: &HashMap<String, String>) -> Self {
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Returns a copy of `base` with every non-null entry applied on top.
/// Entries win over base values on the same key; null entries are
/// skipped and never clear a key.
pub fn project<K, V>(
    base: &HadoopConf,
    entries: impl IntoIterator<Item = (K, Option<V>)>,
) -> HadoopConf
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut conf = base.clone();
    for (k, v) in entries {
        if let Some(v) = v {
            conf.set(k.as_ref(), v.as_ref());
        }
    }
    conf
}

/// Layers caller supplied options onto `conf`, skipping null values and
/// the reserved location keys.
pub fn apply_options(conf: &mut HadoopConf, options: &CaseInsensitiveMap) {
    for (k, v) in options.iter() {
        if RESERVED_OPTION_KEYS.iter().any(|reserved| reserved.eq_ignore_ascii_case(k)) {
            continue;
        }
        if let Some(v) = v {
            conf.set(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_precedence() {
        let base = HadoopConf::from_iter([("a", "1")]);
        let entries = vec![("a", Some("2")), ("b", Some("3")), ("c", None)];
        let conf = project(&base, entries);

        assert_eq!(HadoopConf::from_iter([("a", "2"), ("b", "3")]), conf);
        assert_eq!(None, conf.get("c"));
        assert_eq!(HadoopConf::from_iter([("a", "1")]), base);
    }

    #[test]
    fn test_null_entry_keeps_base_value() {
        let base = HadoopConf::from_iter([("a", "1")]);
        let conf = project(&base, vec![("a", None::<&str>)]);
        assert_eq!(Some("1"), conf.get("a"));
    }

    #[test]
    fn test_apply_options_skips_reserved_keys() {
        let mut conf = HadoopConf::new();
        let mut options = CaseInsensitiveMap::from([("path", "/x"), ("PATHS", "/y"), ("z", "1")]);
        options.insert("n", None);
        apply_options(&mut conf, &options);
        assert_eq!(HadoopConf::from_iter([("z", "1")]), conf);
    }
}
