use std::marker::PhantomData;

use crate::config_err;
use crate::error::Result;

/// A value type a [`ConfEntry`] can be parsed into.
pub trait ConfType: Sized {
    fn parse(key: &str, raw: &str) -> Result<Self>;
}

impl ConfType for bool {
    fn parse(key: &str, raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(config_err!("{} should be boolean, got '{}'", key, raw)),
        }
    }
}

impl ConfType for usize {
    fn parse(key: &str, raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<usize>()
            .map_err(|_| config_err!("{} should be a non-negative integer, got '{}'", key, raw))
    }
}

impl ConfType for String {
    fn parse(_key: &str, raw: &str) -> Result<Self> {
        Ok(raw.to_string())
    }
}

/// A strongly typed handle to a session configuration key.
///
/// The default is kept in its string form so entries can be declared as
/// `const` regardless of the value type, and goes through the same parse
/// path as user supplied values.
#[derive(Debug)]
pub struct ConfEntry<T> {
    key: &'static str,
    default: Option<&'static str>,
    doc: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T: ConfType> ConfEntry<T> {
    pub const fn new(key: &'static str, default: &'static str, doc: &'static str) -> Self {
        ConfEntry { key, default: Some(default), doc, _type: PhantomData }
    }

    /// An entry without a default value.
    pub const fn optional(key: &'static str, doc: &'static str) -> Self {
        ConfEntry { key, default: None, doc, _type: PhantomData }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn doc(&self) -> &'static str {
        self.doc
    }

    pub fn default_value(&self) -> Result<Option<T>> {
        self.default.map(|raw| T::parse(self.key, raw)).transpose()
    }

    pub fn parse(&self, raw: &str) -> Result<T> {
        T::parse(self.key, raw)
    }
}

/// Type erased view of a registered entry, used to validate values
/// set through the string keyed interface.
pub trait ConfDescriptor: Sync {
    fn key(&self) -> &'static str;

    fn doc(&self) -> &'static str;

    fn default_str(&self) -> Option<&'static str>;

    fn validate(&self, raw: &str) -> Result<()>;
}

impl<T: ConfType> ConfDescriptor for ConfEntry<T> {
    fn key(&self) -> &'static str {
        self.key
    }

    fn doc(&self) -> &'static str {
        self.doc
    }

    fn default_str(&self) -> Option<&'static str> {
        self.default
    }

    fn validate(&self, raw: &str) -> Result<()> {
        self.parse(raw).map(|_| ())
    }
}

pub const CASE_SENSITIVE: ConfEntry<bool> = ConfEntry::new(
    "sbox.sql.case_sensitive",
    "false",
    "Whether identifiers are resolved case sensitively by the session catalog.",
);

pub const DEFAULT_DATABASE: ConfEntry<String> = ConfEntry::new(
    "sbox.sql.default_database",
    "default",
    "Database unqualified table names resolve against.",
);

pub const CONNECTION_URL: ConfEntry<String> = ConfEntry::optional(
    "sbox.connection.url",
    "Base URL of the outbound connection, may contain the ${user} placeholder.",
);

pub const CONNECTION_PRINCIPAL: ConfEntry<String> = ConfEntry::optional(
    "sbox.connection.principal",
    "Principal appended to the connection URL outside managed containers.",
);

pub const DELEGATION_TOKEN_ENABLED: ConfEntry<bool> = ConfEntry::new(
    "sbox.connection.delegation_token.enabled",
    "false",
    "Authenticate with delegation tokens when running inside a managed container.",
);

static REGISTERED: &[&dyn ConfDescriptor] = &[
    &CASE_SENSITIVE,
    &DEFAULT_DATABASE,
    &CONNECTION_URL,
    &CONNECTION_PRINCIPAL,
    &DELEGATION_TOKEN_ENABLED,
];

/// Looks up a registered entry by key.
pub fn lookup(key: &str) -> Option<&'static dyn ConfDescriptor> {
    REGISTERED.iter().copied().find(|it| it.key() == key)
}

/// All registered entries.
pub fn registered() -> &'static [&'static dyn ConfDescriptor] {
    REGISTERED
}
