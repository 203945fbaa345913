//! Declarative per-field rules

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Validation requirements for a single request field.
///
/// The serde names match the rule-set declaration format used by route
/// parameter files (`isRequired`, `isTrim`, `enumValues`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rule {
    #[serde(rename = "isRequired")]
    pub required: bool,
    #[serde(rename = "isTrim")]
    pub trim: bool,
    #[serde(rename = "isNumber")]
    pub numeric: bool,
    #[serde(rename = "isArray")]
    pub array: bool,
    #[serde(rename = "isPositive")]
    pub positive: bool,
    #[serde(rename = "isValidPhone")]
    pub phone: bool,
    #[serde(rename = "isJson")]
    pub json: bool,
    /// `HH:MM:SS`, 24 hour clock
    #[serde(rename = "isTime")]
    pub time: bool,
    /// `DD-MM-YYYY`, pattern only
    #[serde(rename = "isDate")]
    pub date: bool,
    #[serde(rename = "enumValues")]
    pub enum_values: Option<Vec<String>>,
    #[serde(rename = "isFileRequired")]
    pub file_required: bool,
    #[serde(rename = "allowedFileTypes")]
    pub allowed_file_types: Option<Vec<String>>,
    /// Maximum attachment size in bytes. Zero disables the check.
    #[serde(rename = "allowedFileSize")]
    pub max_file_size: Option<u64>,
    #[serde(rename = "allowedFileNames")]
    pub allowed_file_extensions: Option<Vec<String>>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn positive(mut self) -> Self {
        self.positive = true;
        self
    }

    pub fn phone(mut self) -> Self {
        self.phone = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn time(mut self) -> Self {
        self.time = true;
        self
    }

    pub fn date(mut self) -> Self {
        self.date = true;
        self
    }

    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn file_required(mut self) -> Self {
        self.file_required = true;
        self
    }

    pub fn file_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_file_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    pub fn file_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_file_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }
}

/// Field name to [`Rule`] mapping for one route.
///
/// Fields are evaluated in declaration order, so the first declared
/// violation is the one reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    fields: Vec<(String, Rule)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field rule. Redeclaring a field replaces its rule in place.
    pub fn field(mut self, name: impl Into<String>, rule: Rule) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = rule,
            None => self.fields.push((name, rule)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, rule)| rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses a rule set from its JSON declaration, keeping document order.
    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to rules")
            }

            fn visit_map<A>(self, mut map: A) -> Result<RuleSet, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut rules = RuleSet::new();
                while let Some((name, rule)) = map.next_entry::<String, Rule>()? {
                    if rules.get(&name).is_some() {
                        return Err(de::Error::custom(format!("duplicate rule for field `{name}`")));
                    }
                    rules = rules.field(name, rule);
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}
