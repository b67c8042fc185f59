//! Declarative form validation
//!
//! A [`Schema`] is an ordered list of fields, each carrying a list of
//! [`Rule`]s. Rules may look at other fields (password confirmation,
//! conditional requirement), so every check receives the whole value map.
//! Evaluation is a pure function of the current values; nothing here knows
//! about screens or the network.

pub mod schemas;

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Current raw values of a form, keyed by field name
pub type FormValues = BTreeMap<String, String>;

/// Per-field error messages produced by a failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Error for a single field, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether no field failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub(crate) fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

static EMAIL_RE: LazyLock<Option<regex_lite::Regex>> =
    LazyLock::new(|| regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Whether `value` has the shape of an email address
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// A single constraint on a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Value must be non-empty
    Required(&'static str),
    /// Value must have at least `min` characters
    MinLength {
        /// Minimum number of characters
        min: usize,
        /// Message when too short
        message: &'static str,
    },
    /// Value must look like an email address
    Email(&'static str),
    /// Value must equal another field's current value
    EqualsField {
        /// Field to compare against
        field: &'static str,
        /// Message on mismatch
        message: &'static str,
    },
    /// Field is required when `field` is non-empty. An empty trigger only
    /// lifts the requirement; a value that is present is still checked
    RequiredIf {
        /// Triggering field
        field: &'static str,
        /// Message when the trigger is set and this value is empty
        message: &'static str,
    },
}

impl Rule {
    /// Other field this rule reads, if any
    pub const fn referenced_field(&self) -> Option<&'static str> {
        match self {
            Self::EqualsField { field, .. } | Self::RequiredIf { field, .. } => Some(field),
            Self::Required(_) | Self::MinLength { .. } | Self::Email(_) => None,
        }
    }

    const fn required_message(&self) -> Option<&'static str> {
        match self {
            Self::Required(message) | Self::RequiredIf { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// A named field and its rules, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name (key in [`FormValues`])
    pub name: &'static str,
    /// Rules, checked in order; the first failure wins
    pub rules: Vec<Rule>,
}

/// Ordered set of field rules for one form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

fn value_of<'a>(values: &'a FormValues, field: &str) -> &'a str {
    values.get(field).map_or("", String::as_str)
}

impl Schema {
    /// Empty schema
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field with its rules
    pub fn field(mut self, name: &'static str, rules: Vec<Rule>) -> Self {
        self.fields.push(FieldSpec { name, rules });
        self
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Rules declared for `name`
    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields whose rules read `name` (and must be re-checked when it changes)
    pub fn dependents<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.rules.iter().any(|r| r.referenced_field() == Some(name)))
            .map(|f| f.name)
    }

    /// Check one field against the full value map
    pub fn check_field(&self, name: &str, values: &FormValues) -> Option<&'static str> {
        self.spec(name).and_then(|spec| evaluate(spec, values))
    }

    /// Check every field.
    ///
    /// Returns the normalised values (empty fields dropped) when all rules pass,
    /// otherwise the message of the first failing rule per field.
    pub fn validate(&self, values: &FormValues) -> Result<FormValues, FieldErrors> {
        let mut errors = FieldErrors::default();
        for spec in &self.fields {
            if let Some(message) = evaluate(spec, values) {
                errors.insert(spec.name, message);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(self
            .fields
            .iter()
            .filter_map(|spec| {
                let value = value_of(values, spec.name);
                (!value.is_empty()).then(|| (spec.name.to_string(), value.to_string()))
            })
            .collect())
    }
}

fn evaluate(spec: &FieldSpec, values: &FormValues) -> Option<&'static str> {
    let value = value_of(values, spec.name);
    if value.is_empty() {
        return spec.rules.iter().find_map(|rule| match rule {
            Rule::RequiredIf { field, .. } if value_of(values, field).is_empty() => None,
            rule => rule.required_message(),
        });
    }

    spec.rules.iter().find_map(|rule| match rule {
        Rule::MinLength { min, message } if value.chars().count() < *min => Some(*message),
        Rule::Email(message) if !is_email(value) => Some(*message),
        Rule::EqualsField { field, message } if value_of(values, field) != value => {
            Some(*message)
        }
        _ => None,
    })
}
