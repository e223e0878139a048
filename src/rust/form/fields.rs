use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::labels::{feature_label, value_label, Locale};
use crate::bundle::ModelBundle;

/// Separates the raw code from its localized name in option text
pub const OPTION_SEPARATOR: &str = " — ";

/// Features the observer may leave as "not specified"
pub const OPTIONAL_FEATURES: [&str; 1] = ["spore-print-color"];

pub fn allows_unspecified(feature: &str) -> bool {
    OPTIONAL_FEATURES.contains(&feature)
}

/// One entry of a selector. `code` is `None` for the "not specified" entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOption {
    pub code: Option<String>,
    pub text: String,
}

/// A labeled selector for one feature.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub feature: String,
    pub label: String,
    pub allows_unspecified: bool,
    pub options: Vec<FieldOption>,
}

/// The generated form, one field per bundle feature in bundle order.
#[derive(Debug, Clone, Serialize)]
pub struct FormSpec {
    pub locale: Locale,
    pub fields: Vec<Field>,
}

/// Option text for a raw code, e.g. `"n — без запаха"`.
pub fn option_text(locale: Locale, feature: &str, code: &str) -> String {
    format!("{}{}{}", code, OPTION_SEPARATOR, value_label(locale, feature, code))
}

/// Extracts the raw code from option text; a bare code is returned as is.
pub fn parse_option(text: &str) -> &str {
    text.split(OPTION_SEPARATOR).next().unwrap_or(text).trim()
}

/// Builds the selectors from the fitted encoders of the loaded bundle.
///
/// Options always come from the encoder vocabulary, so the form cannot drift
/// from the model it feeds.
pub fn render_form(bundle: &ModelBundle, locale: Locale) -> FormSpec {
    let text = locale.text();
    let fields = bundle
        .features()
        .iter()
        .map(|feature| {
            let optional = allows_unspecified(feature);
            let mut options = Vec::new();
            if optional {
                options.push(FieldOption {
                    code: None,
                    text: text.not_specified.to_string(),
                });
            }
            if let Some(encoder) = bundle.encoder(feature) {
                options.extend(encoder.classes().iter().map(|code| FieldOption {
                    code: Some(code.clone()),
                    text: option_text(locale, feature, code),
                }));
            }
            Field {
                feature: feature.clone(),
                label: feature_label(locale, feature).to_string(),
                allows_unspecified: optional,
                options,
            }
        })
        .collect();

    FormSpec { locale, fields }
}

/// What the observer chose: a raw code per feature, or `None` for "not specified".
///
/// Deserialized values pass through [`Selection::set`], so JSON callers may
/// send option texts, `""` or the "not specified" text as well as raw codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Option<String>>",
    into = "BTreeMap<String, Option<String>>"
)]
pub struct Selection {
    values: BTreeMap<String, Option<String>>,
}

impl From<BTreeMap<String, Option<String>>> for Selection {
    fn from(values: BTreeMap<String, Option<String>>) -> Self {
        let mut selection = Self::new();
        for (feature, value) in values {
            match value {
                Some(value) => selection.set(feature, value),
                None => selection = selection.with_unspecified(feature),
            }
        }
        selection
    }
}

impl From<Selection> for BTreeMap<String, Option<String>> {
    fn from(selection: Selection) -> Self {
        selection.values
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a feature to a raw code or option text
    pub fn with(mut self, feature: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.set(feature, value);
        self
    }

    pub fn with_unspecified(mut self, feature: impl Into<String>) -> Self {
        self.values.insert(feature.into(), None);
        self
    }

    /// Records a submitted value. Empty values and the localized
    /// "not specified" text mark the feature as unspecified; anything else is
    /// reduced to its raw code.
    pub fn set(&mut self, feature: impl Into<String>, value: impl AsRef<str>) {
        let value = value.as_ref().trim();
        let unspecified = value.is_empty()
            || [Locale::Ru, Locale::En]
                .iter()
                .any(|l| value == l.text().not_specified);
        let code = if unspecified { None } else { Some(parse_option(value).to_string()) };
        self.values.insert(feature.into(), code);
    }

    /// `None` if nothing was submitted, `Some(None)` if explicitly unspecified
    pub fn get(&self, feature: &str) -> Option<Option<&str>> {
        self.values.get(feature).map(|v| v.as_deref())
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Builds a selection from submitted `name=value` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut selection = Self::new();
        for (feature, value) in pairs {
            selection.set(feature, value);
        }
        selection
    }
}
