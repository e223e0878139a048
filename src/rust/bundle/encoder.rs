use serde::{Deserialize, Serialize};

use super::error::BundleError;

/// A fitted label encoder: an ordered vocabulary of raw codes.
///
/// The integer code of a class is its position in `classes`, which is kept
/// unique and strictly ascending, exactly as the encoder was fitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Creates an encoder from its fitted classes.
    ///
    /// # Errors
    /// `BundleError::Validation` if the vocabulary is empty, has duplicates,
    /// or is not sorted.
    pub fn new(classes: Vec<impl Into<String>>) -> Result<Self, BundleError> {
        let encoder = Self {
            classes: classes.into_iter().map(Into::into).collect(),
        };
        encoder.validate()?;
        Ok(encoder)
    }

    pub(crate) fn validate(&self) -> Result<(), BundleError> {
        if self.classes.is_empty() {
            return Err(BundleError::Validation("Encoder vocabulary cannot be empty".into()));
        }
        if let Some(pair) = self.classes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(BundleError::Validation(format!(
                "Encoder classes must be unique and ascending, found '{}' before '{}'",
                pair[0], pair[1]
            )));
        }
        Ok(())
    }

    /// The fitted vocabulary, in encoding order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The first vocabulary entry, used as the fallback for unspecified input
    pub fn first(&self) -> &str {
        &self.classes[0]
    }

    pub fn contains(&self, code: &str) -> bool {
        self.transform(code).is_some()
    }

    /// Maps a raw code to its integer code.
    pub fn transform(&self, code: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(code))
            .ok()
    }

    /// Maps an integer code back to its raw code.
    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }
}
