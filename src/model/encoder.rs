use crate::error::ServiceError;
use std::collections::HashMap;
use std::path::Path;

/// A fitted label encoder: the class at position `i` encodes to `i`.
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl CategoryEncoder {
    /// Builds an encoder from classes in fitted order. Duplicates and empty
    /// class lists are rejected since they would break code uniqueness.
    pub fn new(classes: Vec<String>) -> Result<Self, ServiceError> {
        if classes.is_empty() {
            return Err(ServiceError::InvalidArtifact(
                "encoder has no classes".to_string(),
            ));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code as u32).is_some() {
                return Err(ServiceError::InvalidArtifact(format!(
                    "duplicate class '{}'",
                    class
                )));
            }
        }

        Ok(Self { classes, codes })
    }

    /// Exact match only: no trimming, no case folding.
    pub fn encode(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Column name -> encoder, in the order the artifact lists them.
#[derive(Debug, Clone, Default)]
pub struct EncoderTable {
    columns: Vec<(String, CategoryEncoder)>,
}

impl EncoderTable {
    pub fn new(columns: Vec<(String, CategoryEncoder)>) -> Self {
        Self { columns }
    }

    /// Parses `{"Gender": ["Female", "Male"], ...}`.
    pub fn from_json(content: &str) -> Result<Self, ServiceError> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
            .map_err(|e| ServiceError::InvalidArtifact(format!("encoders: {}", e)))?;

        let mut columns = Vec::with_capacity(raw.len());
        for (column, value) in raw {
            let classes: Vec<String> = serde_json::from_value(value).map_err(|e| {
                ServiceError::InvalidArtifact(format!("encoder for '{}': {}", column, e))
            })?;
            let encoder = CategoryEncoder::new(classes).map_err(|e| {
                ServiceError::InvalidArtifact(format!("encoder for '{}': {}", column, e))
            })?;
            columns.push((column, encoder));
        }

        Ok(Self { columns })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ServiceError::ArtifactNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_json(&content)?;

        tracing::info!(path = %path.display(), columns = table.len(), "loaded label encoders");
        Ok(table)
    }

    pub fn get(&self, column: &str) -> Option<&CategoryEncoder> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, encoder)| encoder)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryEncoder)> {
        self.columns.iter().map(|(name, enc)| (name.as_str(), enc))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
