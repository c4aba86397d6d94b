use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::models::CatalogEntry;

/// Errors that can occur while loading the place catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate area code in catalog: {0}")]
    DuplicateCode(String),
}

/// Immutable place catalog, loaded once at startup.
///
/// Besides the entry list it carries a code map and a lowercase alias
/// inverted index so exact lookups stay cheap on the request path.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_code: HashMap<String, usize>,
    by_alias: HashMap<String, Vec<usize>>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut by_code = HashMap::with_capacity(entries.len());
        let mut by_alias: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            if by_code.insert(entry.code.clone(), index).is_some() {
                return Err(CatalogError::DuplicateCode(entry.code.clone()));
            }
            for alias in &entry.aliases {
                by_alias
                    .entry(alias.to_lowercase())
                    .or_default()
                    .push(index);
            }
        }

        Ok(Self {
            entries,
            by_code,
            by_alias,
        })
    }

    /// Load the catalog from a JSON file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;
        let catalog = Self::from_entries(entries)?;
        tracing::info!(
            path = %path.as_ref().display(),
            places = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.by_code.get(code).map(|&index| &self.entries[index])
    }

    /// Entries that list the given alias (case-insensitive)
    pub fn alias_owners(&self, alias: &str) -> Vec<&CatalogEntry> {
        self.by_alias
            .get(&alias.to_lowercase())
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, native: &str, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            code: code.to_string(),
            native_name: native.to_string(),
            display_name: format!("{} 일대", native),
            translated_name: String::new(),
            category: "관광특구".to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_lookup_by_code() {
        let catalog = Catalog::from_entries(vec![
            entry("POI001", "홍대 관광특구", &["홍대"]),
            entry("POI002", "명동 관광특구", &["명동"]),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("POI002").unwrap().native_name, "명동 관광특구");
        assert!(catalog.get("POI999").is_none());
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let result = Catalog::from_entries(vec![
            entry("POI001", "홍대 관광특구", &[]),
            entry("POI001", "명동 관광특구", &[]),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateCode(code)) if code == "POI001"));
    }

    #[test]
    fn test_alias_index_is_case_insensitive() {
        let catalog = Catalog::from_entries(vec![entry(
            "POI001",
            "홍대 관광특구",
            &["홍대", "Hongdae"],
        )])
        .unwrap();

        assert_eq!(catalog.alias_owners("hongdae").len(), 1);
        assert_eq!(catalog.alias_owners("홍대")[0].code, "POI001");
        assert!(catalog.alias_owners("강남").is_empty());
    }
}
