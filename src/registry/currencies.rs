use std::collections::HashMap;
use std::path::Path;
use crate::error::{Error, Result};

/// Short code to full currency name, e.g. `BTC -> Bitcoin`.
#[derive(Clone, Debug, Default)]
pub struct CurrencyNames {
    names: HashMap<String, String>,
}

impl CurrencyNames {
    pub fn new(names: HashMap<String, String>) -> Self {
        CurrencyNames {
            names: names
                .into_iter()
                .map(|(code, name)| (code.to_uppercase(), name))
                .collect(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let names: HashMap<String, String> = serde_json::from_str(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;

        if names.is_empty() {
            return Err(Error::ConfigError(format!("{}: currency table is empty", path.display())));
        }
        Ok(Self::new(names))
    }

    pub fn lookup(&self, short: &str) -> Option<&str> {
        self.names.get(&short.to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for CurrencyNames {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let names: CurrencyNames = [("btc".to_string(), "Bitcoin".to_string())].into_iter().collect();
        assert_eq!(names.lookup("BTC"), Some("Bitcoin"));
        assert_eq!(names.lookup("btc"), Some("Bitcoin"));
        assert_eq!(names.lookup("eth"), None);
    }
}
