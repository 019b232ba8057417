use serde::Deserialize;

/// How discovered ecosystems map onto output documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentPolicy {
    /// One document covering every ecosystem
    #[default]
    Merged,
    /// One document per ecosystem that produced data
    PerEcosystem,
}

impl std::str::FromStr for DocumentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "merged" => Ok(DocumentPolicy::Merged),
            "per-ecosystem" => Ok(DocumentPolicy::PerEcosystem),
            _ => Err(format!(
                "Invalid document policy: {}. Please specify 'merged' or 'per-ecosystem'",
                s
            )),
        }
    }
}

impl std::fmt::Display for DocumentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentPolicy::Merged => write!(f, "merged"),
            DocumentPolicy::PerEcosystem => write!(f, "per-ecosystem"),
        }
    }
}
