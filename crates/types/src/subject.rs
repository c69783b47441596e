// crates/types/src/subject.rs
//! Subject identity: which business's filing pack for which tax year.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Composite identity for a watchable filing-pack job.
///
/// The Job Store guarantees at most one live job per subject; the client
/// uses the pair as the key for its poll-session bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Owning business identifier.
    pub business_id: String,
    /// Tax year the pack covers (e.g. 2025).
    pub tax_year: u16,
}

impl Subject {
    pub fn new(business_id: impl Into<String>, tax_year: u16) -> Self {
        Self {
            business_id: business_id.into(),
            tax_year,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.business_id, self.tax_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_business_and_year() {
        let subject = Subject::new("biz-1", 2025);
        assert_eq!(subject.to_string(), "biz-1/2025");
    }

    #[test]
    fn serializes_camel_case() {
        let subject = Subject::new("biz-1", 2025);
        let json = serde_json::to_string(&subject).unwrap();
        assert!(json.contains("\"businessId\":\"biz-1\""));
        assert!(json.contains("\"taxYear\":2025"));
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(Subject::new("biz-1", 2025), Subject::new("biz-1", 2025));
        assert_ne!(Subject::new("biz-1", 2025), Subject::new("biz-1", 2024));
        assert_ne!(Subject::new("biz-1", 2025), Subject::new("biz-2", 2025));
    }
}
