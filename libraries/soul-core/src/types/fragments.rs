/// Base query fragments published by a track store
use serde::{Deserialize, Serialize};

/// The store provider's contribution to every candidate query
///
/// `select` must produce the columns the store knows how to load a full
/// `Track` from; `from` names the primary track source and its joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFragments {
    /// Base projection (column list without a trailing comma)
    pub select: String,

    /// Base source (table plus any joins needed by `select`)
    pub from: String,

    /// Base filter, `None` when every stored track is eligible
    pub condition: Option<String>,

    /// Fully qualified track id column, e.g. `t.id`
    pub track_id_column: String,
}

impl ProviderFragments {
    /// Base filter, or an always-true condition when the provider has none
    pub fn condition_or_true(&self) -> &str {
        match self.condition.as_deref() {
            Some(condition) if !condition.trim().is_empty() => condition,
            _ => "1=1",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(condition: Option<&str>) -> ProviderFragments {
        ProviderFragments {
            select: "t.id".to_string(),
            from: "tracks t".to_string(),
            condition: condition.map(str::to_string),
            track_id_column: "t.id".to_string(),
        }
    }

    #[test]
    fn missing_condition_is_always_true() {
        assert_eq!(fragments(None).condition_or_true(), "1=1");
    }

    #[test]
    fn blank_condition_is_always_true() {
        assert_eq!(fragments(Some("   ")).condition_or_true(), "1=1");
    }

    #[test]
    fn present_condition_is_kept() {
        assert_eq!(
            fragments(Some("t.hidden = 0")).condition_or_true(),
            "t.hidden = 0"
        );
    }
}
