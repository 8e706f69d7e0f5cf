//! Plain configuration struct consumed by the coordinator.
//!
//! Field names mirror the dotted configuration keys in the retrieved pack's
//! own config surface (`SPEC_FULL.md` §6); the caller is responsible for
//! populating this from `config`/`dotenvy`/CLI flags — this crate never reads
//! the environment itself.

#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// `supported.hl7.messages`: ordered allow-list of message template
    /// names, or `["*"]` to mean "all discovered templates".
    pub supported_messages: Vec<String>,
    /// `default.hl7.version`: version used when MSH-12 is blank.
    pub default_version: String,
    /// Maximum template-reference recursion depth before a `Resource`
    /// expression is treated as a cycle and the field is omitted with a
    /// warning (`SPEC_FULL.md` §9).
    pub max_template_depth: u32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            supported_messages: vec!["*".to_string()],
            default_version: "2.6".to_string(),
            max_template_depth: 32,
        }
    }
}

impl ConversionConfig {
    pub fn allows(&self, message_type: &str) -> bool {
        self.supported_messages.iter().any(|m| m == "*" || m == message_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_allows_any_message_type() {
        let config = ConversionConfig::default();
        assert!(config.allows("ADT_A01"));
    }

    #[test]
    fn explicit_list_restricts_message_types() {
        let config = ConversionConfig {
            supported_messages: vec!["ADT_A01".to_string()],
            ..ConversionConfig::default()
        };
        assert!(config.allows("ADT_A01"));
        assert!(!config.allows("ADT_A03"));
    }
}
