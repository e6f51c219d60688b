//! Per-provider routing
//!
//! Decides whether a provider is eligible for a component/severity pair,
//! either from a flat list of levels or from per-component rules.

use super::types::Severity;
use crate::config::RoutingConfig;
use std::borrow::Cow;
use std::collections::HashMap;

/// Rules key consulted when a component has no rule of its own
pub const DEFAULT_RULE_KEY: &str = "default";

/// Levels allowed when a provider lists none
pub const DEFAULT_LEVELS: [Severity; 2] = [Severity::Warning, Severity::Critical];

/// Normalize a component identifier into its rules key
///
/// `DISK:<path>` maps to `filesystem`, `LOAD` to `load`, anything else to
/// its lowercase form.
pub fn canonical_key(component: &str) -> Cow<'_, str> {
    if component.starts_with("DISK:") {
        Cow::Borrowed("filesystem")
    } else if component == "LOAD" {
        Cow::Borrowed("load")
    } else if component.chars().any(|c| c.is_uppercase()) {
        Cow::Owned(component.to_lowercase())
    } else {
        Cow::Borrowed(component)
    }
}

/// Eligibility filter owned by one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingFilter {
    enabled: bool,
    rules: Option<HashMap<String, Vec<Severity>>>,
    levels: Vec<Severity>,
}

impl RoutingFilter {
    /// Build from provider configuration
    ///
    /// An empty `rules` table counts as absent; an empty `levels` list falls
    /// back to WARNING and CRITICAL.
    pub fn new(config: &RoutingConfig) -> Self {
        let rules = if config.rules.is_empty() {
            None
        } else {
            Some(
                config
                    .rules
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )
        };

        let levels = if config.levels.is_empty() {
            DEFAULT_LEVELS.to_vec()
        } else {
            config.levels.clone()
        };

        Self {
            enabled: config.enabled,
            rules,
            levels,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether rules-based routing is in effect
    pub fn has_rules(&self) -> bool {
        self.rules.is_some()
    }

    /// Resolve the severities allowed for a component
    pub fn allowed_levels(&self, component: &str) -> &[Severity] {
        match &self.rules {
            Some(rules) => {
                let key = canonical_key(component);
                rules
                    .get(key.as_ref())
                    .or_else(|| rules.get(DEFAULT_RULE_KEY))
                    .map(Vec::as_slice)
                    // No rule and no default: fail closed
                    .unwrap_or(&[])
            }
            None => &self.levels,
        }
    }

    /// Decide whether a notification for this component/severity may be sent
    pub fn should_send(&self, component: &str, severity: Severity) -> bool {
        if !self.enabled {
            return false;
        }
        self.allowed_levels(component).contains(&severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn routing(
        enabled: bool,
        levels: Vec<Severity>,
        rules: &[(&str, Vec<Severity>)],
    ) -> RoutingFilter {
        let rules: BTreeMap<String, Vec<Severity>> = rules
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        RoutingFilter::new(&RoutingConfig {
            enabled,
            levels,
            rules,
        })
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("DISK:/data"), "filesystem");
        assert_eq!(canonical_key("DISK:/"), "filesystem");
        assert_eq!(canonical_key("LOAD"), "load");
        assert_eq!(canonical_key("CPU"), "cpu");
        assert_eq!(canonical_key("I/O"), "i/o");
        assert_eq!(canonical_key("reboot"), "reboot");
    }

    #[test]
    fn test_disabled_rejects_everything() {
        let filter = routing(false, vec![], &[]);
        assert!(!filter.should_send("CPU", Severity::Critical));
        assert!(!filter.should_send("CPU", Severity::Warning));
    }

    #[test]
    fn test_default_levels() {
        let filter = routing(true, vec![], &[]);
        assert!(!filter.has_rules());
        assert!(filter.should_send("CPU", Severity::Warning));
        assert!(filter.should_send("DISK:/", Severity::Critical));
    }

    #[test]
    fn test_flat_levels_apply_to_all_components() {
        let filter = routing(true, vec![Severity::Critical], &[]);
        assert!(filter.should_send("CPU", Severity::Critical));
        assert!(filter.should_send("LOAD", Severity::Critical));
        assert!(!filter.should_send("CPU", Severity::Warning));
    }

    #[test]
    fn test_rules_take_precedence_over_levels() {
        let filter = routing(
            true,
            vec![Severity::Warning, Severity::Critical],
            &[("filesystem", vec![Severity::Critical])],
        );
        assert!(filter.has_rules());
        assert!(filter.should_send("DISK:/data", Severity::Critical));
        assert!(!filter.should_send("DISK:/data", Severity::Warning));
    }

    #[test]
    fn test_rules_fall_back_to_default_key() {
        let filter = routing(
            true,
            vec![],
            &[
                ("load", vec![Severity::Warning, Severity::Critical]),
                ("default", vec![Severity::Critical]),
            ],
        );
        assert!(filter.should_send("LOAD", Severity::Warning));
        assert!(filter.should_send("CPU", Severity::Critical));
        assert!(!filter.should_send("CPU", Severity::Warning));
    }

    #[test]
    fn test_rules_fail_closed_without_default() {
        let filter = routing(true, vec![], &[("cpu", vec![Severity::Warning])]);
        assert!(filter.should_send("CPU", Severity::Warning));
        assert!(!filter.should_send("MEMORY", Severity::Warning));
        assert!(!filter.should_send("MEMORY", Severity::Critical));
        assert!(filter.allowed_levels("DISK:/").is_empty());
    }

    #[test]
    fn test_empty_rule_list_blocks_component() {
        let filter = routing(
            true,
            vec![],
            &[("reboot", vec![]), ("default", vec![Severity::Warning])],
        );
        assert!(!filter.should_send("REBOOT", Severity::Warning));
        assert!(filter.should_send("CPU", Severity::Warning));
    }
}
