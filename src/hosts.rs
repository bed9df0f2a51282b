use std::collections::HashMap;

/// Work out which host raised an alert from its instance label.
///
/// A non-empty entry in `hosts` for the label wins; otherwise the part of the
/// label before the first `:` is used. Returns `None` when that leaves nothing.
pub fn resolve_host(hosts: &HashMap<String, String>, instance: &str) -> Option<String> {
    if let Some(address) = hosts.get(instance).filter(|address| !address.is_empty()) {
        return Some(address.clone());
    }

    let host = instance.split(':').next().unwrap_or_default();

    (!host.is_empty()).then(|| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn strips_port_from_instance() {
        assert_eq!(resolve_host(&HashMap::new(), "db1:9100").as_deref(), Some("db1"));
    }

    #[test]
    fn instance_without_port_is_used_as_is() {
        assert_eq!(resolve_host(&HashMap::new(), "db1").as_deref(), Some("db1"));
    }

    #[test]
    fn alias_overrides_derived_host() {
        let hosts = hosts(&[("db1:9100", "10.0.0.5")]);
        assert_eq!(resolve_host(&hosts, "db1:9100").as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn alias_is_matched_on_full_label() {
        let hosts = hosts(&[("db1", "10.0.0.5")]);
        assert_eq!(resolve_host(&hosts, "db1:9100").as_deref(), Some("db1"));
    }

    #[test]
    fn empty_alias_falls_back_to_derived_host() {
        let hosts = hosts(&[("db1:9100", "")]);
        assert_eq!(resolve_host(&hosts, "db1:9100").as_deref(), Some("db1"));
    }

    #[test]
    fn empty_host_is_unresolved() {
        assert_eq!(resolve_host(&HashMap::new(), ""), None);
        assert_eq!(resolve_host(&HashMap::new(), ":9100"), None);
    }
}
