//! `InstallTarget`: a specifier plus the aggregated usage shape the application
//! made of it (default binding, namespace binding, named bindings, or whole-module use).

use rustc_hash::FxHashSet as HashSet;

/// One unit of install work: a specifier plus how the app consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub specifier: String,
    /// Consumer uses the whole module surface (dynamic import, or a bare
    /// side-effect import with no default/namespace/named bindings).
    pub all: bool,
    pub default: bool,
    pub namespace: bool,
    /// Deduplicated named bindings, renaming (`as`) stripped.
    pub named: Vec<String>,
}

impl InstallTarget {
    #[must_use]
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            all: false,
            default: false,
            namespace: false,
            named: Vec::new(),
        }
    }

    #[must_use]
    pub fn whole(specifier: impl Into<String>) -> Self {
        Self {
            all: true,
            ..Self::new(specifier)
        }
    }

    /// Merge another target for the same specifier into this one.
    /// `all := any(all)`, `default := any(default)`, `namespace := any(namespace)`,
    /// `named := union(named)`.
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.specifier, other.specifier);
        self.all |= other.all;
        self.default |= other.default;
        self.namespace |= other.namespace;
        for name in &other.named {
            if !self.named.contains(name) {
                self.named.push(name.clone());
            }
        }
    }
}

/// Merge a stream of targets (possibly repeating the same specifier) into
/// one target per specifier, preserving first-seen order.
#[must_use]
pub fn merge_targets(targets: impl IntoIterator<Item = InstallTarget>) -> Vec<InstallTarget> {
    let mut order = Vec::new();
    let mut seen: HashSet<String> = HashSet::default();
    let mut merged: Vec<InstallTarget> = Vec::new();

    for target in targets {
        if seen.insert(target.specifier.clone()) {
            order.push(target.specifier.clone());
            merged.push(target);
        } else {
            let existing = merged
                .iter_mut()
                .find(|t| t.specifier == target.specifier)
                .expect("seen set and merged vec stay in sync");
            existing.merge(&target);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_shape() {
        let mut a = InstallTarget::new("react");
        a.default = true;
        let mut b = InstallTarget::new("react");
        b.named.push("useState".to_string());

        a.merge(&b);

        assert!(a.default);
        assert!(!a.all);
        assert_eq!(a.named, vec!["useState".to_string()]);
    }

    #[test]
    fn merge_targets_preserves_first_seen_order() {
        let targets = vec![
            InstallTarget::new("react"),
            InstallTarget::new("lodash"),
            InstallTarget::whole("react"),
        ];
        let merged = merge_targets(targets);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].specifier, "react");
        assert_eq!(merged[1].specifier, "lodash");
        assert!(merged[0].all);
    }
}
