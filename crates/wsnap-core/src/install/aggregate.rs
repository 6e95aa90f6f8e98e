//! Target aggregator: unions the three target streams (scanned imports,
//! known entrypoints, remote-dependency manifest keys), applies alias
//! rewriting and external-package filtering, and sorts the result.

use super::alias::{is_externalized, rewrite_package_alias, AliasEntry};
use super::target::{merge_targets, InstallTarget};

/// Aggregate all target sources into one sorted, deduplicated list.
#[must_use]
pub fn aggregate(
    scanned: Vec<InstallTarget>,
    known_entrypoints: &[String],
    web_dependencies: &[String],
    aliases: &[AliasEntry],
    external_packages: &[String],
) -> Vec<InstallTarget> {
    let mut all = scanned;
    all.extend(known_entrypoints.iter().map(InstallTarget::whole));
    all.extend(web_dependencies.iter().map(InstallTarget::whole));

    for target in &mut all {
        let rewritten = rewrite_package_alias(&target.specifier, aliases).to_string();
        target.specifier = rewritten;
    }

    let merged = merge_targets(all);

    let mut surviving: Vec<InstallTarget> = merged
        .into_iter()
        .filter(|t| !is_externalized(&t.specifier, external_packages))
        .collect();

    surviving.sort_by(|a, b| a.specifier.cmp(&b.specifier));
    surviving
}
