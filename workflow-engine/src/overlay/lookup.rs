//! Workflow-lookup-on-load priority rules of spec.md §4.3:
//! exact filename match, then a renamed file whose stem is the requested
//! base name decorated with a `-`/`_` prefix or suffix (e.g. `team-main`,
//! `main_v2`), then an exact base-name match, picking the shortest
//! candidate when several tie.

use super::manifest::base_name;

/// Resolves `wanted` (e.g. `"checkout.yaml"`, possibly itself already
/// renamed by an overlay) against the set of `candidates` actually present
/// in the composed output, applying the three-tier priority order.
/// Returns `None` if nothing matches under any tier.
pub fn resolve<'a>(wanted: &str, candidates: &'a [String]) -> Option<&'a str> {
    if let Some(exact) = candidates.iter().find(|c| c.as_str() == wanted) {
        return Some(exact.as_str());
    }

    let wanted_base = base_name(wanted);
    let mut disambiguated: Vec<&str> = candidates
        .iter()
        .filter(|c| is_disambiguation_of(wanted_base, c))
        .map(String::as_str)
        .collect();
    if !disambiguated.is_empty() {
        disambiguated.sort_by_key(|c| c.len());
        return Some(disambiguated[0]);
    }

    let mut by_base: Vec<&str> = candidates
        .iter()
        .filter(|c| base_name(c) == wanted_base)
        .map(String::as_str)
        .collect();
    if !by_base.is_empty() {
        by_base.sort_by_key(|c| c.len());
        return Some(by_base[0]);
    }

    None
}

/// True when `candidate`'s base name is `wanted_base` decorated with a
/// `-`/`_` prefix or suffix, e.g. `wanted_base` `"main"` matches candidate
/// base names `"team-main"`, `"team_main"`, `"main-prod"`, `"main_v2"`.
fn is_disambiguation_of(wanted_base: &str, candidate: &str) -> bool {
    let cand_base = base_name(candidate);
    if cand_base == wanted_base {
        return false;
    }
    cand_base.ends_with(&format!("-{wanted_base}"))
        || cand_base.ends_with(&format!("_{wanted_base}"))
        || cand_base.starts_with(&format!("{wanted_base}-"))
        || cand_base.starts_with(&format!("{wanted_base}_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_filename_match_wins() {
        let candidates = vec!["checkout.yaml".to_string(), "wf-checkout.yaml".to_string()];
        assert_eq!(resolve("checkout.yaml", &candidates), Some("checkout.yaml"));
    }

    #[test]
    fn disambiguated_rename_found_when_no_exact_match() {
        let candidates = vec!["wf-checkout.yaml".to_string(), "other.yaml".to_string()];
        assert_eq!(resolve("checkout.yaml", &candidates), Some("wf-checkout.yaml"));
    }

    #[test]
    fn suffix_disambiguation_also_matches() {
        let candidates = vec!["checkout-wf.yaml".to_string()];
        assert_eq!(resolve("checkout.yaml", &candidates), Some("checkout-wf.yaml"));
    }

    #[test]
    fn shortest_disambiguated_candidate_wins_on_tie() {
        let candidates = vec![
            "wf-checkout-extended.yaml".to_string(),
            "wf-checkout.yaml".to_string(),
        ];
        assert_eq!(resolve("checkout.yaml", &candidates), Some("wf-checkout.yaml"));
    }

    #[test]
    fn base_name_match_used_as_last_resort() {
        let candidates = vec!["checkout.json".to_string()];
        assert_eq!(resolve("checkout.yaml", &candidates), Some("checkout.json"));
    }

    #[test]
    fn no_match_returns_none() {
        let candidates = vec!["unrelated.yaml".to_string()];
        assert_eq!(resolve("checkout.yaml", &candidates), None);
    }

    #[test]
    fn unrelated_substring_is_not_mistaken_for_disambiguation() {
        let candidates = vec!["wfcheckout.yaml".to_string()];
        assert_eq!(resolve("checkout.yaml", &candidates), None);
    }

    #[test]
    fn name_prefix_overlay_rename_is_reachable() {
        let candidates = vec!["team-main.yaml".to_string()];
        assert_eq!(resolve("main.yaml", &candidates), Some("team-main.yaml"));
    }

    #[test]
    fn name_suffix_overlay_rename_is_reachable() {
        let candidates = vec!["checkout-prod.yaml".to_string()];
        assert_eq!(resolve("checkout.yaml", &candidates), Some("checkout-prod.yaml"));
    }
}
