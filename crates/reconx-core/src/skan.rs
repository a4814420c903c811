//! SKAdNetwork identifier catalog and coverage validation

use crate::facts::Fact;
use serde::Serialize;
use std::collections::HashSet;

/// Required for Google App Campaign attribution
pub const GOOGLE_CORE_ID: &str = "cstr6suwn9.skadnetwork";

/// Required for Meta campaign attribution
pub const META_IDS: [&str; 2] = ["v9wttpbfk9.skadnetwork", "n38lu8286q.skadnetwork"];

/// Built-in identifier list, in the order it is written to `Info.plist`
pub const CATALOG: &[&str] = &[
    GOOGLE_CORE_ID,
    "4fzdc2evr5.skadnetwork",
    "2fnua5tdw4.skadnetwork",
    "ydx93a7ass.skadnetwork",
    "p78axxw29g.skadnetwork",
    "v72qych5uu.skadnetwork",
    "cp8zw746q7.skadnetwork",
    "ludvb6z3bs.skadnetwork",
    "v9wttpbfk9.skadnetwork",
    "n38lu8286q.skadnetwork",
    "4468km3ulz.skadnetwork",
    "t38b2kh725.skadnetwork",
    "7ug5zh24hu.skadnetwork",
    "9rd848q2bz.skadnetwork",
    "n6fk4nfna4.skadnetwork",
    "7rz58n8ntl.skadnetwork",
    "ejvt5qm6ak.skadnetwork",
    "5lm9lj6jb7.skadnetwork",
    "44jx6755aq.skadnetwork",
    "tl55sbb4fm.skadnetwork",
    "2u9pt9hc89.skadnetwork",
    "8s468mfl3y.skadnetwork",
    "av6w8kgt66.skadnetwork",
    "klf5c3l5u5.skadnetwork",
    "ppxm28t8ap.skadnetwork",
    "424m5254lk.skadnetwork",
    "uw77j35x4d.skadnetwork",
    "578prtvx9j.skadnetwork",
    "4dzt52r2t5.skadnetwork",
    "e5fvkxwrpn.skadnetwork",
    "8c4e2ghe7u.skadnetwork",
    "zq492l623r.skadnetwork",
    "3rd42ekr43.skadnetwork",
    "3s53sq2bgm.skadnetwork",
    "f38h382jlk.skadnetwork",
    "hs6bdukanm.skadnetwork",
    "prcb7njmu6.skadnetwork",
    "vzv2zcsg8b.skadnetwork",
    "9nlqeag3gk.skadnetwork",
    "275upjj5gd.skadnetwork",
    "wg4vff78zm.skadnetwork",
    "g28c52eehv.skadnetwork",
    "cg4emx4h2s.skadnetwork",
    "294l99pt4k.skadnetwork",
    "mtkv5xtk9e.skadnetwork",
    "gvmwg8q7h5.skadnetwork",
    "n9x2a789qt.skadnetwork",
    "6g9af3uyq4.skadnetwork",
    "w9q455wk68.skadnetwork",
];

/// `PartnerId` facts for every catalog entry, in catalog order
pub fn catalog_facts() -> Vec<Fact> {
    CATALOG.iter().map(|id| Fact::partner_id(*id)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkanValidation {
    pub has_google_core_id: bool,
    pub has_meta_ids: bool,
    /// Share of the catalog present, 0.0..=100.0
    pub coverage_percent: f64,
    pub missing_critical_ids: Vec<String>,
}

impl SkanValidation {
    pub fn is_valid(&self) -> bool {
        self.has_google_core_id && self.has_meta_ids
    }

    pub fn summary(&self) -> String {
        if self.is_valid() {
            format!(
                "SKAdNetwork configuration valid, {:.1}% catalog coverage",
                self.coverage_percent
            )
        } else {
            format!(
                "SKAdNetwork configuration incomplete, missing: {}",
                self.missing_critical_ids.join(", ")
            )
        }
    }
}

/// Check configured identifiers against the critical ids and the catalog
pub fn validate_partner_ids<S: AsRef<str>>(ids: &[S]) -> SkanValidation {
    let present: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();

    let has_google_core_id = present.contains(GOOGLE_CORE_ID);
    let has_meta_ids = META_IDS.iter().all(|id| present.contains(id));

    let covered = CATALOG.iter().filter(|id| present.contains(*id)).count();
    let coverage_percent = covered as f64 / CATALOG.len() as f64 * 100.0;

    let missing_critical_ids = std::iter::once(GOOGLE_CORE_ID)
        .chain(META_IDS)
        .filter(|id| !present.contains(id))
        .map(str::to_string)
        .collect();

    SkanValidation {
        has_google_core_id,
        has_meta_ids,
        coverage_percent,
        missing_critical_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_no_duplicates_and_contains_critical_ids() {
        let unique: HashSet<&str> = CATALOG.iter().copied().collect();
        assert_eq!(unique.len(), CATALOG.len());
        assert!(unique.contains(GOOGLE_CORE_ID));
        assert!(META_IDS.iter().all(|id| unique.contains(id)));
    }

    #[test]
    fn test_full_catalog_is_valid() {
        let result = validate_partner_ids(CATALOG);
        assert!(result.is_valid());
        assert!((result.coverage_percent - 100.0).abs() < f64::EPSILON);
        assert!(result.missing_critical_ids.is_empty());
        assert!(result.summary().contains("100.0%"));
    }

    #[test]
    fn test_missing_meta_is_invalid() {
        let result = validate_partner_ids(&[GOOGLE_CORE_ID, "v9wttpbfk9.skadnetwork"]);
        assert!(result.has_google_core_id);
        assert!(!result.has_meta_ids);
        assert!(!result.is_valid());
        assert_eq!(result.missing_critical_ids, vec!["n38lu8286q.skadnetwork"]);
        assert!(result.summary().contains("n38lu8286q.skadnetwork"));
    }

    #[test]
    fn test_empty_input() {
        let result = validate_partner_ids::<String>(&[]);
        assert_eq!(result.missing_critical_ids.len(), 3);
        assert_eq!(result.coverage_percent, 0.0);
    }

    #[test]
    fn test_catalog_facts_in_order() {
        let facts = catalog_facts();
        assert_eq!(facts.len(), CATALOG.len());
        assert_eq!(facts[0], Fact::partner_id(GOOGLE_CORE_ID));
    }
}
