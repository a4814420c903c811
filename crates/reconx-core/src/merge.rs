//! Generic match-then-append primitive
//!
//! Every reconciler that adds entries to an ordered container (manifest
//! children, entitlement arrays, SKAdNetwork item lists) goes through
//! [`match_then_append`]. The container only has to expose its items and an
//! append operation, which keeps removal out of reach of the reconcilers.

/// Ordered container that can be read and appended to, never shrunk
pub trait AppendOnly {
    type Item;

    fn items(&self) -> &[Self::Item];

    fn append(&mut self, item: Self::Item);
}

/// Result of a match-then-append step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// An equivalent item already existed; nothing changed
    AlreadyPresent,
    /// No equivalent item existed; the built item was appended at the end
    Appended,
}

/// Append the item produced by `build` unless an item satisfying
/// `is_equivalent` already exists.
///
/// `build` only runs on a miss.
pub fn match_then_append<C, P, B>(container: &mut C, is_equivalent: P, build: B) -> Merge
where
    C: AppendOnly + ?Sized,
    P: Fn(&C::Item) -> bool,
    B: FnOnce() -> C::Item,
{
    if container.items().iter().any(is_equivalent) {
        return Merge::AlreadyPresent;
    }
    container.append(build());
    Merge::Appended
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bag(Vec<String>);

    impl AppendOnly for Bag {
        type Item = String;

        fn items(&self) -> &[String] {
            &self.0
        }

        fn append(&mut self, item: String) {
            self.0.push(item);
        }
    }

    #[test]
    fn test_appends_on_miss() {
        let mut bag = Bag(vec!["a".to_string()]);
        let merge = match_then_append(&mut bag, |s| s == "b", || "b".to_string());
        assert_eq!(merge, Merge::Appended);
        assert_eq!(bag.0, vec!["a", "b"]);
    }

    #[test]
    fn test_skips_on_hit_without_building() {
        let mut bag = Bag(vec!["a".to_string()]);
        let merge = match_then_append(
            &mut bag,
            |s| s == "a",
            || panic!("build must not run when an equivalent item exists"),
        );
        assert_eq!(merge, Merge::AlreadyPresent);
        assert_eq!(bag.0.len(), 1);
    }

    #[test]
    fn test_equivalence_is_not_equality() {
        let mut bag = Bag(vec!["A.COM".to_string()]);
        let merge = match_then_append(
            &mut bag,
            |s| s.eq_ignore_ascii_case("a.com"),
            || "a.com".to_string(),
        );
        assert_eq!(merge, Merge::AlreadyPresent);
    }
}
