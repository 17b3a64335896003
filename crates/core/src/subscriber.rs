//! Store affinity of webhook subscriptions.
//!
//! Subscriptions are registered with a user string that ends in `-<storeId>`,
//! e.g. `"erp-sync-3"`. This module is the only place that reads that
//! convention; everything else goes through [`decode_store_suffix`] and
//! [`RecipientFilter`].

use crate::scope::StoreScope;
use crate::types::StoreId;

/// Decode the store id encoded as the `-<id>` suffix of a subscription user.
///
/// Only canonical decimal suffixes decode, so the result agrees exactly with
/// "the user string ends with `-` followed by the id". Users without a
/// suffix, or with a malformed one (`"shop-"`, `"shop-03"`, `"shop-x"`),
/// decode to `None` and never match any store.
pub fn decode_store_suffix(user: &str) -> Option<StoreId> {
    let (_, suffix) = user.rsplit_once('-')?;
    let id: StoreId = suffix.parse().ok()?;
    (id.to_string() == suffix).then_some(id)
}

/// Whether the subscription user is bound to one of the stores in `scope`.
pub fn matches_scope(user: &str, scope: &StoreScope) -> bool {
    decode_store_suffix(user).is_some_and(|id| scope.contains(id))
}

// ---------------------------------------------------------------------------
// RecipientFilter
// ---------------------------------------------------------------------------

/// Which registered subscribers of an event receive a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientFilter {
    /// Every subscriber of the event.
    All,
    /// Subscribers bound to one of the stores.
    InScope(StoreScope),
    /// Subscribers not bound to any of the stores.
    OutOfScope(StoreScope),
}

impl RecipientFilter {
    pub fn admits(&self, user: &str) -> bool {
        match self {
            Self::All => true,
            Self::InScope(scope) => matches_scope(user, scope),
            Self::OutOfScope(scope) => !matches_scope(user, scope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_trailing_store_id() {
        assert_eq!(decode_store_suffix("erp-sync-3"), Some(3));
        assert_eq!(decode_store_suffix("shop-42"), Some(42));
    }

    #[test]
    fn malformed_suffixes_do_not_decode() {
        assert_eq!(decode_store_suffix("admin"), None);
        assert_eq!(decode_store_suffix("shop-"), None);
        assert_eq!(decode_store_suffix("shop-x"), None);
        assert_eq!(decode_store_suffix("shop-03"), None);
        assert_eq!(decode_store_suffix("shop-+3"), None);
        assert_eq!(decode_store_suffix("shop- 3"), None);
    }

    #[test]
    fn suffix_must_follow_a_dash_exactly() {
        // "-15" does not end with "-5".
        let scope = StoreScope::single(5);
        assert!(!matches_scope("shop-15", &scope));
        assert!(matches_scope("shop-15", &StoreScope::single(15)));
    }

    #[test]
    fn in_scope_filter_admits_only_members() {
        let filter = RecipientFilter::InScope([3, 7].into_iter().collect());
        assert!(filter.admits("a-3"));
        assert!(filter.admits("b-7"));
        assert!(!filter.admits("c-5"));
        assert!(!filter.admits("no-store"));
    }

    #[test]
    fn out_of_scope_filter_is_the_complement() {
        let scope: StoreScope = [3, 7].into_iter().collect();
        let inside = RecipientFilter::InScope(scope.clone());
        let outside = RecipientFilter::OutOfScope(scope);
        for user in ["a-3", "b-7", "c-5", "d-70", "plain", "e-"] {
            assert_ne!(inside.admits(user), outside.admits(user), "user {user}");
        }
    }

    #[test]
    fn all_filter_admits_everyone() {
        assert!(RecipientFilter::All.admits("x-1"));
        assert!(RecipientFilter::All.admits(""));
    }
}
