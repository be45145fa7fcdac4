//! Shadow groups: sets of parameters that mirror each other.
//!
//! A [`ShadowRegistry`] maps keys into groups. Writing any member of a group
//! is followed by an explicit fan-out to the other members, so there are no
//! links inside the parameters themselves and nothing to keep consistent
//! when a parameter goes away beyond calling [`unlink`](ShadowRegistry::unlink).
//!
//! The graph keys its registry by [`PinRef`](crate::PinRef). Standalone
//! parameters can use any ordered key:
//!
//! ```rust
//! use tessera_core::{Parameter, ShadowRegistry};
//!
//! let mut params = vec![Parameter::new(0.0f32), Parameter::new(0.0f32)];
//! let mut shadows = ShadowRegistry::new();
//! shadows.shadow(1, 0);
//!
//! params[0].set(0.75f32, true).unwrap();
//! let state = params[0].shadow_state();
//! shadows.for_each_shadow(&0, |&k| {
//!     params[k].apply_shadow(&state).unwrap();
//! });
//! assert_eq!(params[1].to::<f32>(), Ok(0.75));
//! ```

use std::collections::BTreeMap;

/// Group membership registry.
#[derive(Debug, Clone)]
pub struct ShadowRegistry<K> {
    groups: BTreeMap<u64, Vec<K>>,
    membership: BTreeMap<K, u64>,
    next_group: u64,
}

impl<K> Default for ShadowRegistry<K> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
            membership: BTreeMap::new(),
            next_group: 0,
        }
    }
}

impl<K: Ord + Clone> ShadowRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `follower` mirror `leader`.
    ///
    /// The follower joins the leader's group, leaving any group it was in.
    /// Returns `false` if `follower == leader`.
    pub fn shadow(&mut self, follower: K, leader: K) -> bool {
        if follower == leader {
            return false;
        }
        if self.membership.get(&follower).is_some_and(|g| self.membership.get(&leader) == Some(g)) {
            return true;
        }
        self.unlink(&follower);

        let group = match self.membership.get(&leader) {
            Some(&group) => group,
            None => {
                let group = self.next_group;
                self.next_group += 1;
                self.groups.insert(group, vec![leader.clone()]);
                self.membership.insert(leader, group);
                group
            }
        };

        if let Some(members) = self.groups.get_mut(&group) {
            members.push(follower.clone());
        }
        self.membership.insert(follower, group);
        true
    }

    /// Remove `key` from its group. Groups left with one member dissolve.
    ///
    /// Returns `true` if the key was a member.
    pub fn unlink(&mut self, key: &K) -> bool {
        let Some(group) = self.membership.remove(key) else {
            return false;
        };
        let Some(members) = self.groups.get_mut(&group) else {
            return true;
        };
        members.retain(|k| k != key);
        if members.len() < 2 {
            for remaining in members.drain(..) {
                self.membership.remove(&remaining);
            }
            self.groups.remove(&group);
        }
        true
    }

    /// Unlink every key matching `predicate`. Returns how many were removed.
    pub fn unlink_where(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let doomed: Vec<K> = self.membership.keys().filter(|k| predicate(*k)).cloned().collect();
        for key in &doomed {
            self.unlink(key);
        }
        doomed.len()
    }

    /// Visit every other member of `key`'s group, in join order.
    pub fn for_each_shadow(&self, key: &K, mut f: impl FnMut(&K)) {
        for other in self.shadows_of(key) {
            f(other);
        }
    }

    /// Iterate the other members of `key`'s group.
    pub fn shadows_of<'a>(&'a self, key: &'a K) -> impl Iterator<Item = &'a K> + 'a {
        self.members(key).iter().filter(move |k| *k != key)
    }

    /// All members of `key`'s group including `key`, or an empty slice.
    pub fn members(&self, key: &K) -> &[K] {
        self.membership
            .get(key)
            .and_then(|g| self.groups.get(g))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns `true` if `key` belongs to a group.
    pub fn is_linked(&self, key: &K) -> bool {
        self.membership.contains_key(key)
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Remove every group.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.membership.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_creates_group() {
        let mut reg = ShadowRegistry::new();
        assert!(reg.shadow("b", "a"));
        assert_eq!(reg.members(&"a"), &["a", "b"]);
        assert_eq!(reg.shadows_of(&"b").copied().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(reg.group_count(), 1);
    }

    #[test]
    fn self_shadow_is_rejected() {
        let mut reg = ShadowRegistry::new();
        assert!(!reg.shadow(1, 1));
        assert!(reg.is_empty());
    }

    #[test]
    fn followers_share_one_group() {
        let mut reg = ShadowRegistry::new();
        reg.shadow(2, 1);
        reg.shadow(3, 1);
        reg.shadow(4, 3);
        assert_eq!(reg.members(&4), &[1, 2, 3, 4]);

        let mut seen = Vec::new();
        reg.for_each_shadow(&2, |k| seen.push(*k));
        assert_eq!(seen, vec![1, 3, 4]);
    }

    #[test]
    fn reshadow_moves_key() {
        let mut reg = ShadowRegistry::new();
        reg.shadow(2, 1);
        reg.shadow(3, 1);
        reg.shadow(2, 9);
        assert_eq!(reg.members(&1), &[1, 3]);
        assert_eq!(reg.members(&9), &[9, 2]);
        assert_eq!(reg.group_count(), 2);
    }

    #[test]
    fn repeated_shadow_keeps_order() {
        let mut reg = ShadowRegistry::new();
        reg.shadow(2, 1);
        reg.shadow(3, 1);
        reg.shadow(2, 1);
        assert_eq!(reg.members(&1), &[1, 2, 3]);
    }

    #[test]
    fn unlink_dissolves_pairs() {
        let mut reg = ShadowRegistry::new();
        reg.shadow(2, 1);
        assert!(reg.unlink(&1));
        assert!(!reg.is_linked(&2));
        assert!(reg.is_empty());
        assert!(!reg.unlink(&1));
    }

    #[test]
    fn unlink_where_filters() {
        let mut reg = ShadowRegistry::new();
        reg.shadow((1, 0), (0, 0));
        reg.shadow((1, 1), (0, 0));
        reg.shadow((2, 0), (0, 1));
        assert_eq!(reg.unlink_where(|k| k.0 == 1), 2);
        assert!(!reg.is_linked(&(0, 0)));
        assert!(reg.is_linked(&(0, 1)));
    }
}
