//! Combining invocation directives with persisted state.

use std::collections::HashSet;

use crate::mounts::directive::{self, MountDirective};
use crate::mounts::state::MountState;

/// Enforce unique `(service, container_path)` pairs; the later directive wins.
///
/// An earlier directive loses only the overlapping services. Directives left
/// without any service are dropped. Relative order is otherwise preserved.
pub fn dedup(directives: Vec<MountDirective>) -> Vec<MountDirective> {
    let mut claimed: HashSet<(String, String)> = HashSet::new();
    let mut kept = Vec::with_capacity(directives.len());
    for mut directive in directives.into_iter().rev() {
        // saved state may predate container path folding
        directive.container_path = directive::clean_container_path(&directive.container_path);
        let container_path = directive.container_path.clone();
        directive
            .services
            .retain(|service| claimed.insert((service.clone(), container_path.clone())));
        if !directive.services.is_empty() {
            kept.push(directive);
        }
    }
    kept.reverse();
    kept
}

/// The latest invocation wins: any directive replaces the whole previous
/// set, no directive carries the previous state forward untouched.
pub fn next_state(previous: &MountState, invocation: Vec<MountDirective>) -> MountState {
    if invocation.is_empty() {
        return previous.clone();
    }
    previous.successor(dedup(invocation))
}

/// Additive update used by `mounts add`.
pub fn append(previous: &MountState, additions: Vec<MountDirective>) -> MountState {
    if additions.is_empty() {
        return previous.clone();
    }
    let mut directives = previous.directives.clone();
    directives.extend(additions);
    previous.successor(dedup(directives))
}

/// Drop every directive matching `matches`; returns the new state and what
/// was removed. Nothing removed means the previous state is returned as is.
pub fn remove<F>(previous: &MountState, matches: F) -> (MountState, Vec<MountDirective>)
where
    F: Fn(&MountDirective) -> bool,
{
    let (removed, kept): (Vec<_>, Vec<_>) =
        previous.directives.iter().cloned().partition(|d| matches(d));
    if removed.is_empty() {
        return (previous.clone(), removed);
    }
    (previous.successor(kept), removed)
}
