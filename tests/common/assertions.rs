//! Common assertion helpers for test output validation

#![allow(dead_code)]

use predicates::prelude::*;

pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

/// A flag line from `state`, e.g. `isOnFeatureBranch  true`.
pub fn has_flag(name: &str, value: bool) -> impl Predicate<str> {
    predicates::str::is_match(format!(r"(?m)^\s+{name}\s+{value}$"))
        .expect("flag pattern is a valid regex")
}

pub fn has_current_branch(branch: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("Current: {branch}"))
}

pub fn unknown_branch_type(name: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("Unknown branch type: '{name}'"))
}
