//! Signal selection and extractor configuration
//!
//! `SelectionCriteria` is what the extractors consult at runtime. It can be
//! a fixed set of names or an arbitrary predicate. `ExtractorConfig` is the
//! serialisable form used by configuration files; it converts into a pair of
//! criteria.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Decides whether a variable name is of interest
pub enum SelectionCriteria {
    /// Every name matches
    All,
    /// Membership in a fixed set of names
    Names(HashSet<String>),
    /// Arbitrary test over the name (prefixes, wildcards, ...)
    Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

impl SelectionCriteria {
    /// Match exactly the given names
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SelectionCriteria::Names(names.into_iter().map(Into::into).collect())
    }

    /// Match whatever the predicate accepts
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        SelectionCriteria::Predicate(Box::new(f))
    }

    /// Match names starting with `prefix`
    pub fn prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::predicate(move |name| name.starts_with(&prefix))
    }

    /// Match every name
    pub fn all() -> Self {
        SelectionCriteria::All
    }

    /// Match nothing
    pub fn none() -> Self {
        SelectionCriteria::Names(HashSet::new())
    }

    /// Check whether `name` is selected
    pub fn matches(&self, name: &str) -> bool {
        match self {
            SelectionCriteria::All => true,
            SelectionCriteria::Names(names) => names.contains(name),
            SelectionCriteria::Predicate(f) => f(name),
        }
    }
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for SelectionCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionCriteria::All => write!(f, "All"),
            SelectionCriteria::Names(names) => f.debug_tuple("Names").field(names).finish(),
            SelectionCriteria::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// Serialisable description of a selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSelection {
    /// Select every variable
    #[serde(default)]
    pub all: bool,

    /// Exact variable names
    #[serde(default)]
    pub names: Vec<String>,

    /// Name prefixes (e.g. "body." selects every member of a component)
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl SignalSelection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: select every variable
    pub fn with_all(mut self, enabled: bool) -> Self {
        self.all = enabled;
        self
    }

    /// Builder method: add an exact name
    pub fn add_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Builder method: add a name prefix
    pub fn add_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// True if nothing can match
    pub fn is_empty(&self) -> bool {
        !self.all && self.names.is_empty() && self.prefixes.is_empty()
    }

    /// Convert into runtime criteria
    ///
    /// A name-only selection stays a set lookup; prefixes need a predicate.
    pub fn to_criteria(&self) -> SelectionCriteria {
        if self.all {
            return SelectionCriteria::All;
        }
        if self.prefixes.is_empty() {
            return SelectionCriteria::names(self.names.iter().cloned());
        }

        let names: HashSet<String> = self.names.iter().cloned().collect();
        let prefixes = self.prefixes.clone();
        SelectionCriteria::predicate(move |name| {
            names.contains(name) || prefixes.iter().any(|p| name.starts_with(p.as_str()))
        })
    }
}

/// Configuration for a value extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Variables whose whole trajectory is wanted
    #[serde(default)]
    pub trajectories: SignalSelection,

    /// Variables whose value at the last instant is wanted
    #[serde(default)]
    pub finals: SignalSelection,
}

impl ExtractorConfig {
    /// Create a configuration that selects nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: request a trajectory
    pub fn add_trajectory(mut self, name: impl Into<String>) -> Self {
        self.trajectories.names.push(name.into());
        self
    }

    /// Builder method: request a final value
    pub fn add_final(mut self, name: impl Into<String>) -> Self {
        self.finals.names.push(name.into());
        self
    }

    /// Builder method: replace the trajectory selection
    pub fn with_trajectories(mut self, selection: SignalSelection) -> Self {
        self.trajectories = selection;
        self
    }

    /// Builder method: replace the final value selection
    pub fn with_finals(mut self, selection: SignalSelection) -> Self {
        self.finals = selection;
        self
    }

    /// Runtime criteria as (trajectories, finals)
    pub fn criteria(&self) -> (SelectionCriteria, SelectionCriteria) {
        (self.trajectories.to_criteria(), self.finals.to_criteria())
    }
}
