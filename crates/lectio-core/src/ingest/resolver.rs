use std::cmp::Reverse;
use std::collections::HashMap;

/// Occurrence counts keyed by cleaned name, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCounts {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl EntityCounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>) {
        self.add_n(name, 1);
    }

    pub fn add_n(&mut self, name: impl Into<String>, count: usize) {
        let name = name.into();
        if let Some(&slot) = self.index.get(&name) {
            self.entries[slot].1 += count;
        } else {
            self.index.insert(name.clone(), self.entries.len());
            self.entries.push((name, count));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|&slot| self.entries[slot].1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl<S: Into<String>> FromIterator<S> for EntityCounts {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut counts = Self::new();
        for name in iter {
            counts.add(name);
        }
        counts
    }
}

/// Merges a name into the first accepted canonical name that contains it or
/// is contained by it.
///
/// Names are visited longest first (ties in first-seen order), so the
/// canonical form is the longest variant: `Augusto` folds into
/// `Ottaviano Augusto`. The match is the first one in acceptance order, not
/// the best one, so a short name that fits two canonical names always lands
/// on the earlier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainmentResolver;

impl ContainmentResolver {
    #[must_use]
    pub fn merge(&self, counts: &EntityCounts) -> Vec<(String, usize)> {
        let mut entries: Vec<(&str, usize)> = counts.iter().collect();
        entries.sort_by_key(|(name, _)| Reverse(name.chars().count()));

        let mut merged: Vec<(String, usize)> = Vec::with_capacity(entries.len());
        for (name, count) in entries {
            let canonical = merged
                .iter_mut()
                .find(|(canonical, _)| canonical.contains(name) || name.contains(canonical.as_str()));

            match canonical {
                Some((_, total)) => *total += count,
                None => merged.push((name.to_string(), count)),
            }
        }

        merged
    }
}

/// Alias merging with the default [`ContainmentResolver`].
#[must_use]
pub fn merge_aliases(counts: &EntityCounts) -> Vec<(String, usize)> {
    ContainmentResolver.merge(counts)
}
