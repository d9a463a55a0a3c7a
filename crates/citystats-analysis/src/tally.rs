use std::collections::HashMap;

/// A counter that remembers the order in which keys were first seen.
///
/// Rankings are stable: keys with equal counts keep their first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        if let Some(&idx) = self.index.get(key) {
            self.counts[idx].1 += 1;
        } else {
            self.index.insert(key.to_owned(), self.counts.len());
            self.counts.push((key.to_owned(), 1));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map_or(0, |&idx| self.counts[idx].1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Up to `n` entries with the highest counts.
    #[must_use]
    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.counts.clone();
        sorted.sort_by(|(_, a), (_, b)| b.cmp(a));
        sorted.truncate(n);
        sorted
    }

    /// Up to `n` entries with the lowest counts.
    #[must_use]
    pub fn least_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.counts.clone();
        sorted.sort_by_key(|(_, count)| *count);
        sorted.truncate(n);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(keys: &[&str]) -> Tally {
        let mut tally = Tally::new();
        for key in keys {
            tally.add(key);
        }
        tally
    }

    #[test]
    fn test_counts() {
        let tally = tally(&["a", "b", "a"]);
        assert_eq!(tally.get("a"), 2);
        assert_eq!(tally.get("b"), 1);
        assert_eq!(tally.get("c"), 0);
        assert_eq!(tally.len(), 2);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let tally = tally(&["x", "y", "z", "y", "x", "w"]);
        assert_eq!(
            tally.most_common(3),
            vec![("x".to_owned(), 2), ("y".to_owned(), 2), ("z".to_owned(), 1)]
        );
        assert_eq!(
            tally.least_common(2),
            vec![("z".to_owned(), 1), ("w".to_owned(), 1)]
        );
    }
}
