//! Frequent itemset mining by recursive elimination (Relim).
//!
//! Items are plain `usize` ids. Transactions are recoded so that items are
//! ranked by ascending frequency; each rank owns a list of transaction
//! suffixes that start with it. Processing a rank reports its itemset,
//! recurses into the conditional database built from its suffixes, then
//! eliminates the rank by moving every suffix to the list of its next item.

use std::collections::{BTreeMap, HashMap};

/// A transaction suffix (ranks, ascending) with its multiplicity.
type Suffixes = Vec<(Vec<usize>, usize)>;

/// Mine every itemset contained in at least `min_support` transactions.
///
/// Returned itemsets are sorted item ids mapped to their support count.
/// A `min_support` of zero behaves like one.
pub fn relim(transactions: &[Vec<usize>], min_support: usize) -> BTreeMap<Vec<usize>, usize> {
    let min_support = min_support.max(1);

    let mut frequency: HashMap<usize, usize> = HashMap::new();
    for transaction in transactions {
        for &item in transaction {
            *frequency.entry(item).or_insert(0) += 1;
        }
    }

    // least frequent first, ties by item id for determinism
    let mut ranked: Vec<(usize, usize)> = frequency
        .into_iter()
        .filter(|&(_, count)| count >= min_support)
        .collect();
    ranked.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let items: Vec<usize> = ranked.iter().map(|&(item, _)| item).collect();
    let rank_of: HashMap<usize, usize> = items
        .iter()
        .enumerate()
        .map(|(rank, &item)| (item, rank))
        .collect();

    let mut recoded: HashMap<Vec<usize>, usize> = HashMap::new();
    for transaction in transactions {
        let mut ranks: Vec<usize> = transaction
            .iter()
            .filter_map(|item| rank_of.get(item).copied())
            .collect();
        ranks.sort_unstable();
        ranks.dedup();
        if !ranks.is_empty() {
            *recoded.entry(ranks).or_insert(0) += 1;
        }
    }

    let mut lists: Vec<Suffixes> = vec![Vec::new(); items.len()];
    for (ranks, count) in recoded {
        lists[ranks[0]].push((ranks[1..].to_vec(), count));
    }

    let mut found = Vec::new();
    eliminate(lists, &mut Vec::new(), min_support, &mut found);

    found
        .into_iter()
        .map(|(ranks, support)| {
            let mut set: Vec<usize> = ranks.iter().map(|&rank| items[rank]).collect();
            set.sort_unstable();
            (set, support)
        })
        .collect()
}

fn eliminate(
    mut lists: Vec<Suffixes>,
    prefix: &mut Vec<usize>,
    min_support: usize,
    found: &mut Vec<(Vec<usize>, usize)>,
) {
    for rank in 0..lists.len() {
        let list = std::mem::take(&mut lists[rank]);
        let support: usize = list.iter().map(|(_, count)| count).sum();

        if support >= min_support {
            prefix.push(rank);
            found.push((prefix.clone(), support));

            let mut conditional: Vec<Suffixes> = vec![Vec::new(); lists.len()];
            for (suffix, count) in &list {
                if let Some((&head, tail)) = suffix.split_first() {
                    conditional[head].push((tail.to_vec(), *count));
                }
            }
            if conditional.iter().any(|l| !l.is_empty()) {
                eliminate(conditional, prefix, min_support, found);
            }
            prefix.pop();
        }

        for (suffix, count) in list {
            if let Some((&head, tail)) = suffix.split_first() {
                lists[head].push((tail.to_vec(), count));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Brute force reference: support of every non-empty subset of the items seen.
    fn brute_force(transactions: &[Vec<usize>], min_support: usize) -> BTreeMap<Vec<usize>, usize> {
        let mut items: Vec<usize> = transactions.iter().flatten().copied().collect();
        items.sort_unstable();
        items.dedup();

        let mut out = BTreeMap::new();
        for bits in 1u32..(1 << items.len()) {
            let set: Vec<usize> = items
                .iter()
                .enumerate()
                .filter(|(i, _)| bits & (1 << i) != 0)
                .map(|(_, &item)| item)
                .collect();
            let support = transactions
                .iter()
                .filter(|t| set.iter().all(|item| t.contains(item)))
                .count();
            if support >= min_support.max(1) {
                out.insert(set, support);
            }
        }
        out
    }

    fn sample() -> Vec<Vec<usize>> {
        vec![
            vec![0, 1, 2],
            vec![0, 1],
            vec![1, 2],
            vec![0, 1, 2, 3],
            vec![3],
            vec![],
            vec![1],
            vec![0, 2],
        ]
    }

    #[test]
    fn test_matches_brute_force() {
        let transactions = sample();
        for min_support in 0..=5 {
            assert_eq!(
                relim(&transactions, min_support),
                brute_force(&transactions, min_support),
                "min_support = {}",
                min_support
            );
        }
    }

    #[test]
    fn test_known_supports() {
        let found = relim(&sample(), 2);
        assert_eq!(found.get(&vec![1]), Some(&5));
        assert_eq!(found.get(&vec![0, 1]), Some(&3));
        assert_eq!(found.get(&vec![0, 1, 2]), Some(&2));
        assert_eq!(found.get(&vec![3]), Some(&2));
        assert_eq!(found.get(&vec![1, 3]), None);
    }

    #[test]
    fn test_empty_input() {
        assert!(relim(&[], 1).is_empty());
        assert!(relim(&[vec![], vec![]], 0).is_empty());
    }

    #[test]
    fn test_duplicate_items_in_transaction() {
        let found = relim(&[vec![4, 4, 2], vec![2]], 1);
        assert_eq!(found.get(&vec![2, 4]), Some(&1));
        assert_eq!(found.get(&vec![2]), Some(&2));
    }
}
