//! Association rules from frequent itemsets.

use std::collections::{BTreeMap, HashSet};

/// `antecedent => consequent` over item ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub antecedent: Vec<usize>,
    pub consequent: Vec<usize>,
    pub support: usize,
    pub confidence: f64,
}

/// Derive rules from `itemsets` (sorted item ids to support).
///
/// For a frequent itemset `S` and a non-empty proper subset `X`, the rule
/// `X => S \ X` has the support of `S` and confidence
/// `support(S) / support(X)`. Confidence can only drop as items move from
/// the antecedent to the consequent, so expansion stops at the first rule
/// below `min_confidence`.
pub fn mine_rules(
    itemsets: &BTreeMap<Vec<usize>, usize>,
    min_support: usize,
    min_confidence: f64,
) -> Vec<Rule> {
    let mut rules = Vec::new();
    let mut visited = HashSet::new();

    let mut sets: Vec<(&Vec<usize>, usize)> = itemsets.iter().map(|(s, &c)| (s, c)).collect();
    sets.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    for (set, support) in sets {
        if support < min_support || set.len() < 2 {
            continue;
        }
        for &item in set {
            let antecedent = without(set, item);
            expand(
                antecedent,
                vec![item],
                support,
                itemsets,
                min_confidence,
                &mut visited,
                &mut rules,
            );
        }
    }

    rules
}

fn expand(
    antecedent: Vec<usize>,
    consequent: Vec<usize>,
    support: usize,
    itemsets: &BTreeMap<Vec<usize>, usize>,
    min_confidence: f64,
    visited: &mut HashSet<(Vec<usize>, Vec<usize>)>,
    rules: &mut Vec<Rule>,
) {
    if !visited.insert((antecedent.clone(), consequent.clone())) {
        return;
    }
    // subsets of a frequent itemset are frequent, so this lookup holds
    let Some(&antecedent_support) = itemsets.get(&antecedent) else {
        return;
    };

    let confidence = support as f64 / antecedent_support as f64;
    if confidence < min_confidence {
        return;
    }

    if antecedent.len() > 1 {
        for &item in &antecedent {
            let mut next_consequent = consequent.clone();
            next_consequent.push(item);
            next_consequent.sort_unstable();
            expand(
                without(&antecedent, item),
                next_consequent,
                support,
                itemsets,
                min_confidence,
                visited,
                rules,
            );
        }
    }

    rules.push(Rule {
        antecedent,
        consequent,
        support,
        confidence,
    });
}

fn without(set: &[usize], item: usize) -> Vec<usize> {
    set.iter().copied().filter(|&i| i != item).collect()
}
