//! Frequent itemset and association rule mining over missingness.
//!
//! Each row of the mask becomes a transaction holding the indices of the
//! columns missing in that row. Mining runs on indices; results are mapped
//! back to column names before they leave this module.

mod relim;
mod rules;

pub use relim::relim;
pub use rules::{Rule, mine_rules};

use crate::config::ItemsetOptions;
use crate::error::{MissingnessError, Result};
use crate::subset::{Combinator, SubsetQuery, SubsetSelector};
use crate::types::{AssociationRule, Itemset, ItemsetMining};
use crate::utils::bool_columns;
use polars::prelude::*;
use tracing::debug;

/// Mine column sets that go missing together.
///
/// `support` is a fraction of rows in (0, 1] and is truncated to a row count;
/// `confidence` must lie in [0, 1]. Rules are only derived when
/// `options.rules` is set.
pub fn frequency_item_set(mask: &DataFrame, options: &ItemsetOptions) -> Result<ItemsetMining> {
    validate(options)?;

    let query = SubsetQuery {
        anchors: None,
        how: Combinator::Any,
        columns: options.columns.clone(),
    };
    let subset = SubsetSelector::select(mask, &query)?;
    let columns = bool_columns(&subset)?;
    let names: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();

    let transactions = transactions(&columns, subset.height());
    let min_support = (options.support * subset.height() as f64) as usize;

    let found = relim(&transactions, min_support);
    debug!(
        transactions = transactions.len(),
        min_support,
        itemsets = found.len(),
        "Mined frequent missingness itemsets"
    );

    let mut itemsets: Vec<(Vec<usize>, usize)> = found.iter().map(|(s, &c)| (s.clone(), c)).collect();
    itemsets.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(a.0.len().cmp(&b.0.len()))
            .then(a.0.cmp(&b.0))
    });

    let mut rules = if options.rules {
        mine_rules(&found, min_support, options.confidence)
    } else {
        Vec::new()
    };
    rules.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(b.support.cmp(&a.support))
            .then(a.antecedent.cmp(&b.antecedent))
            .then(a.consequent.cmp(&b.consequent))
    });
    if options.rules {
        debug!(rules = rules.len(), confidence = options.confidence, "Mined association rules");
    }

    Ok(ItemsetMining {
        itemsets: itemsets
            .into_iter()
            .map(|(ids, support)| Itemset {
                items: to_names(&names, &ids),
                support,
            })
            .collect(),
        rules: rules
            .into_iter()
            .map(|rule| AssociationRule {
                antecedent: to_names(&names, &rule.antecedent),
                consequent: to_names(&names, &rule.consequent),
                support: rule.support,
                confidence: rule.confidence,
            })
            .collect(),
        min_support,
        transactions: transactions.len(),
    })
}

fn validate(options: &ItemsetOptions) -> Result<()> {
    let support = options.support;
    if support.is_nan() || support <= 0.0 || support > 1.0 {
        return Err(MissingnessError::invalid_parameter(
            "support",
            support,
            "must be greater than 0 and at most 1",
        ));
    }

    let confidence = options.confidence;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(MissingnessError::invalid_parameter(
            "confidence",
            confidence,
            "must be between 0 and 1",
        ));
    }

    Ok(())
}

fn to_names(names: &[String], ids: &[usize]) -> Vec<String> {
    ids.iter().map(|&id| names[id].clone()).collect()
}

/// One transaction per row: indices of the columns missing in that row.
fn transactions(columns: &[(String, Vec<bool>)], height: usize) -> Vec<Vec<usize>> {
    (0..height)
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .filter(|(_, (_, flags))| flags[row])
                .map(|(index, _)| index)
                .collect()
        })
        .collect()
}
