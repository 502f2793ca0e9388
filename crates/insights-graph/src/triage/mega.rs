//! Mega-triage output (§4.7): the actionable set broken out by type and
//! label, plus copy-paste commands and a single highest-impact summary.

use std::collections::BTreeMap;

use insights_core::model::Issue;

use crate::triage::TriageItem;

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub items: Vec<TriageItem>,
    /// `insights show <id>` / `insights plan --focus <id>` for this
    /// category's top-ranked item. Built, never executed.
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MegaTriage {
    pub by_type: Vec<Category>,
    /// An issue with two labels appears in both label buckets.
    pub by_label: Vec<Category>,
    pub highest_impact: Option<TriageItem>,
}

/// Build the mega-triage breakdown from the ranked actionable `items`.
#[must_use]
pub fn build(items: &[TriageItem], issues: &[Issue]) -> MegaTriage {
    let issues_by_id: std::collections::HashMap<&str, &Issue> =
        issues.iter().map(|i| (i.id.as_str(), i)).collect();

    let mut by_type: BTreeMap<String, Vec<TriageItem>> = BTreeMap::new();
    let mut by_label: BTreeMap<String, Vec<TriageItem>> = BTreeMap::new();

    for item in items {
        let Some(issue) = issues_by_id.get(item.issue_id.as_str()) else {
            continue;
        };
        let type_key = if issue.issue_type.is_empty() {
            "untyped".to_string()
        } else {
            issue.issue_type.clone()
        };
        by_type.entry(type_key).or_default().push(item.clone());

        for label in &issue.labels {
            by_label.entry(label.clone()).or_default().push(item.clone());
        }
    }

    let by_type = into_categories(by_type);
    let by_label = into_categories(by_label);

    let highest_impact = items
        .iter()
        .max_by(|a, b| {
            a.unblocks
                .cmp(&b.unblocks)
                .then_with(|| b.priority.cmp(&a.priority))
                .then_with(|| b.issue_id.cmp(&a.issue_id))
        })
        .cloned();

    MegaTriage {
        by_type,
        by_label,
        highest_impact,
    }
}

fn into_categories(mut groups: BTreeMap<String, Vec<TriageItem>>) -> Vec<Category> {
    groups
        .iter_mut()
        .for_each(|(_, items)| sort_by_triage_score(items));

    groups
        .into_iter()
        .map(|(name, items)| {
            let commands = items
                .first()
                .map(|top| {
                    vec![
                        format!("insights show {}", top.issue_id),
                        format!("insights plan --focus {}", top.issue_id),
                    ]
                })
                .unwrap_or_default();
            Category { name, items, commands }
        })
        .collect()
}

fn sort_by_triage_score(items: &mut [TriageItem]) {
    items.sort_by(|a, b| {
        b.triage_score
            .partial_cmp(&a.triage_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.issue_id.cmp(&b.issue_id))
    });
}
