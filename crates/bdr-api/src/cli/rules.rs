//! `bdr rules`: print the active routing table.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use std::collections::BTreeSet;

use bdr_types::rule::RuleTable;

pub fn print_rules(rules: &RuleTable, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rules)?);
        return Ok(());
    }

    if rules.is_empty() {
        println!();
        println!(
            "  {} No routing rules: every event will be skipped.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Event").fg(Color::White),
        Cell::new("Properties").fg(Color::White),
        Cell::new("Values").fg(Color::White),
        Cell::new("Workflow").fg(Color::White),
    ]);

    for (index, rule) in rules.rules().iter().enumerate() {
        table.add_row(vec![
            Cell::new(index),
            Cell::new(format!("{}.{}", rule.object_type, rule.event_type)),
            Cell::new(join_or_any(rule.property_names.as_ref())),
            Cell::new(join_or_any(rule.property_values.as_ref())),
            Cell::new(&rule.workflow).fg(Color::Cyan),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} rule{} (first match wins)",
        style(rules.len()).bold(),
        if rules.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

fn join_or_any(set: Option<&BTreeSet<String>>) -> String {
    match set {
        Some(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
        None => "any".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_or_any_formats_filters() {
        assert_eq!(join_or_any(None), "any");
        let set: BTreeSet<String> = ["b", "a"].into_iter().map(String::from).collect();
        assert_eq!(join_or_any(Some(&set)), "a, b");
    }

    #[test]
    fn prints_default_table() {
        print_rules(&RuleTable::default(), false).unwrap();
        print_rules(&RuleTable::default(), true).unwrap();
    }
}
