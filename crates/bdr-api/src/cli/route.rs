//! `bdr route <file>`: offline classification of a saved delivery.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;

use bdr_core::event::{normalize, parse_delivery};
use bdr_core::routing::resolve;
use bdr_types::error::DeliveryError;
use bdr_types::rule::RuleTable;

/// How one sub-event of the delivery was classified.
#[derive(Debug, Serialize)]
pub struct RouteRow {
    pub index: usize,
    pub subscription_type: Option<String>,
    pub object_id: Option<String>,
    pub property: Option<String>,
    pub value: Option<String>,
    /// Matched workflow; `None` when skipped or rejected.
    pub workflow: Option<String>,
    /// Normalization error for rejected sub-events.
    pub error: Option<String>,
}

/// Normalize and resolve every sub-event, in delivery order.
pub fn route_delivery(body: &[u8], rules: &RuleTable) -> Result<Vec<RouteRow>, DeliveryError> {
    let rows = parse_delivery(body)?
        .iter()
        .enumerate()
        .map(|(index, raw)| match normalize(raw) {
            Ok(event) => RouteRow {
                index,
                subscription_type: Some(event.subscription_type()),
                object_id: Some(event.object_id().to_string()),
                property: event.changed_property().map(str::to_string),
                value: event.property_value().map(str::to_string),
                workflow: resolve(&event, rules).map(|w| w.to_string()),
                error: None,
            },
            Err(e) => RouteRow {
                index,
                subscription_type: raw.subscription_type().map(str::to_string),
                object_id: None,
                property: None,
                value: None,
                workflow: None,
                error: Some(e.to_string()),
            },
        })
        .collect();
    Ok(rows)
}

pub async fn route_file(path: &Path, rules: &RuleTable, json: bool) -> Result<()> {
    let body = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let rows = route_delivery(&body, rules)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Event").fg(Color::White),
        Cell::new("Object").fg(Color::White),
        Cell::new("Change").fg(Color::White),
        Cell::new("Result").fg(Color::White),
    ]);

    for row in &rows {
        let change = match (&row.property, &row.value) {
            (Some(p), Some(v)) => format!("{p} = {v:?}"),
            _ => String::new(),
        };
        let result = match (&row.workflow, &row.error) {
            (Some(workflow), _) => Cell::new(workflow).fg(Color::Green),
            (None, Some(error)) => Cell::new(format!("rejected: {error}")).fg(Color::Red),
            (None, None) => Cell::new("skipped").fg(Color::DarkGrey),
        };

        table.add_row(vec![
            Cell::new(row.index),
            Cell::new(row.subscription_type.as_deref().unwrap_or("?")),
            Cell::new(row.object_id.as_deref().unwrap_or("")),
            Cell::new(change),
            result,
        ]);
    }

    let scheduled = rows.iter().filter(|r| r.workflow.is_some()).count();
    let rejected = rows.iter().filter(|r| r.error.is_some()).count();

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} scheduled, {} skipped, {} rejected",
        style(scheduled).green().bold(),
        style(rows.len() - scheduled - rejected).bold(),
        style(rejected).red().bold()
    );
    println!();

    Ok(())
}
