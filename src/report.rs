//! Rendering of estimates for the terminal

use crate::engine::Estimate;
use crate::estimate::format_money;
use crate::request::ResourceRequest;
use comfy_table::{Cell, Color, Table};
use serde::Serialize;

/// One line of a report
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub request: ResourceRequest,
    #[serde(flatten)]
    pub estimate: Estimate,
}

/// Sum of monthly cost across rows, and of carbon where present
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportTotals {
    pub cost_per_month: f64,
    pub carbon_grams: Option<f64>,
    pub unpriced: usize,
}

pub fn totals(rows: &[ReportRow]) -> ReportTotals {
    let cost_per_month = rows.iter().map(|r| r.estimate.cost.cost_per_month).sum();
    let carbon: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.estimate.carbon.as_ref().map(|c| c.total_grams()))
        .collect();
    ReportTotals {
        cost_per_month,
        carbon_grams: (!carbon.is_empty()).then(|| carbon.iter().sum()),
        unpriced: rows
            .iter()
            .filter(|r| !r.estimate.cost.price_available)
            .count(),
    }
}

pub fn render_table(rows: &[ReportRow], show_diagnostics: bool) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Service", "SKU", "Cost/month", "Carbon", "Detail", "Defaulted",
    ]);

    for row in rows {
        let cost = &row.estimate.cost;
        let cost_cell = if cost.price_available {
            Cell::new(format_money(cost.cost_per_month))
        } else {
            Cell::new(format_money(cost.cost_per_month)).fg(Color::Yellow)
        };
        let carbon = match &row.estimate.carbon {
            Some(c) if c.note.is_some() => format!("{:.2} {} *", c.grams, c.unit),
            Some(c) => match c.embodied_grams {
                Some(embodied) => format!("{:.2} {} (+{:.2} embodied)", c.grams, c.unit, embodied),
                None => format!("{:.2} {}", c.grams, c.unit),
            },
            None => "-".to_string(),
        };
        let defaulted = if cost.defaulted_fields.is_empty() {
            "-".to_string()
        } else {
            cost.defaulted_fields
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut detail = cost.billing_detail.clone();
        if show_diagnostics && !cost.diagnostics.is_empty() {
            for step in &cost.diagnostics {
                detail.push_str("\n  ");
                detail.push_str(step);
            }
        }

        table.add_row(vec![
            Cell::new(cost.service.as_str()),
            Cell::new(if row.request.sku.is_empty() {
                "-"
            } else {
                row.request.sku.as_str()
            }),
            cost_cell,
            Cell::new(carbon),
            Cell::new(detail),
            Cell::new(defaulted),
        ]);
    }

    let sums = totals(rows);
    let mut out = table.to_string();
    out.push_str(&format!(
        "\nTotal: {}/month",
        format_money(sums.cost_per_month)
    ));
    if let Some(grams) = sums.carbon_grams {
        out.push_str(&format!(", {:.2} gCO2e", grams));
    }
    if sums.unpriced > 0 {
        out.push_str(&format!(" ({} resource(s) without pricing)", sums.unpriced));
    }
    if rows
        .iter()
        .any(|r| r.estimate.carbon.as_ref().is_some_and(|c| c.note.is_some()))
    {
        out.push_str(&format!(
            "\n* {}",
            crate::carbon::coefficients::SHARED_INFRASTRUCTURE_NOTE
        ));
    }
    out
}

pub fn render_json(rows: &[ReportRow]) -> serde_json::Result<String> {
    #[derive(Serialize)]
    struct Report<'a> {
        resources: &'a [ReportRow],
        totals: ReportTotals,
    }
    serde_json::to_string_pretty(&Report {
        resources: rows,
        totals: totals(rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EstimateOptions};

    fn rows() -> Vec<ReportRow> {
        let engine = Engine::from_embedded("us-east-1").unwrap();
        let options = EstimateOptions {
            include_carbon: true,
            utilization_override: None,
        };
        [
            ResourceRequest::aws("ec2", "t3.micro", "us-east-1"),
            ResourceRequest::aws("ec2", "z9.enormous", "us-east-1"),
            ResourceRequest::aws("eks", "", "us-east-1"),
        ]
        .into_iter()
        .map(|request| ReportRow {
            estimate: engine.estimate(&request, &options).unwrap(),
            request,
        })
        .collect()
    }

    #[test]
    fn test_totals() {
        let sums = totals(&rows());
        assert!((sums.cost_per_month - (7.592 + 73.0)).abs() < 1e-6);
        assert_eq!(sums.unpriced, 1);
        assert!(sums.carbon_grams.unwrap() > 0.0);
    }

    #[test]
    fn test_table_mentions_everything() {
        let out = render_table(&rows(), false);
        assert!(out.contains("t3.micro"));
        assert!(out.contains("$7.5920"));
        assert!(out.contains("pricing unavailable"));
        assert!(out.contains("shared infrastructure"));
        assert!(out.contains("Total:"));
    }

    #[test]
    fn test_json_shape() {
        let json = render_json(&rows()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["resources"].as_array().unwrap().len(), 3);
        assert_eq!(value["resources"][0]["cost"]["service"], "ec2");
        assert_eq!(value["totals"]["unpriced"], 1);
    }
}
