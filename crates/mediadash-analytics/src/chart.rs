//! Vega-Lite chart specs for the dashboard panels.

use serde_json::{json, Value};

use crate::entities::EntityComparison;
use crate::topics::SectionShare;

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Pie of section shares with one-decimal percentage labels.
///
/// Angles are normalized over the slices given; labels keep the unfiltered
/// percentages.
#[must_use]
pub fn section_pie(title: &str, shares: &[SectionShare]) -> Value {
    let values: Vec<Value> = shares
        .iter()
        .map(|s| json!({ "section": s.section, "percent": s.percent }))
        .collect();

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": title,
        "data": { "values": values },
        "encoding": {
            "theta": { "field": "percent", "type": "quantitative", "stack": true },
            "color": { "field": "section", "type": "nominal", "title": "Section" }
        },
        "layer": [
            {
                "mark": { "type": "arc", "outerRadius": 120, "tooltip": true }
            },
            {
                "mark": { "type": "text", "radius": 140 },
                "encoding": {
                    "text": { "field": "percent", "type": "quantitative", "format": ".1f" }
                }
            }
        ],
        "view": { "stroke": null }
    })
}

/// Grouped bar chart: entity on x in axis order, percent on y, one bar per
/// source.
#[must_use]
pub fn entity_bars(comparison: &EntityComparison) -> Value {
    let values: Vec<Value> = comparison
        .shares
        .iter()
        .map(|s| {
            json!({
                "source": s.source.as_str(),
                "entity": s.entity,
                "count": s.count,
                "total": s.total,
                "percent": s.percent,
            })
        })
        .collect();

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": "Entity % Share Comparison for Top Entities",
        "width": "container",
        "height": 400,
        "data": { "values": values },
        "mark": "bar",
        "encoding": {
            "x": {
                "field": "entity",
                "type": "nominal",
                "title": "Entity",
                "sort": comparison.entity_axis,
                "axis": { "labelAngle": -90 }
            },
            "xOffset": { "field": "source", "type": "nominal" },
            "y": { "field": "percent", "type": "quantitative", "title": "% Share of Mentions" },
            "color": { "field": "source", "type": "nominal", "title": "Source" },
            "tooltip": [
                { "field": "source", "type": "nominal" },
                { "field": "entity", "type": "nominal" },
                { "field": "percent", "type": "quantitative", "format": ".2f" }
            ]
        }
    })
}
