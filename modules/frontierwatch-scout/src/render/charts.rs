use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::Write;

use frontierwatch_common::{CanonicalIncident, IncidentType, Region};

use super::html_escape;

pub const REGION_CHART: &str = "incidents_by_region.svg";
pub const TYPE_CHART: &str = "incidents_by_type.svg";
pub const SOURCE_CHART: &str = "top_sources.svg";

const TOP_SOURCES: usize = 10;
const PALETTE: &[&str] = &["#d32f2f", "#f57c00", "#1565c0", "#2e7d32", "#7b1fa2", "#616161"];

/// (file name, SVG document) for each chart. Empty when there are no incidents.
pub fn render_charts(incidents: &[CanonicalIncident]) -> Vec<(&'static str, String)> {
    if incidents.is_empty() {
        return Vec::new();
    }
    vec![
        (REGION_CHART, bar_chart("Incidents by Region", &region_counts(incidents))),
        (TYPE_CHART, pie_chart("Incidents by Type", &type_counts(incidents))),
        (SOURCE_CHART, bar_chart("Top Sources", &top_sources(incidents, TOP_SOURCES))),
    ]
}

pub fn region_counts(incidents: &[CanonicalIncident]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<Region, usize> = BTreeMap::new();
    for i in incidents {
        *counts.entry(i.region).or_default() += 1;
    }
    Region::ALL
        .iter()
        .filter_map(|r| counts.get(r).map(|n| (r.to_string(), *n)))
        .collect()
}

pub fn type_counts(incidents: &[CanonicalIncident]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<IncidentType, usize> = BTreeMap::new();
    for i in incidents {
        *counts.entry(i.incident_type).or_default() += 1;
    }
    IncidentType::ALL
        .iter()
        .filter_map(|t| counts.get(t).map(|n| (t.to_string(), *n)))
        .collect()
}

/// Most frequent sources first; equal counts in name order.
pub fn top_sources(incidents: &[CanonicalIncident], n: usize) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for i in incidents {
        *counts.entry(i.source_or_unknown()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

fn svg_open(width: u32, height: u32, title: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif">
<rect width="100%" height="100%" fill="#fff"/>
<text x="{x}" y="28" font-size="18" font-weight="600" text-anchor="middle">{title}</text>
"##,
        x = width / 2,
        title = html_escape(title),
    )
}

/// Horizontal bars, one per (label, count).
pub fn bar_chart(title: &str, rows: &[(String, usize)]) -> String {
    const WIDTH: u32 = 640;
    const LABEL_W: f64 = 180.0;
    const BAR_H: u32 = 28;
    const TOP: u32 = 50;

    let height = TOP + BAR_H * rows.len().max(1) as u32 + 20;
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1) as f64;
    let span = WIDTH as f64 - LABEL_W - 60.0;

    let mut svg = svg_open(WIDTH, height, title);
    for (idx, (label, count)) in rows.iter().enumerate() {
        let y = TOP + idx as u32 * BAR_H;
        let w = (*count as f64 / max * span).max(1.0);
        let _ = writeln!(
            svg,
            r#"<text x="{lx}" y="{ty}" font-size="13" text-anchor="end">{label}</text><rect x="{LABEL_W}" y="{ry}" width="{w:.1}" height="{bh}" fill="{color}"/><text x="{cx:.1}" y="{ty}" font-size="13">{count}</text>"#,
            lx = LABEL_W - 8.0,
            ty = y + BAR_H / 2 + 5,
            label = html_escape(label),
            ry = y + 4,
            bh = BAR_H - 8,
            color = PALETTE[2],
            cx = LABEL_W + w + 6.0,
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// Pie with a legend. Slices follow the order of `rows`.
pub fn pie_chart(title: &str, rows: &[(String, usize)]) -> String {
    const WIDTH: u32 = 520;
    const HEIGHT: u32 = 340;
    const CX: f64 = 170.0;
    const CY: f64 = 190.0;
    const R: f64 = 120.0;

    let total: usize = rows.iter().map(|(_, n)| n).sum();
    let mut svg = svg_open(WIDTH, HEIGHT, title);

    let mut angle = -PI / 2.0;
    for (idx, (label, count)) in rows.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        if total > 0 && *count > 0 {
            let sweep = *count as f64 / total as f64 * 2.0 * PI;
            if *count == total {
                let _ = writeln!(svg, r#"<circle cx="{CX}" cy="{CY}" r="{R}" fill="{color}"/>"#);
            } else {
                let (x0, y0) = (CX + R * angle.cos(), CY + R * angle.sin());
                let end = angle + sweep;
                let (x1, y1) = (CX + R * end.cos(), CY + R * end.sin());
                let large = if sweep > PI { 1 } else { 0 };
                let _ = writeln!(
                    svg,
                    r##"<path d="M{CX},{CY} L{x0:.2},{y0:.2} A{R},{R} 0 {large} 1 {x1:.2},{y1:.2} Z" fill="{color}" stroke="#fff"/>"##
                );
                angle = end;
            }
        }

        let ly = 80 + idx as u32 * 24;
        let pct = if total > 0 { *count as f64 * 100.0 / total as f64 } else { 0.0 };
        let _ = writeln!(
            svg,
            r#"<rect x="330" y="{ry}" width="14" height="14" fill="{color}"/><text x="352" y="{ly}" font-size="13">{label} ({count}, {pct:.0}%)</text>"#,
            ry = ly - 12,
            label = html_escape(label),
        );
    }
    svg.push_str("</svg>\n");
    svg
}
