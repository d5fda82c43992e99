use frontierwatch_common::{CanonicalIncident, IncidentType};
use serde_json::json;

use super::html_escape;

const TERROR_COLOR: &str = "#d32f2f";
const DEFAULT_COLOR: &str = "#f57c00";
const POPUP_TITLE_CHARS: usize = 100;

/// Leaflet page with one circle marker per geocoded incident. `None` when no
/// incident has coordinates.
pub fn render_map(incidents: &[CanonicalIncident]) -> Option<String> {
    let located: Vec<_> = incidents
        .iter()
        .filter_map(|i| i.coordinates.map(|c| (i, c)))
        .collect();
    if located.is_empty() {
        return None;
    }

    let n = located.len() as f64;
    let center_lat = located.iter().map(|(_, c)| c.lat).sum::<f64>() / n;
    let center_lng = located.iter().map(|(_, c)| c.lng).sum::<f64>() / n;

    let features: Vec<_> = located
        .iter()
        .map(|(incident, point)| {
            let title: String = incident.title_or_content().chars().take(POPUP_TITLE_CHARS).collect();
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [point.lng, point.lat] },
                "properties": {
                    "color": marker_color(incident.incident_type),
                    "popup": format!(
                        "<strong>{}</strong><br><span style=\"font-size:12px;color:#555\">{}</span>",
                        html_escape(&title),
                        html_escape(incident.source_or_unknown())
                    ),
                },
            })
        })
        .collect();
    let geojson = json!({ "type": "FeatureCollection", "features": features })
        .to_string()
        .replace("</", "<\\/");

    let content = format!(
        r#"<div id="map"></div>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script>
const map = L.map('map').setView([{center_lat:.4}, {center_lng:.4}], 6);
L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
    attribution: '&copy; OpenStreetMap contributors',
    maxZoom: 18,
}}).addTo(map);

const incidents = {geojson};
incidents.features.forEach(f => {{
    const [lng, lat] = f.geometry.coordinates;
    const p = f.properties;
    L.circleMarker([lat, lng], {{
        radius: 8, fillColor: p.color, color: '#fff', weight: 2, fillOpacity: 0.85
    }}).bindPopup(p.popup).addTo(map);
}});
</script>"#
    );

    Some(build_page("Incident Map", &content))
}

fn marker_color(kind: IncidentType) -> &'static str {
    match kind {
        IncidentType::Terror => TERROR_COLOR,
        _ => DEFAULT_COLOR,
    }
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - FrontierWatch</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;}}
#map{{height:100vh;}}
</style>
</head>
<body>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}
