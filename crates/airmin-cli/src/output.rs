//! Output formatting for CLI commands.
//!
//! Every renderer returns the full text to print so the binary stays a thin
//! dispatcher and the formatting can be tested without spawning a process.

use std::fmt::Write;

use airmin_lib::{AirportGraph, City, ImportReport, RoutePlan, RouteRenderMode, RouteSummary};
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::json;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text.
    #[default]
    Text,
    /// Markdown-flavoured text.
    Rich,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    fn render_mode(self) -> RouteRenderMode {
        match self {
            OutputFormat::Rich => RouteRenderMode::RichText,
            OutputFormat::Text | OutputFormat::Json => RouteRenderMode::PlainText,
        }
    }
}

/// Render a discovered plan, or the "no route" notice when it has no legs.
pub fn render_plan(plan: &RoutePlan, graph: &AirportGraph, format: OutputFormat) -> Result<String> {
    if plan.is_empty() {
        return match format {
            OutputFormat::Json => to_json(&json!({
                "source_city": plan.source_city,
                "destination_city": plan.destination_city,
                "total_price": 0.0,
                "hops": 0,
                "legs": [],
            })),
            OutputFormat::Text | OutputFormat::Rich => Ok(format!(
                "No route found from {}, {} to {}, {}\n",
                plan.source_city.name,
                plan.source_city.country,
                plan.destination_city.name,
                plan.destination_city.country
            )),
        };
    }

    let summary = RouteSummary::from_plan(plan, graph)?;
    match format {
        OutputFormat::Json => to_json(&summary),
        OutputFormat::Text | OutputFormat::Rich => Ok(summary.render(format.render_mode())),
    }
}

/// Render the stored cities, one per line in text modes.
pub fn render_cities(cities: &[City], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&cities);
    }
    if cities.is_empty() {
        return Ok("No cities stored.\n".to_string());
    }

    let mut buffer = String::new();
    let _ = writeln!(buffer, "{:>6}  {}", "ID", "City");
    for city in cities {
        let _ = writeln!(buffer, "{:>6}  {}, {}", city.id, city.name, city.country);
    }
    Ok(buffer)
}

/// Render one line per import step, or a JSON object keyed by step.
pub fn render_imports(reports: &[(&str, ImportReport)], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        let object: serde_json::Map<String, serde_json::Value> = reports
            .iter()
            .map(|(kind, report)| Ok(((*kind).to_string(), serde_json::to_value(report)?)))
            .collect::<Result<_>>()?;
        return to_json(&object);
    }

    let mut buffer = String::new();
    for (kind, report) in reports {
        let _ = writeln!(
            buffer,
            "Imported {} {kind} ({} skipped)",
            report.imported, report.skipped
        );
    }
    Ok(buffer)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use airmin_lib::{MemoryStore, RouteDiscovery, SnapshotCache};

    use super::*;

    fn discovery() -> (RouteDiscovery, i64, i64, i64) {
        let store = Arc::new(MemoryStore::new());
        let berlin = store.add_city("Berlin", "Germany");
        let paris = store.add_city("Paris", "France");
        let oslo = store.add_city("Oslo", "Norway");
        let tegel = store.add_airport("Tegel", berlin);
        let orly = store.add_airport("Orly", paris);
        store.add_airport("Gardermoen", oslo);
        store.add_route(tegel, orly, 42.0);
        let cache = Arc::new(SnapshotCache::new(store.clone()));
        (RouteDiscovery::new(store, cache), berlin, paris, oslo)
    }

    #[test]
    fn empty_plan_prints_no_route_notice() {
        let (discovery, berlin, _, oslo) = discovery();
        let plan = discovery.cheapest(berlin, oslo).expect("query succeeds");
        let graph = discovery.cache().get().expect("snapshot");

        let text = render_plan(&plan, &graph, OutputFormat::Text).expect("render");
        assert_eq!(text, "No route found from Berlin, Germany to Oslo, Norway\n");

        let json = render_plan(&plan, &graph, OutputFormat::Json).expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["hops"], 0);
        assert_eq!(value["legs"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn plan_renders_summary_in_each_format() {
        let (discovery, berlin, paris, _) = discovery();
        let plan = discovery.cheapest(berlin, paris).expect("query succeeds");
        let graph = discovery.cache().get().expect("snapshot");

        let text = render_plan(&plan, &graph, OutputFormat::Text).expect("render");
        assert!(text.starts_with("Route: Berlin, Germany -> Paris, France (1 legs, total 42.00)"));

        let rich = render_plan(&plan, &graph, OutputFormat::Rich).expect("render");
        assert!(rich.starts_with("**Route**"));

        let json = render_plan(&plan, &graph, OutputFormat::Json).expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["total_price"], 42.0);
    }

    #[test]
    fn import_reports_render_as_lines_or_object() {
        let reports = [
            ("cities", ImportReport { imported: 2, skipped: 1 }),
            ("airports", ImportReport { imported: 3, skipped: 0 }),
        ];

        let text = render_imports(&reports, OutputFormat::Text).expect("render");
        assert_eq!(
            text,
            "Imported 2 cities (1 skipped)\nImported 3 airports (0 skipped)\n"
        );

        let json = render_imports(&reports, OutputFormat::Json).expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["airports"]["imported"], 3);
    }

    #[test]
    fn empty_city_list_has_a_notice() {
        let text = render_cities(&[], OutputFormat::Text).expect("render");
        assert_eq!(text, "No cities stored.\n");
    }
}
