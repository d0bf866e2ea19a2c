use std::fmt::Write;

use serde::Serialize;

use crate::discovery::RoutePlan;
use crate::error::{Error, Result};
use crate::graph::AirportGraph;
use crate::model::{AirportId, RouteId};

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    PlainText,
    RichText,
}

/// Airport at either end of a leg.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AirportEndpoint {
    pub id: AirportId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iata_code: Option<String>,
}

impl AirportEndpoint {
    fn resolve(graph: &AirportGraph, id: AirportId) -> Self {
        let airport = graph.airport_by_id(id);
        Self {
            id,
            name: airport.map(|airport| airport.name.clone()),
            iata_code: airport.and_then(|airport| airport.iata_code.clone()),
        }
    }

    fn display_name(&self) -> String {
        let name = self.name.as_deref().unwrap_or("<unknown>");
        match &self.iata_code {
            Some(code) => format!("{name} [{code}]"),
            None => name.to_string(),
        }
    }
}

/// One priced flight in a summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LegSummary {
    pub index: usize,
    pub route_id: RouteId,
    pub departure: AirportEndpoint,
    pub arrival: AirportEndpoint,
    pub price: f64,
}

/// Structured representation of a discovered itinerary with its total price.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub source_city: String,
    pub destination_city: String,
    pub total_price: f64,
    pub hops: usize,
    pub legs: Vec<LegSummary>,
}

impl RouteSummary {
    /// Convert a [`RoutePlan`] into a summary with resolved airport names.
    pub fn from_plan(plan: &RoutePlan, graph: &AirportGraph) -> Result<Self> {
        if plan.is_empty() {
            return Err(Error::EmptyRoutePlan);
        }

        let legs = plan
            .legs
            .iter()
            .enumerate()
            .map(|(index, leg)| LegSummary {
                index: index + 1,
                route_id: leg.route_id,
                departure: AirportEndpoint::resolve(graph, leg.source),
                arrival: AirportEndpoint::resolve(graph, leg.destination),
                price: leg.price,
            })
            .collect::<Vec<_>>();

        Ok(Self {
            source_city: city_label(&plan.source_city.name, &plan.source_city.country),
            destination_city: city_label(
                &plan.destination_city.name,
                &plan.destination_city.country,
            ),
            total_price: plan.total_price(),
            hops: legs.len(),
            legs,
        })
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::RichText => self.render_rich(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route: {} -> {} ({} legs, total {:.2})",
            self.source_city, self.destination_city, self.hops, self.total_price
        );
        for leg in &self.legs {
            let _ = writeln!(
                buffer,
                "{:>3}: {} -> {} ({:.2})",
                leg.index,
                leg.departure.display_name(),
                leg.arrival.display_name(),
                leg.price
            );
        }
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "**Route** _{} -> {}_ ({} legs, total `{:.2}`)",
            self.source_city, self.destination_city, self.hops, self.total_price
        );
        for leg in &self.legs {
            let _ = writeln!(
                buffer,
                "* {:>2}. **{}** -> **{}** (`{:.2}`)",
                leg.index,
                leg.departure.display_name(),
                leg.arrival.display_name(),
                leg.price
            );
        }
        buffer
    }
}

fn city_label(name: &str, country: &str) -> String {
    format!("{name}, {country}")
}
