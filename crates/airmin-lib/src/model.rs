use serde::Serialize;

/// Store-assigned identifier for a city.
pub type CityId = i64;

/// Store-assigned identifier for an airport.
pub type AirportId = i64;

/// Store-assigned identifier for a priced route.
pub type RouteId = i64;

/// A city groups one or more airports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub country: String,
    pub description: String,
}

/// Airport as persisted by the store. Search state is never kept here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub id: AirportId,
    /// Identifier from the source dataset, unique across airports.
    pub external_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iata_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icao_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub city_id: CityId,
}

/// Directed priced connection between two airports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: RouteId,
    pub price: f64,
    pub source: AirportId,
    pub destination: AirportId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stops: Option<u32>,
}

/// City awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCity {
    pub name: String,
    pub country: String,
    pub description: String,
}

/// Airport awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAirport {
    pub external_id: i64,
    pub name: String,
    pub iata_code: Option<String>,
    pub icao_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city_id: CityId,
}

/// Route awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoute {
    pub price: f64,
    pub source: AirportId,
    pub destination: AirportId,
    pub airline_code: Option<String>,
    pub stops: Option<u32>,
}

impl NewRoute {
    /// Route without airline metadata.
    pub fn priced(source: AirportId, destination: AirportId, price: f64) -> Self {
        Self {
            price,
            source,
            destination,
            airline_code: None,
            stops: None,
        }
    }
}

/// Denormalized projection of every airport and route, as returned by a loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphData {
    pub airports: Vec<Airport>,
    pub routes: Vec<Route>,
}

/// One hop of a discovered itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteLeg {
    pub route_id: RouteId,
    pub source: AirportId,
    pub destination: AirportId,
    pub price: f64,
}

impl From<&Route> for RouteLeg {
    fn from(route: &Route) -> Self {
        Self {
            route_id: route.id,
            source: route.source,
            destination: route.destination,
            price: route.price,
        }
    }
}
