//! Stations of the municipal emergency management network (CGE).

use cge_monitor_core::DEFAULT_STATION;

/// (name, station id, latitude, longitude)
const CGE_STATIONS: &[(&str, u32, f64, f64)] = &[
    ("Penha", 1000887, -23.530763, -46.528744),
    ("Perus", 504, -23.40716, -46.75264),
    ("Pirituba", 515, -23.489, -46.727),
    ("Freguesia do Ó", 509, -23.47706, -46.66537),
    ("Santana", 510, -23.51064, -46.61746),
    ("Tremembé", 1000944, -23.459841, -46.585572),
    ("S. Miguel", 1000862, -23.491511, -46.46361),
    ("Itaim Paulista", 1000882, -23.49067, -46.43599),
    ("S. Mateus", 1000844, -23.594199, -46.465567),
    ("Sé", 503, -23.553, -46.656),
    ("Butantã", 1000842, -23.5545389, -46.7259528),
    ("Ipiranga", 1000840, -23.632978, -46.583518),
    ("Santo Amaro", 1000852, -23.634789, -46.667657),
    ("M Boi Mirim", 1000850, -23.671486, -46.727305),
    ("Cidade Ademar", 592, -23.6675, -46.675),
    ("Parelheiros", 507, -23.8678, -46.6522),
    ("Marsilac", 1000300, -23.916332, -46.727397),
    ("Lapa", 1000848, -23.52556, -46.75083),
    ("Campo Limpo", 1000854, -23.65818, -46.76749),
    ("Cap. Socorro Sub", 846, -23.723035, -46.699263),
    ("Cap. Socorro", 1000857, -23.781133, -46.725217),
    ("Vila Formosa", 1000859, -23.56403, -46.508234),
    ("Mooca", 1000860, -23.530444, -46.595059),
    ("Itaquera", 1000864, -23.552301, -46.44611),
    ("Vila Prudente", 524, -23.583219, -46.560179),
    ("Vila Maria", 540, -23.501611, -46.591534),
    ("Vila Mariana", 495, -23.58472, -46.63556),
    ("Riacho Grande", 400, -23.752079, -46.532528),
    ("Mauá", 1000876, -23.667, -46.465),
    ("S. de Parnaíba", 1000880, -23.43794, -46.90945),
    ("Jabaquara", 634, -23.650814, -46.646581),
    ("Pinheiros", 1000635, -23.551871, -46.695939),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: u32,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Station {
    /// Station outside the registry: named after its id, not placed on the map.
    pub fn unlisted(id: u32) -> Self {
        Station {
            id,
            name: id.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn page_url(&self, template: &str) -> String {
        template.replace("{station}", &self.id.to_string())
    }
}

fn from_entry(&(name, id, latitude, longitude): &(&str, u32, f64, f64)) -> Station {
    Station {
        id,
        name: name.to_string(),
        latitude: Some(latitude),
        longitude: Some(longitude),
    }
}

pub fn known_stations() -> Vec<Station> {
    CGE_STATIONS.iter().map(from_entry).collect()
}

pub fn lookup(id: u32) -> Option<Station> {
    CGE_STATIONS
        .iter()
        .find(|(_, station_id, _, _)| *station_id == id)
        .map(from_entry)
}

/// Stations to process this run, in configuration order without repeats.
///
/// `all` selects the whole registry. An empty list selects the default station.
pub fn resolve(ids: &[u32], all: bool) -> Vec<Station> {
    if all {
        return known_stations();
    }
    if ids.is_empty() {
        return resolve(&[DEFAULT_STATION], false);
    }

    let mut stations: Vec<Station> = Vec::with_capacity(ids.len());
    for &id in ids {
        if stations.iter().any(|s| s.id == id) {
            continue;
        }
        stations.push(lookup(id).unwrap_or_else(|| Station::unlisted(id)));
    }
    stations
}
