//! Real Las Vegas Strip locations for delivery fixtures.
//!
//! Coordinates sourced from OpenStreetMap via Overpass API.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// The outlet every fixture order ships from.
pub const SHOP: Location = Location::new("Caesars Palace", 36.1162, -115.1745);

/// Delivery points within ~1.5 km of the shop.
pub const NEAR_STRIP: &[Location] = &[
    Location::new("Bellagio", 36.1126, -115.1767),
    Location::new("Brooklyn Bowl", 36.1175388, -115.1695094),
    Location::new("Yard House", 36.1177147, -115.1691992),
    Location::new("Gordon Ramsay Steak", 36.1127744, -115.1712029),
    Location::new("Spago by Wolfgang Puck", 36.1139368, -115.1741462),
    Location::new("Guy Fieri's Vegas Kitchen", 36.1184064, -115.1722088),
    Location::new("Rao's", 36.1163982, -115.1763053),
    Location::new("Public House", 36.1219193, -115.1689317),
];

/// Delivery points far from the shop (Henderson / North Las Vegas).
pub const FAR_AWAY: &[Location] = &[
    Location::new("Islander's Grill", 36.0335058, -114.9856162),
    Location::new("Naga", 36.0137634, -114.9928676),
    Location::new("Rivas Mexican Grill North", 36.1450055, -115.0482587),
    Location::new("I Love Sushi Henderson", 35.9916660, -115.1028343),
];
