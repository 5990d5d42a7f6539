use serde::{Deserialize, Serialize};

/// Monthly rent as a fraction of the listing price.
const RENT_YIELD: f64 = 0.003;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum District {
    Central,
    Riverside,
    TechPark,
    OldTown,
    Harbor,
}

/// News wires name districts by short desk tags rather than by their map
/// names; this table maps one scheme onto the other.
const NEWS_DISTRICT_NAMES: [(&str, District); 10] = [
    ("cbd", District::Central),
    ("downtown", District::Central),
    ("riverside", District::Riverside),
    ("river", District::Riverside),
    ("tech", District::TechPark),
    ("tech-park", District::TechPark),
    ("old-town", District::OldTown),
    ("heritage", District::OldTown),
    ("harbor", District::Harbor),
    ("port", District::Harbor),
];

impl District {
    pub const ALL: [District; 5] = [
        District::Central,
        District::Riverside,
        District::TechPark,
        District::OldTown,
        District::Harbor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            District::Central => "Central Business District",
            District::Riverside => "Riverside",
            District::TechPark => "Tech Park",
            District::OldTown => "Old Town",
            District::Harbor => "Harbor Front",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            District::Central => "CBD",
            District::Riverside => "RVS",
            District::TechPark => "TEC",
            District::OldTown => "OLD",
            District::Harbor => "HBR",
        }
    }

    pub fn from_news_name(name: &str) -> Option<District> {
        let name = name.trim();
        NEWS_DISTRICT_NAMES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, district)| *district)
    }

    fn price_multiplier(self) -> f64 {
        match self {
            District::Central => 1.8,
            District::Riverside => 1.4,
            District::TechPark => 1.2,
            District::OldTown => 0.9,
            District::Harbor => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HouseType {
    Villa,
    HighRise,
    Tower,
    Bungalow,
}

impl HouseType {
    pub fn label(self) -> &'static str {
        match self {
            HouseType::Villa => "Villa",
            HouseType::HighRise => "High-rise",
            HouseType::Tower => "Tower",
            HouseType::Bungalow => "Bungalow",
        }
    }

    fn base_price(self) -> f64 {
        match self {
            HouseType::Villa => 60_000_000.0,
            HouseType::Tower => 25_000_000.0,
            HouseType::HighRise => 8_000_000.0,
            HouseType::Bungalow => 2_500_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decoration {
    Bare,
    Simple,
    Fine,
    Legendary,
}

impl Decoration {
    pub fn label(self) -> &'static str {
        match self {
            Decoration::Bare => "Bare",
            Decoration::Simple => "Simple",
            Decoration::Fine => "Fine",
            Decoration::Legendary => "Legendary",
        }
    }

    fn multiplier(self) -> f64 {
        match self {
            Decoration::Bare => 0.85,
            Decoration::Simple => 1.0,
            Decoration::Fine => 1.25,
            Decoration::Legendary => 1.6,
        }
    }
}

/// Blocks every district is built from.
const DISTRICT_LAYOUT: [(HouseType, Decoration); 14] = [
    (HouseType::Villa, Decoration::Fine),
    (HouseType::Villa, Decoration::Legendary),
    (HouseType::Tower, Decoration::Simple),
    (HouseType::Tower, Decoration::Fine),
    (HouseType::Tower, Decoration::Legendary),
    (HouseType::HighRise, Decoration::Bare),
    (HouseType::HighRise, Decoration::Simple),
    (HouseType::HighRise, Decoration::Simple),
    (HouseType::HighRise, Decoration::Fine),
    (HouseType::Bungalow, Decoration::Bare),
    (HouseType::Bungalow, Decoration::Bare),
    (HouseType::Bungalow, Decoration::Simple),
    (HouseType::Bungalow, Decoration::Simple),
    (HouseType::Bungalow, Decoration::Fine),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: String,
    pub district: District,
    pub house_type: HouseType,
    pub decoration: Decoration,
    pub initial_price: u64,
    pub monthly_rent: u64,
}

pub fn catalog() -> Vec<CatalogEntry> {
    let mut entries = Vec::with_capacity(District::ALL.len() * DISTRICT_LAYOUT.len());
    for district in District::ALL {
        for (index, (house_type, decoration)) in DISTRICT_LAYOUT.iter().enumerate() {
            let variation = 1.0 + (index % 5) as f64 * 0.02;
            let price = house_type.base_price()
                * decoration.multiplier()
                * district.price_multiplier()
                * variation;
            let initial_price = round_to(price, 10_000);
            let monthly_rent = round_to(initial_price as f64 * RENT_YIELD, 100);
            entries.push(CatalogEntry {
                id: format!("{}-{:03}", district.code(), index + 1),
                district,
                house_type: *house_type,
                decoration: *decoration,
                initial_price,
                monthly_rent,
            });
        }
    }
    entries
}

fn round_to(value: f64, step: u64) -> u64 {
    ((value / step as f64).round() as u64).max(1) * step
}
