use serde::Serialize;

/// One redeemable badge in the static catalog.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    /// Point cost, always positive.
    pub price: i64,
    pub color: &'static str,
}

/// Badge tiers, cheapest first. Loaded at startup, never persisted; the
/// redemption engine only reads from here.
pub const PRODUCTS: &[Product] = &[
    Product { id: "001", name: "Rookie", price: 50, color: "#52c41a" },
    Product { id: "002", name: "Bronze", price: 100, color: "#cd7f32" },
    Product { id: "003", name: "Silver", price: 200, color: "#c0c0c0" },
    Product { id: "004", name: "Gold", price: 350, color: "#ffd700" },
    Product { id: "005", name: "Diamond", price: 600, color: "#00bcd4" },
    Product { id: "006", name: "King", price: 1000, color: "#9c27b0" },
    Product { id: "007", name: "Glory", price: 1500, color: "#ff5722" },
    Product { id: "008", name: "Legend", price: 2200, color: "#e91e63" },
    Product { id: "009", name: "Supreme", price: 3000, color: "#673ab7" },
    Product { id: "010", name: "Eternal", price: 4000, color: "#3f51b5" },
    Product { id: "011", name: "Starlight", price: 5500, color: "#2196f3" },
    Product { id: "012", name: "Moonlight", price: 7500, color: "#607d8b" },
];

pub fn find(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}
