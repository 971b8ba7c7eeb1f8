/// Data layer: gallery types, loading, filtering, and the residue log.
///
/// Architecture:
/// ```text
///  dir of *.png / .json / .csv / .parquet      residue log .csv / .json
///        │                                              │
///        ▼                                              ▼
///   ┌──────────┐                                  ┌──────────┐
///   │  loader   │  manifest → Gallery              │ records   │  → ResidueLog
///   └──────────┘                                  └──────────┘
///        │                                              │
///        ▼                                              ▼
///   ┌──────────┐                                  monthly_totals
///   │  Gallery  │  Vec<DisplayItem>, categories
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category + year range → Vec<bool>
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
pub mod records;
