//! Metal usage across jobs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::percentage;
use crate::domain::null_as_default;

/// Label used when a metal has no type
const UNKNOWN_TYPE: &str = "unknown";

/// Number of metals shown in the ranking
pub const TOP_METALS: usize = 10;

/// A metal in the price catalogue
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalTypeRow {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// `ferrous`, `non-ferrous` or `precious`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Price per pound
    #[serde(default)]
    pub current_price_per_pound: Option<f64>,
    /// Unit
    #[serde(default)]
    pub unit: Option<String>,
    /// `active` or `inactive`
    #[serde(default)]
    pub is_active: Option<String>,
}

/// Metal expanded inside a usage entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsedMetal {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Type
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// One metal entry of a job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalUsageEntry {
    /// Dereferenced metal; `None` when the reference dangles or is unset
    #[serde(default)]
    pub metal: Option<UsedMetal>,
    /// Weight
    #[serde(default)]
    pub weight: Option<f64>,
    /// Amount paid
    #[serde(default)]
    pub purchase_price: Option<f64>,
}

/// The metal entries of one job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetalUsageJob {
    /// Entries
    #[serde(default, deserialize_with = "null_as_default")]
    pub metals: Vec<MetalUsageEntry>,
}

/// Result of the metal analytics query
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalAnalyticsRows {
    /// Catalogue
    #[serde(default, deserialize_with = "null_as_default")]
    pub metal_types: Vec<MetalTypeRow>,
    /// Jobs that have metal entries
    #[serde(default, deserialize_with = "null_as_default")]
    pub metal_usage: Vec<MetalUsageJob>,
}

/// Totals for one metal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalStats {
    /// Metal document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    pub name: Option<String>,
    /// Type, `unknown` when unset
    #[serde(rename = "type")]
    pub kind: String,
    /// Pounds collected
    pub total_weight: f64,
    /// Amount paid
    pub total_value: f64,
    /// Number of entries, which may exceed the number of distinct jobs
    pub job_count: u64,
    /// Value over weight, 0 when no weight
    pub average_price_per_pound: f64,
}

/// Totals for one metal type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalTypeBreakdown {
    /// Type
    #[serde(rename = "type")]
    pub kind: String,
    /// Pounds collected
    pub total_weight: f64,
    /// Amount paid
    pub total_value: f64,
    /// Number of distinct metals of the type
    pub metal_count: u64,
    /// Share of total weight, in percent
    pub percentage_of_weight: f64,
}

/// Metal analytics panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalAnalytics {
    /// Number of metals in the catalogue
    pub catalogue_size: usize,
    /// Pounds across all metals
    pub total_weight: f64,
    /// Amount paid across all metals
    pub total_value: f64,
    /// Top metals by value
    pub top_metals: Vec<MetalStats>,
    /// Per-type totals, in first-seen order
    pub type_breakdown: Vec<MetalTypeBreakdown>,
    /// Catalogue as returned
    pub metal_types: Vec<MetalTypeRow>,
}

impl MetalAnalytics {
    /// Compute the panel from the query result
    pub fn from_rows(rows: MetalAnalyticsRows) -> Self {
        let mut stats: Vec<MetalStats> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in rows.metal_usage.iter().flat_map(|job| job.metals.iter()) {
            let Some(metal) = &entry.metal else {
                continue;
            };
            let slot = *index.entry(metal.id.clone()).or_insert_with(|| {
                stats.push(MetalStats {
                    id: metal.id.clone(),
                    name: metal.name.clone(),
                    kind: metal.kind.clone().unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
                    total_weight: 0.0,
                    total_value: 0.0,
                    job_count: 0,
                    average_price_per_pound: 0.0,
                });
                stats.len() - 1
            });

            let metal_stats = &mut stats[slot];
            metal_stats.total_weight += entry.weight.unwrap_or(0.0);
            metal_stats.total_value += entry.purchase_price.unwrap_or(0.0);
            metal_stats.job_count += 1;
        }

        for metal in &mut stats {
            metal.average_price_per_pound = if metal.total_weight > 0.0 {
                metal.total_value / metal.total_weight
            } else {
                0.0
            };
        }

        let total_weight: f64 = stats.iter().map(|m| m.total_weight).sum();
        let total_value: f64 = stats.iter().map(|m| m.total_value).sum();

        let mut type_breakdown: Vec<MetalTypeBreakdown> = Vec::new();
        for metal in &stats {
            let position = type_breakdown.iter().position(|t| t.kind == metal.kind);
            let breakdown = match position {
                Some(i) => &mut type_breakdown[i],
                None => {
                    type_breakdown.push(MetalTypeBreakdown {
                        kind: metal.kind.clone(),
                        total_weight: 0.0,
                        total_value: 0.0,
                        metal_count: 0,
                        percentage_of_weight: 0.0,
                    });
                    let last = type_breakdown.len() - 1;
                    &mut type_breakdown[last]
                }
            };
            breakdown.total_weight += metal.total_weight;
            breakdown.total_value += metal.total_value;
            breakdown.metal_count += 1;
        }
        for breakdown in &mut type_breakdown {
            breakdown.percentage_of_weight = percentage(breakdown.total_weight, total_weight);
        }

        // stable: ties keep first-seen order
        stats.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
        stats.truncate(TOP_METALS);

        Self {
            catalogue_size: rows.metal_types.len(),
            total_weight,
            total_value,
            top_metals: stats,
            type_breakdown,
            metal_types: rows.metal_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metal_analytics() {
        let rows: MetalAnalyticsRows = serde_json::from_value(json!({
            "metalTypes": [
                {"_id": "cu", "name": "Copper", "type": "non-ferrous"},
                {"_id": "fe", "name": "Steel", "type": "ferrous"},
                {"_id": "au", "name": "Gold", "type": "precious"}
            ],
            "metalUsage": [
                {"metals": [
                    {"metal": {"_id": "cu", "name": "Copper", "type": "non-ferrous"}, "weight": 10.0, "purchasePrice": 40.0},
                    {"metal": {"_id": "fe", "name": "Steel", "type": "ferrous"}, "weight": 100.0, "purchasePrice": 20.0}
                ]},
                {"metals": [
                    {"metal": {"_id": "cu", "name": "Copper", "type": "non-ferrous"}, "weight": 10.0, "purchasePrice": 40.0},
                    {"metal": {"_id": "cu", "name": "Copper", "type": "non-ferrous"}, "weight": 0.0, "purchasePrice": 0.0},
                    {"metal": null, "weight": 5.0, "purchasePrice": 5.0},
                    {"metal": {"_id": "al", "name": "Aluminium", "type": null}, "weight": 0.0, "purchasePrice": 0.0}
                ]},
                {"metals": null}
            ]
        }))
        .unwrap();

        let analytics = MetalAnalytics::from_rows(rows);
        assert_eq!(analytics.catalogue_size, 3);
        assert_eq!(analytics.total_weight, 120.0);
        assert_eq!(analytics.total_value, 100.0);

        let ids: Vec<&str> = analytics.top_metals.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["cu", "fe", "al"]);

        let copper = &analytics.top_metals[0];
        assert_eq!(copper.job_count, 3);
        assert_eq!(copper.average_price_per_pound, 4.0);
        assert_eq!(analytics.top_metals[2].average_price_per_pound, 0.0);
        assert_eq!(analytics.top_metals[2].kind, "unknown");

        let kinds: Vec<&str> = analytics.type_breakdown.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["non-ferrous", "ferrous", "unknown"]);
        let ferrous = &analytics.type_breakdown[1];
        assert_eq!(ferrous.metal_count, 1);
        assert_eq!(ferrous.percentage_of_weight, 100.0 / 120.0 * 100.0);
    }

    #[test]
    fn test_ranking_keeps_top_ten() {
        let jobs: Vec<serde_json::Value> = (0..12)
            .map(|i| {
                json!({"metals": [{
                    "metal": {"_id": format!("m{}", i), "name": format!("Metal {}", i), "type": "ferrous"},
                    "weight": 1.0,
                    "purchasePrice": i as f64
                }]})
            })
            .collect();
        let rows: MetalAnalyticsRows =
            serde_json::from_value(json!({"metalTypes": [], "metalUsage": jobs})).unwrap();

        let analytics = MetalAnalytics::from_rows(rows);
        assert_eq!(analytics.top_metals.len(), TOP_METALS);
        assert_eq!(analytics.top_metals[0].id, "m11");
        assert_eq!(analytics.top_metals[9].id, "m2");
        assert_eq!(analytics.type_breakdown[0].metal_count, 12);
    }
}
