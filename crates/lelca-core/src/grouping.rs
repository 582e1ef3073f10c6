//! # Inventory Grouping
//!
//! Smart grouping of inventory items by base name with variant
//! extraction: `"Coke (350ml)"` and `"Coke (500ml)"` collapse into one
//! "Coke" group with two variants. Plural and case differences in base
//! names are normalized so "Hammer" and "Hammers" land in the same
//! group.
//!
//! Pure functions over item slices; the UI decides whether to render
//! grouped or flat.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::InventoryItem;

// =============================================================================
// Name Parsing
// =============================================================================

/// Splits an item name into base name and optional variant.
///
/// ## Example
/// ```rust
/// use lelca_core::grouping::split_variant;
///
/// assert_eq!(
///     split_variant("Coke (350ml)"),
///     ("Coke".to_string(), Some("350ml".to_string()))
/// );
/// assert_eq!(split_variant("Hammer"), ("Hammer".to_string(), None));
/// ```
pub fn split_variant(item_name: &str) -> (String, Option<String>) {
    let trimmed = item_name.trim();
    if trimmed.is_empty() {
        return (String::new(), None);
    }

    // Pattern: "<base> (<variant>)" with the closing paren at the end.
    if let (Some(open), true) = (trimmed.find('('), trimmed.ends_with(')')) {
        let base = trimmed[..open].trim();
        let variant = trimmed[open + 1..trimmed.len() - 1].trim();
        if !base.is_empty() && !variant.is_empty() {
            return (base.to_string(), Some(variant.to_string()));
        }
    }

    (trimmed.to_string(), None)
}

/// Normalizes a base name for group matching (case + simple plurals).
///
/// Trailing `s` is stripped only for words longer than 3 characters and
/// not ending in `ss`, so "gas" and "glass" survive intact.
pub fn normalize_base_name(base_name: &str) -> String {
    let mut normalized = base_name.trim().to_lowercase();

    if normalized.len() > 3 && normalized.ends_with('s') && !normalized.ends_with("ss") {
        normalized.pop();
    }

    normalized
}

// =============================================================================
// Groups
// =============================================================================

/// An inventory item annotated with its parsed base name and variant.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GroupedItem {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub base_name: String,
    pub variant: Option<String>,
}

/// A group of variants sharing a normalized base name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemGroup {
    /// Original-case base name of the first item seen (for display).
    pub base_name: String,
    pub normalized_name: String,
    pub variants: Vec<GroupedItem>,
}

impl ItemGroup {
    /// A group is only interesting when it holds multiple variants.
    pub fn is_grouped(&self) -> bool {
        self.variants.len() > 1
    }
}

/// Aggregate statistics for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GroupStats {
    pub total_quantity: i64,
    pub variant_count: usize,
    pub min_price_cents: i64,
    pub max_price_cents: i64,
}

/// Groups inventory items by normalized base name.
///
/// Returns a map keyed by group key; BTreeMap keeps iteration order
/// deterministic for display and tests.
pub fn group_items(items: &[InventoryItem]) -> BTreeMap<String, ItemGroup> {
    let mut groups: BTreeMap<String, ItemGroup> = BTreeMap::new();

    for item in items {
        let (base_name, variant) = split_variant(&item.item_name);
        let key = normalize_base_name(&base_name);

        let group = groups.entry(key.clone()).or_insert_with(|| ItemGroup {
            base_name: base_name.clone(),
            normalized_name: key,
            variants: Vec::new(),
        });

        group.variants.push(GroupedItem {
            item: item.clone(),
            base_name,
            variant,
        });
    }

    groups
}

/// Computes stats over a group's variants.
pub fn group_stats(group: &ItemGroup) -> GroupStats {
    if group.variants.is_empty() {
        return GroupStats {
            total_quantity: 0,
            variant_count: 0,
            min_price_cents: 0,
            max_price_cents: 0,
        };
    }

    let total_quantity = group.variants.iter().map(|v| v.item.quantity).sum();
    let min_price_cents = group
        .variants
        .iter()
        .map(|v| v.item.price_cents)
        .min()
        .unwrap_or(0);
    let max_price_cents = group
        .variants
        .iter()
        .map(|v| v.item.price_cents)
        .max()
        .unwrap_or(0);

    GroupStats {
        total_quantity,
        variant_count: group.variants.len(),
        min_price_cents,
        max_price_cents,
    }
}

/// Filters groups to those with at least one variant matching the
/// query (name, base name, variant, or material details).
pub fn search_groups(
    groups: &BTreeMap<String, ItemGroup>,
    query: &str,
) -> BTreeMap<String, ItemGroup> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return groups.clone();
    }

    let mut matching = BTreeMap::new();

    for (key, group) in groups {
        let variants: Vec<GroupedItem> = group
            .variants
            .iter()
            .filter(|v| {
                v.item.item_name.to_lowercase().contains(&query)
                    || v.base_name.to_lowercase().contains(&query)
                    || v.variant
                        .as_deref()
                        .is_some_and(|var| var.to_lowercase().contains(&query))
                    || v.item.material_details.to_lowercase().contains(&query)
            })
            .cloned()
            .collect();

        if !variants.is_empty() {
            matching.insert(
                key.clone(),
                ItemGroup {
                    base_name: group.base_name.clone(),
                    normalized_name: group.normalized_name.clone(),
                    variants,
                },
            );
        }
    }

    matching
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewInventoryItem;

    fn item(name: &str, quantity: i64, price_cents: i64) -> InventoryItem {
        InventoryItem::create(NewInventoryItem {
            item_name: name.to_string(),
            material_details: String::new(),
            quantity,
            price_cents,
            qr_code: None,
            image: None,
        })
    }

    #[test]
    fn test_split_variant() {
        assert_eq!(
            split_variant("Coke (350ml)"),
            ("Coke".to_string(), Some("350ml".to_string()))
        );
        assert_eq!(split_variant("Hammer"), ("Hammer".to_string(), None));
        assert_eq!(
            split_variant("  Nails (2 inch)  "),
            ("Nails".to_string(), Some("2 inch".to_string()))
        );
        // Empty parens are not a variant
        assert_eq!(split_variant("Odd ()"), ("Odd ()".to_string(), None));
    }

    #[test]
    fn test_normalize_base_name() {
        assert_eq!(normalize_base_name("Hammers"), "hammer");
        assert_eq!(normalize_base_name("Nails"), "nail");
        assert_eq!(normalize_base_name("Coke"), "coke");
        // Short words and double-s words keep their 's'
        assert_eq!(normalize_base_name("Gas"), "gas");
        assert_eq!(normalize_base_name("Glass"), "glass");
    }

    #[test]
    fn test_group_items_merges_variants_and_plurals() {
        let items = vec![
            item("Coke (350ml)", 10, 450),
            item("Coke (500ml)", 5, 700),
            item("Hammer", 3, 2500),
            item("Hammers (Claw)", 2, 3000),
        ];

        let groups = group_items(&items);
        assert_eq!(groups.len(), 2);

        let coke = &groups["coke"];
        assert_eq!(coke.variants.len(), 2);
        assert!(coke.is_grouped());

        let hammer = &groups["hammer"];
        assert_eq!(hammer.variants.len(), 2);
        assert_eq!(hammer.variants[1].variant.as_deref(), Some("Claw"));
    }

    #[test]
    fn test_group_stats() {
        let items = vec![item("Coke (350ml)", 10, 450), item("Coke (500ml)", 5, 700)];
        let groups = group_items(&items);
        let stats = group_stats(&groups["coke"]);

        assert_eq!(
            stats,
            GroupStats {
                total_quantity: 15,
                variant_count: 2,
                min_price_cents: 450,
                max_price_cents: 700,
            }
        );
    }

    #[test]
    fn test_search_groups() {
        let items = vec![
            item("Coke (350ml)", 10, 450),
            item("Coke (500ml)", 5, 700),
            item("Hammer", 3, 2500),
        ];
        let groups = group_items(&items);

        let hits = search_groups(&groups, "500");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits["coke"].variants.len(), 1);

        let all = search_groups(&groups, "");
        assert_eq!(all.len(), 2);
    }
}
