use std::collections::{BTreeMap, HashMap};

use crate::models::{ItemRating, RatedItem};

/// Ranks items by mean rating, best first; ties go to the smaller item id
pub fn top_rated(
    ratings: &[ItemRating],
    item_names: &HashMap<String, String>,
    limit: usize,
) -> Vec<RatedItem> {
    let mut totals: BTreeMap<&str, (i64, usize)> = BTreeMap::new();
    for rating in ratings {
        let entry = totals.entry(rating.item_id.as_str()).or_insert((0, 0));
        entry.0 += rating.rating;
        entry.1 += 1;
    }

    let mut ranked: Vec<RatedItem> = totals
        .into_iter()
        .map(|(item_id, (sum, count))| RatedItem {
            item_id: item_id.to_string(),
            name: display_name(item_names, item_id),
            average_rating: sum as f64 / count as f64,
            rating_count: count,
        })
        .collect();

    // stable sort keeps the BTreeMap's id order among equal means
    ranked.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    ranked.truncate(limit);
    ranked
}

/// Display name for an item, falling back to its id
pub fn display_name(item_names: &HashMap<String, String>, item_id: &str) -> String {
    item_names
        .get(item_id)
        .cloned()
        .unwrap_or_else(|| item_id.to_string())
}
