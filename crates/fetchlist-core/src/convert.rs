// ── API-to-domain type conversions ──
//
// Bridges raw `fetchlist_api` response types into `fetchlist_core::model`.
// The wire type is already strictly decoded, so conversion is a plain
// field move; name validation happens later in the pipeline.

use fetchlist_api::ItemResponse;

use crate::model::Item;

impl From<ItemResponse> for Item {
    fn from(raw: ItemResponse) -> Self {
        Item {
            id: raw.id,
            list_id: raw.list_id,
            name: raw.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_blank_names_for_the_pipeline_to_judge() {
        let item = Item::from(ItemResponse {
            id: 7,
            list_id: 3,
            name: Some("  ".into()),
        });
        assert_eq!(item, Item::new(7, 3, Some("  ".into())));
    }
}
