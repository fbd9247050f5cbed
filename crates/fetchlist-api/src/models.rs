// Item endpoint response types
//
// The endpoint returns a bare JSON array of item objects. Decoding is
// strict: required fields must be present and correctly typed, nothing
// is coerced or defaulted. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// One item as it appears on the wire.
///
/// ```json
/// { "id": 755, "listId": 2, "name": "Item 755" }
/// ```
///
/// `name` may be missing, `null`, empty, or whitespace-only; deciding
/// whether such an item is displayable is not this crate's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i64,
    pub list_id: i64,
    #[serde(default)]
    pub name: Option<String>,
}
