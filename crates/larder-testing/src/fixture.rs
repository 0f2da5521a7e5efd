//! Request-body fixtures.

use serde_json::{Value, json};

/// A 1x1 transparent PNG as a data URI.
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Registration body for `POST /api/users/`.
pub fn signup_payload(username: &str) -> Value {
    json!({
        "email": format!("{username}@example.com"),
        "username": username,
        "first_name": "Test",
        "last_name": "Cook",
        "password": "correct-horse-battery",
    })
}

/// Recipe body using `(ingredient_id, amount)` pairs and tag ids.
pub fn recipe_payload(name: &str, ingredients: &[(i32, i32)], tags: &[i32]) -> Value {
    json!({
        "ingredients": ingredients
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect::<Vec<_>>(),
        "tags": tags,
        "image": PNG_DATA_URI,
        "name": name,
        "text": "Mix everything and cook.",
        "cooking_time": 15,
    })
}
