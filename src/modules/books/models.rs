use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// A catalog record as stored in the `books` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Book {
    /// Identifier assigned by the store; never changes
    pub id: i64,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub description: Option<String>,
    /// Creation time, RFC 3339; never changes after insert
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
}

/// Client-supplied book fields for create and update.
///
/// `id` and `create_time` are owned by the store, so any such fields in a
/// request body are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl BookPayload {
    /// Field-level problems, empty when the payload is acceptable
    pub fn validate(&self) -> Vec<serde_json::Value> {
        let mut problems = Vec::new();

        if self.title.trim().is_empty() {
            problems.push(serde_json::json!({"field": "title", "error": "required"}));
        }
        if self.author.trim().is_empty() {
            problems.push(serde_json::json!({"field": "author", "error": "required"}));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            problems.push(serde_json::json!({"field": "price", "error": "must be a non-negative number"}));
        }

        problems
    }
}

/// Insert request for the store. `create_time` defaults to now.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub price: f64,
    pub description: Option<String>,
    pub create_time: Option<OffsetDateTime>,
}

impl From<BookPayload> for NewBook {
    fn from(payload: BookPayload) -> Self {
        Self {
            title: payload.title,
            author: payload.author,
            price: payload.price,
            description: payload.description,
            create_time: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str, author: &str, price: f64) -> BookPayload {
        BookPayload {
            title: title.to_string(),
            author: author.to_string(),
            price,
            description: None,
        }
    }

    #[test]
    fn valid_payload_has_no_problems() {
        assert!(payload("Dune", "Frank Herbert", 9.99).validate().is_empty());
        assert!(payload("Free", "Anon", 0.0).validate().is_empty());
    }

    #[test]
    fn blank_fields_and_bad_price_are_reported() {
        let problems = payload("  ", "", -1.0).validate();
        let fields: Vec<&str> = problems
            .iter()
            .map(|p| p["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["title", "author", "price"]);

        assert_eq!(payload("A", "B", f64::NAN).validate().len(), 1);
    }

    #[test]
    fn store_owned_fields_are_ignored_on_input() {
        let raw = r#"{"id": 42, "title": "A", "author": "B", "price": 10.0,
                      "create_time": "2020-01-01T00:00:00Z"}"#;
        let parsed: BookPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, payload("A", "B", 10.0));
    }

    #[test]
    fn create_time_serializes_as_rfc3339_text() {
        let book = Book {
            id: 1,
            title: "A".to_string(),
            author: "B".to_string(),
            price: 10.0,
            description: None,
            create_time: time::macros::datetime!(2024-03-01 12:30:00 UTC),
        };

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["create_time"], "2024-03-01T12:30:00Z");

        let back: Book = serde_json::from_value(value).unwrap();
        assert_eq!(back, book);
    }
}
