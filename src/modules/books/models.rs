use serde::{Deserialize, Serialize};

use super::validation::{self, FieldViolation, Validator};

/// Identifier of a book, assigned by the catalog
pub type BookId = u64;

/// A book held by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub description: String,
    /// Rating between 1 and 5
    pub rating: u8,
    /// Publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<u16>,
}

/// Validated book fields that do not have an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub rating: u8,
    pub published_date: Option<u16>,
}

impl NewBook {
    pub fn with_id(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            rating: self.rating,
            published_date: self.published_date,
        }
    }
}

/// Request payload for creating or updating a book.
///
/// Numeric fields are wide on purpose so out-of-range values reach
/// validation instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    /// Ignored on create, identifies the target book on update
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub description: String,
    pub rating: i64,
    #[serde(default)]
    pub published_date: Option<i64>,
}

impl BookRequest {
    /// Check every field constraint, reporting all failures at once.
    pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        self.validator().finish()
    }

    fn validator(&self) -> Validator {
        let mut validator = Validator::new();
        validator
            .text_length("title", &self.title, validation::TEXT_LENGTH)
            .text_length("author", &self.author, validation::TEXT_LENGTH)
            .text_length("description", &self.description, validation::TEXT_LENGTH)
            .range("rating", self.rating, validation::RATING);
        if let Some(year) = self.published_date {
            validator.range("published_date", year, validation::PUBLISHED_YEAR);
        }
        validator
    }

    /// Validate and strip the id, as done on create.
    pub fn into_new_book(self) -> Result<NewBook, Vec<FieldViolation>> {
        self.validate()?;
        Ok(self.into_fields())
    }

    /// Validate and keep the id, which must be present and positive.
    pub fn into_book(self) -> Result<Book, Vec<FieldViolation>> {
        let mut validator = self.validator();
        let id = match self.id {
            Some(id) => validator.positive_id("id", id),
            None => {
                validator.required("id");
                None
            }
        };
        validator.finish()?;

        match id {
            Some(id) => Ok(self.into_fields().with_id(id)),
            None => Err(vec![FieldViolation::new("id", "field required")]),
        }
    }

    // Callers validate first, so the narrowing casts cannot truncate.
    fn into_fields(self) -> NewBook {
        NewBook {
            title: self.title,
            author: self.author,
            description: self.description,
            rating: self.rating as u8,
            published_date: self.published_date.map(|year| year as u16),
        }
    }
}

/// The five books every seeded catalog starts with.
pub fn sample_books() -> Vec<Book> {
    let sample = |id: BookId, author: &str, rating: u8, year: u16| Book {
        id,
        title: format!("title{}", id),
        author: author.to_string(),
        description: format!("description{}", id),
        rating,
        published_date: Some(year),
    };

    vec![
        sample(1, "author1", 5, 2030),
        sample(2, "author2", 4, 2030),
        sample(3, "author3", 5, 2029),
        sample(4, "author1", 2, 2028),
        sample(5, "author3", 3, 2027),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request() -> BookRequest {
        BookRequest {
            id: None,
            title: "Dune Messiah".to_string(),
            author: "Frank Herbert".to_string(),
            description: "Second book".to_string(),
            rating: 4,
            published_date: Some(1969),
        }
    }

    #[test]
    fn sample_books_have_sequential_ids() {
        let ids: Vec<BookId> = sample_books().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sample_books_pass_validation() {
        for book in sample_books() {
            let request = BookRequest {
                id: Some(book.id as i64),
                title: book.title.clone(),
                author: book.author.clone(),
                description: book.description.clone(),
                rating: book.rating.into(),
                published_date: book.published_date.map(i64::from),
            };
            assert_eq!(request.into_book(), Ok(book));
        }
    }

    #[test]
    fn rating_boundaries() {
        for rating in [1, 5] {
            let req = BookRequest { rating, ..request() };
            assert!(req.validate().is_ok(), "rating {} should be accepted", rating);
        }
        for rating in [0, 6, -1] {
            let req = BookRequest { rating, ..request() };
            let violations = req.validate().unwrap_err();
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, "rating");
        }
    }

    #[test]
    fn published_date_boundaries() {
        for year in [1900, 2031] {
            let req = BookRequest {
                published_date: Some(year),
                ..request()
            };
            assert!(req.validate().is_ok());
        }
        for year in [1899, 2032] {
            let req = BookRequest {
                published_date: Some(year),
                ..request()
            };
            assert_eq!(req.validate().unwrap_err()[0].field, "published_date");
        }
        let req = BookRequest {
            published_date: None,
            ..request()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn every_failing_field_is_reported() {
        let req = BookRequest {
            title: "ab".to_string(),
            author: "x".repeat(101),
            description: "ok!".to_string(),
            rating: 9,
            ..request()
        };
        let fields: Vec<&str> = req.validate().unwrap_err().iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["title", "author", "rating"]);
    }

    #[test]
    fn create_ignores_client_id() {
        let req = BookRequest {
            id: Some(42),
            ..request()
        };
        let new_book = req.into_new_book().unwrap();
        assert_eq!(new_book.with_id(7).id, 7);
    }

    #[test]
    fn update_requires_positive_id() {
        let missing = request().into_book().unwrap_err();
        assert_eq!(missing, vec![FieldViolation::new("id", "field required")]);

        let zero = BookRequest {
            id: Some(0),
            ..request()
        };
        assert_eq!(zero.into_book().unwrap_err()[0].field, "id");

        let ok = BookRequest {
            id: Some(3),
            ..request()
        };
        assert_eq!(ok.into_book().unwrap().id, 3);
    }

    #[test]
    fn book_omits_missing_published_date() {
        let book = Book {
            published_date: None,
            ..sample_books().remove(0)
        };
        let json = serde_json::to_value(&book).unwrap();
        assert!(json.get("published_date").is_none());
        assert_eq!(json["rating"], 5);
    }
}
