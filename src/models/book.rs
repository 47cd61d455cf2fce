use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a book that reviews can reference
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::books)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct Book {
    /// Unique identifier for the book (UUID v4 as string)
    id: String,

    /// The ID of the user who added this book, if any
    owner_id: Option<String>,

    /// The title of the book
    title: String,

    /// The author of the book
    author: String,

    /// The year of first publication, if known
    year: Option<i32>,

    /// The page count, if known
    pages: Option<i32>,

    /// Whether this book is part of the validated (publicly visible) set
    validated: bool,

    /// When this book was created
    created_at: NaiveDateTime,

    /// When this book was last updated
    updated_at: NaiveDateTime,
}

impl Book {
    /// Creates a new book
    ///
    /// ### Arguments
    ///
    /// * `title` - The title of the book
    /// * `author` - The author of the book
    /// * `year` - The year of first publication, if known
    /// * `pages` - The page count, if known
    /// * `owner_id` - The ID of the user adding the book, if any
    ///
    /// ### Returns
    ///
    /// A new `Book` instance with a fresh UUID and timestamps
    pub fn new(
        title: String,
        author: String,
        year: Option<i32>,
        pages: Option<i32>,
        owner_id: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            title,
            author,
            year,
            pages,
            validated: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gets the book's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the user who added this book, if any
    pub fn get_owner_id(&self) -> Option<String> {
        self.owner_id.clone()
    }

    /// Sets the owner of this book
    pub fn set_owner_id(&mut self, owner_id: Option<String>) {
        self.owner_id = owner_id;
    }

    /// Gets the book's title
    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    /// Sets the book's title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    /// Gets the book's author
    pub fn get_author(&self) -> String {
        self.author.clone()
    }

    /// Sets the book's author
    pub fn set_author(&mut self, author: String) {
        self.author = author;
    }

    /// Gets the year of first publication, if known
    pub fn get_year(&self) -> Option<i32> {
        self.year
    }

    /// Sets the year of first publication
    pub fn set_year(&mut self, year: Option<i32>) {
        self.year = year;
    }

    /// Gets the page count, if known
    pub fn get_pages(&self) -> Option<i32> {
        self.pages
    }

    /// Sets the page count
    pub fn set_pages(&mut self, pages: Option<i32>) {
        self.pages = pages;
    }

    /// Gets whether this book is part of the validated set
    pub fn get_validated(&self) -> bool {
        self.validated
    }

    /// Sets whether this book is part of the validated set
    pub fn set_validated(&mut self, validated: bool) {
        self.validated = validated;
    }

    /// Gets the book's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the book's last update timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }

    /// Refreshes the last update timestamp to now
    pub fn refresh_updated_at(&mut self) {
        self.updated_at = Utc::now().naive_utc();
    }

    /// Builds the display label used by media suggestions
    ///
    /// Books are labelled `"Title (Author, Year)"`, with the year omitted
    /// when it is unknown.
    pub fn label(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({}, {})", self.title, self.author, year),
            None => format!("{} ({})", self.title, self.author),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_new() {
        let book = Book::new(
            "Anna Karenina".to_string(),
            "L. Tolstoy".to_string(),
            Some(1878),
            None,
            Some("user-1".to_string()),
        );

        assert_eq!(book.get_title(), "Anna Karenina");
        assert_eq!(book.get_author(), "L. Tolstoy");
        assert_eq!(book.get_year(), Some(1878));
        assert_eq!(book.get_pages(), None);
        assert_eq!(book.get_owner_id(), Some("user-1".to_string()));
        assert!(!book.get_validated());
        assert!(Uuid::parse_str(&book.get_id()).is_ok());

        // Ensure created_at is within the last second
        let now = Utc::now();
        let diff = now.signed_duration_since(book.get_created_at());
        assert!(diff.num_seconds() < 1);
    }

    #[test]
    fn test_book_label_with_year() {
        let book = Book::new(
            "Charade".to_string(),
            "Nobody".to_string(),
            Some(1963),
            None,
            None,
        );

        assert_eq!(book.label(), "Charade (Nobody, 1963)");
    }

    #[test]
    fn test_book_label_without_year() {
        let book = Book::new(
            "Epic of Gilgamesh".to_string(),
            "Unknown".to_string(),
            None,
            None,
            None,
        );

        assert_eq!(book.label(), "Epic of Gilgamesh (Unknown)");
    }
}
