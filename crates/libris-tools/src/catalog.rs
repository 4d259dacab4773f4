//! Catalog and policy collaborator
//!
//! The built-in capabilities never touch storage directly; they go through
//! the [`Catalog`] trait so tests and demos run against the seeded in-memory
//! catalog while a deployment can plug in a real backend.

/// One book record in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub available: bool,
}

impl CatalogRecord {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            available: true,
        }
    }

    /// Render the record the way capability outputs list books.
    pub fn render(&self) -> String {
        let status = if self.available {
            "available"
        } else {
            "not available"
        };
        format!(
            "- {} by {} ({}) [{}]",
            self.title, self.author, self.genre, status
        )
    }
}

/// Read access to the library catalog and its policy text.
pub trait Catalog: Send + Sync {
    /// Case-insensitive substring search over title, author, and genre.
    fn search(&self, term: &str) -> Vec<CatalogRecord>;

    /// Exact case-insensitive title lookup.
    fn find_title(&self, title: &str) -> Option<CatalogRecord>;

    /// Keyword-routed canned policy answer.
    fn lookup_policy(&self, query: &str) -> String;
}

/// In-memory catalog seeded with a handful of classics.
pub struct InMemoryCatalog {
    records: Vec<CatalogRecord>,
}

impl InMemoryCatalog {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    /// The default seeded catalog used by demos and tests.
    pub fn seeded() -> Self {
        Self::new(vec![
            CatalogRecord::new("Don Quijote de la Mancha", "Miguel de Cervantes", "Fiction"),
            CatalogRecord::new("Cien años de soledad", "Gabriel García Márquez", "Fiction"),
            CatalogRecord::new("A Brief History of Time", "Stephen Hawking", "Science"),
            CatalogRecord::new("Clean Code", "Robert C. Martin", "Programming"),
            CatalogRecord::new("Veinte poemas de amor", "Pablo Neruda", "Poetry"),
        ])
    }
}

impl Catalog for InMemoryCatalog {
    fn search(&self, term: &str) -> Vec<CatalogRecord> {
        let needle = term.to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.author.to_lowercase().contains(&needle)
                    || r.genre.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    fn find_title(&self, title: &str) -> Option<CatalogRecord> {
        self.records
            .iter()
            .find(|r| r.title.eq_ignore_ascii_case(title))
            .cloned()
    }

    fn lookup_policy(&self, query: &str) -> String {
        let query = query.to_lowercase();
        if query.contains("day") || query.contains("period") || query.contains("dia") {
            "Per library policy: loans run for 14 calendar days and may be renewed.".to_string()
        } else if query.contains("fee")
            || query.contains("fine")
            || query.contains("late")
            || query.contains("overdue")
            || query.contains("multa")
        {
            "Per library policy: late fees accrue at $500 per day overdue.".to_string()
        } else if query.contains("renew") || query.contains("renov") {
            "Per library policy: a loan may be renewed up to 2 times when no reservation is pending."
                .to_string()
        } else {
            "Library policies cover: 14-day loans, renewals, and late fees per day overdue."
                .to_string()
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}
