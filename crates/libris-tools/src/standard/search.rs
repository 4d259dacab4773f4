use crate::catalog::Catalog;
use libris_core::{
    ArgValue, Capability, CapabilitySchema, ExecutionResult, ParamSpec, StandardCapability,
};
use std::sync::Arc;

/// `search_books(term)`: substring match over title, author, and genre.
pub struct SearchBooksCapability {
    catalog: Arc<dyn Catalog>,
}

impl SearchBooksCapability {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }
}

impl Capability for SearchBooksCapability {
    fn name(&self) -> &str {
        StandardCapability::SearchBooks.name()
    }

    fn description(&self) -> &str {
        StandardCapability::SearchBooks.description()
    }

    fn schema(&self) -> CapabilitySchema {
        CapabilitySchema::new(vec![ParamSpec::text("term")])
    }

    fn invoke(&self, args: &[ArgValue]) -> ExecutionResult {
        let term = args[0].as_text();
        let matches = self.catalog.search(&term);
        if matches.is_empty() {
            return ExecutionResult::success(format!("No books found for term: {term}"));
        }

        let mut lines = vec![format!("Found {} book(s):", matches.len())];
        lines.extend(matches.iter().map(|r| r.render()));
        ExecutionResult::success(lines.join("\n"))
    }
}
