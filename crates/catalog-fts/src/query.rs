//! Query building utilities.
//!
//! [`QueryBuilder`] turns free text into a match query over the `name`
//! field: the text goes through the same analyzer as indexed names, and each
//! distinct resulting term becomes an optional clause. A document matches if
//! it contains any term; BM25 ranks documents that contain more (and rarer)
//! terms higher.

use tantivy::Term;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::tokenizer::TextAnalyzer;

use crate::schema::analyze;

/// Builder for match queries over a single text field.
#[derive(Clone)]
pub struct QueryBuilder {
    field: Field,
    analyzer: TextAnalyzer,
}

impl QueryBuilder {
    /// Create a builder for `field`, analyzing query text with `analyzer`.
    pub fn new(field: Field, analyzer: TextAnalyzer) -> Self {
        Self { field, analyzer }
    }

    /// Build a query from the search string.
    ///
    /// Returns `None` when the text yields no terms (empty, punctuation or
    /// stopwords only); such a query matches nothing.
    pub fn build(&self, text: &str) -> Option<Box<dyn Query>> {
        let mut analyzer = self.analyzer.clone();
        let mut terms = analyze(&mut analyzer, text);
        terms.sort();
        terms.dedup();

        if terms.is_empty() {
            return None;
        }

        let clauses: Vec<(Occur, Box<dyn Query>)> = terms
            .iter()
            .map(|term| {
                let query: Box<dyn Query> = Box::new(TermQuery::new(
                    Term::from_field_text(self.field, term),
                    IndexRecordOption::WithFreqs,
                ));
                (Occur::Should, query)
            })
            .collect();

        Some(Box::new(BooleanQuery::new(clauses)))
    }
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("field", &self.field)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
