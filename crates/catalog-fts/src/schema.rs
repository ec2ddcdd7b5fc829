//! Tantivy schema for catalog items.
//!
//! # Schema Fields
//!
//! - `id`: Catalog identifier (U64, INDEXED | STORED | FAST). Indexed so a
//!   document can be deleted by term; stored so query hits resolve to ids.
//! - `name`: Item name (TEXT | STORED), analyzed with `standard`, with
//!   positions recorded.
//! - `category`: Item category (STORED only). Never matched against.
//!
//! # Tokenizer
//!
//! `standard` is SimpleTokenizer → RemoveLongFilter(40) → LowerCaser →
//! StopWordFilter(English). Splitting on non-alphanumerics keeps the
//! trailing sequence number of generated names as its own token.

use tantivy::Index;
use tantivy::schema::{
    FAST, Field, INDEXED, IndexRecordOption, STORED, Schema, SchemaBuilder, TextFieldIndexing,
    TextOptions,
};
use tantivy::tokenizer::{
    LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer,
};

use crate::stopwords::StopwordFilter;

/// Name under which the name analyzer is registered.
pub const NAME_TOKENIZER: &str = "standard";

/// Tokens longer than this many bytes are dropped.
const MAX_TOKEN_LEN: usize = 40;

/// Typed handles to the catalog schema's fields.
#[derive(Clone)]
pub struct ProductSchema {
    schema: Schema,

    /// Catalog identifier.
    pub id: Field,
    /// Item name, the only analyzed field.
    pub name: Field,
    /// Item category, stored only.
    pub category: Field,
}

impl ProductSchema {
    /// Build the schema.
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new();

        let name_options = TextOptions::default()
            .set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(NAME_TOKENIZER)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            )
            .set_stored();

        let id = builder.add_u64_field("id", INDEXED | STORED | FAST);
        let name = builder.add_text_field("name", name_options);
        let category = builder.add_text_field("category", STORED);

        Self {
            schema: builder.build(),
            id,
            name,
            category,
        }
    }

    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Register the `standard` analyzer with a Tantivy index.
    ///
    /// Must be called after creating an index, before any document is added.
    pub fn register_tokenizers(index: &Index, stopwords: &StopwordFilter) {
        index
            .tokenizers()
            .register(NAME_TOKENIZER, standard_analyzer(stopwords));
    }
}

impl std::fmt::Debug for ProductSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductSchema")
            .field("fields", &["id", "name", "category"])
            .finish()
    }
}

/// Build the analyzer applied to names and to query text.
pub fn standard_analyzer(stopwords: &StopwordFilter) -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(stopwords.words()))
        .build()
}

/// Run `text` through `analyzer`, returning the resulting terms in order.
pub fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut stream = analyzer.token_stream(text);
    stream.process(&mut |token| terms.push(token.text.clone()));
    terms
}

// ============================================================================
// Tests
// ============================================================================
