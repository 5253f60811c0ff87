use tantivy::schema::{Facet, Schema, TextFieldIndexing, TextOptions, IndexRecordOption, FacetOptions, STRING};
use tantivy::tokenizer::{TextAnalyzer, SimpleTokenizer, LowerCaser, AsciiFoldingFilter};
use tantivy::Index;

pub const KEY_FIELD: &str = "key";
pub const TEXT_FIELD: &str = "text";
pub const FACETS_FIELD: &str = "facets";
pub const RECORD_FIELD: &str = "record";
const TOKENIZER: &str = "poi_text";

/// `key` identifies the record (indexed only, for replacement on re-index), `text` holds every scalar value for
/// full-text search, `facets` holds `/<field>/<value>` paths and `record`
/// keeps the original JSON.
pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	schema_builder.add_text_field(KEY_FIELD, STRING);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	schema_builder.add_text_field(TEXT_FIELD, TextOptions::default().set_indexing_options(text_field_indexing));
	schema_builder.add_facet_field(FACETS_FIELD, FacetOptions::default());
	schema_builder.add_text_field(RECORD_FIELD, TextOptions::default().set_stored());
	schema_builder.build()
}

/// Lowercased and ASCII-folded: "paranaque" matches "Parañaque".
pub fn register_tokenizer(index: &Index) {
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(AsciiFoldingFilter)
		.build();
	index.tokenizers().register(TOKENIZER, tokenizer);
}

pub fn facet_path(field: &str, value: &str) -> Facet {
	Facet::from_path([field, value])
}

pub fn facet_root(field: &str) -> Facet {
	Facet::from_path([field])
}
