use anyhow::Result;
use std::path::PathBuf;
use tantivy::{Index, TantivyDocument, Term};
use tracing::{debug, warn};

use poibot_core::mapper::field_text;
use poibot_core::RawRecord;

use crate::tantivy_utils::{build_schema, facet_path, register_tokenizer, FACETS_FIELD, KEY_FIELD, RECORD_FIELD, TEXT_FIELD};

/// Builds a fresh POI index from raw records.
pub struct PoiIndexer {
	index: Index,
	key_source: String,
	facet_fields: Vec<String>,
	key_field: tantivy::schema::Field,
	text_field: tantivy::schema::Field,
	facets_field: tantivy::schema::Field,
	record_field: tantivy::schema::Field,
}

impl PoiIndexer {
	/// Replaces whatever is in `index_dir`. `key_source` names the record
	/// field holding the stable id; `facet_fields` are the refiner fields.
	pub fn new(index_dir: PathBuf, key_source: &str, facet_fields: &[String]) -> Result<Self> {
		let schema = build_schema();
		if index_dir.exists() { std::fs::remove_dir_all(&index_dir)?; }
		std::fs::create_dir_all(&index_dir)?;
		let index = Index::create_in_dir(&index_dir, schema)?;
		Self::with_index(index, key_source, facet_fields)
	}

	/// In-RAM index, for tests and throwaway sessions.
	pub fn in_memory(key_source: &str, facet_fields: &[String]) -> Result<Self> {
		Self::with_index(Index::create_in_ram(build_schema()), key_source, facet_fields)
	}

	fn with_index(index: Index, key_source: &str, facet_fields: &[String]) -> Result<Self> {
		register_tokenizer(&index);
		let schema = index.schema();
		let key_field = schema.get_field(KEY_FIELD)?;
		let text_field = schema.get_field(TEXT_FIELD)?;
		let facets_field = schema.get_field(FACETS_FIELD)?;
		let record_field = schema.get_field(RECORD_FIELD)?;
		Ok(Self { index, key_source: key_source.to_string(), facet_fields: facet_fields.to_vec(), key_field, text_field, facets_field, record_field })
	}

	pub fn index(&self) -> &Index { &self.index }

	/// Returns the number of records written. Records without a key are
	/// skipped; a record whose key is already indexed replaces the old one.
	pub fn index_records(&self, records: &[RawRecord]) -> Result<usize> {
		let mut index_writer = self.index.writer(50_000_000)?;
		let mut count = 0;
		for record in records {
			let key = field_text(record, &self.key_source);
			if key.is_empty() { warn!(key_field = %self.key_source, "record without key, not indexed"); continue; }
			index_writer.delete_term(Term::from_field_text(self.key_field, &key));
			let mut doc = TantivyDocument::default();
			doc.add_text(self.key_field, &key);
			doc.add_text(self.text_field, searchable_text(record));
			for field in &self.facet_fields {
				let value = field_text(record, field);
				if !value.is_empty() { doc.add_facet(self.facets_field, facet_path(field, &value)); }
			}
			doc.add_text(self.record_field, serde_json::to_string(record)?);
			index_writer.add_document(doc)?;
			count += 1;
		}
		index_writer.commit()?;
		debug!(count, "indexed POI records");
		Ok(count)
	}
}

/// All scalar values of the record, space separated.
fn searchable_text(record: &RawRecord) -> String {
	let parts: Vec<String> = record.keys().map(|k| field_text(record, k)).filter(|s| !s.is_empty()).collect();
	parts.join(" ")
}
