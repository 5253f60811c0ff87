use async_trait::async_trait;
use std::path::Path;
use tantivy::collector::{Count, FacetCollector, TopDocs};
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query as TantivyQuery, QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{Index, IndexReader, Searcher, TantivyDocument, Term};
use tracing::{debug, warn};

use poibot_core::traits::SearchProvider;
use poibot_core::{Error, FacetValues, Query, RawPage, RawRecord, Result};

use crate::tantivy_utils::{facet_path, facet_root, register_tokenizer, FACETS_FIELD, RECORD_FIELD, TEXT_FIELD};

/// Queries a POI index built by [`PoiIndexer`](crate::PoiIndexer).
pub struct PoiSearchEngine {
	index: Index,
	reader: IndexReader,
	text_field: Field,
	facets_field: Field,
	record_field: Field,
	facet_fields: Vec<String>,
	page_size: usize,
}

impl PoiSearchEngine {
	pub fn open(index_dir: &Path, facet_fields: &[String], page_size: usize) -> anyhow::Result<Self> {
		let index = Index::open_in_dir(index_dir)?;
		Self::from_index(index, facet_fields, page_size)
	}

	pub fn from_index(index: Index, facet_fields: &[String], page_size: usize) -> anyhow::Result<Self> {
		register_tokenizer(&index);
		let reader = index.reader()?;
		let schema = index.schema();
		let text_field = schema.get_field(TEXT_FIELD)?;
		let facets_field = schema.get_field(FACETS_FIELD)?;
		let record_field = schema.get_field(RECORD_FIELD)?;
		Ok(Self { index, reader, text_field, facets_field, record_field, facet_fields: facet_fields.to_vec(), page_size: page_size.max(1) })
	}

	pub fn num_docs(&self) -> u64 { self.reader.searcher().num_docs() }

	fn build_query(&self, query: &Query) -> Box<dyn TantivyQuery> {
		let text_query: Box<dyn TantivyQuery> = if query.text.trim().is_empty() {
			Box::new(AllQuery)
		} else {
			// Free text: unparsable syntax is dropped, never reported.
			let qp = QueryParser::for_index(&self.index, vec![self.text_field]);
			let (parsed, errors) = qp.parse_query_lenient(&query.text);
			if !errors.is_empty() {
				debug!(text = %query.text, ?errors, "query syntax ignored");
			}
			parsed
		};
		if query.refinements.is_empty() { return text_query; }
		let mut clauses: Vec<(Occur, Box<dyn TantivyQuery>)> = vec![(Occur::Must, text_query)];
		for r in &query.refinements {
			let term = Term::from_facet(self.facets_field, &facet_path(&r.field, &r.value));
			clauses.push((Occur::Must, Box::new(TermQuery::new(term, IndexRecordOption::Basic))));
		}
		Box::new(BooleanQuery::new(clauses))
	}
}

/// Runs on a blocking thread: segment reads and stored-document loads are
/// synchronous.
fn collect_page(searcher: &Searcher, query: &dyn TantivyQuery, request: &Query, page_size: usize, facet_fields: &[String], record_field: Field) -> Result<RawPage> {
	let offset = request.page * page_size;
	let top = TopDocs::with_limit(page_size).and_offset(offset);
	let mut facet_collector = FacetCollector::for_field(FACETS_FIELD);
	for field in facet_fields { facet_collector.add_facet(facet_root(field)); }
	let (top_docs, total, facet_counts) = searcher
		.search(query, &(top, Count, facet_collector))
		.map_err(unavailable)?;

	let mut records = Vec::with_capacity(top_docs.len());
	for (_score, addr) in &top_docs {
		let doc: TantivyDocument = searcher.doc(*addr).map_err(unavailable)?;
		let Some(json) = doc.get_first(record_field).and_then(|v| v.as_str()) else { warn!("indexed document has no stored record"); continue; };
		match serde_json::from_str::<RawRecord>(json) {
			Ok(record) => records.push(record),
			Err(e) => warn!(error = %e, "stored record is not a JSON object"),
		}
	}

	let mut facets = Vec::new();
	for field in facet_fields {
		let mut counts: Vec<(String, u64)> = facet_counts
			.get(facet_root(field))
			.filter_map(|(facet, count)| facet.to_path().last().map(|v| (v.to_string(), count)))
			.collect();
		if counts.is_empty() { continue; }
		counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
		facets.push(FacetValues { field: field.clone(), values: counts.into_iter().map(|(v, _)| v).collect() });
	}

	let has_more = offset + top_docs.len() < total;
	debug!(text = %request.text, page = request.page, total, returned = records.len(), "local search");
	Ok(RawPage { records, facets, has_more })
}

#[async_trait]
impl SearchProvider for PoiSearchEngine {
	async fn search(&self, query: &Query) -> Result<RawPage> {
		let tantivy_query = self.build_query(query);
		let searcher = self.reader.searcher();
		let request = query.clone();
		let facet_fields = self.facet_fields.clone();
		let (page_size, record_field) = (self.page_size, self.record_field);
		tokio::task::spawn_blocking(move || collect_page(&searcher, tantivy_query.as_ref(), &request, page_size, &facet_fields, record_field))
			.await
			.map_err(|e| Error::SearchUnavailable(format!("search task failed: {e}")))?
	}
}

fn unavailable(e: tantivy::TantivyError) -> Error { Error::SearchUnavailable(e.to_string()) }
