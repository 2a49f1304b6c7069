//! Tantivy implementation of [`SearchBackend`].

use std::path::Path;

use geo::{Distance, Haversine, Point};
use locus::{BackendError, CandidateRecord, FulltextQuery, FulltextResults, Proximity, SearchBackend};
use tantivy::{
    Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term,
    collector::{Count, TopDocs},
    query::{BooleanQuery, BoostQuery, ConstScoreQuery, FuzzyTermQuery, Occur, Query, TermQuery, TermSetQuery},
    schema::{IndexRecordOption, Value},
    tokenizer::TokenStream,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    error::{IndexError, Result},
    schema::{GazetteerFields, register_tokenizer},
};

/// Writer memory budget; one thread is plenty for gazetteer-sized batches.
const WRITER_MEMORY_BYTES: usize = 50_000_000;
/// Weight of a fuzzy term match relative to an exact one in the same field.
const FUZZY_BOOST_FACTOR: f32 = 0.5;
/// With a proximity filter, fetch this many times the limit before filtering by distance.
const PROXIMITY_OVERFETCH: usize = 10;

/// An embedded full-text gazetteer.
///
/// Each record is indexed by name (boost 3), alternate names (boost 2) and the
/// localities, administrative names and zip codes it belongs to (boost 1). Place type
/// and country code are exact-match filters. The whole record is stored as JSON and
/// returned with the BM25 score of the match.
#[derive(Clone)]
pub struct TantivyBackend {
    index: Index,
    reader: IndexReader,
    fields: GazetteerFields,
}

impl TantivyBackend {
    /// An empty index held in memory.
    pub fn create_in_ram() -> Result<Self> {
        Self::from_index(Index::create_in_ram(GazetteerFields::schema()))
    }

    /// An in-memory index holding `records`.
    pub fn from_records(records: impl IntoIterator<Item = CandidateRecord>) -> Result<Self> {
        let backend = Self::create_in_ram()?;
        backend.index_records(records)?;
        Ok(backend)
    }

    /// Open the index in `path`, or create an empty one when there is none. With
    /// `overwrite` any existing index is removed first.
    #[instrument(name = "Open gazetteer index", level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn open_or_create_in_dir(path: impl AsRef<Path>, overwrite: bool) -> Result<Self> {
        let path = path.as_ref();
        if overwrite && path.exists() {
            info!("Overwriting existing index directory");
            std::fs::remove_dir_all(path)?;
        }
        std::fs::create_dir_all(path)?;

        if path.join("meta.json").exists() {
            info!("Loading existing index");
            return Self::open_in_dir(path);
        }
        info!("Creating new index");
        Self::from_index(Index::create_in_dir(path, GazetteerFields::schema())?)
    }

    /// Open an existing index directory.
    pub fn open_in_dir(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_index(Index::open_in_dir(path)?)
    }

    fn from_index(index: Index) -> Result<Self> {
        register_tokenizer(&index);
        let fields = GazetteerFields::from_schema(&index.schema())?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(Self {
            index,
            reader,
            fields,
        })
    }

    /// Add `records` and commit. Returns the number of records added.
    ///
    /// Nothing is committed when a record is invalid: it must have a name and
    /// coordinates within WGS84 bounds.
    #[instrument(name = "Index records", level = "info", skip_all)]
    pub fn index_records(&self, records: impl IntoIterator<Item = CandidateRecord>) -> Result<usize> {
        let mut writer: IndexWriter = self.index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
        let mut added = 0;
        for record in records {
            if let Err(e) = validate(&record) {
                writer.rollback()?;
                return Err(e);
            }
            writer.add_document(self.fields.document(&record)?)?;
            added += 1;
        }
        writer.commit()?;
        self.reader.reload()?;
        info!(added, total = self.num_docs(), "Index commit complete");
        Ok(added)
    }

    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Query terms as the index tokenizes them.
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut analyzer = self.index.tokenizer_for_field(self.fields.name)?;
        let mut tokens = Vec::new();
        analyzer
            .token_stream(text)
            .process(&mut |token| tokens.push(token.text.clone()));
        Ok(tokens)
    }

    /// One `Should` group per token across the weighted fields, joined with `Must`
    /// when every word is required, plus non-scoring type and country filters.
    #[instrument(name = "Build query", level = "trace", skip_all)]
    fn build_query(&self, query: &FulltextQuery, tokens: &[String]) -> BooleanQuery {
        let word_occur = if query.all_words_required {
            Occur::Must
        } else {
            Occur::Should
        };

        let words: Vec<(Occur, Box<dyn Query>)> = tokens
            .iter()
            .map(|token| {
                let mut alternatives: Vec<(Occur, Box<dyn Query>)> = Vec::new();
                for (field, boost) in self.fields.weighted_text_fields() {
                    let term = Term::from_field_text(field, token);
                    let exact = TermQuery::new(term.clone(), IndexRecordOption::WithFreqs);
                    alternatives.push((Occur::Should, Box::new(BoostQuery::new(Box::new(exact), boost))));
                    if query.fuzzy && token.chars().count() > 2 {
                        let fuzzy = FuzzyTermQuery::new(term, 1, true);
                        alternatives.push((
                            Occur::Should,
                            Box::new(BoostQuery::new(Box::new(fuzzy), boost * FUZZY_BOOST_FACTOR)),
                        ));
                    }
                }
                (word_occur, Box::new(BooleanQuery::new(alternatives)) as Box<dyn Query>)
            })
            .collect();

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, Box::new(BooleanQuery::new(words)))];
        if !query.place_types.is_empty() {
            let terms = query
                .place_types
                .iter()
                .map(|place_type| Term::from_field_text(self.fields.place_type, place_type.as_str()));
            clauses.push((Occur::Must, filter(TermSetQuery::new(terms))));
        }
        if let Some(code) = &query.country_code {
            let term = Term::from_field_text(self.fields.country_code, &code.to_ascii_uppercase());
            clauses.push((Occur::Must, filter(TermQuery::new(term, IndexRecordOption::Basic))));
        }
        let query = BooleanQuery::new(clauses);
        trace!(?query, "Query constructed");
        query
    }

    fn search(&self, query: &FulltextQuery) -> Result<FulltextResults> {
        let tokens = self.tokenize(&query.text)?;
        if tokens.is_empty() || query.limit == 0 {
            return Ok(FulltextResults::default());
        }
        let tantivy_query = self.build_query(query, &tokens);

        let fetch = match query.proximity {
            Some(_) => query.limit.saturating_mul(PROXIMITY_OVERFETCH),
            None => query.limit,
        };
        let searcher = self.reader.searcher();
        let (top_docs, count) = searcher.search(&tantivy_query, &(TopDocs::with_limit(fetch), Count))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc = searcher.doc::<TantivyDocument>(address)?;
            let payload = doc
                .get_first(self.fields.payload)
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("Document {address:?} has no payload"))?;
            let record: CandidateRecord = serde_json::from_str(payload)?;
            results.push(record.with_score(score));
        }

        let num_found = match query.proximity {
            Some(proximity) => {
                results.retain(|record| within(proximity, record));
                results.len()
            }
            None => count,
        };
        results.truncate(query.limit);
        Ok(FulltextResults { results, num_found })
    }
}

impl SearchBackend for TantivyBackend {
    #[instrument(name = "Tantivy search", level = "debug", skip_all, fields(text = %query.text, limit = query.limit, fuzzy = query.fuzzy))]
    fn execute_query(&self, query: &FulltextQuery) -> std::result::Result<FulltextResults, BackendError> {
        let t_search = std::time::Instant::now();
        let results = self.search(query).inspect_err(|e| warn!(error = %e, "Index search failed"))?;
        debug!(
            num_found = results.num_found,
            returned = results.results.len(),
            search_execution_seconds = t_search.elapsed().as_secs_f32(),
            "Tantivy search execution complete"
        );
        Ok(results)
    }
}

fn filter(query: impl Query + 'static) -> Box<dyn Query> {
    Box::new(ConstScoreQuery::new(Box::new(query), 0.0))
}

fn within(proximity: Proximity, record: &CandidateRecord) -> bool {
    let centre = Point::new(proximity.longitude, proximity.latitude);
    Haversine.distance(centre, record.location()) <= proximity.radius_km * 1000.0
}

fn validate(record: &CandidateRecord) -> Result<()> {
    let reason = if record.name.trim().is_empty() {
        Some("name is empty")
    } else if !(-90.0..=90.0).contains(&record.latitude) {
        Some("latitude out of range")
    } else if !(-180.0..=180.0).contains(&record.longitude) {
        Some("longitude out of range")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(IndexError::InvalidRecord {
            name: record.name.clone(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
