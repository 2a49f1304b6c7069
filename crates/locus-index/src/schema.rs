use locus::CandidateRecord;
use tantivy::{
    Index, TantivyDocument,
    schema::{Field, IndexRecordOption, STORED, STRING, Schema, SchemaBuilder, TextFieldIndexing, TextOptions},
    tokenizer::{AsciiFoldingFilter, LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer},
};

use crate::error::Result;

/// Tokenizer shared by the searchable text fields and query tokenization.
pub const TOKENIZER: &str = "locus";

/// Field handles of the gazetteer schema.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GazetteerFields {
    pub name: Field,
    pub alternate_names: Field,
    /// Locality, administrative and zip names the record belongs to
    pub context: Field,
    pub place_type: Field,
    pub country_code: Field,
    /// The whole record as JSON
    pub payload: Field,
}

impl GazetteerFields {
    pub(crate) fn schema() -> Schema {
        let mut schema_builder = SchemaBuilder::new();

        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer(TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let text_options = TextOptions::default().set_indexing_options(text_indexing);

        schema_builder.add_text_field("name", text_options.clone());
        schema_builder.add_text_field("alternatenames", text_options.clone());
        schema_builder.add_text_field("context", text_options);
        schema_builder.add_text_field("placetype", STRING);
        schema_builder.add_text_field("country_code", STRING);
        schema_builder.add_text_field("payload", STORED);
        schema_builder.build()
    }

    pub(crate) fn from_schema(schema: &Schema) -> Result<Self> {
        Ok(Self {
            name: schema.get_field("name")?,
            alternate_names: schema.get_field("alternatenames")?,
            context: schema.get_field("context")?,
            place_type: schema.get_field("placetype")?,
            country_code: schema.get_field("country_code")?,
            payload: schema.get_field("payload")?,
        })
    }

    /// Searchable fields with their boosts, most specific first.
    pub(crate) fn weighted_text_fields(&self) -> [(Field, f32); 3] {
        [(self.name, 3.0), (self.alternate_names, 2.0), (self.context, 1.0)]
    }

    pub(crate) fn document(&self, record: &CandidateRecord) -> Result<TantivyDocument> {
        let mut doc = TantivyDocument::default();
        doc.add_text(self.name, &record.name);
        for alternate in &record.alternate_names {
            doc.add_text(self.alternate_names, alternate);
        }
        for context in context_names(record) {
            doc.add_text(self.context, context);
        }
        doc.add_text(self.place_type, record.place_type.as_str());
        if let Some(code) = &record.country_code {
            doc.add_text(self.country_code, code.to_ascii_uppercase());
        }
        doc.add_text(self.payload, serde_json::to_string(record)?);
        Ok(doc)
    }
}

fn context_names(record: &CandidateRecord) -> impl Iterator<Item = &str> {
    [
        &record.is_in,
        &record.is_in_place,
        &record.is_in_adm,
        &record.adm1_name,
        &record.adm2_name,
        &record.adm3_name,
        &record.adm4_name,
        &record.adm5_name,
    ]
    .into_iter()
    .filter_map(Option::as_deref)
    .chain(record.zip_codes.iter().map(String::as_str))
    .chain(record.is_in_zip.iter().map(String::as_str))
}

/// Register the text analyzer on an index; required after creating or opening one.
pub(crate) fn register_tokenizer(index: &Index) {
    let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(40))
        .filter(LowerCaser)
        .filter(AsciiFoldingFilter)
        .build();
    index.tokenizers().register(TOKENIZER, analyzer);
}
