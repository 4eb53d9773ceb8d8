//! The state one page works on: target schema, active source, preview mode
//! and job cards.
//!
//! Every mutation goes through a method here, so the reset rules live in
//! one place:
//! - loading a source replaces the previous one wholesale (fresh selection,
//!   first page, `Matched` preview) and seeds its mapping from the schema;
//! - reloading the schema clears the mapping of the active source and seeds
//!   it again against the new attributes;
//! - a failed load leaves everything as it was.

use log::debug;

use crate::error::IngestError;
use crate::jobs::JobTracker;
use crate::mapping::MappingTarget;
use crate::model::schema::TableSchema;
use crate::payload::{PayloadBuilder, UploadForm};
use crate::preview::{build_preview, PreviewGrid, PreviewMode};
use crate::requests::TransferStartRequest;
use crate::source::{Pager, QueryResult, TabularSource, PAGE_SIZE};

#[derive(Debug)]
pub struct Session {
    schema: Option<TableSchema>,
    source: Option<TabularSource>,
    /// SQL that produced the active source, for query sources only.
    query: Option<String>,
    preview_mode: PreviewMode,
    /// Preview rows per page for every source loaded from now on.
    page_size: usize,
    pub jobs: JobTracker,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            schema: None,
            source: None,
            query: None,
            preview_mode: PreviewMode::default(),
            page_size,
            jobs: JobTracker::new(),
        }
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    pub fn source(&self) -> Option<&TabularSource> {
        self.source.as_ref()
    }

    pub fn source_mut(&mut self) -> Option<&mut TabularSource> {
        self.source.as_mut()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn preview_mode(&self) -> PreviewMode {
        self.preview_mode
    }

    fn attributes(&self) -> &[String] {
        self.schema
            .as_ref()
            .map(|s| s.attributes.as_slice())
            .unwrap_or_default()
    }

    pub fn set_schema(&mut self, schema: TableSchema) {
        debug!(
            "schema for {}: {} attributes, key [{}]",
            schema.table,
            schema.attributes.len(),
            schema.primary_key.join(",")
        );
        if let Some(source) = self.source.as_mut() {
            let header = source.header().to_vec();
            source.mapping.clear();
            source.mapping.seed_defaults(&schema.attributes, &header);
        }
        self.schema = Some(schema);
    }

    /// Uses the active source's own header as the target schema.
    pub fn use_source_header_as_schema(&mut self, table: &str) -> Result<(), IngestError> {
        let source = self.source.as_ref().ok_or(IngestError::NoSource)?;
        let schema = TableSchema::from_header(table, source.header());
        self.set_schema(schema);
        Ok(())
    }

    fn install(&mut self, mut source: TabularSource, query: Option<String>) -> &TabularSource {
        let attributes = self.attributes().to_vec();
        let header = source.header().to_vec();
        source.mapping.seed_defaults(&attributes, &header);
        source.pager = Pager::with_page_size(self.page_size);
        self.preview_mode = PreviewMode::default();
        self.query = query;
        self.source.insert(source)
    }

    /// Loads a CSV or JSON file as the active source.
    pub fn load_file(&mut self, name: &str, text: &str) -> Result<&TabularSource, IngestError> {
        let source = TabularSource::load_file(name, text)?;
        Ok(self.install(source, None))
    }

    /// Makes a query result the active source.
    pub fn load_query(&mut self, query: &str, result: QueryResult) -> &TabularSource {
        self.install(TabularSource::from_query(result), Some(query.to_string()))
    }

    pub fn clear_source(&mut self) {
        self.source = None;
        self.query = None;
        self.preview_mode = PreviewMode::default();
    }

    pub fn set_mapping(&mut self, attribute: &str, target: MappingTarget) {
        if let Some(source) = self.source.as_mut() {
            source.mapping.set(attribute, target);
        }
    }

    /// Normalized-name matching for attributes still unmapped.
    pub fn auto_map(&mut self) -> usize {
        let attributes = self.attributes().to_vec();
        match self.source.as_mut() {
            Some(source) => {
                let header = source.header().to_vec();
                source.mapping.auto_map(&attributes, &header)
            }
            None => 0,
        }
    }

    pub fn match_rate(&self) -> u32 {
        self.source
            .as_ref()
            .map(|s| s.mapping.match_rate(self.attributes()))
            .unwrap_or(0)
    }

    pub fn toggle_preview_mode(&mut self) -> PreviewMode {
        self.preview_mode = self.preview_mode.toggled();
        self.preview_mode
    }

    pub fn preview(&self) -> Option<PreviewGrid> {
        let source = self.source.as_ref()?;
        build_preview(source, self.attributes(), self.preview_mode)
    }

    /// Checks the upload preconditions in order and builds the form.
    pub fn prepare_upload(&self) -> Result<UploadForm, IngestError> {
        let source = self.source.as_ref().ok_or(IngestError::NoSource)?;
        let schema = self.schema.as_ref().ok_or(IngestError::NoSchema)?;
        if schema.attributes.is_empty() {
            return Err(IngestError::SchemaWithoutAttributes);
        }
        if source.header().is_empty() {
            return Err(IngestError::EmptyInput);
        }
        let builder = PayloadBuilder::new(source, &schema.attributes)?;
        Ok(builder.upload_form(schema))
    }

    /// Server-side transfer of the active query into the schema's table,
    /// using the current mapping.
    pub fn transfer_request(&self, chunk_size: u32) -> Result<TransferStartRequest, IngestError> {
        let source = self.source.as_ref().ok_or(IngestError::NoSource)?;
        let query = self.query.clone().ok_or(IngestError::NoSource)?;
        let schema = self.schema.as_ref().ok_or(IngestError::NoSchema)?;
        if schema.attributes.is_empty() {
            return Err(IngestError::SchemaWithoutAttributes);
        }
        let target_columns = source.mapping.included_attributes(&schema.attributes);
        if target_columns.is_empty() {
            return Err(IngestError::NoMappedAttributes);
        }
        Ok(TransferStartRequest {
            query,
            target_table: schema.table.clone(),
            source_to_target_mapping: source.mapping.field_pairs(&target_columns),
            primary_key: source.mapping.mapped_primary_key(schema),
            target_columns,
            chunk_size: chunk_size.max(1),
            on_conflict_do_nothing: true,
        })
    }
}
