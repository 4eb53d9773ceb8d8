//! Component state for the loader page.
//!
//! Everything the `common` crate models (schema, source, mapping, selection,
//! job cards) lives in the shared `Session`. The component itself only keeps
//! form inputs, connection indicators and DOM refs.

use std::cell::RefCell;
use std::rc::Rc;

use yew::prelude::*;

use common::config::ApiConfig;
use common::requests::{Connection, SourceDbStatus};
use common::session::Session;

use crate::api::ApiClient;

/// Name and size of the file the active source was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
}

pub struct LoaderComponent {
    pub config: ApiConfig,

    /// Shared with the poll tasks, which update job cards between renders.
    pub session: Rc<RefCell<Session>>,

    /// Health of the selected preset; `None` while the first check runs.
    pub connection: Option<Connection>,

    pub db_url_input: String,

    /// Masked destination URL once saved. The input is hidden while set.
    pub saved_db_url: Option<String>,

    pub create_sql: String,
    pub table_name: String,
    pub file_info: Option<FileInfo>,

    pub source_db_url_input: String,
    pub source_db: SourceDbStatus,
    pub query_text: String,

    /// Row count the last query matched, before the row limit.
    pub query_total: Option<usize>,

    pub chunk_size: u32,

    pub file_input_ref: NodeRef,
    pub create_table_ref: NodeRef,

    /// Set while a request triggered by a button is in flight.
    pub busy: bool,

    /// Guard for first-render initialization.
    pub loaded: bool,
}

impl LoaderComponent {
    pub fn new(config: ApiConfig) -> Self {
        let session = Session::with_page_size(config.page_size);
        Self {
            config,
            session: Rc::new(RefCell::new(session)),
            connection: None,
            db_url_input: String::new(),
            saved_db_url: None,
            create_sql: String::new(),
            table_name: String::new(),
            file_info: None,
            source_db_url_input: String::new(),
            source_db: SourceDbStatus::default(),
            query_text: String::new(),
            query_total: None,
            chunk_size: 1000,
            file_input_ref: NodeRef::default(),
            create_table_ref: NodeRef::default(),
            busy: false,
            loaded: false,
        }
    }

    /// Client bound to the currently selected preset.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.config.base_url())
    }

    pub fn api_name(&self) -> String {
        self.config.selected.clone()
    }
}
