use common::jobs::{PollOutcome, RunningJob, UploadJob};
use common::model::schema::TableSchema;
use common::requests::{Connection, SourceDbStatus};
use common::source::QueryResult;

pub enum Msg {
    SelectApi(String),
    HealthChecked(Connection),

    UpdateDbUrl(String),
    SaveDb,
    DbSaved(String),
    EditDbUrl,
    ToggleCreateTable,
    UpdateCreateSql(String),
    CreateTable,
    TableCreated,

    UpdateTableName(String),
    FetchSchema,
    SchemaLoaded(TableSchema),
    UseHeaderAsSchema,

    OpenFileDialog,
    FileSelected(web_sys::File),
    FileRead { name: String, size: u64, text: String },
    ClearSource,

    UpdateSourceDbUrl(String),
    ConnectSourceDb,
    DisconnectSourceDb,
    SourceDbChanged(SourceDbStatus),
    UpdateQuery(String),
    ExecuteQuery,
    QueryLoaded(QueryResult),

    SetMapping { attribute: String, value: String },
    AutoMap,

    TogglePreviewMode,
    ToggleRow(usize),
    TogglePage,
    SelectAll,
    ClearSelection,
    NextPage,
    PrevPage,

    Upload,
    UpdateChunkSize(String),
    StartTransfer,
    CancelTransfer(String),
    JobStarted { job_id: String, title: String, api: String, transfer: bool },

    RecentJobsLoaded { jobs: Vec<UploadJob>, api: String },
    RunningJobsLoaded { jobs: Vec<RunningJob>, api: String },
    JobsChanged,
    PollFinished { job_id: String, outcome: PollOutcome },
    DismissJob(String),

    RequestFailed(String),
    Idle,
}
