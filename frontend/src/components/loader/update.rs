//! Update function for the loader component.
//!
//! Elm-style: `update` receives the state, the context and one `Msg`,
//! mutates the state and returns whether to re-render. Every request runs in
//! `spawn_local` and reports back through a message, so the session is only
//! ever touched from this function or from a poll task between two awaits.

use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use log::{debug, info};
use yew::platform::spawn_local;
use yew::prelude::*;

use common::display::mask_url;
use common::jobs::{poll_job, JobStatus, PollOutcome};
use common::mapping::MappingTarget;

use super::helpers::{read_file_text, show_toast, ToastKind};
use super::messages::Msg;
use super::state::{FileInfo, LoaderComponent};
use crate::api::ApiClient;
use crate::components::top_sheet::{close_top_sheet, is_top_sheet_open, open_top_sheet};

pub fn update(component: &mut LoaderComponent, ctx: &Context<LoaderComponent>, msg: Msg) -> bool {
    match msg {
        Msg::SelectApi(name) => {
            if let Err(err) = component.config.select(&name) {
                show_toast(&err.to_string(), ToastKind::Error);
                return false;
            }
            info!("switched to preset {} ({})", name, component.config.base_url());
            component.connection = None;
            check_health(component, ctx);
            true
        }
        Msg::HealthChecked(connection) => {
            component.connection = Some(connection);
            true
        }

        Msg::UpdateDbUrl(url) => {
            component.db_url_input = url;
            false
        }
        Msg::SaveDb => {
            let url = component.db_url_input.trim().to_string();
            if url.is_empty() {
                show_toast("Please enter a database URL", ToastKind::Error);
                return false;
            }
            let client = component.client();
            request(component, ctx, async move {
                client.save_db(&url).await?;
                Ok(Msg::DbSaved(url))
            })
        }
        Msg::DbSaved(url) => {
            component.busy = false;
            component.saved_db_url = Some(mask_url(&url));
            show_toast("Database connection saved!", ToastKind::Success);
            true
        }
        Msg::EditDbUrl => {
            component.saved_db_url = None;
            true
        }
        Msg::ToggleCreateTable => {
            if is_top_sheet_open(&component.create_table_ref) {
                close_top_sheet(&component.create_table_ref);
            } else {
                open_top_sheet(&component.create_table_ref);
            }
            false
        }
        Msg::UpdateCreateSql(sql) => {
            component.create_sql = sql;
            false
        }
        Msg::CreateTable => {
            let sql = component.create_sql.trim().to_string();
            if sql.is_empty() {
                show_toast("Please enter a CREATE TABLE statement", ToastKind::Error);
                return false;
            }
            let client = component.client();
            request(component, ctx, async move {
                client.create_table(&sql).await?;
                Ok(Msg::TableCreated)
            })
        }
        Msg::TableCreated => {
            component.busy = false;
            component.create_sql.clear();
            close_top_sheet(&component.create_table_ref);
            show_toast("Table created!", ToastKind::Success);
            true
        }

        Msg::UpdateTableName(name) => {
            component.table_name = name;
            false
        }
        Msg::FetchSchema => {
            let table = component.table_name.trim().to_string();
            if table.is_empty() {
                show_toast("Please enter a table name", ToastKind::Error);
                return false;
            }
            let client = component.client();
            request(component, ctx, async move {
                let schema = client.table_schema(&table).await?;
                Ok(Msg::SchemaLoaded(schema))
            })
        }
        Msg::SchemaLoaded(schema) => {
            component.busy = false;
            component.session.borrow_mut().set_schema(schema);
            show_toast("Schema loaded!", ToastKind::Success);
            true
        }
        Msg::UseHeaderAsSchema => {
            let table = component.table_name.trim().to_string();
            if table.is_empty() {
                show_toast("Please enter a table name", ToastKind::Error);
                return false;
            }
            let result = component.session.borrow_mut().use_source_header_as_schema(&table);
            match result {
                Ok(()) => {
                    show_toast("Schema taken from the file header", ToastKind::Info);
                    true
                }
                Err(err) => {
                    show_toast(&err.to_string(), ToastKind::Error);
                    false
                }
            }
        }

        Msg::OpenFileDialog => {
            if let Some(input) = component.file_input_ref.cast::<web_sys::HtmlInputElement>() {
                input.click();
            }
            false
        }
        Msg::FileSelected(file) => {
            let link = ctx.link().clone();
            spawn_local(async move {
                match read_file_text(file).await {
                    Ok((name, size, text)) => link.send_message(Msg::FileRead { name, size, text }),
                    Err(err) => link.send_message(Msg::RequestFailed(format!("Read error: {}", err))),
                }
            });
            false
        }
        Msg::FileRead { name, size, text } => {
            let result = component
                .session
                .borrow_mut()
                .load_file(&name, &text)
                .map(|source| source.kind().label());
            match result {
                Ok(label) => {
                    component.file_info = Some(FileInfo { name, size });
                    component.query_total = None;
                    show_toast(&format!("{} verified!", label), ToastKind::Success);
                }
                Err(err) => show_toast(&err.to_string(), ToastKind::Error),
            }
            reset_file_input(component);
            true
        }
        Msg::ClearSource => {
            component.session.borrow_mut().clear_source();
            component.file_info = None;
            component.query_total = None;
            reset_file_input(component);
            true
        }

        Msg::UpdateSourceDbUrl(url) => {
            component.source_db_url_input = url;
            false
        }
        Msg::ConnectSourceDb => {
            let url = component.source_db_url_input.trim().to_string();
            if url.is_empty() {
                show_toast("Please enter a source database URL", ToastKind::Error);
                return false;
            }
            let client = component.client();
            request(component, ctx, async move {
                let status = client.connect_source_db(&url).await?;
                Ok(Msg::SourceDbChanged(status))
            })
        }
        Msg::DisconnectSourceDb => {
            let client = component.client();
            request(component, ctx, async move {
                client.disconnect_source_db().await?;
                let status = client.source_db_status().await?;
                Ok(Msg::SourceDbChanged(status))
            })
        }
        Msg::SourceDbChanged(status) => {
            component.busy = false;
            component.source_db = status;
            true
        }
        Msg::UpdateQuery(query) => {
            component.query_text = query;
            false
        }
        Msg::ExecuteQuery => {
            let query = component.query_text.trim().to_string();
            if query.is_empty() {
                show_toast("Please enter a query", ToastKind::Error);
                return false;
            }
            let client = component.client();
            let limit = component.config.query_limit;
            request(component, ctx, async move {
                let result = client.execute_query(&query, limit).await?;
                Ok(Msg::QueryLoaded(result))
            })
        }
        Msg::QueryLoaded(result) => {
            component.busy = false;
            let total = result.total_count;
            let query = component.query_text.trim().to_string();
            let rows = component
                .session
                .borrow_mut()
                .load_query(&query, result)
                .row_count();
            component.query_total = Some(total.unwrap_or(rows));
            component.file_info = None;
            show_toast(&format!("Query returned {} rows", rows), ToastKind::Success);
            true
        }

        Msg::SetMapping { attribute, value } => {
            component
                .session
                .borrow_mut()
                .set_mapping(&attribute, MappingTarget::from_value(&value));
            true
        }
        Msg::AutoMap => {
            let matched = component.session.borrow_mut().auto_map();
            show_toast(&format!("Auto-mapped {} attribute(s)", matched), ToastKind::Info);
            true
        }

        Msg::TogglePreviewMode => {
            component.session.borrow_mut().toggle_preview_mode();
            true
        }
        Msg::ToggleRow(row) => with_source(component, |s| s.toggle_row(row)),
        Msg::TogglePage => with_source(component, |s| s.toggle_page()),
        Msg::SelectAll => with_source(component, |s| s.select_all()),
        Msg::ClearSelection => with_source(component, |s| s.clear_selection()),
        Msg::NextPage => with_source(component, |s| s.next_page()),
        Msg::PrevPage => with_source(component, |s| s.prev_page()),

        Msg::Upload => {
            let form = component.session.borrow().prepare_upload();
            let form = match form {
                Ok(form) => form,
                Err(err) => {
                    show_toast(&err.to_string(), ToastKind::Error);
                    return false;
                }
            };
            let client = component.client();
            let api = component.api_name();
            request(component, ctx, async move {
                let accepted = client.upload(&form).await?;
                Ok(Msg::JobStarted {
                    job_id: accepted.job_id,
                    title: form.file.filename.clone(),
                    api,
                    transfer: false,
                })
            })
        }
        Msg::UpdateChunkSize(value) => {
            if let Ok(size) = value.trim().parse::<u32>() {
                component.chunk_size = size;
            }
            false
        }
        Msg::StartTransfer => {
            let transfer = component
                .session
                .borrow()
                .transfer_request(component.chunk_size);
            let transfer = match transfer {
                Ok(transfer) => transfer,
                Err(err) => {
                    show_toast(&err.to_string(), ToastKind::Error);
                    return false;
                }
            };
            let client = component.client();
            let api = component.api_name();
            request(component, ctx, async move {
                let accepted = client.start_transfer(&transfer).await?;
                Ok(Msg::JobStarted {
                    job_id: accepted.job_id,
                    title: format!("Transfer to {}", transfer.target_table),
                    api,
                    transfer: true,
                })
            })
        }
        Msg::CancelTransfer(job_id) => {
            let client = component.client();
            let link = ctx.link().clone();
            spawn_local(async move {
                match client.cancel_transfer(&job_id).await {
                    Ok(_) => show_toast("Cancellation requested", ToastKind::Info),
                    Err(err) => link.send_message(Msg::RequestFailed(err.user_message())),
                }
            });
            false
        }
        Msg::JobStarted { job_id, title, api, transfer } => {
            component.busy = false;
            {
                let mut session = component.session.borrow_mut();
                session.jobs.create_card(&job_id, &title, &api, None);
                if transfer {
                    session.jobs.mark_cancellable(&job_id);
                }
            }
            show_toast("Upload started!", ToastKind::Info);
            start_polling(component, ctx, job_id);
            true
        }

        Msg::RecentJobsLoaded { jobs, api } => {
            let mut pending = Vec::new();
            {
                let mut session = component.session.borrow_mut();
                // The server lists newest first; cards are pushed on top.
                for job in jobs.iter().rev() {
                    session.jobs.upsert_from_server(job, &api);
                    if job.status == JobStatus::Processing {
                        pending.push(job.job_id.clone());
                    }
                }
            }
            debug!("reattached {} recent jobs", jobs.len());
            for job_id in pending {
                start_polling(component, ctx, job_id);
            }
            true
        }
        Msg::RunningJobsLoaded { jobs, api } => {
            for job in jobs {
                if component.session.borrow().jobs.is_polling(&job.job_id) {
                    continue;
                }
                component
                    .session
                    .borrow_mut()
                    .jobs
                    .create_card(&job.job_id, &job.job_id, &api, None);
                start_polling(component, ctx, job.job_id);
            }
            true
        }
        Msg::JobsChanged => true,
        Msg::PollFinished { job_id, outcome } => {
            match outcome {
                PollOutcome::Terminal(JobStatus::Completed) => {
                    show_toast("File uploaded successfully!", ToastKind::Success)
                }
                PollOutcome::Terminal(JobStatus::Failed) => show_toast("Upload failed", ToastKind::Error),
                PollOutcome::Terminal(JobStatus::Canceled) => {
                    show_toast("Transfer canceled", ToastKind::Info)
                }
                PollOutcome::TransportFailed(_) => {
                    show_toast("Error checking job status", ToastKind::Error)
                }
                PollOutcome::Terminal(_) | PollOutcome::Detached => {}
            }
            debug!("poller for {} finished", job_id);
            true
        }
        Msg::DismissJob(job_id) => {
            component.session.borrow_mut().jobs.remove_card(&job_id);
            true
        }

        Msg::RequestFailed(message) => {
            component.busy = false;
            show_toast(&format!("Error: {}", message), ToastKind::Error);
            true
        }
        Msg::Idle => false,
    }
}

/// Runs `task` in the background with the busy flag set. Its `Ok` message is
/// delivered as is; an error becomes `RequestFailed`.
fn request<F>(component: &mut LoaderComponent, ctx: &Context<LoaderComponent>, task: F) -> bool
where
    F: std::future::Future<Output = Result<Msg, common::error::ApiError>> + 'static,
{
    component.busy = true;
    let link = ctx.link().clone();
    spawn_local(async move {
        match task.await {
            Ok(msg) => link.send_message(msg),
            Err(err) => link.send_message(Msg::RequestFailed(err.user_message())),
        }
    });
    true
}

fn with_source(
    component: &mut LoaderComponent,
    apply: impl FnOnce(&mut common::source::TabularSource),
) -> bool {
    match component.session.borrow_mut().source_mut() {
        Some(source) => {
            apply(source);
            true
        }
        None => false,
    }
}

fn reset_file_input(component: &LoaderComponent) {
    if let Some(input) = component.file_input_ref.cast::<web_sys::HtmlInputElement>() {
        input.set_value("");
    }
}

pub fn check_health(component: &LoaderComponent, ctx: &Context<LoaderComponent>) {
    let client = component.client();
    let link = ctx.link().clone();
    spawn_local(async move {
        let connection = client.health().await;
        link.send_message(Msg::HealthChecked(connection));
    });
}

/// Reattaches to jobs the server still knows about.
pub fn load_jobs(component: &LoaderComponent, ctx: &Context<LoaderComponent>) {
    let client = component.client();
    let link = ctx.link().clone();
    let api = component.api_name();
    let hours = component.config.recent_hours;
    spawn_local(async move {
        match client.recent_jobs(hours).await {
            Ok(recent) => link.send_message(Msg::RecentJobsLoaded {
                jobs: recent.jobs,
                api: api.clone(),
            }),
            Err(err) => debug!("recent jobs unavailable: {}", err),
        }
        match client.running_jobs().await {
            Ok(running) => link.send_message(Msg::RunningJobsLoaded {
                jobs: running.jobs,
                api,
            }),
            Err(err) => debug!("running jobs unavailable: {}", err),
        }
    });
}

pub fn load_source_db_status(component: &LoaderComponent, ctx: &Context<LoaderComponent>) {
    let client = component.client();
    let link = ctx.link().clone();
    spawn_local(async move {
        if let Ok(status) = client.source_db_status().await {
            link.send_message(Msg::SourceDbChanged(status));
        }
    });
}

/// Starts the poll task for `job_id` unless one is already running.
fn start_polling(component: &LoaderComponent, ctx: &Context<LoaderComponent>, job_id: String) {
    if !component.session.borrow_mut().jobs.begin_polling(&job_id) {
        debug!("job {} already polled", job_id);
        return;
    }
    let session = component.session.clone();
    let client: ApiClient = component.client();
    let interval = component.config.poll_interval();
    let link = ctx.link().clone();
    spawn_local(async move {
        let outcome = poll_job(
            &client,
            &job_id,
            interval,
            |delay: Duration| TimeoutFuture::new(delay.as_millis() as u32),
            |event| {
                let control = session.borrow_mut().jobs.handle_poll_event(&job_id, event);
                link.send_message(Msg::JobsChanged);
                control
            },
        )
        .await;
        session.borrow_mut().jobs.end_polling(&job_id);
        link.send_message(Msg::PollFinished { job_id, outcome });
    });
}
