//! Loader page: root module wiring the Yew `Component` implementation with
//! submodules for state, update logic, view rendering and helpers.
//!
//! Responsibilities
//! - Re-export `Msg`, `LoaderProps`, `LoaderComponent` and the page config reader.
//! - Provide the `Component` implementation that delegates to `update::update` and `view::view`.
//! - On first render, check the selected endpoint, the source database and
//!   reattach to jobs the server is still running.

use yew::prelude::*;

mod helpers;
mod messages;
mod props;
mod state;
mod update;
mod view;

pub use helpers::read_page_config;
pub use messages::Msg;
pub use props::LoaderProps;
pub use state::LoaderComponent;

impl Component for LoaderComponent {
    type Message = Msg;
    type Properties = LoaderProps;

    fn create(ctx: &Context<Self>) -> Self {
        LoaderComponent::new(ctx.props().config.clone())
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && !self.loaded {
            self.loaded = true;
            log::info!("loader ready, endpoint {}", self.config.base_url());
            update::check_health(self, ctx);
            update::load_source_db_status(self, ctx);
            update::load_jobs(self, ctx);
        }
    }
}
