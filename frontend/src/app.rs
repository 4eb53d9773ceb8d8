use crate::components::loader::{read_page_config, LoaderComponent};
use yew::{html, Component, Context, Html};

pub struct App;

impl Component for App {
    type Message = ();
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div>
                <LoaderComponent config={read_page_config()} />
            </div>
        }
    }
}
