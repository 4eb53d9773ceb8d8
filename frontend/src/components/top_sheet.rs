use uuid::Uuid;
use yew::{html, Component, Context, Html, NodeRef, Properties};

/// Slide-down panel. Hidden until `open_top_sheet` adds its `show` class.
pub struct TopSheet {
    pub id: String,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub children: Html,
    pub node_ref: NodeRef,
    #[prop_or_default]
    pub title: Option<String>,
}

impl Component for TopSheet {
    type Message = ();
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            id: format!("sheet-{}", Uuid::new_v4()),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        html! {
            <div class="top-sheet" id={self.id.clone()} ref={props.node_ref.clone()}>
                if let Some(title) = &props.title {
                    <h3 class="top-sheet-title">{ title.clone() }</h3>
                }
                { props.children.clone() }
            </div>
        }
    }
}

fn set_shown(sheet_ref: &NodeRef, shown: bool) {
    if let Some(sheet) = sheet_ref.cast::<web_sys::HtmlElement>() {
        let classes = sheet.class_list();
        if shown {
            classes.add_1("show").ok();
        } else {
            classes.remove_1("show").ok();
        }
    }
}

pub fn open_top_sheet(sheet_ref: &NodeRef) {
    set_shown(sheet_ref, true);
}

pub fn close_top_sheet(sheet_ref: &NodeRef) {
    set_shown(sheet_ref, false);
}

pub fn is_top_sheet_open(sheet_ref: &NodeRef) -> bool {
    sheet_ref
        .cast::<web_sys::HtmlElement>()
        .map(|sheet| sheet.class_list().contains("show"))
        .unwrap_or(false)
}
