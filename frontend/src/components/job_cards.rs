//! Stack of job cards, newest first.

use common::jobs::{CardState, JobCard};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct JobCardsProps {
    pub cards: Vec<JobCard>,
    pub on_dismiss: Callback<String>,
    pub on_cancel: Callback<String>,
}

pub struct JobCards;

impl Component for JobCards {
    type Message = ();
    type Properties = JobCardsProps;

    fn create(_ctx: &Context<Self>) -> Self {
        JobCards
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        if props.cards.is_empty() {
            return html! {};
        }
        html! {
            <div class="job-status-section">
                <h3>{"Upload jobs"}</h3>
                <div class="job-cards-container">
                    { for props.cards.iter().map(|card| job_card(card, props)) }
                </div>
            </div>
        }
    }
}

fn job_card(card: &JobCard, props: &JobCardsProps) -> Html {
    let dismiss = {
        let id = card.job_id.clone();
        props.on_dismiss.reform(move |_: MouseEvent| id.clone())
    };
    let cancel = {
        let id = card.job_id.clone();
        props.on_cancel.reform(move |_: MouseEvent| id.clone())
    };
    let icon = match card.state {
        CardState::Processing => html! { <div class="spinner"></div> },
        CardState::Completed => html! { <i class="material-icons">{"check_circle"}</i> },
        CardState::Canceled => html! { <i class="material-icons">{"block"}</i> },
        CardState::Failed | CardState::ConnectionError => {
            html! { <i class="material-icons">{"error"}</i> }
        }
    };
    let width = format!("width: {}%", card.progress);

    html! {
        <div class="job-card" key={card.job_id.clone()} id={format!("job-card-{}", card.job_id)}>
            <div class="job-card-header">
                <div class="job-card-title">
                    <i class="material-icons">{"upload_file"}</i>
                    { card.title.clone() }
                    <span class="job-id-badge">{ format!("ID: {}", card.job_id) }</span>
                </div>
                <div class={classes!("job-card-status", card.state.css_class())}>
                    { icon }
                    { card.status_label.clone() }
                </div>
                if card.cancellable && card.state == CardState::Processing {
                    <button class="icon-btn" title="Cancel transfer" onclick={cancel}>
                        <i class="material-icons">{"stop_circle"}</i>
                    </button>
                }
                <button class="icon-btn" title="Dismiss" onclick={dismiss}>
                    <i class="material-icons">{"close"}</i>
                </button>
            </div>
            <div class="job-progress-section">
                <div class="job-progress-info">
                    <span>{"Upload Progress"}</span>
                    <span>{ format!("{}%", card.progress) }</span>
                </div>
                <div class="job-progress-bar">
                    <div class="job-progress-fill" style={width}></div>
                </div>
            </div>
            <div class="job-details">{ card.details.clone() }</div>
            if let Some(error) = &card.error {
                <div class="job-error">{ error.clone() }</div>
            }
        </div>
    }
}
