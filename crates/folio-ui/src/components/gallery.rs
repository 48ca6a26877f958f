//! Gallery overlay body rendered into the gallery container.
//!
//! # Design
//! - Purely presentational: page state comes from the core gallery via props.
//! - Navigation buttons emit intents; boundaries are enforced by the core state.

use crate::core::gallery::GalleryState;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct GalleryOverlayProps {
    pub(crate) state: GalleryState,
    pub(crate) on_prev: Callback<()>,
    pub(crate) on_next: Callback<()>,
    pub(crate) on_jump: Callback<usize>,
    pub(crate) on_close: Callback<()>,
}

#[function_component(GalleryOverlay)]
pub(crate) fn gallery_overlay(props: &GalleryOverlayProps) -> Html {
    let state = &props.state;
    let on_prev = {
        let on_prev = props.on_prev.clone();
        Callback::from(move |_: MouseEvent| on_prev.emit(()))
    };
    let on_next = {
        let on_next = props.on_next.clone();
        Callback::from(move |_: MouseEvent| on_next.emit(()))
    };
    let on_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    html! {
        <div class="gallery-body" role="dialog" aria-modal="true" aria-label={state.title().to_string()}>
            <header class="gallery-header">
                <h2 class="gallery-title">{state.title().to_string()}</h2>
                <span class="gallery-page-label" aria-live="polite">{state.page_label()}</span>
                <button class="gallery-close" aria-label="Close" onclick={on_close}>{"\u{00d7}"}</button>
            </header>
            <div class="gallery-content">
                <button
                    class="gallery-nav gallery-prev"
                    aria-label="Previous page"
                    disabled={!state.can_prev()}
                    onclick={on_prev}
                >{"\u{2039}"}</button>
                <img
                    class="gallery-image"
                    src={state.current_image().to_string()}
                    alt={state.page_label()}
                />
                <button
                    class="gallery-nav gallery-next"
                    aria-label="Next page"
                    disabled={!state.can_next()}
                    onclick={on_next}
                >{"\u{203a}"}</button>
            </div>
            <footer class="gallery-indicators">
                {for state.indicators().enumerate().map(|(idx, active)| render_indicator(idx, active, props.on_jump.clone()))}
            </footer>
        </div>
    }
}

fn render_indicator(idx: usize, active: bool, on_jump: Callback<usize>) -> Html {
    let onclick = Callback::from(move |_: MouseEvent| on_jump.emit(idx));
    html! {
        <button
            class={classes!("gallery-indicator", active.then_some("active"))}
            aria-label={format!("Page {}", idx + 1)}
            aria-current={active.then_some("page")}
            onclick={onclick}
        ></button>
    }
}
