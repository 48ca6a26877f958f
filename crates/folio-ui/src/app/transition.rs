//! Transition-finished signal for overlay teardown.
//!
//! # Design
//! - Resolve on the container's own `transitionend`, so sequencing follows the stylesheet.
//! - Fall back to a timeout for containers without a CSS transition.
//! - Resumption goes through the component's token check; late signals are harmless.

use crate::core::config::TransitionConfig;
use crate::core::overlay::{Pending, TransitionToken};
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Promise};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Element, EventTarget};

/// Wait for `pending` and then hand its token to `resume`.
pub(crate) fn schedule<F>(
    pending: Pending,
    target: Option<Element>,
    timing: TransitionConfig,
    resume: F,
) where
    F: FnOnce(TransitionToken) + 'static,
{
    spawn_local(async move {
        match pending {
            Pending::Transition(_) => {
                transition_finished(target.as_ref(), timing.exit_fallback_ms).await;
            }
            Pending::Pause(_) => TimeoutFuture::new(timing.queue_gap_ms).await,
        }
        resume(pending.token());
    });
}

/// Resolves when `target` finishes a transition or after `fallback_ms`.
pub(crate) async fn transition_finished(target: Option<&Element>, fallback_ms: u32) {
    let Some(target) = target else {
        TimeoutFuture::new(0).await;
        return;
    };
    let mut guards: (Option<EventListener>, Option<Timeout>) = (None, None);
    let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
        let on_end = resolve.clone();
        let own = target.clone();
        // Transitions on children bubble up; only the container's own counts.
        guards.0 = Some(EventListener::new(target, "transitionend", move |event| {
            let own: &EventTarget = own.as_ref();
            if event.target().as_ref() == Some(own) {
                let _ = on_end.call0(&JsValue::NULL);
            }
        }));
        guards.1 = Some(Timeout::new(fallback_ms, move || {
            let _ = resolve.call0(&JsValue::NULL);
        }));
    });
    if let Err(err) = JsFuture::from(promise).await {
        tracing::debug!(error = ?err, "transition signal rejected");
    }
    drop(guards);
}
