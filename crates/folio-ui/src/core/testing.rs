//! Recording fakes for exercising the state machines without a browser.

use crate::core::events::PreferenceEvent;
use crate::core::gallery::{GalleryState, GalleryView};
use crate::core::overlay::BackdropSurface;
use crate::core::preferences::{FontSize, PreferenceBackend, PreferenceSurface, Theme};
use crate::core::sequence::{SequenceItem, SequencePosition, SequenceView};
use crate::core::trigger::{MarkerId, TriggerDescriptor, TriggerView};
use crate::core::viewer::{DocumentDescriptor, ViewerView};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingBackdrop {
    visible: Rc<Cell<bool>>,
    locked: Rc<Cell<bool>>,
    reveals: Rc<Cell<usize>>,
    conceals: Rc<Cell<usize>>,
}

impl RecordingBackdrop {
    pub(crate) fn visible(&self) -> bool {
        self.visible.get()
    }

    pub(crate) fn scroll_locked(&self) -> bool {
        self.locked.get()
    }

    pub(crate) fn reveals(&self) -> usize {
        self.reveals.get()
    }

    pub(crate) fn conceals(&self) -> usize {
        self.conceals.get()
    }
}

impl BackdropSurface for RecordingBackdrop {
    fn reveal(&self) {
        self.visible.set(true);
        self.reveals.set(self.reveals.get() + 1);
    }

    fn conceal(&self) {
        self.visible.set(false);
        self.conceals.set(self.conceals.get() + 1);
    }

    fn lock_scroll(&self, locked: bool) {
        self.locked.set(locked);
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryBackend {
    values: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
    system_dark: bool,
}

impl MemoryBackend {
    pub(crate) fn with_system_dark(mut self, dark: bool) -> Self {
        self.system_dark = dark;
        self
    }

    pub(crate) fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn load(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn store(&self, key: &str, value: &str) {
        self.writes.set(self.writes.get() + 1);
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn system_prefers_dark(&self) -> bool {
        self.system_dark
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingSurface {
    theme: Rc<Cell<Option<Theme>>>,
    font_size: Rc<Cell<Option<FontSize>>>,
    applies: Rc<Cell<usize>>,
    events: Rc<RefCell<Vec<PreferenceEvent>>>,
}

impl RecordingSurface {
    pub(crate) fn theme_attr(&self) -> Option<Theme> {
        self.theme.get()
    }

    pub(crate) fn font_size_attr(&self) -> Option<FontSize> {
        self.font_size.get()
    }

    pub(crate) fn applies(&self) -> usize {
        self.applies.get()
    }

    pub(crate) fn events(&self) -> Vec<PreferenceEvent> {
        self.events.borrow().clone()
    }
}

impl PreferenceSurface for RecordingSurface {
    fn apply_theme(&self, theme: Theme) {
        self.theme.set(Some(theme));
        self.applies.set(self.applies.get() + 1);
    }

    fn apply_font_size(&self, size: FontSize) {
        self.font_size.set(Some(size));
        self.applies.set(self.applies.get() + 1);
    }

    fn notify(&self, event: &PreferenceEvent) {
        self.events.borrow_mut().push(*event);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SequenceCall {
    Mount,
    Render(SequencePosition),
    ItemExit,
    Close,
    Unmount,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingSequenceView {
    calls: Rc<RefCell<Vec<SequenceCall>>>,
}

impl RecordingSequenceView {
    pub(crate) fn calls(&self) -> Vec<SequenceCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn renders(&self) -> usize {
        self.count(|call| matches!(call, SequenceCall::Render(_)))
    }

    pub(crate) fn mounts(&self) -> usize {
        self.count(|call| *call == SequenceCall::Mount)
    }

    pub(crate) fn last_position(&self) -> Option<SequencePosition> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            SequenceCall::Render(position) => Some(*position),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&SequenceCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| pred(call)).count()
    }
}

impl SequenceView for RecordingSequenceView {
    fn mount(&mut self) {
        self.calls.borrow_mut().push(SequenceCall::Mount);
    }

    fn render(&mut self, _item: &SequenceItem, position: SequencePosition) {
        self.calls.borrow_mut().push(SequenceCall::Render(position));
    }

    fn play_item_exit(&mut self) {
        self.calls.borrow_mut().push(SequenceCall::ItemExit);
    }

    fn play_close(&mut self) {
        self.calls.borrow_mut().push(SequenceCall::Close);
    }

    fn unmount(&mut self) {
        self.calls.borrow_mut().push(SequenceCall::Unmount);
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingTriggerView {
    watched: Rc<RefCell<Vec<MarkerId>>>,
    unwatched: Rc<RefCell<Vec<MarkerId>>>,
    presented: Rc<RefCell<Vec<String>>>,
    removals: Rc<Cell<usize>>,
}

impl RecordingTriggerView {
    pub(crate) fn watched(&self) -> Vec<MarkerId> {
        self.watched.borrow().clone()
    }

    pub(crate) fn unwatched(&self) -> Vec<MarkerId> {
        self.unwatched.borrow().clone()
    }

    pub(crate) fn presented(&self) -> Vec<String> {
        self.presented.borrow().clone()
    }

    pub(crate) fn removals(&self) -> usize {
        self.removals.get()
    }

    pub(crate) fn visible(&self) -> usize {
        self.presented.borrow().len() - self.removals.get()
    }
}

impl TriggerView for RecordingTriggerView {
    fn watch(&mut self, marker: MarkerId) {
        self.watched.borrow_mut().push(marker);
    }

    fn unwatch(&mut self, marker: MarkerId) {
        self.unwatched.borrow_mut().push(marker);
    }

    fn present(&mut self, descriptor: &TriggerDescriptor) {
        let label = descriptor
            .image_src
            .clone()
            .or_else(|| descriptor.markup.as_ref().map(|markup| markup.raw().to_string()))
            .unwrap_or_default();
        self.presented.borrow_mut().push(label);
    }

    fn play_dismiss(&mut self) {}

    fn remove(&mut self) {
        self.removals.set(self.removals.get() + 1);
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingViewerView {
    built: Rc<Cell<usize>>,
    destroyed: Rc<Cell<usize>>,
}

impl RecordingViewerView {
    pub(crate) fn live(&self) -> usize {
        self.built.get() - self.destroyed.get()
    }
}

impl ViewerView for RecordingViewerView {
    fn build(&mut self, _descriptor: &DocumentDescriptor) {
        self.built.set(self.built.get() + 1);
    }

    fn play_close(&mut self) {}

    fn destroy(&mut self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingGalleryView {
    mounts: Rc<Cell<usize>>,
    unmounts: Rc<Cell<usize>>,
    last_page: Rc<Cell<Option<usize>>>,
}

impl RecordingGalleryView {
    pub(crate) fn mounts(&self) -> usize {
        self.mounts.get()
    }

    pub(crate) fn unmounts(&self) -> usize {
        self.unmounts.get()
    }

    pub(crate) fn last_page(&self) -> Option<usize> {
        self.last_page.get()
    }
}

impl GalleryView for RecordingGalleryView {
    fn mount(&mut self, state: &GalleryState) {
        self.mounts.set(self.mounts.get() + 1);
        self.last_page.set(Some(state.current()));
    }

    fn show_page(&mut self, state: &GalleryState) {
        self.last_page.set(Some(state.current()));
    }

    fn play_close(&mut self) {}

    fn unmount(&mut self) {
        self.unmounts.set(self.unmounts.get() + 1);
    }
}
