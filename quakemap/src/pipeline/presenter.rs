//! Presentation boundary.
//!
//! The map widget (or any other view) lives behind [`PresentationAdapter`].
//! The pipeline drives it; it never reaches into pipeline state.

use std::ops::{Deref, DerefMut};

use crate::record::EventRecord;

/// Callback invoked when the user selects a marker.
pub type MarkerSelectedCallback = Box<dyn FnMut(&EventRecord) + Send>;

/// Rendering collaborator for a filtered batch.
pub trait PresentationAdapter {
    /// Draws one marker (and radius overlay) per record.
    fn render_markers(&mut self, records: &[EventRecord]);

    /// Removes every marker drawn so far.
    fn clear_markers(&mut self);

    /// Moves the view so every record is visible.
    fn fit_view_to_records(&mut self, records: &[EventRecord]);

    /// Registers the handler for marker selection.
    fn on_marker_selected(&mut self, callback: MarkerSelectedCallback);

    /// Shows a user-visible failure message.
    fn show_error(&mut self, message: &str);

    /// Shows the "no results" state.
    fn show_no_results(&mut self);

    fn show_loading(&mut self) {}

    fn hide_loading(&mut self) {}
}

/// Scoped loading state.
///
/// Calls [`PresentationAdapter::show_loading`] on creation and
/// [`PresentationAdapter::hide_loading`] when dropped, whatever the
/// outcome of the work in between. Derefs to the adapter.
pub struct LoadingGuard<'a, P: PresentationAdapter + ?Sized> {
    adapter: &'a mut P,
}

impl<'a, P: PresentationAdapter + ?Sized> LoadingGuard<'a, P> {
    pub fn new(adapter: &'a mut P) -> Self {
        adapter.show_loading();
        Self { adapter }
    }
}

impl<P: PresentationAdapter + ?Sized> Deref for LoadingGuard<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.adapter
    }
}

impl<P: PresentationAdapter + ?Sized> DerefMut for LoadingGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.adapter
    }
}

impl<P: PresentationAdapter + ?Sized> Drop for LoadingGuard<'_, P> {
    fn drop(&mut self) {
        self.adapter.hide_loading();
    }
}
