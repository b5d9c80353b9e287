use std::sync::Arc;

use crate::chat::ChatAssistant;
use crate::reference::ReferenceDataset;
use crate::store::{RecordStore, UserStore};

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub users: Arc<dyn UserStore>,
    pub assistant: Arc<ChatAssistant>,
    pub reference: Arc<ReferenceDataset>,
    pub sample_size: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        users: Arc<dyn UserStore>,
        assistant: ChatAssistant,
        reference: ReferenceDataset,
        sample_size: usize,
    ) -> Self {
        Self {
            store,
            users,
            assistant: Arc::new(assistant),
            reference: Arc::new(reference),
            sample_size,
        }
    }
}
