//! Ordered set of registered sources.

use std::collections::HashMap;
use std::path::Path;

use reelcut_media_model::{MediaInput, MediaType};

use crate::graph::OwnerId;

/// Sources keyed by owner id. Registration order decides input indices.
#[derive(Debug, Clone, Default)]
pub struct InputRegistry {
    entries: Vec<(OwnerId, MediaInput)>,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source, returning its owner id. Registering the same path
    /// and type again returns the existing id without adding an entry.
    pub fn register(&mut self, input: MediaInput) -> OwnerId {
        if let Some(owner) = self.owner_of(&input.path, input.media_type) {
            return owner.clone();
        }

        let key = input.path.to_string_lossy().into_owned();
        let mut salt = 0;
        let mut owner = OwnerId::derive(&key, salt);
        while self.get(&owner).is_some() {
            salt += 1;
            owner = OwnerId::derive(&key, salt);
        }

        tracing::debug!(owner = %owner, path = %input.path.display(), media_type = input.media_type.as_str(), "Registered input");
        self.entries.push((owner.clone(), input));
        owner
    }

    pub fn owner_of(&self, path: &Path, media_type: MediaType) -> Option<&OwnerId> {
        self.entries
            .iter()
            .find(|(_, input)| input.path == path && input.media_type == media_type)
            .map(|(owner, _)| owner)
    }

    pub fn get(&self, owner: &OwnerId) -> Option<&MediaInput> {
        self.entries
            .iter()
            .find(|(id, _)| id == owner)
            .map(|(_, input)| input)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&OwnerId, &MediaInput)> {
        self.entries.iter().map(|(owner, input)| (owner, input))
    }

    /// Owner to input index, following registration order.
    pub fn indices(&self) -> HashMap<OwnerId, usize> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, (owner, _))| (owner.clone(), index))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether every registered source is a still image.
    pub fn all_images(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|(_, input)| input.is_image())
    }
}
