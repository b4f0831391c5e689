use std::collections::HashMap;

use crate::assets::loader::{AssetError, LoadedImage};

/// Handle for one outstanding image load.
///
/// A ticket is only honored while its generation is the tracker's current one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageTicket {
    /// Image reference to load.
    pub reference: String,
    /// Render generation the request belongs to.
    pub generation: u64,
    /// Design revision the request was made for.
    pub revision: u64,
}

/// What happened to a delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Stored for the current render.
    Accepted,
    /// Belonged to an older render and was dropped.
    Stale,
    /// Not requested by the current render.
    Unknown,
}

/// Tags image loads with a monotonically increasing generation.
///
/// Every render starts a new generation and forgets the previous one's results, so a late
/// decode from an earlier render can never attach its image to the current scene.
#[derive(Debug, Default)]
pub struct ImageRequestTracker {
    generation: u64,
    revision: u64,
    requested: Vec<String>,
    delivered: HashMap<String, Result<LoadedImage, AssetError>>,
}

impl ImageRequestTracker {
    /// Empty tracker at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Design revision the current generation was issued for.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Start a new generation requesting `references`; duplicates are requested once.
    pub fn begin<'r>(
        &mut self,
        revision: u64,
        references: impl IntoIterator<Item = &'r str>,
    ) -> Vec<ImageTicket> {
        self.generation += 1;
        self.revision = revision;
        self.requested.clear();
        self.delivered.clear();
        for r in references {
            if !self.requested.iter().any(|x| x == r) {
                self.requested.push(r.to_string());
            }
        }
        tracing::debug!(
            generation = self.generation,
            revision,
            images = self.requested.len(),
            "image requests issued"
        );
        self.requested
            .iter()
            .map(|reference| ImageTicket {
                reference: reference.clone(),
                generation: self.generation,
                revision,
            })
            .collect()
    }

    /// Record the result of a load.
    pub fn deliver(
        &mut self,
        ticket: &ImageTicket,
        result: Result<LoadedImage, AssetError>,
    ) -> Delivery {
        if ticket.generation != self.generation {
            tracing::warn!(
                reference = %ticket.reference,
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                ticket_revision = ticket.revision,
                current_revision = self.revision,
                "discarding stale image delivery"
            );
            return Delivery::Stale;
        }
        if !self.requested.iter().any(|r| *r == ticket.reference) {
            tracing::warn!(
                reference = %ticket.reference,
                "delivery for an image that was not requested"
            );
            return Delivery::Unknown;
        }
        if let Err(e) = &result {
            tracing::warn!(reference = %ticket.reference, error = %e, "image load failed");
        }
        self.delivered.insert(ticket.reference.clone(), result);
        Delivery::Accepted
    }

    /// Result delivered for `reference` in the current generation.
    ///
    /// `None` while the load is still outstanding.
    pub fn get(&self, reference: &str) -> Option<&Result<LoadedImage, AssetError>> {
        self.delivered.get(reference)
    }

    /// Whether every requested image has been delivered.
    pub fn is_complete(&self) -> bool {
        self.requested.iter().all(|r| self.delivered.contains_key(r))
    }

    /// References still outstanding.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.requested
            .iter()
            .filter(|r| !self.delivered.contains_key(*r))
            .map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/requests.rs"]
mod tests;
