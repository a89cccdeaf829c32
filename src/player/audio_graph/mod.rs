// SPDX-License-Identifier: MPL-2.0
//! Audio processing graph bound to one media element.
//!
//! The graph is `source -> gain -> analyser -> destination`. A source node
//! can only be created once per concrete element, so [`AudioGraph::attach`]
//! is idempotent for the element already bound and rebuilds only when the
//! element itself changes.
//!
//! When the platform has no audio API the graph is built without a context
//! and every operation passes straight through to the media element.

mod analyser;

pub use analyser::SoftwareAnalyser;

use crate::error::MediaError;
use crate::player::media::{ElementId, MediaAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioContextState {
    /// Browsers start contexts suspended until a user gesture.
    Suspended,
    Running,
    Closed,
}

/// The platform audio context.
pub trait AudioContextApi {
    fn state(&self) -> AudioContextState;

    fn resume(&mut self);

    /// Creates the source node for `element` and wires the graph.
    fn connect_source(&mut self, element: ElementId) -> Result<(), MediaError>;

    /// Tears down the source node and its connections.
    fn disconnect(&mut self);

    fn set_gain(&mut self, gain: f32);

    /// Number of frequency bins, half the FFT size.
    fn frequency_bin_count(&self) -> usize;

    /// Fills `out` with the current byte frequency data.
    fn frequency_data(&mut self, out: &mut [u8]);

    /// Decoded PCM for contexts that analyse in software. Platform contexts
    /// tap the element directly and ignore this.
    fn feed(&mut self, _samples: &[f32]) {}
}

/// Proof that a graph is bound to a given element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphHandle {
    element: ElementId,
}

impl GraphHandle {
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }
}

pub struct AudioGraph {
    context: Option<Box<dyn AudioContextApi>>,
    bound: Option<ElementId>,
    sources_created: usize,
    bins: Vec<u8>,
}

impl std::fmt::Debug for AudioGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioGraph")
            .field("available", &self.context.is_some())
            .field("bound", &self.bound)
            .field("sources_created", &self.sources_created)
            .finish()
    }
}

impl AudioGraph {
    #[must_use]
    pub fn new(context: Box<dyn AudioContextApi>) -> Self {
        Self {
            context: Some(context),
            bound: None,
            sources_created: 0,
            bins: Vec::new(),
        }
    }

    /// Pass-through graph for platforms without an audio API.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            context: None,
            bound: None,
            sources_created: 0,
            bins: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.context.is_some()
    }

    /// Source nodes created over the graph's lifetime.
    #[must_use]
    pub fn sources_created(&self) -> usize {
        self.sources_created
    }

    #[must_use]
    pub fn bound_element(&self) -> Option<ElementId> {
        self.bound
    }

    /// Binds the graph to `element`.
    ///
    /// Re-attaching the bound element returns the existing handle. A
    /// different element tears the old source down first. When the context
    /// refuses the source the graph degrades to pass-through.
    pub fn attach(&mut self, element: ElementId) -> Option<GraphHandle> {
        if self.bound == Some(element) {
            return Some(GraphHandle { element });
        }
        let context = self.context.as_mut()?;
        if self.bound.take().is_some() {
            context.disconnect();
        }
        match context.connect_source(element) {
            Ok(()) => {
                self.bound = Some(element);
                self.sources_created += 1;
                tracing::debug!(element = element.0, "audio graph attached");
                Some(GraphHandle { element })
            }
            Err(err) => {
                tracing::warn!(error = %err, "audio graph unavailable, visualizer disabled");
                self.context = None;
                None
            }
        }
    }

    /// Releases the source bound by `handle`. Stale handles are ignored.
    pub fn detach(&mut self, handle: GraphHandle) {
        if self.bound != Some(handle.element) {
            return;
        }
        self.bound = None;
        if let Some(context) = self.context.as_mut() {
            context.disconnect();
        }
        tracing::debug!(element = handle.element.0, "audio graph detached");
    }

    /// Resumes a suspended context, then starts the element.
    pub fn play(&mut self, media: &mut MediaAdapter) -> Result<(), MediaError> {
        if let Some(context) = self.context.as_mut() {
            if context.state() == AudioContextState::Suspended {
                context.resume();
            }
        }
        media.play()
    }

    pub fn pause(&mut self, media: &mut MediaAdapter) {
        media.pause();
    }

    /// Mirrors the element's effective loudness into the gain node.
    pub fn sync_gain(&mut self, volume: f64, muted: bool) {
        if let Some(context) = self.context.as_mut() {
            let gain = if muted || !volume.is_finite() { 0.0 } else { volume as f32 };
            context.set_gain(gain);
        }
    }

    pub fn feed(&mut self, samples: &[f32]) {
        if let Some(context) = self.context.as_mut() {
            context.feed(samples);
        }
    }

    /// Normalized energy of `n` frequency bands, all zero when no graph is
    /// bound.
    pub fn sample_bands(&mut self, n: usize) -> Vec<f32> {
        let Some(context) = self.context.as_mut().filter(|_| self.bound.is_some()) else {
            return vec![0.0; n];
        };
        let bins = context.frequency_bin_count();
        self.bins.resize(bins, 0);
        context.frequency_data(&mut self.bins);
        reduce_bands(&self.bins, n)
    }
}

impl Drop for AudioGraph {
    fn drop(&mut self) {
        if let (Some(context), Some(_)) = (self.context.as_mut(), self.bound) {
            context.disconnect();
        }
    }
}

/// Splits `data` into `n` contiguous ranges of equal width and returns the
/// mean of each range scaled to `[0, 1]`. Trailing bins that do not fill a
/// whole band are left out.
#[must_use]
pub fn reduce_bands(data: &[u8], n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    let width = data.len() / n;
    if width == 0 {
        return vec![0.0; n];
    }
    data.chunks_exact(width)
        .take(n)
        .map(|chunk| {
            let sum: u32 = chunk.iter().map(|&b| u32::from(b)).sum();
            sum as f32 / (chunk.len() as f32 * 255.0)
        })
        .collect()
}
