//! Filtergraph construction state.
//!
//! Filters are buffered per channel as bare expressions and folded into a
//! tagged [`Fragment`] on [`FilterGraph::materialize`]. Pads are structured
//! [`PadRef`] values that name their owning source; owners are replaced by
//! numeric input indices only at resolution time.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use reelcut_common::error::{ReelcutError, ReelcutResult};

/// Short per-source key (six hex digits) used until input indices are known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Derive an id from a path, mixing in `salt` on collisions.
    pub fn derive(path: &str, salt: u32) -> Self {
        let seed = if salt == 0 {
            path.to_string()
        } else {
            format!("{path}#{salt}")
        };
        Self(format!("{:06x}", fnv1a_64(&seed) & 0x00ff_ffff))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn fnv1a_64(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in input.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Stream channel of a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Audio,
    Video,
}

impl Channel {
    pub fn as_char(self) -> char {
        match self {
            Channel::Audio => 'a',
            Channel::Video => 'v',
        }
    }
}

/// A filtergraph edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PadRef {
    /// The raw stream of an input file (`[N:a]` once resolved).
    Raw { owner: OwnerId, channel: Channel },
    /// An intermediate pad produced by a fragment (`[N_serial:a]`).
    Node {
        owner: OwnerId,
        serial: u64,
        channel: Channel,
    },
}

impl PadRef {
    pub fn raw(owner: OwnerId, channel: Channel) -> Self {
        PadRef::Raw { owner, channel }
    }

    pub fn owner(&self) -> &OwnerId {
        match self {
            PadRef::Raw { owner, .. } | PadRef::Node { owner, .. } => owner,
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            PadRef::Raw { channel, .. } | PadRef::Node { channel, .. } => *channel,
        }
    }

    /// Render with the owner written as a `{owner}` placeholder.
    pub fn placeholder(&self) -> String {
        self.render_with(&format!("{{{}}}", self.owner()))
    }

    /// Render with the owner replaced by its input index.
    pub fn resolve(&self, indices: &HashMap<OwnerId, usize>) -> ReelcutResult<String> {
        let index = indices.get(self.owner()).ok_or_else(|| {
            ReelcutError::internal(format!("unresolved input owner {}", self.owner()))
        })?;
        Ok(self.render_with(&index.to_string()))
    }

    fn render_with(&self, owner: &str) -> String {
        match self {
            PadRef::Raw { channel, .. } => format!("[{owner}:{}]", channel.as_char()),
            PadRef::Node {
                serial, channel, ..
            } => format!("[{owner}_{serial}:{}]", channel.as_char()),
        }
    }
}

/// One filtergraph clause: `inputs + filter + output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub inputs: Vec<PadRef>,
    pub filter: String,
    pub output: PadRef,
}

impl Fragment {
    pub fn channel(&self) -> Channel {
        self.output.channel()
    }

    pub fn placeholder(&self) -> String {
        let inputs: String = self.inputs.iter().map(PadRef::placeholder).collect();
        format!("{inputs}{}{}", self.filter, self.output.placeholder())
    }

    pub fn resolve(&self, indices: &HashMap<OwnerId, usize>) -> ReelcutResult<String> {
        let mut text = String::new();
        for input in &self.inputs {
            text.push_str(&input.resolve(indices)?);
        }
        text.push_str(&self.filter);
        text.push_str(&self.output.resolve(indices)?);
        Ok(text)
    }
}

/// Hands out node pads with a strictly increasing counter per owner.
#[derive(Debug, Clone, Default)]
pub struct PadAllocator {
    counters: HashMap<OwnerId, u64>,
}

impl PadAllocator {
    pub fn next(&mut self, owner: &OwnerId, channel: Channel) -> PadRef {
        let counter = self.counters.entry(owner.clone()).or_insert(0);
        let serial = *counter;
        *counter += 1;
        PadRef::Node {
            owner: owner.clone(),
            serial,
            channel,
        }
    }
}

/// Snapshot returned by [`FilterGraph::materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub fragments: Vec<Fragment>,
    pub audio_out: Option<PadRef>,
    pub video_out: Option<PadRef>,
}

/// Per-source graph state: channel buffers, emitted fragments and the
/// current output pad of each channel.
#[derive(Debug, Clone)]
pub struct FilterGraph {
    owner: OwnerId,
    allocator: PadAllocator,
    audio_buffer: Vec<String>,
    video_buffer: Vec<String>,
    audio_out: Option<PadRef>,
    video_out: Option<PadRef>,
    fragments: Vec<Fragment>,
}

impl FilterGraph {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            allocator: PadAllocator::default(),
            audio_buffer: Vec::new(),
            video_buffer: Vec::new(),
            audio_out: None,
            video_out: None,
            fragments: Vec::new(),
        }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn append_audio(&mut self, expr: impl Into<String>) {
        self.audio_buffer.push(expr.into());
    }

    pub fn append_video(&mut self, expr: impl Into<String>) {
        self.video_buffer.push(expr.into());
    }

    pub fn append(&mut self, channel: Channel, expr: impl Into<String>) {
        match channel {
            Channel::Audio => self.append_audio(expr),
            Channel::Video => self.append_video(expr),
        }
    }

    pub fn pending(&self, channel: Channel) -> &[String] {
        match channel {
            Channel::Audio => &self.audio_buffer,
            Channel::Video => &self.video_buffer,
        }
    }

    pub fn output(&self, channel: Channel) -> Option<&PadRef> {
        match channel {
            Channel::Audio => self.audio_out.as_ref(),
            Channel::Video => self.video_out.as_ref(),
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The pad the next step on `channel` reads from.
    fn current_input(&self, channel: Channel) -> PadRef {
        self.output(channel)
            .cloned()
            .unwrap_or_else(|| PadRef::raw(self.owner.clone(), channel))
    }

    /// Fold one channel's buffer into a fragment. No-op when empty.
    fn flush(&mut self, channel: Channel) {
        let buffer = match channel {
            Channel::Audio => std::mem::take(&mut self.audio_buffer),
            Channel::Video => std::mem::take(&mut self.video_buffer),
        };
        if buffer.is_empty() {
            return;
        }
        let input = self.current_input(channel);
        let output = self.allocator.next(&self.owner, channel);
        self.emit(Fragment {
            inputs: vec![input],
            filter: buffer.join(","),
            output,
        });
    }

    fn emit(&mut self, fragment: Fragment) {
        let output = fragment.output.clone();
        match output.channel() {
            Channel::Audio => self.audio_out = Some(output),
            Channel::Video => self.video_out = Some(output),
        }
        self.fragments.push(fragment);
    }

    /// Push a step that reads the current pad plus `extra` inputs, such as
    /// another source's raw stream. Pending filters on the channel are
    /// flushed first so ordering is preserved.
    pub fn push_joined(&mut self, channel: Channel, extra: Vec<PadRef>, filter: impl Into<String>) {
        self.flush(channel);
        let mut inputs = vec![self.current_input(channel)];
        inputs.extend(extra);
        let output = self.allocator.next(&self.owner, channel);
        self.emit(Fragment {
            inputs,
            filter: filter.into(),
            output,
        });
    }

    /// Flush audio then video and return the current structural state.
    pub fn materialize(&mut self) -> Materialized {
        self.flush(Channel::Audio);
        self.flush(Channel::Video);
        tracing::debug!(
            fragments = self.fragments.len(),
            audio_out = ?self.audio_out.as_ref().map(PadRef::placeholder),
            video_out = ?self.video_out.as_ref().map(PadRef::placeholder),
            "Materialized filter graph"
        );
        Materialized {
            fragments: self.fragments.clone(),
            audio_out: self.audio_out.clone(),
            video_out: self.video_out.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::derive("clip.mp4", 0)
    }

    #[test]
    fn test_owner_id_is_six_hex_digits() {
        let id = owner();
        assert_eq!(id.as_str().len(), 6);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, OwnerId::derive("clip.mp4", 0));
        assert_ne!(id, OwnerId::derive("clip.mp4", 1));
    }

    #[test]
    fn test_allocator_counts_per_owner() {
        let mut alloc = PadAllocator::default();
        let a = owner();
        let b = OwnerId::derive("other.png", 0);
        let first = alloc.next(&a, Channel::Audio);
        let second = alloc.next(&a, Channel::Video);
        let other = alloc.next(&b, Channel::Video);
        assert_eq!(first.placeholder(), format!("[{{{a}}}_0:a]"));
        assert_eq!(second.placeholder(), format!("[{{{a}}}_1:v]"));
        assert_eq!(other.placeholder(), format!("[{{{b}}}_0:v]"));
    }

    #[test]
    fn test_buffered_filters_collapse_into_one_fragment() {
        let mut graph = FilterGraph::new(owner());
        graph.append_video("eq=brightness=0.1");
        graph.append_video("format=gray");
        let state = graph.materialize();

        assert_eq!(state.fragments.len(), 1);
        let fragment = &state.fragments[0];
        assert_eq!(fragment.filter, "eq=brightness=0.1,format=gray");
        assert_eq!(fragment.inputs, vec![PadRef::raw(owner(), Channel::Video)]);
        assert_eq!(state.video_out.as_ref(), Some(&fragment.output));
        assert!(state.audio_out.is_none());
        assert!(graph.pending(Channel::Video).is_empty());
    }

    #[test]
    fn test_materialize_chains_and_is_idempotent() {
        let mut graph = FilterGraph::new(owner());
        graph.append_audio("volume=2");
        let first = graph.materialize();
        graph.append_audio("areverse");
        let second = graph.materialize();

        assert_eq!(second.fragments.len(), 2);
        assert_eq!(second.fragments[1].inputs[0], first.fragments[0].output);

        let third = graph.materialize();
        assert_eq!(third, second);
    }

    #[test]
    fn test_push_joined_flushes_pending_first() {
        let mut graph = FilterGraph::new(owner());
        let logo = OwnerId::derive("logo.png", 0);
        graph.append_video("scale=1280:-2");
        graph.push_joined(
            Channel::Video,
            vec![PadRef::raw(logo.clone(), Channel::Video)],
            "overlay=x=0:y=0",
        );
        let state = graph.materialize();

        assert_eq!(state.fragments.len(), 2);
        let overlay = &state.fragments[1];
        assert_eq!(overlay.inputs[0], state.fragments[0].output);
        assert_eq!(overlay.inputs[1], PadRef::raw(logo, Channel::Video));
        assert_eq!(state.video_out.as_ref(), Some(&overlay.output));
    }

    #[test]
    fn test_resolve_requires_every_owner() {
        let pad = PadRef::raw(owner(), Channel::Audio);
        let mut indices = HashMap::new();
        assert!(matches!(
            pad.resolve(&indices),
            Err(ReelcutError::Internal { .. })
        ));
        indices.insert(owner(), 0);
        assert_eq!(pad.resolve(&indices).unwrap(), "[0:a]");
    }
}
