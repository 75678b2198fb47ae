use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A unique identifier for a segment.
/// Assigned sequentially by a [`crate::GenerationContext`], never reused within it.
pub type SegmentId = u32;

/// One drawn unit of the tree, produced by a single `F`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,

    pub start: Vec3,
    pub end: Vec3,

    /// Width at `start`.
    pub start_width: f32,

    /// Width at `end` (`start_width * decay`).
    pub end_width: f32,

    /// The segment that was active when this one was drawn, if any.
    pub parent: Option<SegmentId>,
}

impl Segment {
    /// Distance from `start` to `end`.
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Unit vector from `start` to `end`.
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or_zero()
    }
}

/// The complete, engine-agnostic skeleton of a generated tree.
///
/// Segments are kept in creation order, so every parent precedes its children and
/// the slice can be walked front to back to instantiate a scene hierarchy.
/// Leaf flags are derived once when the skeleton is built.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct TreeSkeleton {
    segments: Vec<Segment>,
    index: HashMap<SegmentId, usize>,
    leaf: Vec<bool>,
}

impl TreeSkeleton {
    /// Creates an empty skeleton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a skeleton from segments in creation order and derives the leaf tags.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let index: HashMap<SegmentId, usize> = segments
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();

        let mut leaf = vec![true; segments.len()];
        for segment in &segments {
            if let Some(parent) = segment.parent
                && let Some(&i) = index.get(&parent)
            {
                leaf[i] = false;
            }
        }

        Self {
            segments,
            index,
            leaf,
        }
    }

    /// All segments in creation order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Hands the segments over to the caller, dropping the derived data.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Looks up a segment by id.
    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.index.get(&id).map(|&i| &self.segments[i])
    }

    /// The parent segment of `id`, if both exist.
    pub fn parent_of(&self, id: SegmentId) -> Option<&Segment> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Direct children of `id`, in creation order.
    pub fn children(&self, id: SegmentId) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.iter().filter(move |s| s.parent == Some(id))
    }

    /// Segments without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.iter().filter(|s| s.parent.is_none())
    }

    /// A segment is a leaf iff no other segment names it as parent.
    /// Unknown ids are not leaves.
    pub fn is_leaf(&self, id: SegmentId) -> bool {
        self.index.get(&id).is_some_and(|&i| self.leaf[i])
    }

    /// Leaf segments, in creation order.
    pub fn leaves(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segments
            .iter()
            .zip(&self.leaf)
            .filter_map(|(s, &leaf)| leaf.then_some(s))
    }

    /// Number of ancestors above `id` (roots have depth 0).
    pub fn depth(&self, id: SegmentId) -> Option<usize> {
        let mut current = self.get(id)?;
        let mut depth = 0;
        while let Some(parent) = current.parent.and_then(|p| self.get(p)) {
            depth += 1;
            // Cycles can only come from hand-built or deserialized input.
            if depth > self.segments.len() {
                return None;
            }
            current = parent;
        }
        Some(depth)
    }
}

impl From<Vec<Segment>> for TreeSkeleton {
    fn from(segments: Vec<Segment>) -> Self {
        Self::from_segments(segments)
    }
}

impl From<TreeSkeleton> for Vec<Segment> {
    fn from(tree: TreeSkeleton) -> Self {
        tree.segments
    }
}
