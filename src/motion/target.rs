//! Animatable targets and the collaborator traits the controllers drive.
//!
//! Controllers never own DOM nodes. They hold opaque [`NodeId`] handles,
//! read geometry through a [`LayoutProbe`] and write property values through
//! a [`Renderer`].

use std::fmt;

use crate::util::geometry::Rect;

/// Opaque handle to one node owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node, or a homogeneous group of nodes under one root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnimatableTarget {
    /// A single node.
    Node(NodeId),
    /// Every descendant of `root` matching `selector`, e.g. all children
    /// tagged `entrance-item`.
    Group {
        /// Subtree root the members were collected from.
        root: NodeId,
        /// Selector the host used to collect the members.
        selector: String,
        /// Number of members.
        len: usize,
    },
}

impl AnimatableTarget {
    /// A group of `len` members under `root`.
    pub fn group(root: NodeId, selector: impl Into<String>, len: usize) -> Self {
        AnimatableTarget::Group {
            root,
            selector: selector.into(),
            len,
        }
    }

    /// The node geometry queries and visibility tracking use.
    pub fn root(&self) -> NodeId {
        match self {
            AnimatableTarget::Node(id) | AnimatableTarget::Group { root: id, .. } => *id,
        }
    }

    /// Number of nodes mutations fan out to.
    pub fn len(&self) -> usize {
        match self {
            AnimatableTarget::Node(_) => 1,
            AnimatableTarget::Group { len, .. } => *len,
        }
    }

    /// Whether the target addresses no nodes at all (an empty group).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handle for member `index` (ignored for single nodes).
    pub fn member(&self, index: usize) -> TargetRef {
        match self {
            AnimatableTarget::Node(id) => TargetRef {
                node: *id,
                item: None,
            },
            AnimatableTarget::Group { root, .. } => TargetRef {
                node: *root,
                item: Some(index),
            },
        }
    }

    /// All member handles in declaration order.
    pub fn members(&self) -> impl Iterator<Item = TargetRef> + '_ {
        (0..self.len()).map(move |i| self.member(i))
    }
}

/// Address of one concrete node: the target root plus the group member index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetRef {
    /// Root node of the target.
    pub node: NodeId,
    /// Member index for group targets.
    pub item: Option<usize>,
}

/// Visual properties the controllers animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Opacity, 0.0 to 1.0.
    Opacity,
    /// Horizontal translation, pixels.
    TranslateX,
    /// Vertical translation, pixels.
    TranslateY,
    /// Uniform scale factor.
    Scale,
    /// Rotation, degrees.
    Rotation,
    /// Glow intensity, 0.0 to 1.0.
    Glow,
}

/// A property animated from one value to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDelta {
    /// Which property.
    pub property: Property,
    /// Value before the animation (the hidden, pre-entrance state).
    pub from: f32,
    /// Value after the animation (the final state).
    pub to: f32,
}

impl PropertyDelta {
    /// Create a delta.
    pub const fn new(property: Property, from: f32, to: f32) -> Self {
        Self { property, from, to }
    }

    /// Value at eased progress `t`.
    #[inline]
    pub fn sample(&self, t: f32) -> f32 {
        self.from + (self.to - self.from) * t
    }
}

/// One property write issued against a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mutation {
    /// Node the write applies to.
    pub target: TargetRef,
    /// Property being written.
    pub property: Property,
    /// New value.
    pub value: f32,
}

/// Rendering collaborator: applies property writes to real nodes.
pub trait Renderer {
    /// Apply one property write.
    fn apply(&mut self, mutation: Mutation);
}

/// Recording renderer, handy for hosts that batch writes per frame.
impl Renderer for Vec<Mutation> {
    fn apply(&mut self, mutation: Mutation) {
        self.push(mutation);
    }
}

/// Geometry collaborator: reads layout synchronously.
pub trait LayoutProbe {
    /// Bounding box of `node` in viewport coordinates, `None` when the node
    /// is not attached.
    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;

    /// Current viewport rectangle.
    fn viewport(&self) -> Rect;
}
