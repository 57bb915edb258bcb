//! Browser bindings: the reduced-motion media query, DOM geometry and DOM
//! style writes.
//!
//! Hosts register the elements they want animated with [`DomNodes`] and get
//! back [`NodeId`] handles for the controllers. Each frame they pass a
//! [`DomProbe`] and a [`DomRenderer`] borrowed from the same registry.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, Window};

use crate::motion::preference::MotionPreference;
use crate::motion::target::{
    AnimatableTarget, LayoutProbe, Mutation, NodeId, Property, Renderer,
    TargetRef,
};
use crate::util::geometry::Rect;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Install the console logger and panic hook. Safe to call more than once.
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("console logger already installed");
    }
}

/// Gate backed by the `prefers-reduced-motion` media query, evaluated on
/// every call.
#[derive(Debug, Clone)]
pub struct MediaQueryPreference {
    window: Window,
}

impl MediaQueryPreference {
    /// Gate for `window`.
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    /// Gate for the global window, if there is one.
    pub fn from_global() -> Option<Self> {
        web_sys::window().map(Self::new)
    }

    /// The reduced-motion flag, `None` when the query is unsupported.
    pub fn reduce_motion(&self) -> Option<bool> {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .map(|list| list.matches())
    }
}

impl MotionPreference for MediaQueryPreference {
    fn allowed(&self) -> bool {
        self.reduce_motion() == Some(false)
    }
}

/// Composed transform for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    translate_x: f32,
    translate_y: f32,
    scale: f32,
    rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    fn css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({}) rotate({}deg)",
            self.translate_x, self.translate_y, self.scale, self.rotation
        )
    }
}

/// Registry of animated elements.
#[derive(Debug, Default)]
pub struct DomNodes {
    nodes: FxHashMap<NodeId, HtmlElement>,
    groups: FxHashMap<NodeId, Vec<HtmlElement>>,
    transforms: RefCell<FxHashMap<TargetRef, Transform>>,
    next_id: u64,
}

impl DomNodes {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element and return its handle.
    pub fn register(&mut self, element: HtmlElement) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let _ = self.nodes.insert(id, element);
        id
    }

    /// Collect every descendant of `root` matching `selector` as a group.
    pub fn collect_group(
        &mut self,
        root: NodeId,
        selector: &str,
    ) -> Result<AnimatableTarget, JsValue> {
        let element = self
            .nodes
            .get(&root)
            .ok_or_else(|| JsValue::from_str("unregistered root"))?;
        let list = element.query_selector_all(selector)?;
        let members: Vec<HtmlElement> = (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect();
        let len = members.len();
        let _ = self.groups.insert(root, members);
        Ok(AnimatableTarget::group(root, selector, len))
    }

    /// Forget an element and its group members.
    pub fn unregister(&mut self, id: NodeId) {
        let _ = self.nodes.remove(&id);
        let _ = self.groups.remove(&id);
        self.transforms.borrow_mut().retain(|target, _| target.node != id);
    }

    fn element(&self, target: TargetRef) -> Option<&HtmlElement> {
        match target.item {
            None => self.nodes.get(&target.node),
            Some(i) => self.groups.get(&target.node).and_then(|g| g.get(i)),
        }
    }
}

/// Geometry reads through `getBoundingClientRect` and the window size.
#[derive(Debug, Clone, Copy)]
pub struct DomProbe<'a> {
    window: &'a Window,
    nodes: &'a DomNodes,
}

impl<'a> DomProbe<'a> {
    /// Probe over `nodes` in `window`.
    pub fn new(window: &'a Window, nodes: &'a DomNodes) -> Self {
        Self { window, nodes }
    }
}

impl LayoutProbe for DomProbe<'_> {
    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        let element = self.nodes.nodes.get(&node)?;
        if !element.is_connected() {
            return None;
        }
        let rect = element.get_bounding_client_rect();
        Some(Rect::new(rect.x() as f32, rect.y() as f32, rect.width() as f32, rect.height() as f32))
    }

    fn viewport(&self) -> Rect {
        let size = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
        };
        Rect::new(0.0, 0.0, size(self.window.inner_width()), size(self.window.inner_height()))
    }
}

/// Writes mutations as inline styles: `opacity`, a composed `transform`,
/// and the `--glow` custom property.
#[derive(Debug, Clone, Copy)]
pub struct DomRenderer<'a> {
    nodes: &'a DomNodes,
}

impl<'a> DomRenderer<'a> {
    /// Renderer over `nodes`.
    pub fn new(nodes: &'a DomNodes) -> Self {
        Self { nodes }
    }
}

impl DomRenderer<'_> {
    fn compose(&self, target: TargetRef, update: impl FnOnce(&mut Transform)) -> String {
        let mut transforms = self.nodes.transforms.borrow_mut();
        let transform = transforms.entry(target).or_default();
        update(transform);
        transform.css()
    }
}

impl Renderer for DomRenderer<'_> {
    fn apply(&mut self, mutation: Mutation) {
        let Some(element) = self.nodes.element(mutation.target) else {
            log::trace!("no element for {:?}", mutation.target);
            return;
        };
        let value = mutation.value;
        let target = mutation.target;
        let (name, css) = match mutation.property {
            Property::Opacity => ("opacity", value.to_string()),
            Property::Glow => ("--glow", value.to_string()),
            Property::TranslateX => {
                ("transform", self.compose(target, |t| t.translate_x = value))
            }
            Property::TranslateY => {
                ("transform", self.compose(target, |t| t.translate_y = value))
            }
            Property::Scale => {
                ("transform", self.compose(target, |t| t.scale = value))
            }
            Property::Rotation => {
                ("transform", self.compose(target, |t| t.rotation = value))
            }
        };
        if let Err(e) = element.style().set_property(name, &css) {
            log::warn!("failed to set {name} on {}: {e:?}", mutation.target.node);
        }
    }
}
