//! Managed elements: the seam between the swap logic and whatever renders
//! the images.
//!
//! The [`ManagedElement`] trait is everything a pass needs from the host:
//! what kind of node it is, its source token, its rendered box, the value it
//! currently renders, and the small [`ElementState`] record the pass keeps on
//! it between signals. A browser binding would implement the trait over DOM
//! nodes; [`Element`] is the in-memory implementation used by the CLI's
//! scene simulation and by tests.

use serde::{Deserialize, Serialize};

/// What the element renders through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Native image element, rendered through its source attribute.
    Image,
    /// Anything else, rendered through its background-image style.
    Other,
}

impl ElementKind {
    /// Classify by tag name. Only `img` (any case) is an image.
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("img") {
            Self::Image
        } else {
            Self::Other
        }
    }
}

/// Per-element state carried across passes.
///
/// - `max_served_zone`: largest zone evaluated under upsize-only. Never
///   decreases while the policy is active.
/// - `aspect_ratio`: inner width / inner height, computed once and then
///   left alone for the element's lifetime. A cached value that is not
///   positive and finite is discarded and measured again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElementState {
    pub max_served_zone: Option<u32>,
    pub aspect_ratio: Option<f64>,
}

/// Host-side accessors for one element under management.
pub trait ManagedElement {
    fn kind(&self) -> ElementKind;

    /// The logical image identifier, if the element declares one.
    fn source_token(&self) -> Option<&str>;

    /// Rendered inner box as `(width, height)`.
    fn inner_size(&self) -> (f64, f64);

    fn state(&self) -> &ElementState;

    fn state_mut(&mut self) -> &mut ElementState;

    /// Current image source (image elements).
    fn image_source(&self) -> Option<&str>;

    fn set_image_source(&mut self, src: &str);

    /// Current background-image style value, e.g. `url(http://…)`.
    fn background_image(&self) -> Option<&str>;

    fn set_background_image(&mut self, value: &str);

    /// Short human-readable identity for diagnostics.
    fn label(&self) -> String;
}

fn default_tag() -> String {
    "img".to_string()
}

/// In-memory managed element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Element {
    pub id: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Source token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Rendered inner width.
    #[serde(default)]
    pub width: f64,
    /// Rendered inner height.
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default)]
    pub state: ElementState,
}

impl Element {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            source: None,
            width: 0.0,
            height: 0.0,
            src: None,
            background_image: None,
            state: ElementState::default(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_box(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Whatever the element currently renders, regardless of kind.
    pub fn rendered(&self) -> Option<&str> {
        match self.kind() {
            ElementKind::Image => self.src.as_deref(),
            ElementKind::Other => self.background_image.as_deref(),
        }
    }
}

impl ManagedElement for Element {
    fn kind(&self) -> ElementKind {
        ElementKind::from_tag(&self.tag)
    }

    fn source_token(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn inner_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn state(&self) -> &ElementState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    fn image_source(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn set_image_source(&mut self, src: &str) {
        self.src = Some(src.to_string());
    }

    fn background_image(&self) -> Option<&str> {
        self.background_image.as_deref()
    }

    fn set_background_image(&mut self, value: &str) {
        self.background_image = Some(value.to_string());
    }

    fn label(&self) -> String {
        format!("{}#{}", self.tag, self.id)
    }
}
