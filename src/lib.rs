//! # Smarter Images
//!
//! Responsive image swapping driven by viewport width. Each managed element
//! declares a source token; on every load or resize signal the viewport
//! width is mapped to a breakpoint zone and each element is re-pointed at
//! an image sized for that zone.
//!
//! # One Pass
//!
//! ```text
//! signal (load | resize, width)
//!   → zone        breakpoints [360, 480, 768] + width 500 → 480
//!   → per element should_swap(upsize_only, max served, zone)
//!                 build_url(strategy, source token, zone)
//!                 apply (write only when the rendering changes)
//!                 on_swap(element, zone)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`zone`] | Breakpoint validation and width → zone resolution |
//! | [`swap`] | The upsize-only gate |
//! | [`url`] | URL strategies, aspect-ratio crop math, idempotent apply |
//! | [`element`] | [`ManagedElement`](element::ManagedElement) host seam and an in-memory element |
//! | [`swapper`] | Recompute passes and their reports |
//! | [`config`] | `smarter-images.toml` loading, layering, and validation |
//! | [`scene`] | Scene files that replay signals against elements |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## No DOM Here
//!
//! The crate never touches a document. Hosts implement
//! [`ManagedElement`](element::ManagedElement) over whatever they render
//! with and call [`Swapper::recompute`](swapper::Swapper::recompute) from
//! their own load and resize handlers. Passes are synchronous and run to
//! completion; successive signals are not coalesced.
//!
//! ## One Strategy, By Construction
//!
//! The URL strategy is a single enum ([`config::Strategy`]), so two
//! strategies can never be enabled at once. Choosing none is allowed and
//! reported per element, leaving elements untouched.
//!
//! ## Errors Stay Local
//!
//! A pass never fails. Per-element problems (no strategy, missing source
//! token) are collected into the [`PassReport`](swapper::PassReport) and,
//! when `logging` is on, emitted through the `log` facade.

pub mod config;
pub mod element;
pub mod output;
pub mod scene;
pub mod swap;
pub mod swapper;
pub mod url;
pub mod zone;

pub use config::{Config, ConfigError, Strategy};
pub use element::{Element, ElementKind, ElementState, ManagedElement};
pub use swapper::{ElementOutcome, PassReport, Signal, Swapper, Trigger};
pub use url::SwapError;
