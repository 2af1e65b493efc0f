//! Image URL building.
//!
//! The string builders at the top of this module are pure; [`build_url`]
//! adds the element-facing parts (source token lookup, aspect ratio
//! caching) and [`apply`] writes the result only when it changes what the
//! element renders.
//!
//! | Strategy | URL |
//! |---|---|
//! | resize-service | `<protocol><service>.cloudimage.io/s/resize/<zone>/<source>` |
//! | resize-service + aspect | `<protocol><service>.cloudimage.io/s/crop/<zone>x<height>/<source>` |
//! | custom-url | template with `%%size%%` → zone, `%%source%%` → source |
//! | placeholder | `<protocol>placehold.it/<zone>x<zone>` |

use crate::config::{Config, Strategy};
use crate::element::{ElementKind, ManagedElement};
use thiserror::Error;

/// Domain of the resize service; the account id is prefixed as a subdomain.
pub const RESIZE_SERVICE_DOMAIN: &str = "cloudimage.io";

/// Domain of the placeholder generator.
pub const PLACEHOLDER_DOMAIN: &str = "placehold.it";

pub const SIZE_TOKEN: &str = "%%size%%";
pub const SOURCE_TOKEN: &str = "%%source%%";

/// Per-element diagnostics. None of these abort a pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("source token is missing for {element}")]
    MissingSourceToken { element: String },
}

/// A built URL plus any diagnostics raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltUrl {
    pub url: String,
    pub diagnostics: Vec<SwapError>,
}

/// Whether `ratio` can describe a real box: positive and finite.
pub fn is_usable_ratio(ratio: f64) -> bool {
    ratio.is_finite() && ratio > 0.0
}

/// Height that keeps `ratio` (width / height) at `zone` width, rounded down.
///
/// `None` when the ratio is unusable or the height would fall outside
/// `1..=u32::MAX`.
pub fn aspect_height(zone: u32, ratio: f64) -> Option<u32> {
    if !is_usable_ratio(ratio) {
        return None;
    }
    let height = (zone as f64 / ratio).floor();
    if height >= 1.0 && height <= u32::MAX as f64 {
        Some(height as u32)
    } else {
        None
    }
}

/// Resize-service URL. With `height`, the crop form is used.
///
/// # Examples
/// ```
/// # use smarter_images::url::resize_service_url;
/// assert_eq!(
///     resize_service_url("https://", "demo", 768, None, "cat.jpg"),
///     "https://demo.cloudimage.io/s/resize/768/cat.jpg"
/// );
/// assert_eq!(
///     resize_service_url("https://", "demo", 480, Some(320), "cat.jpg"),
///     "https://demo.cloudimage.io/s/crop/480x320/cat.jpg"
/// );
/// ```
pub fn resize_service_url(
    protocol: &str,
    service: &str,
    zone: u32,
    height: Option<u32>,
    source: &str,
) -> String {
    match height {
        Some(h) => format!(
            "{protocol}{service}.{RESIZE_SERVICE_DOMAIN}/s/crop/{zone}x{h}/{source}"
        ),
        None => format!("{protocol}{service}.{RESIZE_SERVICE_DOMAIN}/s/resize/{zone}/{source}"),
    }
}

/// Substitute every `%%size%%` with the zone, then every `%%source%%` with
/// the source token.
pub fn custom_url(template: &str, zone: u32, source: &str) -> String {
    template
        .replace(SIZE_TOKEN, &zone.to_string())
        .replace(SOURCE_TOKEN, source)
}

/// Square placeholder sized to the zone.
pub fn placeholder_url(protocol: &str, zone: u32) -> String {
    format!("{protocol}{PLACEHOLDER_DOMAIN}/{zone}x{zone}")
}

/// Background-image style value for a URL.
pub fn css_url(url: &str) -> String {
    format!("url({url})")
}

/// Return the element's cached aspect ratio, measuring and caching it on
/// first use.
///
/// A box with a zero (or non-finite) dimension gives no ratio and caches
/// nothing, so a later pass can measure again once the element has laid out.
/// A cached ratio that is not positive and finite is discarded and the box
/// measured again.
pub fn ensure_aspect_ratio<E: ManagedElement + ?Sized>(element: &mut E) -> Option<f64> {
    let cached = element.state().aspect_ratio;
    match cached {
        Some(ratio) if is_usable_ratio(ratio) => return Some(ratio),
        Some(_) => element.state_mut().aspect_ratio = None,
        None => {}
    }
    let (width, height) = element.inner_size();
    let ratio = width / height;
    if width > 0.0 && height > 0.0 && is_usable_ratio(ratio) {
        element.state_mut().aspect_ratio = Some(ratio);
        Some(ratio)
    } else {
        None
    }
}

/// Build the URL `config`'s strategy produces for `element` at `zone`.
///
/// A missing source token is reported in [`BuiltUrl::diagnostics`] and
/// substituted with the empty string. Only [`Strategy::None`] fails.
pub fn build_url<E: ManagedElement + ?Sized>(
    config: &Config,
    element: &mut E,
    zone: u32,
) -> Result<BuiltUrl, SwapError> {
    let ratio = if config.maintain_aspect {
        ensure_aspect_ratio(element)
    } else {
        None
    };

    let mut diagnostics = Vec::new();
    let mut source = |element: &E| match element.source_token() {
        Some(token) => token.to_string(),
        None => {
            diagnostics.push(SwapError::MissingSourceToken {
                element: element.label(),
            });
            String::new()
        }
    };

    let url = match &config.strategy {
        Strategy::ResizeService { service } => {
            let height = ratio.and_then(|r| aspect_height(zone, r));
            resize_service_url(&config.protocol, service, zone, height, &source(&*element))
        }
        Strategy::CustomUrl { template } => custom_url(template, zone, &source(&*element)),
        Strategy::Placeholder => placeholder_url(&config.protocol, zone),
        Strategy::None => {
            return Err(SwapError::Configuration(
                "no URL strategy selected".to_string(),
            ));
        }
    };

    Ok(BuiltUrl { url, diagnostics })
}

/// Render `url` on the element unless it already shows it.
///
/// Image elements compare and write their source; everything else compares
/// and writes `url(<url>)` as its background image. Returns whether a
/// write happened.
pub fn apply<E: ManagedElement + ?Sized>(element: &mut E, url: &str) -> bool {
    match element.kind() {
        ElementKind::Image => {
            if element.image_source() == Some(url) {
                return false;
            }
            element.set_image_source(url);
        }
        ElementKind::Other => {
            let value = css_url(url);
            if element.background_image() == Some(value.as_str()) {
                return false;
            }
            element.set_background_image(&value);
        }
    }
    true
}
