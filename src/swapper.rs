//! Recompute passes.
//!
//! A host calls [`Swapper::recompute`] once per load or resize signal. The
//! pass resolves the zone once, then walks every element in order:
//!
//! ```text
//! signal ─▶ zone ─▶ for each element:
//!                     should_swap? ──no──▶ Kept
//!                        │yes
//!                     build_url ──err──▶ Failed (element untouched)
//!                        │
//!                     apply (write only on change)
//!                     record max-served-zone (upsize-only)
//!                     on_swap(element, zone)
//! ```
//!
//! Nothing inside a pass is fatal. Per-element problems land in the
//! returned [`PassReport`] and, with `logging` on, in the log.

use crate::config::{Config, ConfigError};
use crate::element::ManagedElement;
use crate::swap::should_swap;
use crate::url::{SwapError, apply, build_url};
use crate::zone::Breakpoints;
use serde::{Deserialize, Serialize};

/// What prompted a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Load,
    Resize,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Load => f.write_str("load"),
            Trigger::Resize => f.write_str("resize"),
        }
    }
}

/// A trigger together with the viewport width it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Signal {
    pub trigger: Trigger,
    pub width: u32,
}

impl Signal {
    pub fn load(width: u32) -> Self {
        Self {
            trigger: Trigger::Load,
            width,
        }
    }

    pub fn resize(width: u32) -> Self {
        Self {
            trigger: Trigger::Resize,
            width,
        }
    }
}

/// What a pass did to one element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementOutcome {
    /// Upsize-only refused a smaller zone than `served`.
    Kept { served: u32 },
    /// URL built. `written` is false when the element already rendered it.
    Applied { url: String, written: bool },
    /// Nothing could be built; the element was left alone.
    Failed(SwapError),
}

/// Result of one pass over the element collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub signal: Signal,
    pub zone: u32,
    /// One outcome per element, in collection order.
    pub outcomes: Vec<ElementOutcome>,
    /// Non-fatal diagnostics raised while building URLs, with element index.
    pub diagnostics: Vec<(usize, SwapError)>,
}

impl PassReport {
    /// Number of elements whose rendering was actually written.
    pub fn writes(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ElementOutcome::Applied { written: true, .. }))
            .count()
    }
}

/// Drives recompute passes for one configuration.
#[derive(Debug, Clone)]
pub struct Swapper {
    config: Config,
    breakpoints: Breakpoints,
}

impl Swapper {
    /// Validate `config` and get ready for passes.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let breakpoints = config.breakpoints()?;
        if config.logging {
            log::info!(
                "smarter-images initialized: {} zones, strategy {}",
                breakpoints.as_slice().len(),
                config.strategy.name()
            );
        }
        Ok(Self {
            config,
            breakpoints,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// Zone for a viewport width.
    pub fn zone_for(&self, width: u32) -> u32 {
        self.breakpoints.resolve(width)
    }

    /// Run one pass over `elements` for `signal`.
    ///
    /// `on_swap` is called with each element whose gate opened and whose URL
    /// was built, together with the applied zone, whether or not the
    /// rendering actually changed.
    pub fn recompute<E, F>(&self, signal: Signal, elements: &mut [E], mut on_swap: F) -> PassReport
    where
        E: ManagedElement,
        F: FnMut(&E, u32),
    {
        let zone = self.zone_for(signal.width);
        log::debug!(
            "{} at {}px: zone {} across {} elements",
            signal.trigger,
            signal.width,
            zone,
            elements.len()
        );

        let mut outcomes = Vec::with_capacity(elements.len());
        let mut diagnostics = Vec::new();

        for (index, element) in elements.iter_mut().enumerate() {
            let served = element.state().max_served_zone;
            if !should_swap(self.config.upsize_only, served, zone) {
                outcomes.push(ElementOutcome::Kept {
                    served: served.unwrap_or(zone),
                });
                continue;
            }

            let built = match build_url(&self.config, element, zone) {
                Ok(built) => built,
                Err(err) => {
                    self.report(&*element, &err);
                    outcomes.push(ElementOutcome::Failed(err));
                    continue;
                }
            };
            for diagnostic in built.diagnostics {
                self.report(&*element, &diagnostic);
                diagnostics.push((index, diagnostic));
            }

            let written = apply(element, &built.url);
            if self.config.upsize_only {
                element.state_mut().max_served_zone = Some(zone);
            }
            on_swap(&*element, zone);
            outcomes.push(ElementOutcome::Applied {
                url: built.url,
                written,
            });
        }

        PassReport {
            signal,
            zone,
            outcomes,
            diagnostics,
        }
    }

    fn report<E: ManagedElement>(&self, element: &E, err: &SwapError) {
        if self.config.logging {
            log::error!("smarter-images: {} ({})", err, element.label());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use crate::element::tests::{RecordedWrite, RecordingElement};

    fn swapper(breakpoints: &[u32], upsize_only: bool, strategy: Strategy) -> Swapper {
        Swapper::new(Config {
            breakpoints: breakpoints.to_vec(),
            upsize_only,
            strategy,
            ..Config::default()
        })
        .unwrap()
    }

    fn placeholder(upsize_only: bool) -> Swapper {
        swapper(&[360, 480, 768], upsize_only, Strategy::Placeholder)
    }

    #[test]
    fn new_rejects_malformed_breakpoints() {
        let result = Swapper::new(Config {
            breakpoints: vec![480, 360],
            ..Config::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn trigger_parses_lowercase() {
        let signal: Signal = toml::from_str("trigger = \"resize\"\nwidth = 400").unwrap();
        assert_eq!(signal, Signal::resize(400));
        assert_eq!(Trigger::Load.to_string(), "load");
    }

    // =========================================================================
    // upsize-only flow
    // =========================================================================

    #[test]
    fn first_load_swaps_and_records_zone() {
        let s = placeholder(true);
        let mut elements = vec![RecordingElement::image("cat.jpg")];

        let report = s.recompute(Signal::load(500), &mut elements, |_, _| {});
        assert_eq!(report.zone, 480);
        assert_eq!(
            report.outcomes,
            vec![ElementOutcome::Applied {
                url: "http://placehold.it/480x480".into(),
                written: true
            }]
        );
        assert_eq!(elements[0].state.max_served_zone, Some(480));
    }

    #[test]
    fn shrinking_viewport_keeps_larger_image() {
        let s = placeholder(true);
        let mut elements = vec![RecordingElement::image("cat.jpg")];

        s.recompute(Signal::load(500), &mut elements, |_, _| {});
        let report = s.recompute(Signal::resize(400), &mut elements, |_, _| {});

        assert_eq!(report.zone, 360);
        assert_eq!(report.outcomes, vec![ElementOutcome::Kept { served: 480 }]);
        assert_eq!(elements[0].writes.len(), 1);
        assert_eq!(elements[0].state.max_served_zone, Some(480));
    }

    #[test]
    fn growing_viewport_upsizes() {
        let s = placeholder(true);
        let mut elements = vec![RecordingElement::image("cat.jpg")];

        s.recompute(Signal::load(400), &mut elements, |_, _| {});
        s.recompute(Signal::resize(900), &mut elements, |_, _| {});

        assert_eq!(elements[0].state.max_served_zone, Some(768));
        assert_eq!(elements[0].src.as_deref(), Some("http://placehold.it/768x768"));
    }

    #[test]
    fn same_zone_records_without_rewriting() {
        let s = placeholder(true);
        let mut elements = vec![RecordingElement::block("cat.jpg")];

        s.recompute(Signal::load(500), &mut elements, |_, _| {});
        let report = s.recompute(Signal::resize(600), &mut elements, |_, _| {});

        assert_eq!(
            report.outcomes,
            vec![ElementOutcome::Applied {
                url: "http://placehold.it/480x480".into(),
                written: false
            }]
        );
        assert_eq!(report.writes(), 0);
        assert_eq!(
            elements[0].writes,
            vec![RecordedWrite::Background("url(http://placehold.it/480x480)".into())]
        );
    }

    // =========================================================================
    // without upsize-only
    // =========================================================================

    #[test]
    fn downsizes_when_policy_off() {
        let s = placeholder(false);
        let mut elements = vec![RecordingElement::image("cat.jpg")];

        s.recompute(Signal::load(900), &mut elements, |_, _| {});
        s.recompute(Signal::resize(300), &mut elements, |_, _| {});

        assert_eq!(elements[0].src.as_deref(), Some("http://placehold.it/360x360"));
        assert_eq!(elements[0].state.max_served_zone, None);
    }

    // =========================================================================
    // failures and diagnostics
    // =========================================================================

    #[test]
    fn no_strategy_leaves_elements_untouched() {
        let s = swapper(&[360, 480, 768], true, Strategy::None);
        let mut elements = vec![
            RecordingElement::image("a.jpg"),
            RecordingElement::block("b.jpg"),
        ];
        let mut calls = 0;

        let report = s.recompute(Signal::load(500), &mut elements, |_, _| calls += 1);

        assert_eq!(calls, 0);
        assert_eq!(report.outcomes.len(), 2);
        assert!(
            report
                .outcomes
                .iter()
                .all(|o| matches!(o, ElementOutcome::Failed(SwapError::Configuration(_))))
        );
        for el in &elements {
            assert!(el.writes.is_empty());
            assert_eq!(el.state.max_served_zone, None);
        }
    }

    #[test]
    fn missing_source_does_not_block_others() {
        let s = swapper(
            &[360, 480, 768],
            true,
            Strategy::CustomUrl {
                template: "https://cdn/%%size%%/%%source%%".into(),
            },
        );
        let mut elements = vec![
            RecordingElement::image("a.jpg").without_source(),
            RecordingElement::image("b.jpg"),
        ];

        let report = s.recompute(Signal::load(800), &mut elements, |_, _| {});

        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].0, 0);
        assert_eq!(elements[0].src.as_deref(), Some("https://cdn/768/"));
        assert_eq!(elements[1].src.as_deref(), Some("https://cdn/768/b.jpg"));
        assert_eq!(report.writes(), 2);
    }

    // =========================================================================
    // callback
    // =========================================================================

    #[test]
    fn callback_receives_element_and_zone() {
        let s = placeholder(true);
        let mut elements = vec![
            RecordingElement::image("a.jpg"),
            RecordingElement::block("b.jpg"),
        ];
        let mut seen = Vec::new();

        s.recompute(Signal::load(1000), &mut elements, |el, zone| {
            seen.push((el.source.clone(), zone));
        });

        assert_eq!(
            seen,
            vec![(Some("a.jpg".into()), 768), (Some("b.jpg".into()), 768)]
        );
    }

    #[test]
    fn callback_skipped_for_kept_elements() {
        let s = placeholder(true);
        let mut elements = vec![RecordingElement::image("a.jpg")];
        s.recompute(Signal::load(1000), &mut elements, |_, _| {});

        let mut calls = 0;
        s.recompute(Signal::resize(320), &mut elements, |_, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn aspect_ratio_survives_resizes() {
        let s = Swapper::new(Config {
            breakpoints: vec![360, 480, 768],
            maintain_aspect: true,
            strategy: Strategy::ResizeService {
                service: "demo".into(),
            },
            ..Config::default()
        })
        .unwrap();
        let mut elements = vec![RecordingElement::image("cat.jpg").sized(600.0, 400.0)];

        s.recompute(Signal::load(500), &mut elements, |_, _| {});
        elements[0].size = (600.0, 600.0);
        s.recompute(Signal::resize(800), &mut elements, |_, _| {});

        assert_eq!(elements[0].state.aspect_ratio, Some(1.5));
        assert_eq!(
            elements[0].src.as_deref(),
            Some("http://demo.cloudimage.io/s/crop/768x512/cat.jpg")
        );
    }
}
