//! Scene files for driving passes without a browser.
//!
//! A scene lists the managed elements and the ordered viewport signals to
//! replay against them:
//!
//! ```toml
//! [[elements]]
//! id = "hero"
//! tag = "img"
//! source = "cat.jpg"
//! width = 600
//! height = 400
//!
//! [[signals]]
//! trigger = "load"
//! width = 500
//!
//! [[signals]]
//! trigger = "resize"
//! width = 400
//! ```

use crate::element::Element;
use crate::swapper::{PassReport, Signal, Swapper};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scene {
    pub elements: Vec<Element>,
    pub signals: Vec<Signal>,
}

/// A callback firing recorded during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapEvent {
    pub pass: usize,
    pub element: String,
    pub zone: u32,
}

/// Everything a replay produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    pub passes: Vec<PassReport>,
    pub swaps: Vec<SwapEvent>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Run one pass per signal, in order, mutating the scene's elements.
    pub fn replay(&mut self, swapper: &Swapper) -> Replay {
        let mut passes = Vec::with_capacity(self.signals.len());
        let mut swaps = Vec::new();
        for (pass, signal) in self.signals.iter().enumerate() {
            let report = swapper.recompute(*signal, &mut self.elements, |element, zone| {
                swaps.push(SwapEvent {
                    pass,
                    element: element.id.clone(),
                    zone,
                });
            });
            passes.push(report);
        }
        Replay { passes, swaps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Strategy};
    use crate::swapper::ElementOutcome;
    use tempfile::TempDir;

    const SCENE: &str = r#"
[[elements]]
id = "hero"
source = "cat.jpg"

[[elements]]
id = "banner"
tag = "div"
source = "sky.jpg"

[[signals]]
trigger = "load"
width = 500

[[signals]]
trigger = "resize"
width = 400
"#;

    fn placeholder() -> Swapper {
        Swapper::new(Config {
            breakpoints: vec![360, 480, 768],
            strategy: Strategy::Placeholder,
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn parse_scene() {
        let scene: Scene = toml::from_str(SCENE).unwrap();
        assert_eq!(scene.elements.len(), 2);
        assert_eq!(scene.signals, vec![Signal::load(500), Signal::resize(400)]);
    }

    #[test]
    fn empty_scene_is_valid() {
        let scene: Scene = toml::from_str("").unwrap();
        assert!(scene.elements.is_empty());
        assert!(scene.signals.is_empty());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<Scene, _> = toml::from_str("[[events]]\nwidth = 1");
        assert!(result.is_err());
    }

    #[test]
    fn replay_runs_each_signal() {
        let mut scene: Scene = toml::from_str(SCENE).unwrap();
        let replay = scene.replay(&placeholder());

        assert_eq!(replay.passes.len(), 2);
        assert_eq!(replay.passes[0].zone, 480);
        assert_eq!(replay.passes[1].zone, 360);
        assert!(
            replay.passes[1]
                .outcomes
                .iter()
                .all(|o| matches!(o, ElementOutcome::Kept { served: 480 }))
        );
        assert_eq!(
            replay.swaps,
            vec![
                SwapEvent {
                    pass: 0,
                    element: "hero".into(),
                    zone: 480
                },
                SwapEvent {
                    pass: 0,
                    element: "banner".into(),
                    zone: 480
                },
            ]
        );
        assert_eq!(
            scene.elements[1].background_image.as_deref(),
            Some("url(http://placehold.it/480x480)")
        );
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = Scene::load(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(SceneError::Io(_))));
    }

    #[test]
    fn load_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scene.toml");
        fs::write(&path, SCENE).unwrap();
        let scene = Scene::load(&path).unwrap();
        assert_eq!(scene.elements[0].id, "hero");
    }
}
