//! Configuration management for the groovebox router
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.

pub mod watcher;

use crate::error::ConfigError;
use crate::remap::EngineFamily;
use crate::routing::{RoutingEntry, RoutingLayer, RoutingTable, TargetKind, SLOT_COUNT};
use crate::scale::ScaleType;
use crate::state::{
    ChannelFilter, RoutingState, TrackState, DEFAULT_MACRO_COUNT, DEFAULT_ROOT_NOTE,
    DEFAULT_TRACK_COUNT,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::fs;
use tracing::{info, warn};

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default = "default_tracks")]
    pub tracks: Vec<TrackConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routing: Vec<BindingConfig>,
}

/// Session-wide settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub selected_track: usize,
    #[serde(default)]
    pub bank: u8,
    #[serde(default)]
    pub scale: ScaleType,
    #[serde(default = "default_root_note")]
    pub root_note: u8,
    #[serde(default)]
    pub echo_test: bool,
    #[serde(default = "default_macro_count")]
    pub macro_count: usize,
}

/// One sequencer track
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrackConfig {
    pub engine: EngineFamily,
    /// 0 = none, 1-16 = channel, 17 = omni
    #[serde(default = "default_midi_in")]
    pub midi_in: u8,
}

/// A persisted fader/knob assignment
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BindingConfig {
    /// Engine family layer; absent = default layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineFamily>,
    /// 0-3 faders, 4-7 knobs
    pub slot: usize,
    pub target: TargetKind,
    pub id: i32,
    #[serde(default)]
    pub min: f32,
    #[serde(default = "default_max")]
    pub max: f32,
    #[serde(default)]
    pub label: String,
}

impl BindingConfig {
    pub fn layer(&self) -> RoutingLayer {
        self.engine.map_or(RoutingLayer::Default, RoutingLayer::Family)
    }

    fn entry(&self) -> RoutingEntry {
        RoutingEntry::new(self.target, self.id, self.label.clone()).with_range(self.min, self.max)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            selected_track: 0,
            bank: 0,
            scale: ScaleType::default(),
            root_note: default_root_note(),
            echo_test: false,
            macro_count: default_macro_count(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            tracks: default_tracks(),
            routing: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file: {}", path))?;

        info!(
            "Loaded config {} ({} tracks, {} bindings)",
            path,
            config.tracks.len(),
            config.routing.len()
        );
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracks.is_empty() {
            return Err(ConfigError::NoTracks);
        }

        for (track, config) in self.tracks.iter().enumerate() {
            if ChannelFilter::from_raw(config.midi_in).is_none() {
                return Err(ConfigError::InvalidChannel {
                    track,
                    channel: config.midi_in,
                });
            }
        }

        let session = &self.session;
        if session.selected_track >= self.tracks.len() {
            return Err(ConfigError::SelectedTrackOutOfRange {
                selected: session.selected_track,
                tracks: self.tracks.len(),
            });
        }
        if session.root_note > 127 {
            return Err(ConfigError::RootNoteOutOfRange(session.root_note));
        }

        let mut seen = BTreeSet::new();
        for binding in &self.routing {
            self.validate_binding(binding)?;
            if !seen.insert((binding.layer(), binding.slot)) {
                return Err(ConfigError::DuplicateBinding {
                    layer: binding.layer().to_string(),
                    slot: binding.slot,
                });
            }
        }

        Ok(())
    }

    fn validate_binding(&self, binding: &BindingConfig) -> Result<(), ConfigError> {
        if binding.slot >= SLOT_COUNT {
            return Err(ConfigError::SlotOutOfRange {
                label: binding.label.clone(),
                slot: binding.slot,
            });
        }

        if !binding.min.is_finite() || !binding.max.is_finite() || binding.min == binding.max {
            return Err(ConfigError::InvalidRange {
                label: binding.label.clone(),
                min: binding.min,
                max: binding.max,
            });
        }

        let macro_count = self.session.macro_count;
        if binding.target == TargetKind::Macro
            && usize::try_from(binding.id).map_or(true, |index| index >= macro_count)
        {
            return Err(ConfigError::MacroOutOfRange {
                label: binding.label.clone(),
                index: binding.id,
                count: macro_count,
            });
        }

        Ok(())
    }

    /// Routing table built from the persisted bindings
    pub fn routing_table(&self) -> RoutingTable {
        let mut table = RoutingTable::new();
        for binding in &self.routing {
            if table.bind(binding.layer(), binding.slot, binding.entry()).is_err() {
                warn!(
                    "Binding '{}' dropped: slot {} out of range",
                    binding.label, binding.slot
                );
            }
        }
        table
    }

    fn track_state(config: &TrackConfig) -> TrackState {
        TrackState::new(config.engine)
            .with_channel(ChannelFilter::from_raw(config.midi_in).unwrap_or_default())
    }

    /// Fresh session described by this (validated) configuration
    pub fn to_state(&self) -> RoutingState {
        let mut state = RoutingState::with_tracks(self.tracks.iter().map(Self::track_state).collect());
        state.selected_track = self.session.selected_track;
        state.bank = self.session.bank;
        state.macros = vec![0.0; self.session.macro_count];
        self.apply_settings(&mut state);
        state
    }

    /// Apply a reloaded configuration to a running session.
    ///
    /// Replaces tracks' engine and channel, scale, echo flag and the loaded
    /// bindings. Keeps selection, bank, learn session, transport, macro
    /// values, per-track volume/parameters/pattern, and learned bindings on
    /// slots the file leaves unbound.
    pub fn apply_to(&self, state: &mut RoutingState) {
        state.tracks.truncate(self.tracks.len());
        for (index, config) in self.tracks.iter().enumerate() {
            match state.tracks.get_mut(index) {
                Some(track) => {
                    track.engine = config.engine;
                    track.midi_in = ChannelFilter::from_raw(config.midi_in).unwrap_or_default();
                }
                None => state.tracks.push(Self::track_state(config)),
            }
        }

        if state.selected_track >= state.tracks.len() {
            state.selected_track = 0;
        }
        state.macros.resize(self.session.macro_count, 0.0);

        let previous = std::mem::take(&mut state.routing);
        self.apply_settings(state);
        let kept = state.routing.merge_learned(&previous);
        if kept > 0 {
            info!("Kept {} learned binding(s) across reload", kept);
        }
    }

    fn apply_settings(&self, state: &mut RoutingState) {
        state.scale = self.session.scale;
        state.root_note = self.session.root_note;
        state.echo_test = self.session.echo_test;
        state.routing = self.routing_table();
    }
}

fn default_tracks() -> Vec<TrackConfig> {
    (0..DEFAULT_TRACK_COUNT)
        .map(|i| TrackConfig {
            engine: EngineFamily::default_for_track(i),
            midi_in: default_midi_in(),
        })
        .collect()
}
fn default_root_note() -> u8 { DEFAULT_ROOT_NOTE }
fn default_macro_count() -> usize { DEFAULT_MACRO_COUNT }
fn default_midi_in() -> u8 { crate::midi::OMNI_CHANNEL }
fn default_max() -> f32 { 1.0 }

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXAMPLE: &str = r#"
session:
  selected_track: 1
  scale: dorian
  root_note: 50
  macro_count: 4

tracks:
  - engine: subtractive
  - engine: fm
    midi_in: 2
  - engine: fm_drum
    midi_in: 0

routing:
  - slot: 4
    target: global_effect
    id: 3
    label: Delay
  - engine: fm
    slot: 0
    target: track_parameter
    id: 12
    min: 0.2
    max: 0.8
    label: Ratio
  - engine: fm
    slot: 1
    target: macro
    id: 3
    label: Macro 4
"#;

    fn binding(slot: usize, target: TargetKind, id: i32) -> BindingConfig {
        BindingConfig {
            engine: None,
            slot,
            target,
            id,
            min: 0.0,
            max: 1.0,
            label: "test".to_string(),
        }
    }

    #[test]
    fn test_default_config_matches_default_session() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let state = config.to_state();
        let fresh = RoutingState::new();
        assert_eq!(state.tracks, fresh.tracks);
        assert_eq!(state.pad_scale(), fresh.pad_scale());
        assert_eq!(state.macros.len(), DEFAULT_MACRO_COUNT);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_parse_example() {
        let config = AppConfig::from_yaml(EXAMPLE).unwrap();
        let state = config.to_state();

        assert_eq!(state.tracks.len(), 3);
        assert_eq!(state.selected_track, 1);
        assert_eq!(state.scale, ScaleType::Dorian);
        assert_eq!(state.root_note, 50);
        assert_eq!(state.macros.len(), 4);
        assert_eq!(state.tracks[0].midi_in, ChannelFilter::Omni);
        assert_eq!(state.tracks[1].midi_in, ChannelFilter::Channel(2));
        assert_eq!(state.tracks[2].midi_in, ChannelFilter::None);

        assert_eq!(state.routing.len(), 3);
        let ratio = state.routing.get(RoutingLayer::Family(EngineFamily::Fm), 0).unwrap();
        assert_eq!(ratio.target_id, 12);
        assert_eq!((ratio.min, ratio.max), (0.2, 0.8));
        assert!(state.routing.get(RoutingLayer::Default, 4).is_some());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = AppConfig::default();
        config.tracks[3].midi_in = 18;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidChannel { track: 3, channel: 18 })
        );

        let mut config = AppConfig::default();
        config.session.selected_track = 8;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SelectedTrackOutOfRange { selected: 8, tracks: 8 })
        ));

        let mut config = AppConfig::default();
        config.session.root_note = 200;
        assert_eq!(config.validate(), Err(ConfigError::RootNoteOutOfRange(200)));

        let mut config = AppConfig::default();
        config.tracks.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoTracks));
    }

    #[test]
    fn test_binding_validation() {
        let mut config = AppConfig::default();
        config.routing = vec![binding(8, TargetKind::TrackParameter, 1)];
        assert!(matches!(config.validate(), Err(ConfigError::SlotOutOfRange { slot: 8, .. })));

        let mut flat = binding(0, TargetKind::TrackParameter, 1);
        flat.max = 0.0;
        config.routing = vec![flat];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange { .. })));

        config.routing = vec![binding(0, TargetKind::Macro, 6)];
        assert!(matches!(config.validate(), Err(ConfigError::MacroOutOfRange { index: 6, .. })));

        config.routing = vec![binding(0, TargetKind::Macro, -1)];
        assert!(matches!(config.validate(), Err(ConfigError::MacroOutOfRange { .. })));

        config.routing = vec![
            binding(2, TargetKind::GlobalEffect, 1),
            binding(2, TargetKind::GlobalEffect, 2),
        ];
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateBinding { slot: 2, .. })));

        // inverted ranges are allowed
        let mut inverted = binding(0, TargetKind::GlobalEffect, 1);
        inverted.min = 1.0;
        inverted.max = 0.0;
        config.routing = vec![inverted];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        assert!(AppConfig::from_yaml("tracks: [{ engine: theremin }]").is_err());
        assert!(AppConfig::from_yaml("tracks: []").is_err());
    }

    #[test]
    fn test_apply_to_keeps_transient_state() {
        let mut state = RoutingState::new();
        state.selected_track = 2;
        state.bank = 3;
        state.macros[1] = 0.7;
        state.tracks[2].volume = 0.1;
        state.learn.toggle();

        let config = AppConfig::from_yaml(EXAMPLE).unwrap();
        config.apply_to(&mut state);

        assert_eq!(state.tracks.len(), 3);
        assert_eq!(state.selected_track, 2);
        assert_eq!(state.bank, 3);
        assert_eq!(state.macros, vec![0.0, 0.7, 0.0, 0.0]);
        assert_eq!(state.tracks[2].volume, 0.1);
        assert_eq!(state.tracks[2].engine, EngineFamily::FmDrum);
        assert!(state.learn.is_active());
        assert_eq!(state.scale, ScaleType::Dorian);
        assert_eq!(state.routing.len(), 3);
    }

    #[test]
    fn test_apply_to_keeps_learned_bindings() {
        use crate::command::Command;
        use crate::learn::LearnTarget;

        let mut state = RoutingState::new();
        state.apply(&Command::ToggleLearnMode);
        state.arm_learn(LearnTarget::new(TargetKind::TrackParameter, 9, "Drive"));
        state.apply(&Command::LearnSelect { strip: 2 });

        let layer = RoutingLayer::Family(EngineFamily::Subtractive);
        assert!(state.routing.is_learned(layer, 2));

        AppConfig::default().apply_to(&mut state);
        let entry = state.routing.get(layer, 2).expect("learned binding kept");
        assert_eq!(entry.target_id, 9);
        assert!(state.routing.is_learned(layer, 2));

        // a binding from the file takes the slot over
        let mut config = AppConfig::default();
        config.routing = vec![BindingConfig {
            engine: Some(EngineFamily::Subtractive),
            ..binding(2, TargetKind::GlobalEffect, 4)
        }];
        config.apply_to(&mut state);
        assert_eq!(state.routing.get(layer, 2).unwrap().target_id, 4);
        assert!(!state.routing.is_learned(layer, 2));

        // and once the file drops it, the learned binding is gone too
        AppConfig::default().apply_to(&mut state);
        assert!(state.routing.get(layer, 2).is_none());
    }

    #[test]
    fn test_routing_table_skips_out_of_range_slots() {
        let mut config = AppConfig::default();
        config.routing = vec![binding(9, TargetKind::GlobalEffect, 1), binding(1, TargetKind::GlobalEffect, 2)];
        let table = config.routing_table();
        assert_eq!(table.len(), 1);
        assert!(table.get(RoutingLayer::Default, 1).is_some());
    }

    #[test]
    fn test_apply_to_clamps_selection() {
        let mut state = RoutingState::new();
        state.selected_track = 7;
        AppConfig::from_yaml(EXAMPLE).unwrap().apply_to(&mut state);
        assert_eq!(state.selected_track, 0);
    }

    #[tokio::test]
    async fn test_load_and_save_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("groovebox.yaml");
        let path = path.to_string_lossy().to_string();

        std::fs::write(&path, EXAMPLE)?;
        let config = AppConfig::load(&path).await?;

        config.save(&path).await?;
        let reloaded = AppConfig::load(&path).await?;
        assert_eq!(reloaded, config);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/groovebox.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
