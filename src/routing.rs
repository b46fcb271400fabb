//! Routing table for faders and knobs
//!
//! Each physical slot (faders 0-3, knobs 4-7) can be bound to a track
//! parameter, a global effect parameter or a macro. Bindings are kept per
//! engine family, with a default layer behind them.

use crate::command::{Command, EngineCall, ParamTarget};
use crate::remap::EngineFamily;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const FADER_COUNT: usize = 4;
pub const KNOB_COUNT: usize = 4;
/// Knob `n` lives in slot `KNOB_SLOT_OFFSET + n`
pub const KNOB_SLOT_OFFSET: usize = FADER_COUNT;
pub const SLOT_COUNT: usize = FADER_COUNT + KNOB_COUNT;

/// Reserved parameter id base for fader UI sync (`-100 - fader`)
pub const FADER_SYNC_BASE: i32 = -100;
/// Reserved parameter id base for knob UI sync (`-200 - knob`)
pub const KNOB_SYNC_BASE: i32 = -200;

type SlotArray = [Option<RoutingEntry>; SLOT_COUNT];

/// UI-sync parameter id of a slot
pub fn ui_sync_parameter(slot: usize) -> Option<i32> {
    if slot < FADER_COUNT {
        Some(FADER_SYNC_BASE - slot as i32)
    } else if slot < SLOT_COUNT {
        Some(KNOB_SYNC_BASE - (slot - KNOB_SLOT_OFFSET) as i32)
    } else {
        None
    }
}

/// Slot of a UI-sync parameter id, if the id is one
pub fn ui_sync_slot(parameter: i32) -> Option<usize> {
    let fader = FADER_SYNC_BASE.checked_sub(parameter)?;
    let knob = KNOB_SYNC_BASE.checked_sub(parameter)?;
    if (0..FADER_COUNT as i32).contains(&fader) {
        Some(fader as usize)
    } else if (0..KNOB_COUNT as i32).contains(&knob) {
        Some(KNOB_SLOT_OFFSET + knob as usize)
    } else {
        None
    }
}

/// Kind of logical target a slot drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Parameter of the selected track
    TrackParameter,
    /// Parameter on the global effect bus
    GlobalEffect,
    /// Macro slot
    Macro,
}

/// Binding of one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingEntry {
    pub target: TargetKind,
    pub target_id: i32,
    #[serde(default)]
    pub min: f32,
    #[serde(default = "default_max")]
    pub max: f32,
    /// Display only
    #[serde(default)]
    pub label: String,
}

fn default_max() -> f32 {
    1.0
}

impl RoutingEntry {
    /// Full-range binding
    pub fn new(target: TargetKind, target_id: i32, label: impl Into<String>) -> Self {
        Self {
            target,
            target_id,
            min: 0.0,
            max: 1.0,
            label: label.into(),
        }
    }

    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Linear rescale of a normalized value into [min, max]
    pub fn scale(&self, value: f32) -> f32 {
        let value = value.clamp(0.0, 1.0);
        self.min + value * (self.max - self.min)
    }
}

/// Which layer of the table a binding lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingLayer {
    /// Used when the family layer leaves the slot unbound
    Default,
    Family(EngineFamily),
}

impl std::fmt::Display for RoutingLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingLayer::Default => write!(f, "default"),
            RoutingLayer::Family(family) => write!(f, "{}", family),
        }
    }
}

/// Result of routing one control movement
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingEffect {
    pub call: EngineCall,
    /// UI sync (macros only)
    pub command: Option<Command>,
}

/// Slot assignments keyed by engine family
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    default: SlotArray,
    families: BTreeMap<EngineFamily, SlotArray>,
    /// Slots bound by learn mode rather than loaded
    learned: BTreeSet<(RoutingLayer, usize)>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn layer(&self, layer: RoutingLayer) -> Option<&SlotArray> {
        match layer {
            RoutingLayer::Default => Some(&self.default),
            RoutingLayer::Family(family) => self.families.get(&family),
        }
    }

    fn layer_mut(&mut self, layer: RoutingLayer) -> &mut SlotArray {
        match layer {
            RoutingLayer::Default => &mut self.default,
            RoutingLayer::Family(family) => self.families.entry(family).or_default(),
        }
    }

    /// Bind a slot, replacing any previous binding.
    ///
    /// Returns the replaced entry, or `Err(entry)` when the slot is out of range.
    pub fn bind(
        &mut self,
        layer: RoutingLayer,
        slot: usize,
        entry: RoutingEntry,
    ) -> Result<Option<RoutingEntry>, RoutingEntry> {
        let replaced = self.bind_slot(layer, slot, entry)?;
        self.learned.remove(&(layer, slot));
        Ok(replaced)
    }

    /// Bind a slot captured by learn mode. Learned bindings survive
    /// `merge_learned` into a reloaded table.
    pub fn bind_learned(
        &mut self,
        layer: RoutingLayer,
        slot: usize,
        entry: RoutingEntry,
    ) -> Result<Option<RoutingEntry>, RoutingEntry> {
        let replaced = self.bind_slot(layer, slot, entry)?;
        self.learned.insert((layer, slot));
        Ok(replaced)
    }

    fn bind_slot(
        &mut self,
        layer: RoutingLayer,
        slot: usize,
        entry: RoutingEntry,
    ) -> Result<Option<RoutingEntry>, RoutingEntry> {
        match self.layer_mut(layer).get_mut(slot) {
            Some(cell) => Ok(cell.replace(entry)),
            None => Err(entry),
        }
    }

    pub fn is_learned(&self, layer: RoutingLayer, slot: usize) -> bool {
        self.learned.contains(&(layer, slot))
    }

    /// Learned bindings, in layer/slot order
    pub fn learned_bindings(&self) -> impl Iterator<Item = (RoutingLayer, usize, &RoutingEntry)> {
        self.learned
            .iter()
            .filter_map(|&(layer, slot)| self.get(layer, slot).map(|entry| (layer, slot, entry)))
    }

    /// Copy learned bindings of `previous` into slots this table leaves unbound.
    ///
    /// Returns how many were carried over.
    pub fn merge_learned(&mut self, previous: &RoutingTable) -> usize {
        let mut merged = 0;
        for (layer, slot, entry) in previous.learned_bindings() {
            if self.get(layer, slot).is_none() && self.bind_learned(layer, slot, entry.clone()).is_ok() {
                merged += 1;
            }
        }
        merged
    }

    /// Remove a binding
    pub fn clear(&mut self, layer: RoutingLayer, slot: usize) -> Option<RoutingEntry> {
        self.learned.remove(&(layer, slot));
        self.layer_mut(layer).get_mut(slot).and_then(Option::take)
    }

    /// Binding in one layer only
    pub fn get(&self, layer: RoutingLayer, slot: usize) -> Option<&RoutingEntry> {
        self.layer(layer)?.get(slot)?.as_ref()
    }

    /// Effective binding for a family: family layer first, then the default layer
    pub fn resolve(&self, family: EngineFamily, slot: usize) -> Option<&RoutingEntry> {
        self.get(RoutingLayer::Family(family), slot)
            .or_else(|| self.get(RoutingLayer::Default, slot))
    }

    /// All bindings, default layer first
    pub fn bindings(&self) -> impl Iterator<Item = (RoutingLayer, usize, &RoutingEntry)> {
        let default = self
            .default
            .iter()
            .enumerate()
            .filter_map(|(slot, e)| e.as_ref().map(|e| (RoutingLayer::Default, slot, e)));
        let families = self.families.iter().flat_map(|(family, slots)| {
            slots.iter().enumerate().filter_map(move |(slot, e)| {
                e.as_ref().map(|e| (RoutingLayer::Family(*family), slot, e))
            })
        });
        default.chain(families)
    }

    pub fn len(&self) -> usize {
        self.bindings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Route a normalized control value through a slot.
    ///
    /// Returns `None` when the slot is unbound or the target index is out of
    /// range (macro index >= `macro_count`, or negative).
    pub fn apply(
        &self,
        slot: usize,
        value: f32,
        family: EngineFamily,
        selected_track: usize,
        macro_count: usize,
    ) -> Option<RoutingEffect> {
        let entry = self.resolve(family, slot)?;
        let scaled = entry.scale(value);

        match entry.target {
            TargetKind::TrackParameter => Some(RoutingEffect {
                call: EngineCall::SetParameter {
                    target: ParamTarget::Track(selected_track),
                    parameter: entry.target_id,
                    value: scaled,
                },
                command: None,
            }),
            TargetKind::GlobalEffect => Some(RoutingEffect {
                call: EngineCall::SetParameter {
                    target: ParamTarget::Global,
                    parameter: entry.target_id,
                    value: scaled,
                },
                command: None,
            }),
            TargetKind::Macro => {
                let index = usize::try_from(entry.target_id)
                    .ok()
                    .filter(|&i| i < macro_count)?;
                Some(RoutingEffect {
                    call: EngineCall::SetMacro { index, value: scaled },
                    command: Some(Command::MacroValue { index, value: scaled }),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(f: EngineFamily) -> RoutingLayer {
        RoutingLayer::Family(f)
    }

    #[test]
    fn test_scale_linear() {
        let entry = RoutingEntry::new(TargetKind::TrackParameter, 3, "Cutoff").with_range(0.2, 0.6);
        assert!((entry.scale(0.0) - 0.2).abs() < 1e-6);
        assert!((entry.scale(0.5) - 0.4).abs() < 1e-6);
        assert!((entry.scale(1.0) - 0.6).abs() < 1e-6);
        assert!((entry.scale(7.0) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_inverted_range() {
        let entry = RoutingEntry::new(TargetKind::GlobalEffect, 1, "Mix").with_range(1.0, 0.0);
        assert!((entry.scale(0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_unbound_slot_has_no_effect() {
        let table = RoutingTable::new();
        assert!(table.apply(0, 0.5, EngineFamily::Fm, 0, 6).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_track_parameter_targets_selected_track() {
        let mut table = RoutingTable::new();
        table
            .bind(family(EngineFamily::Fm), 1, RoutingEntry::new(TargetKind::TrackParameter, 12, "Ratio"))
            .unwrap();

        let effect = table.apply(1, 1.0, EngineFamily::Fm, 4, 6).unwrap();
        assert_eq!(
            effect.call,
            EngineCall::SetParameter { target: ParamTarget::Track(4), parameter: 12, value: 1.0 }
        );
        assert!(effect.command.is_none());
    }

    #[test]
    fn test_bindings_are_per_family() {
        let mut table = RoutingTable::new();
        table
            .bind(family(EngineFamily::Fm), 0, RoutingEntry::new(TargetKind::TrackParameter, 1, "A"))
            .unwrap();

        assert!(table.apply(0, 0.5, EngineFamily::Fm, 0, 6).is_some());
        assert!(table.apply(0, 0.5, EngineFamily::Sampler, 0, 6).is_none());
    }

    #[test]
    fn test_default_layer_fallback() {
        let mut table = RoutingTable::new();
        table
            .bind(RoutingLayer::Default, 5, RoutingEntry::new(TargetKind::GlobalEffect, 40, "Reverb"))
            .unwrap();
        table
            .bind(family(EngineFamily::Wavetable), 5, RoutingEntry::new(TargetKind::TrackParameter, 7, "Pos"))
            .unwrap();

        let fallback = table.apply(5, 0.0, EngineFamily::Sampler, 2, 6).unwrap();
        assert_eq!(
            fallback.call,
            EngineCall::SetParameter { target: ParamTarget::Global, parameter: 40, value: 0.0 }
        );

        let specific = table.apply(5, 0.0, EngineFamily::Wavetable, 2, 6).unwrap();
        assert_eq!(
            specific.call,
            EngineCall::SetParameter { target: ParamTarget::Track(2), parameter: 7, value: 0.0 }
        );
    }

    #[test]
    fn test_macro_emits_ui_sync() {
        let mut table = RoutingTable::new();
        table
            .bind(RoutingLayer::Default, 4, RoutingEntry::new(TargetKind::Macro, 2, "Macro 3").with_range(0.0, 0.5))
            .unwrap();

        let effect = table.apply(4, 1.0, EngineFamily::Subtractive, 0, 6).unwrap();
        assert_eq!(effect.call, EngineCall::SetMacro { index: 2, value: 0.5 });
        assert_eq!(effect.command, Some(Command::MacroValue { index: 2, value: 0.5 }));
    }

    #[test]
    fn test_macro_out_of_range_dropped() {
        let mut table = RoutingTable::new();
        table
            .bind(RoutingLayer::Default, 0, RoutingEntry::new(TargetKind::Macro, 6, "Nope"))
            .unwrap();
        table
            .bind(RoutingLayer::Default, 1, RoutingEntry::new(TargetKind::Macro, -1, "Nope"))
            .unwrap();

        assert!(table.apply(0, 1.0, EngineFamily::Fm, 0, 6).is_none());
        assert!(table.apply(1, 1.0, EngineFamily::Fm, 0, 6).is_none());
    }

    #[test]
    fn test_bind_out_of_range_slot() {
        let mut table = RoutingTable::new();
        let entry = RoutingEntry::new(TargetKind::Macro, 0, "M");
        assert_eq!(table.bind(RoutingLayer::Default, SLOT_COUNT, entry.clone()), Err(entry));
        assert!(table.apply(SLOT_COUNT, 1.0, EngineFamily::Fm, 0, 6).is_none());
    }

    #[test]
    fn test_rebind_replaces_and_clear() {
        let mut table = RoutingTable::new();
        let first = RoutingEntry::new(TargetKind::TrackParameter, 1, "A");
        let second = RoutingEntry::new(TargetKind::TrackParameter, 2, "B");

        assert_eq!(table.bind(RoutingLayer::Default, 0, first.clone()), Ok(None));
        assert_eq!(table.bind(RoutingLayer::Default, 0, second.clone()), Ok(Some(first)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.clear(RoutingLayer::Default, 0), Some(second));
        assert!(table.is_empty());
    }

    #[test]
    fn test_learned_bindings_merge_into_unbound_slots() {
        let mut previous = RoutingTable::new();
        let fm = family(EngineFamily::Fm);
        previous
            .bind_learned(fm, 2, RoutingEntry::new(TargetKind::TrackParameter, 9, "Drive"))
            .unwrap();
        previous
            .bind_learned(RoutingLayer::Default, 0, RoutingEntry::new(TargetKind::GlobalEffect, 1, "Mix"))
            .unwrap();
        previous
            .bind(RoutingLayer::Default, 5, RoutingEntry::new(TargetKind::GlobalEffect, 2, "Loaded"))
            .unwrap();
        assert!(previous.is_learned(fm, 2));
        assert!(!previous.is_learned(RoutingLayer::Default, 5));

        // reloaded table defines default slot 0 itself
        let mut reloaded = RoutingTable::new();
        reloaded
            .bind(RoutingLayer::Default, 0, RoutingEntry::new(TargetKind::GlobalEffect, 7, "File"))
            .unwrap();

        assert_eq!(reloaded.merge_learned(&previous), 1);
        assert_eq!(reloaded.get(fm, 2).unwrap().target_id, 9);
        assert!(reloaded.is_learned(fm, 2));
        assert_eq!(reloaded.get(RoutingLayer::Default, 0).unwrap().target_id, 7);
        assert!(reloaded.get(RoutingLayer::Default, 5).is_none());
    }

    #[test]
    fn test_plain_bind_and_clear_drop_learned_mark() {
        let mut table = RoutingTable::new();
        let entry = RoutingEntry::new(TargetKind::TrackParameter, 1, "A");
        table.bind_learned(RoutingLayer::Default, 1, entry.clone()).unwrap();
        table.bind(RoutingLayer::Default, 1, entry.clone()).unwrap();
        assert!(!table.is_learned(RoutingLayer::Default, 1));

        table.bind_learned(RoutingLayer::Default, 3, entry).unwrap();
        table.clear(RoutingLayer::Default, 3);
        assert_eq!(table.learned_bindings().count(), 0);
    }

    #[test]
    fn test_ui_sync_ids() {
        assert_eq!(ui_sync_parameter(0), Some(-100));
        assert_eq!(ui_sync_parameter(3), Some(-103));
        assert_eq!(ui_sync_parameter(4), Some(-200));
        assert_eq!(ui_sync_parameter(7), Some(-203));
        assert_eq!(ui_sync_parameter(8), None);

        for slot in 0..SLOT_COUNT {
            assert_eq!(ui_sync_slot(ui_sync_parameter(slot).unwrap()), Some(slot));
        }
        assert_eq!(ui_sync_slot(-104), None);
        assert_eq!(ui_sync_slot(12), None);
    }

    #[test]
    fn test_entry_yaml_defaults() {
        let entry: RoutingEntry = serde_yaml::from_str("target: global_effect\ntarget_id: 9\n").unwrap();
        assert_eq!(entry.min, 0.0);
        assert_eq!(entry.max, 1.0);
        assert!(entry.label.is_empty());
    }
}
