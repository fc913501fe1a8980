//! Label preset persistence and editing
//!
//! Presets live in the settings store as one JSON array under
//! [`KEY_PRESETS`]; scalar print preferences each have their own key.

use std::collections::HashSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{EntityKind, LabelPreset};
use shared::settings::{
    KEY_CURRENT_PRESET, KEY_PRESETS, KEY_PREVIEW_SCALE, KEY_USE_FULL_URL, PrintPrefs,
};
use tracing::{info, warn};

use crate::source::SettingsStore;
use crate::{PresetError, PresetResult};

/// Loads and saves presets and print preferences
pub struct PresetStore<S> {
    settings: S,
}

impl<S: SettingsStore> PresetStore<S> {
    pub fn new(settings: S) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> PresetResult<Option<T>> {
        match self.settings.get_setting(key).await? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| PresetError::Corrupted(format!("{}: {}", key, e))),
        }
    }

    async fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PresetResult<()> {
        let raw = serde_json::to_string(value).map_err(crate::ClientError::from)?;
        self.settings.set_setting(key, &raw).await?;
        Ok(())
    }

    /// Stored presets; empty when none were saved yet
    ///
    /// Fails on an undecodable blob, duplicate ids or out-of-range flags.
    pub async fn load_presets(&self) -> PresetResult<Vec<LabelPreset>> {
        let presets: Vec<LabelPreset> = self.load_json(KEY_PRESETS).await?.unwrap_or_default();
        check_presets(&presets)?;
        Ok(presets)
    }

    pub async fn save_presets(&self, presets: &[LabelPreset]) -> PresetResult<()> {
        check_presets(presets)?;
        self.save_json(KEY_PRESETS, presets).await?;
        info!(count = presets.len(), "Presets saved");
        Ok(())
    }

    /// Stored preferences; missing keys take their defaults
    pub async fn load_prefs(&self) -> PresetResult<PrintPrefs> {
        let defaults = PrintPrefs::default();
        Ok(PrintPrefs {
            current_preset_id: self
                .load_json::<Option<String>>(KEY_CURRENT_PRESET)
                .await?
                .flatten(),
            preview_scale: self
                .load_json::<f32>(KEY_PREVIEW_SCALE)
                .await?
                .unwrap_or(defaults.preview_scale),
            use_full_url: self
                .load_json::<bool>(KEY_USE_FULL_URL)
                .await?
                .unwrap_or(defaults.use_full_url),
        })
    }

    /// Store only the current preset id, leaving the other preferences alone
    pub async fn save_current(&self, id: &str) -> PresetResult<()> {
        self.save_json(KEY_CURRENT_PRESET, &Some(id)).await
    }

    pub async fn save_prefs(&self, prefs: &PrintPrefs) -> PresetResult<()> {
        self.save_json(KEY_CURRENT_PRESET, &prefs.current_preset_id)
            .await?;
        self.save_json(KEY_PREVIEW_SCALE, &prefs.preview_scale)
            .await?;
        self.save_json(KEY_USE_FULL_URL, &prefs.use_full_url).await
    }
}

fn check_presets(presets: &[LabelPreset]) -> PresetResult<()> {
    let mut seen = HashSet::new();
    for preset in presets {
        if !seen.insert(preset.id.as_str()) {
            return Err(PresetError::DuplicateId(preset.id.clone()));
        }
        let text_size = preset.flags.text_size;
        if !text_size.is_finite() || text_size <= 0.0 {
            return Err(PresetError::OutOfRange(format!(
                "preset {} has text size {}",
                preset.id, text_size
            )));
        }
    }
    Ok(())
}

/// Editing session over a preset collection
///
/// There is always exactly one current preset. Edits replace presets
/// wholesale and mark the session dirty until a save succeeds.
#[derive(Debug, Clone)]
pub struct PresetSession {
    presets: Vec<LabelPreset>,
    current: String,
    dirty: bool,
}

impl PresetSession {
    /// Open a session on `presets`, selecting `current` when it exists
    ///
    /// An empty collection is seeded with a default preset for `kind`.
    pub fn new(mut presets: Vec<LabelPreset>, current: Option<&str>, kind: EntityKind) -> Self {
        let mut dirty = false;
        if presets.is_empty() {
            presets.push(LabelPreset::new("Default", kind));
            dirty = true;
        }

        let current = current
            .filter(|id| presets.iter().any(|p| p.id == *id))
            .map(str::to_string)
            .or_else(|| presets.iter().find(|p| p.kind == kind).map(|p| p.id.clone()))
            .unwrap_or_else(|| presets[0].id.clone());

        Self {
            presets,
            current,
            dirty,
        }
    }

    /// Load presets and preferences from `store` and open a session
    pub async fn open<S: SettingsStore>(store: &PresetStore<S>, kind: EntityKind) -> PresetResult<Self> {
        let presets = store.load_presets().await?;
        let prefs = store.load_prefs().await?;
        Ok(Self::new(
            presets,
            prefs.current_preset_id.as_deref(),
            kind,
        ))
    }

    pub fn presets(&self) -> &[LabelPreset] {
        &self.presets
    }

    pub fn current(&self) -> &LabelPreset {
        self.presets
            .iter()
            .find(|p| p.id == self.current)
            .unwrap_or(&self.presets[0])
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: &str) -> Option<&LabelPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    fn position(&self, id: &str) -> PresetResult<usize> {
        self.presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PresetError::NotFound(id.to_string()))
    }

    /// Add a new preset with the default template and select it
    pub fn create(&mut self, name: impl Into<String>, kind: EntityKind) -> &LabelPreset {
        let preset = LabelPreset::new(name, kind);
        self.current = preset.id.clone();
        self.presets.push(preset);
        self.dirty = true;
        self.current()
    }

    /// Copy preset `id` under a new id and select the copy
    pub fn duplicate(&mut self, id: &str, name: impl Into<String>) -> PresetResult<&LabelPreset> {
        let index = self.position(id)?;
        let copy = self.presets[index].duplicate(name);
        self.current = copy.id.clone();
        self.presets.insert(index + 1, copy);
        self.dirty = true;
        Ok(self.current())
    }

    /// Replace the preset with the same id
    pub fn replace(&mut self, preset: LabelPreset) -> PresetResult<()> {
        let index = self.position(&preset.id)?;
        self.presets[index] = preset;
        self.dirty = true;
        Ok(())
    }

    /// Delete preset `id`; the last preset cannot be deleted
    ///
    /// Deleting the current preset selects its neighbour.
    pub fn delete(&mut self, id: &str) -> PresetResult<LabelPreset> {
        let index = self.position(id)?;
        if self.presets.len() == 1 {
            return Err(PresetError::LastRemaining);
        }
        let removed = self.presets.remove(index);
        if self.current == removed.id {
            let next = index.min(self.presets.len() - 1);
            self.current = self.presets[next].id.clone();
        }
        self.dirty = true;
        Ok(removed)
    }

    pub fn select(&mut self, id: &str) -> PresetResult<&LabelPreset> {
        let index = self.position(id)?;
        self.current = self.presets[index].id.clone();
        Ok(&self.presets[index])
    }

    /// Persist the collection and the current selection
    ///
    /// On failure the session keeps every edit and stays dirty.
    pub async fn save<S: SettingsStore>(&mut self, store: &PresetStore<S>) -> PresetResult<()> {
        if let Err(e) = store.save_presets(&self.presets).await {
            warn!(error = %e, "Saving presets failed, draft kept");
            return Err(e);
        }

        if let Err(e) = store.save_current(&self.current).await {
            warn!(error = %e, "Saving preset selection failed");
            return Err(e);
        }

        self.dirty = false;
        Ok(())
    }
}
