//! Label Preset Model

use serde::{Deserialize, Serialize};

use super::layout::LayoutConfig;
use super::record::EntityKind;

/// Kind-specific rendering flags carried by a preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetFlags {
    /// Append the entity link (short or full URL) as the last label line
    #[serde(default)]
    pub show_link: bool,
    /// Nominal text line height in mm
    #[serde(default = "default_text_size")]
    pub text_size: f32,
    /// Export one exchange document / image per page instead of per item
    #[serde(default)]
    pub per_page_export: bool,
    /// Binarize rasters at this gray level (thermal label printers)
    #[serde(default)]
    pub threshold: Option<u8>,
}

fn default_text_size() -> f32 {
    3.0
}

impl Default for PresetFlags {
    fn default() -> Self {
        Self {
            show_link: false,
            text_size: default_text_size(),
            per_page_export: false,
            threshold: None,
        }
    }
}

/// A named, user-persisted bundle of template and layout
///
/// Presets are values: editing produces a new preset that replaces the old
/// one in its collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: EntityKind,
    pub template: String,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub flags: PresetFlags,
}

impl LabelPreset {
    /// New preset with a fresh id and the default template for `kind`
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            template: default_template(kind).to_string(),
            layout: LayoutConfig::default(),
            flags: PresetFlags::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_flags(mut self, flags: PresetFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Copy under a fresh id
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Template a new preset starts with
pub fn default_template(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Spool => {
            "**{filament.vendor.name} - {filament.name}\n#{id} - {filament.material}**\n\
             {Spool Weight: {filament.spool_weight} g}\n\
             {ET: {filament.settings_extruder_temp} °C}\n\
             {BT: {filament.settings_bed_temp} °C}\n\
             {Lot Nr: {lot_nr}}\n\
             {{comment}}"
        }
        EntityKind::Filament => {
            "**{vendor.name} - {name}\n#{id} - {material}**\n\
             {Diameter: {diameter} mm}\n\
             {ET: {settings_extruder_temp} °C}\n\
             {BT: {settings_bed_temp} °C}\n\
             {{comment}}"
        }
        EntityKind::Vendor => "**{name}**\n{{comment}}",
    }
}
