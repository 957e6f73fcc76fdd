//! Character sheet loading and projection
//!
//! The sheet is fetched once and mapped onto fixed display slots. No state,
//! no retries: a failure replaces the whole panel with one error line.

use crate::api::{CharacterRecord, ChatApi};

/// Shown for scalar fields the backend did not send
pub const MISSING_VALUE: &str = "Unknown";

/// Replaces the whole panel when the sheet cannot be loaded
pub const CHARACTER_ERROR_TEXT: &str = "Error loading character data.";

/// One titled block of the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSection {
    pub title: &'static str,
    pub entries: Vec<String>,
}

/// Display-ready character sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSheet {
    pub sections: Vec<SheetSection>,
}

/// What the character panel shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterPanel {
    Sheet(CharacterSheet),
    Error(String),
}

fn text_or_missing(value: Option<&str>) -> String {
    value.map_or_else(|| MISSING_VALUE.to_string(), str::to_string)
}

/// Whole numbers print without a fractional part (`10.0` shows as `10`)
fn number_or_missing(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING_VALUE.to_string(), |v| v.to_string())
}

/// List slot: prior content is replaced; empty or absent lists get a
/// per-field placeholder line
fn list_or_placeholder(values: Option<&[String]>, placeholder: &str) -> Vec<String> {
    match values {
        Some(values) if !values.is_empty() => values.to_vec(),
        _ => vec![placeholder.to_string()],
    }
}

impl CharacterSheet {
    pub fn project(record: &CharacterRecord) -> Self {
        let identity = SheetSection {
            title: "Character",
            entries: vec![
                format!("Name: {}", text_or_missing(record.name.as_deref())),
                format!("Race: {}", text_or_missing(record.race.as_deref())),
                format!("Class: {}", text_or_missing(record.class_name.as_deref())),
                format!("Background: {}", text_or_missing(record.background.as_deref())),
            ],
        };

        let vitals = SheetSection {
            title: "Vitals",
            entries: vec![
                format!("Hit Points: {}", number_or_missing(record.current_hit_points)),
                format!("Armor Class: {}", number_or_missing(record.armor_class)),
                format!("Gold: {}", number_or_missing(record.gold)),
            ],
        };

        let attributes = SheetSection {
            title: "Attributes",
            entries: [
                ("Strength", record.strength),
                ("Dexterity", record.dexterity),
                ("Constitution", record.constitution),
                ("Intelligence", record.intelligence),
                ("Wisdom", record.wisdom),
                ("Charisma", record.charisma),
            ]
            .into_iter()
            .map(|(name, value)| format!("{name}: {}", number_or_missing(value)))
            .collect(),
        };

        let lists = [
            ("Traits", record.traits.as_deref(), "No racial traits"),
            (
                "Saving Throws",
                record.saving_throws.as_deref(),
                "No saving throw proficiencies",
            ),
            ("Proficiencies", record.proficiencies.as_deref(), "No proficiencies"),
            ("Inventory", record.inventory.as_deref(), "No items"),
        ]
        .into_iter()
        .map(|(title, values, placeholder)| SheetSection {
            title,
            entries: list_or_placeholder(values, placeholder),
        });

        let mut sections = vec![identity, vitals, attributes];
        sections.extend(lists);
        Self { sections }
    }

    #[allow(dead_code)] // Used by tests
    pub fn section(&self, title: &str) -> Option<&SheetSection> {
        self.sections.iter().find(|s| s.title == title)
    }
}

/// Fetch the character once and project it
pub async fn load_character_panel<A: ChatApi + ?Sized>(api: &A) -> CharacterPanel {
    match api.character().await {
        Ok(record) => {
            tracing::debug!(name = ?record.name, "Character sheet loaded");
            CharacterPanel::Sheet(CharacterSheet::project(&record))
        }
        Err(e) => {
            tracing::debug!(error = %e, "Character panel shows load error");
            CharacterPanel::Error(CHARACTER_ERROR_TEXT.to_string())
        }
    }
}
