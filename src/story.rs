//! Core story data model shared by the pipelines and the assembler.

use serde::{Deserialize, Serialize};

/// One of the three narrative sections, in story order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Beginning,
    Middle,
    Ending,
}

impl SectionId {
    pub const ALL: [SectionId; 3] = [SectionId::Beginning, SectionId::Middle, SectionId::Ending];

    /// Position in story order (0-based).
    pub fn index(self) -> usize {
        match self {
            SectionId::Beginning => 0,
            SectionId::Middle => 1,
            SectionId::Ending => 2,
        }
    }

    /// Suffix used for the section's text file.
    pub fn file_suffix(self) -> &'static str {
        match self {
            SectionId::Beginning => "beginning",
            SectionId::Middle => "middle",
            SectionId::Ending => "end",
        }
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionId::Beginning => write!(f, "beginning"),
            SectionId::Middle => write!(f, "middle"),
            SectionId::Ending => write!(f, "ending"),
        }
    }
}

/// One of the four background music cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicCue {
    Opening,
    Transition1,
    Transition2,
    Closing,
}

impl MusicCue {
    pub const ALL: [MusicCue; 4] = [
        MusicCue::Opening,
        MusicCue::Transition1,
        MusicCue::Transition2,
        MusicCue::Closing,
    ];

    pub fn index(self) -> usize {
        match self {
            MusicCue::Opening => 0,
            MusicCue::Transition1 => 1,
            MusicCue::Transition2 => 2,
            MusicCue::Closing => 3,
        }
    }
}

impl std::fmt::Display for MusicCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MusicCue::Opening => write!(f, "opening"),
            MusicCue::Transition1 => write!(f, "transition1"),
            MusicCue::Transition2 => write!(f, "transition2"),
            MusicCue::Closing => write!(f, "closing"),
        }
    }
}

/// A named descriptor (setting, character, or theme) handed to the prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    pub description: String,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The user's choices, resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRequest {
    pub setting: Descriptor,
    pub characters: Vec<Descriptor>,
    pub theme: Descriptor,
}

impl StoryRequest {
    /// Character names joined for prompts ("Fox, Owl").
    pub fn character_names(&self) -> String {
        self.characters
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One "Name: description" line per character.
    pub fn character_descriptions(&self) -> String {
        self.characters
            .iter()
            .map(|c| format!("{}: {}", c.name, c.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An accepted narrative section. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub id: SectionId,
    pub text: String,
}

/// An accepted three-section story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    sections: [NarrativeSection; 3],
}

impl Narrative {
    pub fn new(beginning: String, middle: String, ending: String) -> Self {
        Self {
            sections: [
                NarrativeSection {
                    id: SectionId::Beginning,
                    text: beginning,
                },
                NarrativeSection {
                    id: SectionId::Middle,
                    text: middle,
                },
                NarrativeSection {
                    id: SectionId::Ending,
                    text: ending,
                },
            ],
        }
    }

    pub fn sections(&self) -> &[NarrativeSection; 3] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> &NarrativeSection {
        &self.sections[id.index()]
    }

    /// The three sections separated by blank lines.
    pub fn full_text(&self) -> String {
        join_sections(
            &self.sections[0].text,
            &self.sections[1].text,
            &self.sections[2].text,
        )
    }
}

pub(crate) fn join_sections(beginning: &str, middle: &str, ending: &str) -> String {
    format!("{}\n\n{}\n\n{}", beginning, middle, ending)
}
