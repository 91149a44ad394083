//! Prompt templates for Storyteller.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use crate::story::MusicCue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub story: StoryPrompts,
    pub music: MusicPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the three story sections.
///
/// The middle and ending prompts receive the text generated before them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryPrompts {
    pub beginning: String,
    pub middle: String,
    pub ending: String,
}

impl Default for StoryPrompts {
    fn default() -> Self {
        Self {
            beginning: r#"You are a gentle storyteller writing for children aged 4 to 8.

Write the BEGINNING of a bedtime story.

Setting: {{setting}}
{{setting_description}}

Characters: {{characters}}
{{character_descriptions}}

Theme: {{theme}}
{{theme_description}}

Rules:
- Introduce the setting and every character by name
- Use short sentences and simple, warm words
- Keep everything kind and safe; no fighting, fear, or danger
- Write about 350 words of plain prose
- Do not write a title, headings, or the rest of the story
- Output only the story text"#
                .to_string(),

            middle: r#"You are a gentle storyteller writing for children aged 4 to 8.

Here is the beginning of a bedtime story:

{{beginning}}

Write the MIDDLE of this story. The characters face a small, friendly challenge
that lets them explore the theme of {{theme}}.

Rules:
- Continue naturally from where the beginning stops
- Use short sentences and simple, warm words
- Keep everything kind and safe; no fighting, fear, or danger
- Write about 350 words of plain prose
- Do not resolve the story yet
- Output only the story text"#
                .to_string(),

            ending: r#"You are a gentle storyteller writing for children aged 4 to 8.

Here is the beginning of a bedtime story:

{{beginning}}

Here is the middle:

{{middle}}

Write the ENDING of this story. Resolve the challenge and close with a calm,
cozy moment that reflects the theme of {{theme}}.

Rules:
- Continue naturally from where the middle stops
- Use short sentences and simple, warm words
- Write about 350 words of plain prose
- End softly, ready for sleep
- Output only the story text"#
                .to_string(),
        }
    }
}

/// Prompts for the four background music cues.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicPrompts {
    pub opening: String,
    pub transition1: String,
    pub transition2: String,
    pub closing: String,
}

impl Default for MusicPrompts {
    fn default() -> Self {
        Self {
            opening: "A gentle, inviting instrumental introduction for a children's bedtime story set in {{setting}} ({{setting_description}}). Soft and warm, featuring {{instruments}}. Slow tempo, no vocals.".to_string(),
            transition1: "A short, curious instrumental interlude for a children's story in {{setting}} ({{setting_description}}). Playful and light, featuring {{instruments}}. No vocals.".to_string(),
            transition2: "A short, hopeful instrumental interlude for a children's story in {{setting}} ({{setting_description}}). Building gently, featuring {{instruments}}. No vocals.".to_string(),
            closing: "A calm, soothing instrumental lullaby to end a children's bedtime story in {{setting}} ({{setting_description}}). Very soft, featuring {{instruments}}. Slow fade, no vocals.".to_string(),
        }
    }
}

impl MusicPrompts {
    /// Template for a cue.
    pub fn for_cue(&self, cue: MusicCue) -> &str {
        match cue {
            MusicCue::Opening => &self.opening,
            MusicCue::Transition1 => &self.transition1,
            MusicCue::Transition2 => &self.transition2,
            MusicCue::Closing => &self.closing,
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let story_path = custom_path.join("story.toml");
            if story_path.exists() {
                let content = std::fs::read_to_string(&story_path)?;
                prompts.story = toml::from_str(&content)?;
            }

            let music_path = custom_path.join("music.toml");
            if music_path.exists() {
                let content = std::fs::read_to_string(&music_path)?;
                prompts.music = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single left-to-right pass, so text
    /// inserted from a variable is never expanded again. Unknown placeholders
    /// are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            match after_open.find("}}") {
                Some(end) => {
                    let key = &after_open[..end];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after_open[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.story.middle.contains("{{beginning}}"));
        assert!(prompts.story.ending.contains("{{middle}}"));
        for cue in MusicCue::ALL {
            assert!(prompts.music.for_cue(cue).contains("{{instruments}}"));
        }
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_inserted_text() {
        let mut vars = HashMap::new();
        vars.insert("beginning".to_string(), "Fox said {{theme}} twice.".to_string());
        vars.insert("theme".to_string(), "Friendship".to_string());

        let result = Prompts::render("B: {{beginning}} T: {{theme}}", &vars);
        assert_eq!(result, "B: Fox said {{theme}} twice. T: Friendship");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let vars = HashMap::new();
        assert_eq!(Prompts::render("{{missing}} and {{open", &vars), "{{missing}} and {{open");
    }

    #[test]
    fn test_provided_variables_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("narrator".to_string(), "Grandma".to_string());
        prompts.variables.insert("theme".to_string(), "Courage".to_string());

        let mut vars = HashMap::new();
        vars.insert("theme".to_string(), "Friendship".to_string());

        let result =
            prompts.render_with_custom("{{narrator}} tells a story about {{theme}}.", &vars);
        assert_eq!(result, "Grandma tells a story about Friendship.");
    }

    #[test]
    fn test_custom_dir_overrides_music() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("music.toml"),
            "opening = \"Drums in {{setting}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.music.opening, "Drums in {{setting}}");
        // unspecified cues keep their defaults
        assert!(prompts.music.closing.contains("lullaby"));
    }
}
