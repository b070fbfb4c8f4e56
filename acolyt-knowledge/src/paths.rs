use std::path::PathBuf;

use crate::KnowledgeSettings;
use crate::errors::{KnowledgeError, KnowledgeResult};

pub const KNOWLEDGE_DIR: &str = "knowledge";
pub const NOTES_FILE: &str = "training-notes.md";
pub const EMBEDS_FILE: &str = "signal-embeds.json";

pub fn data_root(settings: &KnowledgeSettings) -> KnowledgeResult<PathBuf> {
    if let Some(path) = &settings.data_root_override {
        return Ok(path.clone());
    }
    if let Ok(override_dir) = std::env::var("ACOLYT_DATA_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let dir = dirs::data_dir().ok_or(KnowledgeError::MissingDataDir)?;
    Ok(dir.join("acolyt"))
}

pub fn notes_path(settings: &KnowledgeSettings) -> KnowledgeResult<PathBuf> {
    if let Some(path) = &settings.notes_path_override {
        return Ok(path.clone());
    }
    Ok(data_root(settings)?.join(KNOWLEDGE_DIR).join(NOTES_FILE))
}

pub fn embeds_path(settings: &KnowledgeSettings) -> KnowledgeResult<PathBuf> {
    if let Some(path) = &settings.embeds_path_override {
        return Ok(path.clone());
    }
    Ok(data_root(settings)?.join(EMBEDS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_data_root_override() {
        let settings = KnowledgeSettings {
            data_root_override: Some(PathBuf::from("/srv/acolyt")),
            ..Default::default()
        };
        assert_eq!(
            notes_path(&settings).unwrap(),
            PathBuf::from("/srv/acolyt/knowledge/training-notes.md")
        );
        assert_eq!(
            embeds_path(&settings).unwrap(),
            PathBuf::from("/srv/acolyt/signal-embeds.json")
        );
    }

    #[test]
    fn explicit_paths_win_over_root() {
        let settings = KnowledgeSettings {
            data_root_override: Some(PathBuf::from("/srv/acolyt")),
            notes_path_override: Some(PathBuf::from("/tmp/notes.md")),
            ..Default::default()
        };
        assert_eq!(notes_path(&settings).unwrap(), PathBuf::from("/tmp/notes.md"));
    }
}
