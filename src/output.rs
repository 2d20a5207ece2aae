use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::model::{Category, Recipe};

pub fn file_name(category: Category) -> String {
    format!("{}_recipes.json", category.key())
}

/// Write one pretty-printed array per category into `dir`. Every category
/// gets a file, empty ones included, so stale output never survives a run.
pub fn write_all(dir: &Path, recipes: &BTreeMap<Category, Vec<Recipe>>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let records = recipes.get(&category).map(Vec::as_slice).unwrap_or_default();
        let path = dir.join(file_name(category));
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), records = records.len(), "wrote category");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Note, Step};

    fn recipe(name: &str) -> Recipe {
        Recipe {
            id: format!("id-{}", name),
            name: name.to_string(),
            description: String::new(),
            source_path: format!("dishes/soup/{}.md", name),
            image_path: None,
            images: vec![],
            category: Category::Soup,
            difficulty: 1,
            tags: vec!["汤类".into()],
            servings: 1,
            ingredients: vec![],
            steps: vec![Step { step: 1, description: "煮开".into(), images: vec![] }],
            prep_time_minutes: None,
            cook_time_minutes: Some(10),
            total_time_minutes: Some(10),
            additional_notes: vec![Note::Text("趁热喝".into())],
        }
    }

    #[test]
    fn writes_every_category() {
        let dir = tempfile::tempdir().unwrap();
        let mut recipes = BTreeMap::new();
        recipes.insert(Category::Soup, vec![recipe("番茄汤")]);

        let written = write_all(dir.path(), &recipes).unwrap();
        assert_eq!(written.len(), 10);
        assert!(dir.path().join("semi-finished_recipes.json").exists());

        let raw = fs::read_to_string(dir.path().join("soup_recipes.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["name"], "番茄汤");
        assert_eq!(json[0]["category"], "汤类");
        assert!(json[0]["image_path"].is_null());

        let empty = fs::read_to_string(dir.path().join("aquatic_recipes.json")).unwrap();
        assert_eq!(empty, "[]");
    }
}
