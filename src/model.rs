use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::error::ExtractError;

/// Raw input: one Markdown document and where it came from.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Document {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read a document as UTF-8. Any other encoding is an error.
    pub fn read(path: &Path) -> Result<Self, ExtractError> {
        let bytes = fs::read(path).map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| ExtractError::Encoding {
            path: path.to_path_buf(),
        })?;
        Ok(Document::new(path, text))
    }

    /// File name without extension, used when a document has no title line.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Aquatic,
    Breakfast,
    Condiment,
    Dessert,
    Drink,
    MeatDish,
    SemiFinished,
    Soup,
    Staple,
    VegetableDish,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Aquatic,
        Category::Breakfast,
        Category::Condiment,
        Category::Dessert,
        Category::Drink,
        Category::MeatDish,
        Category::SemiFinished,
        Category::Soup,
        Category::Staple,
        Category::VegetableDish,
    ];

    /// Directory name under the dishes root.
    pub fn key(self) -> &'static str {
        match self {
            Category::Aquatic => "aquatic",
            Category::Breakfast => "breakfast",
            Category::Condiment => "condiment",
            Category::Dessert => "dessert",
            Category::Drink => "drink",
            Category::MeatDish => "meat_dish",
            Category::SemiFinished => "semi-finished",
            Category::Soup => "soup",
            Category::Staple => "staple",
            Category::VegetableDish => "vegetable_dish",
        }
    }

    /// Display label written into records.
    pub fn label(self) -> &'static str {
        match self {
            Category::Aquatic => "水产",
            Category::Breakfast => "早餐",
            Category::Condiment => "佐料",
            Category::Dessert => "甜品",
            Category::Drink => "饮品",
            Category::MeatDish => "肉食",
            Category::SemiFinished => "半成品",
            Category::Soup => "汤类",
            Category::Staple => "主食",
            Category::VegetableDish => "素菜",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Category implied by the first directory of `path` below `root`.
    pub fn from_path(root: &Path, path: &Path) -> Option<Category> {
        let rel = path.strip_prefix(root).ok()?;
        let mut components = rel.components();
        let first = components.next()?;
        // a file sitting directly in the root has no category directory
        components.next()?;
        Category::from_key(&first.as_os_str().to_string_lossy())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

pub const QUANTITY_UNSPECIFIED: &str = "量未指定";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub text_quantity: String,
    pub notes: String,
}

impl Ingredient {
    pub fn new(
        name: String,
        quantity: Option<f64>,
        unit: Option<String>,
        text_quantity: String,
    ) -> Self {
        let notes = if quantity.is_none() {
            QUANTITY_UNSPECIFIED.to_string()
        } else {
            String::new()
        };
        Ingredient {
            name,
            quantity,
            unit,
            text_quantity,
            notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub step: usize,
    pub description: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Note {
    Text(String),
    Image(String),
}

/// One structured recipe, serialised as-is into the per-category output.
/// Every field is always emitted; absent values become `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source_path: String,
    pub image_path: Option<String>,
    pub images: Vec<String>,
    pub category: Category,
    pub difficulty: u8,
    pub tags: Vec<String>,
    pub servings: u32,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub total_time_minutes: Option<i64>,
    pub additional_notes: Vec<Note>,
}
