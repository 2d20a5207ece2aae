pub mod blocks;
pub mod extract;
pub mod quantity;
pub mod sections;
pub mod timing;

use std::path::Path;

use crate::error::ExtractError;
use crate::model::{Category, Document, Note, Recipe};
use crate::store::{relative_key, IdentifierMap, ImageStore};
use crate::transfer::ImageTransfer;
use extract::images::ImageScope;

/// Shared, read-mostly state every document in a batch is processed against.
pub struct Context<'a> {
    pub base_dir: &'a Path,
    pub ids: &'a IdentifierMap,
    pub images: &'a ImageStore,
    pub transfer: &'a dyn ImageTransfer,
    pub image_scope: ImageScope,
}

/// Pipeline: markdown → blocks → sections → extracted fields → record.
pub fn process_document(
    doc: &Document,
    category: Category,
    ctx: &Context<'_>,
) -> Result<Recipe, ExtractError> {
    let key = relative_key(ctx.base_dir, &doc.path);
    let id = ctx
        .ids
        .get(&key)
        .ok_or_else(|| ExtractError::MissingIdentifier {
            path: doc.path.clone(),
        })?
        .to_string();

    let rel_dir = Path::new(&key).parent().unwrap_or_else(|| Path::new(""));
    let blocks = blocks::classify_lines(&doc.text);
    let mut data = extract::extract_all(doc, &blocks, rel_dir, ctx.image_scope);

    let transfer = |r: &String| ctx.images.resolve(r, ctx.transfer);
    let images: Vec<String> = data.images.iter().map(transfer).collect();
    for step in &mut data.steps {
        step.images = step.images.iter().map(transfer).collect();
    }
    for note in &mut data.notes {
        if let Note::Image(reference) = note {
            *reference = transfer(&*reference);
        }
    }

    Ok(Recipe {
        id,
        name: data.name,
        description: data.description,
        source_path: key,
        image_path: images.first().cloned(),
        images,
        category,
        difficulty: data.difficulty,
        tags: vec![category.label().to_string()],
        servings: 1,
        ingredients: data.ingredients,
        steps: data.steps,
        prep_time_minutes: data.timing.prep,
        cook_time_minutes: data.timing.cook,
        total_time_minutes: data.timing.total,
        additional_notes: data.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransferError;
    use crate::transfer::Passthrough;

    const TOMATO: &str = "dishes/vegetable_dish/西红柿炒鸡蛋/西红柿炒鸡蛋.md";

    struct Cdn;

    impl ImageTransfer for Cdn {
        fn transfer(&self, reference: &str) -> Result<String, TransferError> {
            Ok(format!("https://cdn.example.com/{}", reference))
        }
    }

    struct Offline;

    impl ImageTransfer for Offline {
        fn transfer(&self, _: &str) -> Result<String, TransferError> {
            Err(TransferError::Status(503))
        }
    }

    fn tomato_doc() -> Document {
        let md = std::fs::read_to_string("tests/fixtures/tomato_egg.md").unwrap();
        Document::new(format!("/srv/cook/{}", TOMATO), md)
    }

    fn ids() -> IdentifierMap {
        let mut ids = IdentifierMap::new();
        ids.insert(TOMATO, "0b7c1f9e-tomato");
        ids
    }

    fn run(doc: &Document, transfer: &dyn ImageTransfer, images: &ImageStore) -> Result<Recipe, ExtractError> {
        let ids = ids();
        let ctx = Context {
            base_dir: Path::new("/srv/cook"),
            ids: &ids,
            images,
            transfer,
            image_scope: ImageScope::Description,
        };
        process_document(doc, Category::VegetableDish, &ctx)
    }

    #[test]
    fn unmapped_document_is_rejected() {
        let doc = Document::new("/srv/cook/dishes/soup/无名汤.md", "# 无名汤的做法\n");
        let err = run(&doc, &Passthrough, &ImageStore::new()).unwrap_err();
        assert!(matches!(err, ExtractError::MissingIdentifier { .. }));
    }

    #[test]
    fn record_fields() {
        let r = run(&tomato_doc(), &Cdn, &ImageStore::new()).unwrap();
        assert_eq!(r.id, "0b7c1f9e-tomato");
        assert_eq!(r.name, "西红柿炒鸡蛋");
        assert_eq!(r.source_path, TOMATO);
        assert_eq!(r.tags, vec!["素菜"]);
        assert_eq!(r.servings, 1);
        assert_eq!(
            r.image_path.as_deref(),
            Some("https://cdn.example.com/dishes/vegetable_dish/西红柿炒鸡蛋/西红柿炒鸡蛋.jpg")
        );
        assert_eq!(
            r.steps[2].images,
            vec!["https://cdn.example.com/dishes/vegetable_dish/西红柿炒鸡蛋/热锅.jpg"]
        );
        assert_eq!(r.cook_time_minutes, Some(2));
    }

    #[test]
    fn failed_transfer_keeps_references() {
        let store = ImageStore::new();
        let r = run(&tomato_doc(), &Offline, &store).unwrap();
        assert_eq!(
            r.images,
            vec!["dishes/vegetable_dish/西红柿炒鸡蛋/西红柿炒鸡蛋.jpg"]
        );
        assert!(store.is_empty());
    }

    #[test]
    fn rerun_is_byte_identical() {
        let store = ImageStore::new();
        let doc = tomato_doc();
        let a = serde_json::to_string(&run(&doc, &Cdn, &store).unwrap()).unwrap();
        let b = serde_json::to_string(&run(&doc, &Cdn, &store).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn absent_values_serialize_as_null() {
        let r = run(&tomato_doc(), &Passthrough, &ImageStore::new()).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert!(json["prep_time_minutes"].is_null());
        assert_eq!(json["category"], "素菜");
        assert!(json["ingredients"][0]["quantity"].is_null());
        assert_eq!(json["ingredients"][0]["notes"], "量未指定");
        assert_eq!(json["additional_notes"][0]["type"], "text");
    }
}
