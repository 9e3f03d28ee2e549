use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui;
use image::load_from_memory;

use crate::model::ImageRef;

/// Thumbnails and previews keyed by their image reference. A reference that
/// fails to decode is remembered so it is not retried every frame.
#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<u64, Option<egui::TextureHandle>>,
}

impl TextureCache {
    pub fn get_or_load(
        &mut self,
        ctx: &egui::Context,
        image: &ImageRef,
    ) -> Option<&egui::TextureHandle> {
        let key = cache_key(image);
        self.entries
            .entry(key)
            .or_insert_with(|| {
                decode_color_image(image).map(|color| {
                    ctx.load_texture(
                        format!("match-{key:016x}"),
                        color,
                        egui::TextureOptions::LINEAR,
                    )
                })
            })
            .as_ref()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn cache_key(image: &ImageRef) -> u64 {
    let mut hasher = DefaultHasher::new();
    image.as_str().hash(&mut hasher);
    hasher.finish()
}

pub fn decode_color_image(image: &ImageRef) -> Option<egui::ColorImage> {
    let decoded = image.decode().ok()?;
    let rgba = load_from_memory(&decoded.bytes).ok()?.to_rgba8();
    Some(egui::ColorImage::from_rgba_unmultiplied(
        [rgba.width() as usize, rgba.height() as usize],
        rgba.as_raw(),
    ))
}
