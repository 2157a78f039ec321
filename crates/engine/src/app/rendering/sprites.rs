use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::warn;

#[derive(Debug)]
pub(crate) struct LoadedSprite {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

impl LoadedSprite {
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

#[derive(Debug)]
pub(crate) struct SpriteCache {
    sprite_dir: PathBuf,
    sprites: HashMap<u16, Option<LoadedSprite>>,
    warned_sprite_refs: HashSet<u16>,
}

impl SpriteCache {
    pub(crate) fn new(sprite_dir: PathBuf) -> Self {
        Self {
            sprite_dir,
            sprites: HashMap::new(),
            warned_sprite_refs: HashSet::new(),
        }
    }

    pub(crate) fn sprite_path(&self, sprite_ref: u16) -> PathBuf {
        self.sprite_dir.join(format!("{sprite_ref:04X}.png"))
    }

    pub(crate) fn get(&mut self, sprite_ref: u16) -> Option<&LoadedSprite> {
        if !self.sprites.contains_key(&sprite_ref) {
            let path = self.sprite_path(sprite_ref);
            let loaded = match load_sprite_rgba(&path) {
                Ok(sprite) => Some(sprite),
                Err(reason) => {
                    self.warn_sprite_load_once(sprite_ref, &path, &reason);
                    None
                }
            };
            self.sprites.insert(sprite_ref, loaded);
        }
        self.sprites.get(&sprite_ref).and_then(Option::as_ref)
    }

    fn warn_sprite_load_once(&mut self, sprite_ref: u16, path: &Path, reason: &str) {
        if !self.warned_sprite_refs.insert(sprite_ref) {
            return;
        }
        warn!(
            sprite_ref = %format!("{sprite_ref:#06x}"),
            path = %path.display(),
            reason,
            "renderer_sprite_load_failed_using_placeholder"
        );
    }
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
