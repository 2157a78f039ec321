use std::path::PathBuf;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{HudState, SceneView};
use crate::sim::{Drawable, EntityKind};
use crate::world::{TileWorld, Viewport};

use super::sprites::{LoadedSprite, SpriteCache};
use super::transform::{world_to_screen_px, ScreenRect};
use super::{SCREEN_HEIGHT, SCREEN_WIDTH, STATUS_BAR_HEIGHT};

const CLEAR_COLOR_PLAYING: [u8; 4] = [12, 10, 28, 255];
const CLEAR_COLOR_TITLE: [u8; 4] = [0, 0, 0, 255];
const TITLE_BANNER_COLOR: [u8; 4] = [230, 190, 40, 255];
const STATUS_BAR_COLOR: [u8; 4] = [48, 48, 56, 255];
const HEALTH_PIP_COLOR: [u8; 4] = [220, 40, 40, 255];
const HEALTH_PIP_EMPTY_COLOR: [u8; 4] = [90, 24, 24, 255];
const PLAYER_COLOR: [u8; 4] = [80, 200, 255, 255];
const PROP_COLOR: [u8; 4] = [200, 200, 120, 255];
const ENEMY_COLOR: [u8; 4] = [240, 90, 60, 255];
const HEALTH_PIP_SIZE: i32 = 8;
const HEALTH_PIP_SPACING: i32 = 10;
const TITLE_BANNER_WIDTH: i32 = 160;
const TITLE_BANNER_HEIGHT: i32 = 24;
const TITLE_BLINK_PER_SECOND: f32 = 2.0;

#[derive(Debug, Clone, Copy)]
struct ClipArea {
    width: i32,
    height: i32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    sprites: SpriteCache,
}

impl Renderer {
    pub fn new(window: Arc<Window>, sprite_dir: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            sprites: SpriteCache::new(sprite_dir),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(SCREEN_WIDTH, SCREEN_HEIGHT, surface)
    }

    pub fn render(&mut self, view: &SceneView<'_>) -> Result<(), Error> {
        draw_scene(self.pixels.frame_mut(), view, &mut self.sprites);
        self.pixels.render()
    }
}

fn draw_scene(frame: &mut [u8], view: &SceneView<'_>, sprites: &mut SpriteCache) {
    match view {
        SceneView::Blank => clear(frame, CLEAR_COLOR_TITLE),
        SceneView::Title { elapsed_seconds } => draw_title(frame, *elapsed_seconds),
        SceneView::Playing {
            world,
            viewport,
            drawables,
            hud,
        } => {
            clear(frame, CLEAR_COLOR_PLAYING);
            let area = ClipArea {
                width: SCREEN_WIDTH as i32,
                height: viewport.height.clamp(0, game_area_height()),
            };
            draw_tiles(frame, area, world, viewport, sprites);
            draw_drawables(frame, area, drawables, viewport, sprites);
            draw_status_bar(frame, *hud);
        }
    }
}

fn game_area_height() -> i32 {
    (SCREEN_HEIGHT - STATUS_BAR_HEIGHT) as i32
}

fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

fn draw_title(frame: &mut [u8], elapsed_seconds: f32) {
    clear(frame, CLEAR_COLOR_TITLE);
    let blink_phase = (elapsed_seconds.max(0.0) * TITLE_BLINK_PER_SECOND) as i32;
    if blink_phase % 2 != 0 {
        return;
    }
    let area = full_screen();
    fill_rect(
        frame,
        area,
        ScreenRect {
            x: (SCREEN_WIDTH as i32 - TITLE_BANNER_WIDTH) / 2,
            y: (SCREEN_HEIGHT as i32 - TITLE_BANNER_HEIGHT) / 2,
            width: TITLE_BANNER_WIDTH,
            height: TITLE_BANNER_HEIGHT,
        },
        TITLE_BANNER_COLOR,
    );
}

fn full_screen() -> ClipArea {
    ClipArea {
        width: SCREEN_WIDTH as i32,
        height: SCREEN_HEIGHT as i32,
    }
}

fn draw_tiles(
    frame: &mut [u8],
    area: ClipArea,
    world: &TileWorld,
    viewport: &Viewport,
    sprites: &mut SpriteCache,
) {
    for tile in world.visible_tiles(viewport) {
        if let Some(sprite) = sprites.get(tile.sprite_ref) {
            blit_sprite(frame, area, sprite, tile.screen_x, tile.screen_y);
            continue;
        }
        fill_rect(
            frame,
            area,
            ScreenRect {
                x: tile.screen_x,
                y: tile.screen_y,
                width: crate::world::TILE_SIZE,
                height: crate::world::TILE_SIZE,
            },
            fallback_tile_color(tile.sprite_ref),
        );
    }
}

fn draw_drawables(
    frame: &mut [u8],
    area: ClipArea,
    drawables: &[Drawable],
    viewport: &Viewport,
    sprites: &mut SpriteCache,
) {
    for drawable in drawables.iter().filter(|drawable| drawable.visible) {
        let rect = world_to_screen_px(&drawable.bounds, viewport);
        match sprites.get(drawable.sprite_ref) {
            Some(sprite) => blit_sprite(frame, area, sprite, rect.x, rect.y),
            None => fill_rect(frame, area, rect, kind_color(drawable.kind)),
        }
    }
}

fn draw_status_bar(frame: &mut [u8], hud: HudState) {
    let area = full_screen();
    let top = game_area_height();
    fill_rect(
        frame,
        area,
        ScreenRect {
            x: 0,
            y: top,
            width: SCREEN_WIDTH as i32,
            height: STATUS_BAR_HEIGHT as i32,
        },
        STATUS_BAR_COLOR,
    );

    let pip_top = top + (STATUS_BAR_HEIGHT as i32 - HEALTH_PIP_SIZE) / 2;
    for index in 0..hud.max_health.max(hud.health) {
        let color = if index < hud.health {
            HEALTH_PIP_COLOR
        } else {
            HEALTH_PIP_EMPTY_COLOR
        };
        fill_rect(
            frame,
            area,
            ScreenRect {
                x: 4 + index as i32 * HEALTH_PIP_SPACING,
                y: pip_top,
                width: HEALTH_PIP_SIZE,
                height: HEALTH_PIP_SIZE,
            },
            color,
        );
    }
}

fn kind_color(kind: EntityKind) -> [u8; 4] {
    match kind {
        EntityKind::Player => PLAYER_COLOR,
        EntityKind::Prop => PROP_COLOR,
        EntityKind::Enemy => ENEMY_COLOR,
    }
}

fn fallback_tile_color(sprite_ref: u16) -> [u8; 4] {
    let [high, low] = sprite_ref.to_be_bytes();
    [
        64u8.saturating_add(high.wrapping_mul(37) % 160),
        64u8.saturating_add(low.wrapping_mul(53) % 160),
        64u8.saturating_add((high ^ low).wrapping_mul(29) % 160),
        255,
    ]
}

fn blit_sprite(frame: &mut [u8], area: ClipArea, sprite: &LoadedSprite, x: i32, y: i32) {
    for sy in 0..sprite.height {
        for sx in 0..sprite.width {
            let Some(color) = sprite.pixel(sx, sy) else {
                continue;
            };
            if color[3] == 0 {
                continue;
            }
            write_pixel_in_area(frame, area, x + sx as i32, y + sy as i32, color);
        }
    }
}

fn fill_rect(frame: &mut [u8], area: ClipArea, rect: ScreenRect, color: [u8; 4]) {
    let left = rect.x.max(0);
    let top = rect.y.max(0);
    let right = rect.x.saturating_add(rect.width).min(area.width);
    let bottom = rect.y.saturating_add(rect.height).min(area.height);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, SCREEN_WIDTH as usize, x, y, color);
        }
    }
}

fn write_pixel_in_area(frame: &mut [u8], area: ClipArea, x: i32, y: i32, color: [u8; 4]) {
    if x >= area.width || y >= area.height {
        return;
    }
    write_pixel_rgba_clipped(frame, SCREEN_WIDTH as usize, x, y, color);
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::geometry::Rect;
    use crate::sim::EntityId;
    use crate::world::{TileGrid, TilePropertyTable};

    fn blank_frame() -> Vec<u8> {
        vec![0; (SCREEN_WIDTH * SCREEN_HEIGHT * 4) as usize]
    }

    fn pixel_at(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * SCREEN_WIDTH + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn empty_sprites() -> (tempfile::TempDir, SpriteCache) {
        let temp = tempfile::tempdir().expect("tempdir");
        let cache = SpriteCache::new(temp.path().to_path_buf());
        (temp, cache)
    }

    fn small_world() -> TileWorld {
        let mut grid = TileGrid::filled(32, 16, 0);
        grid.set_tile(0, 0, 7);
        TileWorld::from_parts(grid, TilePropertyTable::default())
    }

    fn drawable(kind: EntityKind, bounds: Rect, visible: bool) -> Drawable {
        Drawable {
            id: EntityId(1),
            kind,
            bounds,
            sprite_ref: 0x7fff,
            visible,
        }
    }

    #[test]
    fn write_pixel_ignores_out_of_bounds() {
        let mut frame = blank_frame();
        write_pixel_rgba_clipped(&mut frame, SCREEN_WIDTH as usize, -1, 0, [1, 2, 3, 4]);
        write_pixel_rgba_clipped(&mut frame, SCREEN_WIDTH as usize, 320, 0, [1, 2, 3, 4]);
        write_pixel_rgba_clipped(&mut frame, SCREEN_WIDTH as usize, 0, 200, [1, 2, 3, 4]);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn fill_rect_clips_to_area() {
        let mut frame = blank_frame();
        let area = ClipArea {
            width: 320,
            height: 188,
        };
        fill_rect(
            &mut frame,
            area,
            ScreenRect {
                x: 310,
                y: 180,
                width: 20,
                height: 20,
            },
            [9, 9, 9, 255],
        );
        assert_eq!(pixel_at(&frame, 319, 187), [9, 9, 9, 255]);
        assert_eq!(pixel_at(&frame, 319, 188), [0, 0, 0, 0]);
        assert_eq!(pixel_at(&frame, 309, 180), [0, 0, 0, 0]);
    }

    #[test]
    fn playing_view_draws_tiles_entities_and_status_bar() {
        let (_temp, mut sprites) = empty_sprites();
        let world = small_world();
        let mut frame = blank_frame();
        let view = SceneView::Playing {
            world: &world,
            viewport: Viewport::default(),
            drawables: vec![
                drawable(EntityKind::Player, Rect::new(40.0, 40.0, 24.0, 42.0), true),
                drawable(EntityKind::Enemy, Rect::new(100.0, 40.0, 16.0, 16.0), false),
            ],
            hud: HudState {
                health: 2,
                max_health: 5,
            },
        };

        draw_scene(&mut frame, &view, &mut sprites);

        let tile_color = fallback_tile_color(world.properties().sprite_ref(7));
        assert_eq!(pixel_at(&frame, 0, 0), tile_color);
        assert_eq!(pixel_at(&frame, 15, 15), tile_color);
        assert_eq!(pixel_at(&frame, 16, 16), CLEAR_COLOR_PLAYING);
        assert_eq!(pixel_at(&frame, 50, 60), PLAYER_COLOR);
        assert_eq!(pixel_at(&frame, 105, 45), CLEAR_COLOR_PLAYING);
        assert_eq!(pixel_at(&frame, 5, 191), HEALTH_PIP_COLOR);
        assert_eq!(pixel_at(&frame, 15, 191), HEALTH_PIP_COLOR);
        assert_eq!(pixel_at(&frame, 25, 191), HEALTH_PIP_EMPTY_COLOR);
        assert_eq!(pixel_at(&frame, 300, 189), STATUS_BAR_COLOR);
    }

    #[test]
    fn entity_below_game_area_does_not_cover_status_bar() {
        let (_temp, mut sprites) = empty_sprites();
        let world = small_world();
        let mut frame = blank_frame();
        let view = SceneView::Playing {
            world: &world,
            viewport: Viewport::default(),
            drawables: vec![drawable(
                EntityKind::Prop,
                Rect::new(200.0, 180.0, 16.0, 16.0),
                true,
            )],
            hud: HudState {
                health: 0,
                max_health: 0,
            },
        };

        draw_scene(&mut frame, &view, &mut sprites);

        assert_eq!(pixel_at(&frame, 205, 185), PROP_COLOR);
        assert_eq!(pixel_at(&frame, 205, 190), STATUS_BAR_COLOR);
    }

    #[test]
    fn sprite_pixels_replace_placeholder_and_skip_transparency() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
        image.save(temp.path().join("7FFF.png")).expect("save png");
        let mut sprites = SpriteCache::new(temp.path().to_path_buf());

        let world = small_world();
        let mut frame = blank_frame();
        let view = SceneView::Playing {
            world: &world,
            viewport: Viewport::default(),
            drawables: vec![drawable(
                EntityKind::Player,
                Rect::new(60.0, 60.0, 24.0, 42.0),
                true,
            )],
            hud: HudState {
                health: 5,
                max_health: 5,
            },
        };

        draw_scene(&mut frame, &view, &mut sprites);

        assert_eq!(pixel_at(&frame, 60, 60), [1, 2, 3, 255]);
        assert_eq!(pixel_at(&frame, 61, 61), CLEAR_COLOR_PLAYING);
        assert_eq!(pixel_at(&frame, 70, 70), CLEAR_COLOR_PLAYING);
    }

    #[test]
    fn title_banner_blinks() {
        let mut frame = blank_frame();
        let (_temp, mut sprites) = empty_sprites();

        draw_scene(
            &mut frame,
            &SceneView::Title {
                elapsed_seconds: 0.1,
            },
            &mut sprites,
        );
        assert_eq!(pixel_at(&frame, 160, 100), TITLE_BANNER_COLOR);

        draw_scene(
            &mut frame,
            &SceneView::Title {
                elapsed_seconds: 0.6,
            },
            &mut sprites,
        );
        assert_eq!(pixel_at(&frame, 160, 100), CLEAR_COLOR_TITLE);
    }

    #[test]
    fn fallback_tile_colors_are_opaque_and_stable() {
        let first = fallback_tile_color(0x4500);
        assert_eq!(first, fallback_tile_color(0x4500));
        assert_eq!(first[3], 255);
        assert_ne!(first, fallback_tile_color(0x4501));
    }
}
