//! GPU texture mirror of the grid.

use std::fmt;

use macroquad::{
    color::{Color, BLACK, WHITE},
    texture::{FilterMode, Image, Texture2D},
};
use torus_life_core::{CellCoord, CellMirror, GridSize, DEAD};
use torus_life_rendering::RenderingError;

/// Mirror that keeps one texel per cell, black for live cells and white for
/// dead ones, with row zero in the first texture row.
///
/// The texture is sampled with nearest filtering so each cell stays crisp on
/// the torus. Must be created after the macroquad window exists.
pub struct TextureMirror {
    size: Option<GridSize>,
    cells: Vec<u8>,
    image: Image,
    texture: Option<Texture2D>,
}

impl TextureMirror {
    /// Creates a mirror with no storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: None,
            cells: Vec::new(),
            image: Image::empty(),
            texture: None,
        }
    }

    /// Dimensions of the mirrored grid, if storage was allocated.
    #[must_use]
    pub fn size(&self) -> Option<GridSize> {
        self.size
    }

    /// Texture holding the grid, if one could be created.
    #[must_use]
    pub fn texture(&self) -> Option<Texture2D> {
        self.texture
    }

    /// Reports whether the mirrored cell is alive.
    #[must_use]
    pub fn is_alive(&self, cell: CellCoord) -> bool {
        self.size
            .and_then(|size| size.index(cell))
            .and_then(|index| self.cells.get(index))
            .is_some_and(|&value| value != DEAD)
    }

    fn paint(&mut self, cell: CellCoord, value: u8) {
        if self.texture.is_none() {
            return;
        }
        self.image.set_pixel(cell.column(), cell.row(), texel_color(value));
    }

    fn paint_all(&mut self, size: GridSize) {
        if self.texture.is_none() {
            return;
        }
        for (index, &value) in self.cells.iter().enumerate() {
            let column = index as u32 % size.columns();
            let row = index as u32 / size.columns();
            self.image.set_pixel(column, row, texel_color(value));
        }
        self.upload();
    }

    fn upload(&self) {
        if let Some(texture) = self.texture {
            texture.update(&self.image);
        }
    }
}

impl fmt::Debug for TextureMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureMirror")
            .field("size", &self.size)
            .field("cells", &self.cells.len())
            .field("texture", &self.texture.is_some())
            .finish()
    }
}

impl Default for TextureMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl CellMirror for TextureMirror {
    fn reallocate(&mut self, size: GridSize, cells: &[u8]) {
        if let Some(texture) = self.texture.take() {
            texture.delete();
        }
        self.size = Some(size);
        self.cells = cells.to_vec();

        let (Ok(width), Ok(height)) =
            (u16::try_from(size.columns()), u16::try_from(size.rows()))
        else {
            let error = RenderingError::TextureTooLarge {
                columns: size.columns(),
                rows: size.rows(),
            };
            tracing::error!(%error, "torus view left blank");
            self.image = Image::empty();
            return;
        };

        self.image = Image::gen_image_color(width, height, WHITE);
        let texture = Texture2D::from_image(&self.image);
        texture.set_filter(FilterMode::Nearest);
        self.texture = Some(texture);

        self.paint_all(size);
    }

    fn write_all(&mut self, cells: &[u8]) {
        let Some(size) = self.size else {
            return;
        };
        self.cells.clear();
        self.cells.extend_from_slice(cells);
        self.paint_all(size);
    }

    fn write_cell(&mut self, cell: CellCoord, value: u8) {
        let Some(index) = self.size.and_then(|size| size.index(cell)) else {
            return;
        };
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = value;
        }
        self.paint(cell, value);
        self.upload();
    }
}

fn texel_color(value: u8) -> Color {
    if value == DEAD {
        WHITE
    } else {
        BLACK
    }
}
