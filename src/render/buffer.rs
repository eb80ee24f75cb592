//! Frame buffer: a grid of cells plus the node that painted each one.

use super::cell::Cell;
use crate::dom::node::NodeId;
use crate::geometry::{Region, Size};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    size: Size,
    cells: Vec<Cell>,
    owners: Vec<Option<NodeId>>,
}

impl FrameBuffer {
    pub fn new(size: Size) -> Self {
        let size = size.clamp_non_negative();
        let len = (size.width * size.height) as usize;
        Self {
            size,
            cells: vec![Cell::blank(); len],
            owners: vec![None; len],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    /// The whole buffer as a region at the origin.
    pub fn area(&self) -> Region {
        Region::from_size(self.size)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some((y * self.size.width + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Node that last painted the cell at `(x, y)`.
    pub fn owner(&self, x: i32, y: i32) -> Option<NodeId> {
        self.index(x, y).and_then(|i| self.owners[i])
    }

    /// Write a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell, owner: Option<NodeId>) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
            self.owners[i] = owner;
        }
    }

    /// Claim ownership of the cells in `region` without changing them.
    pub fn claim(&mut self, region: Region, owner: NodeId) {
        let region = region.intersection(self.area());
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                if let Some(i) = self.index(x, y) {
                    self.owners[i] = Some(owner);
                }
            }
        }
    }

    /// Row `y`, or an empty slice when out of bounds.
    pub fn row(&self, y: i32) -> &[Cell] {
        if y < 0 || y >= self.size.height {
            return &[];
        }
        let start = (y * self.size.width) as usize;
        &self.cells[start..start + self.size.width as usize]
    }

    /// Reset every cell to blank and drop all owners.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::blank());
        self.owners.fill(None);
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        (0..self.size.height).map(move |y| self.row(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::cell::CellStyle;
    use slotmap::SlotMap;

    #[test]
    fn reads_and_writes_within_bounds() {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let node = ids.insert(());
        let mut buffer = FrameBuffer::new(Size::new(4, 2));
        buffer.set(1, 1, Cell::new('x', CellStyle::new()), Some(node));
        buffer.set(9, 9, Cell::new('y', CellStyle::new()), Some(node));
        assert_eq!(buffer.get(1, 1).and_then(Cell::symbol), Some('x'));
        assert_eq!(buffer.owner(1, 1), Some(node));
        assert_eq!(buffer.owner(0, 0), None);
        assert!(buffer.get(4, 0).is_none());
        assert_eq!(buffer.row(1).len(), 4);
        assert!(buffer.row(-1).is_empty());
    }

    #[test]
    fn claim_and_clear() {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let node = ids.insert(());
        let mut buffer = FrameBuffer::new(Size::new(3, 3));
        buffer.claim(Region::new(1, 1, 5, 5), node);
        assert_eq!(buffer.owner(2, 2), Some(node));
        assert_eq!(buffer.owner(0, 2), None);
        buffer.clear();
        assert_eq!(buffer.owner(2, 2), None);
        assert_eq!(buffer.rows().count(), 3);
    }
}
