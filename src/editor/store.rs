use std::collections::HashSet;

use tracing::{debug, warn};

use super::EditError;
use super::block::{Block, BlockId, BlockType, Direction};

/// Ids kept free above the highest seed id for blocks created later.
const ID_HEADROOM: u64 = u32::MAX as u64;

/// Result of [`BlockStore::delete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deletion {
    /// The block was the only one left and stays in place.
    Kept,
    /// The block is gone; `focus` is where editing continues.
    Removed { focus: BlockId },
}

/// Ordered, never-empty sequence of blocks for one open document.
#[derive(Clone, Debug)]
pub struct BlockStore {
    blocks: Vec<Block>,
    next_id: u64,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    /// Builds a store from seed blocks. An empty seed gets one empty
    /// paragraph, and ids that collide with an earlier block are replaced.
    /// Type-specific fields are brought in line with each block's type.
    /// Seeds whose ids leave no room for new blocks are renumbered from 1.
    pub fn from_blocks(mut blocks: Vec<Block>) -> Self {
        for block in &mut blocks {
            block.normalize_type_fields();
        }
        let highest = blocks.iter().map(|block| block.id.get()).max();
        let mut next_id = match highest {
            None => 1,
            Some(max) if max <= u64::MAX - ID_HEADROOM => max + 1,
            Some(max) => {
                warn!(target: "blockpad::store", max, "seed ids exhausted, renumbering");
                for (index, block) in blocks.iter_mut().enumerate() {
                    block.id = BlockId::new(index as u64 + 1);
                }
                blocks.len() as u64 + 1
            }
        };
        let mut seen = HashSet::new();
        for block in &mut blocks {
            if !seen.insert(block.id) {
                block.id = BlockId::new(next_id);
                next_id += 1;
                seen.insert(block.id);
            }
        }
        let mut store = Self { blocks, next_id };
        if store.blocks.is_empty() {
            let id = store.fresh_id();
            store.blocks.push(Block::new(id, BlockType::Paragraph));
        }
        store
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: BlockId) -> Result<usize, EditError> {
        self.blocks
            .iter()
            .position(|block| block.id == id)
            .ok_or(EditError::UnknownBlock(id))
    }

    pub fn first_id(&self) -> BlockId {
        self.blocks[0].id
    }

    pub fn last_id(&self) -> BlockId {
        self.blocks[self.blocks.len() - 1].id
    }

    pub fn previous_id(&self, id: BlockId) -> Result<Option<BlockId>, EditError> {
        let index = self.position(id)?;
        Ok(index
            .checked_sub(1)
            .and_then(|prev| self.blocks.get(prev))
            .map(|block| block.id))
    }

    pub fn next_id(&self, id: BlockId) -> Result<Option<BlockId>, EditError> {
        let index = self.position(id)?;
        Ok(self.blocks.get(index + 1).map(|block| block.id))
    }

    pub fn can_delete(&self) -> bool {
        self.blocks.len() > 1
    }

    pub fn can_move(&self, id: BlockId, direction: Direction) -> Result<bool, EditError> {
        let index = self.position(id)?;
        Ok(match direction {
            Direction::Up => index > 0,
            Direction::Down => index + 1 < self.blocks.len(),
        })
    }

    pub fn insert_after(
        &mut self,
        anchor: BlockId,
        block_type: BlockType,
    ) -> Result<BlockId, EditError> {
        let index = self.position(anchor)?;
        let id = self.fresh_id();
        self.blocks.insert(index + 1, Block::new(id, block_type));
        debug!(target: "blockpad::store", %anchor, %id, %block_type, "insert_after");
        Ok(id)
    }

    pub fn update(&mut self, id: BlockId, content: &str) -> Result<(), EditError> {
        let block = self.block_mut(id)?;
        block.content.clear();
        block.content.push_str(content);
        Ok(())
    }

    pub fn delete(&mut self, id: BlockId) -> Result<Deletion, EditError> {
        let index = self.position(id)?;
        if !self.can_delete() {
            debug!(target: "blockpad::store", %id, "delete refused for last block");
            return Ok(Deletion::Kept);
        }
        self.blocks.remove(index);
        let focus_index = index.saturating_sub(1);
        let focus = self.blocks[focus_index].id;
        debug!(target: "blockpad::store", %id, %focus, "delete");
        Ok(Deletion::Removed { focus })
    }

    pub fn duplicate(&mut self, id: BlockId) -> Result<BlockId, EditError> {
        let index = self.position(id)?;
        let new_id = self.fresh_id();
        let copy = self.blocks[index].duplicate_as(new_id);
        self.blocks.insert(index + 1, copy);
        debug!(target: "blockpad::store", %id, %new_id, "duplicate");
        Ok(new_id)
    }

    /// Swaps the block with its neighbour. Returns `false` at the boundary.
    pub fn move_block(&mut self, id: BlockId, direction: Direction) -> Result<bool, EditError> {
        let index = self.position(id)?;
        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.blocks.len() => index + 1,
            _ => return Ok(false),
        };
        self.blocks.swap(index, target);
        debug!(target: "blockpad::store", %id, ?direction, "move");
        Ok(true)
    }

    pub fn retype(&mut self, id: BlockId, block_type: BlockType) -> Result<(), EditError> {
        self.block_mut(id)?.retype(block_type);
        debug!(target: "blockpad::store", %id, %block_type, "retype");
        Ok(())
    }

    /// Flips a checklist item. Any other block type is left alone.
    pub fn toggle_checked(&mut self, id: BlockId) -> Result<bool, EditError> {
        let block = self.block_mut(id)?;
        let Some(checked) = block.checked.as_mut() else {
            return Ok(false);
        };
        *checked = !*checked;
        Ok(true)
    }

    /// Takes `source` out of the sequence and reinserts it at the index
    /// `target` held before the removal.
    pub fn relocate(&mut self, source: BlockId, target: BlockId) -> Result<bool, EditError> {
        let from = self.position(source)?;
        let to = self.position(target)?;
        if from == to {
            return Ok(false);
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        debug!(target: "blockpad::store", %source, %target, "relocate");
        Ok(true)
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut Block, EditError> {
        self.blocks
            .iter_mut()
            .find(|block| block.id == id)
            .ok_or(EditError::UnknownBlock(id))
    }

    fn fresh_id(&mut self) -> BlockId {
        let id = BlockId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
