// SPDX-License-Identifier: Apache-2.0

use std::rc::Rc;

use crate::{Block, Error, Result};

impl Block {
    /// Makes `sub_block` a child of this block.
    ///
    /// The instance name is `instance_name` if given, otherwise the
    /// sub-block's current instance name; on a collision with a sibling a
    /// running suffix `_1`, `_2`, ... is appended. A sub-block that already
    /// has a parent is moved here. All ports of the sub-block are registered
    /// in this block's netlist.
    pub fn add_sub_block(&self, sub_block: &Block, instance_name: Option<&str>) -> Result<()> {
        if sub_block == self || sub_block.is_ancestor_of(self) {
            return Err(Error::InvalidData(format!(
                "block {} cannot become a sub-block of its own descendant {}",
                sub_block.instance_name(),
                self.instance_name()
            )));
        }
        if let Some(old_parent) = sub_block.parent_block() {
            old_parent.remove_sub_block(sub_block)?;
        }
        let base = instance_name.map_or_else(|| sub_block.instance_name(), |n| n.to_string());
        let unique = self.unique_instance_name(&base);
        {
            let mut sub_core = sub_block.core.borrow_mut();
            sub_core.instance_name = unique;
            sub_core.parent = Some(Rc::downgrade(&self.core));
        }
        self.core.borrow_mut().sub_blocks.push(sub_block.clone());
        {
            let mut netlist = self.netlist_mut();
            for port in sub_block.ports() {
                netlist.register_port(&port);
            }
        }
        log::debug!(
            "added {} ({}) to {}",
            sub_block.instance_name(),
            sub_block.module_name(),
            self.instance_name()
        );
        Ok(())
    }

    /// Detaches `sub_block`, unregistering its ports and their connections
    /// from this block's netlist.
    pub fn remove_sub_block(&self, sub_block: &Block) -> Result<()> {
        let position = self
            .core
            .borrow()
            .sub_blocks
            .iter()
            .position(|b| b == sub_block)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "{} is not a sub-block of {}",
                    sub_block.instance_name(),
                    self.instance_name()
                ))
            })?;
        self.core.borrow_mut().sub_blocks.remove(position);
        {
            let mut netlist = self.netlist_mut();
            for port in sub_block.ports() {
                netlist.unregister_port(&port);
            }
        }
        sub_block.core.borrow_mut().parent = None;
        Ok(())
    }

    /// Sub-blocks in insertion order.
    pub fn sub_blocks(&self) -> Vec<Block> {
        self.core.borrow().sub_blocks.clone()
    }

    pub fn sub_block_count(&self) -> usize {
        self.core.borrow().sub_blocks.len()
    }

    pub fn sub_block_at(&self, index: usize) -> Result<Block> {
        self.core.borrow().sub_blocks.get(index).cloned().ok_or_else(|| {
            Error::OutOfRange(format!(
                "sub-block index {} of block {} with {} sub-blocks",
                index,
                self.instance_name(),
                self.sub_block_count()
            ))
        })
    }

    pub fn sub_block(&self, instance_name: &str) -> Result<Block> {
        self.core
            .borrow()
            .sub_blocks
            .iter()
            .find(|b| b.instance_name() == instance_name)
            .cloned()
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "no sub-block {} in block {}",
                    instance_name,
                    self.instance_name()
                ))
            })
    }

    pub fn has_sub_block(&self, instance_name: &str) -> bool {
        self.sub_block(instance_name).is_ok()
    }

    /// Renames this block. Fails if a sibling already uses the name.
    pub fn set_instance_name(&self, instance_name: impl AsRef<str>) -> Result<()> {
        let instance_name = instance_name.as_ref();
        if let Some(parent) = self.parent_block() {
            let taken = parent
                .sub_blocks()
                .iter()
                .any(|b| b != self && b.instance_name() == instance_name);
            if taken {
                return Err(Error::AlreadyExists(format!(
                    "instance name {} already used in block {}",
                    instance_name,
                    parent.instance_name()
                )));
            }
        }
        self.core.borrow_mut().instance_name = instance_name.to_string();
        Ok(())
    }

    fn unique_instance_name(&self, base: &str) -> String {
        let taken = |name: &str| {
            self.core
                .borrow()
                .sub_blocks
                .iter()
                .any(|b| b.instance_name() == name)
        };
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}
