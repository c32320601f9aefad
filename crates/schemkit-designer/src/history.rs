//! Undo history with nestable macros, a capacity bound and a clean
//! watermark.

use crate::commands::{CompositeCommand, DesignerCommand};
use crate::document::Document;
use crate::error::{DesignerError, DesignerResult};

/// Default number of undo entries kept.
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: Vec<DesignerCommand>,
    /// `entries[..index]` are applied; the rest can be redone.
    index: usize,
    capacity: usize,
    /// Cursor position of the last save; `None` once it can no longer be
    /// reached.
    clean_index: Option<usize>,
    open_macros: Vec<CompositeCommand>,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            capacity: capacity.max(1),
            clean_index: Some(0),
            open_macros: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shrinking evicts the oldest entries right away.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn in_macro(&self) -> bool {
        !self.open_macros.is_empty()
    }

    pub fn macro_depth(&self) -> usize {
        self.open_macros.len()
    }

    /// Apply `command` and record it. Inside a macro the command joins the
    /// innermost open macro instead of becoming its own entry.
    pub fn push(&mut self, mut command: DesignerCommand, doc: &mut Document) -> DesignerResult<()> {
        command.apply(doc)?;
        tracing::debug!("Pushed {}", command.name());
        match self.open_macros.last_mut() {
            Some(open) => open.commands.push(command),
            None => self.commit(command),
        }
        Ok(())
    }

    fn commit(&mut self, command: DesignerCommand) {
        if self.clean_index.is_some_and(|c| c > self.index) {
            self.clean_index = None;
        }
        self.entries.truncate(self.index);
        self.entries.push(command);
        self.index += 1;
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            let dropped = self.entries.remove(0);
            tracing::trace!("Evicted {}", dropped.name());
            self.index = self.index.saturating_sub(1);
            self.clean_index = match self.clean_index {
                Some(0) | None => None,
                Some(c) => Some(c - 1),
            };
        }
    }

    pub fn begin_macro(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::debug!("Begin macro {}", name);
        self.open_macros.push(CompositeCommand::new(name, Vec::new()));
    }

    /// Close the innermost macro. An empty macro leaves no entry; a nested
    /// one becomes a single step of its parent.
    pub fn end_macro(&mut self) -> DesignerResult<()> {
        let closed = self.open_macros.pop().ok_or(DesignerError::NoOpenMacro)?;
        tracing::debug!("End macro {} ({} steps)", closed.name, closed.commands.len());
        if closed.commands.is_empty() {
            return Ok(());
        }
        let command = DesignerCommand::Composite(closed);
        match self.open_macros.last_mut() {
            Some(parent) => parent.commands.push(command),
            None => self.commit(command),
        }
        Ok(())
    }

    /// Revert everything pushed into the innermost open macro and drop it.
    pub fn abort_macro(&mut self, doc: &mut Document) -> DesignerResult<()> {
        let mut open = self.open_macros.pop().ok_or(DesignerError::NoOpenMacro)?;
        tracing::debug!("Abort macro {}", open.name);
        for command in open.commands.iter_mut().rev() {
            command.revert(doc)?;
        }
        Ok(())
    }

    fn check_closed(&self) -> DesignerResult<()> {
        match self.open_macros.last() {
            Some(open) => Err(DesignerError::MacroInProgress(open.name.clone())),
            None => Ok(()),
        }
    }

    /// Revert the most recent entry. Returns `false` when there is nothing
    /// to undo.
    pub fn undo(&mut self, doc: &mut Document) -> DesignerResult<bool> {
        self.check_closed()?;
        if self.index == 0 {
            return Ok(false);
        }
        self.entries[self.index - 1].revert(doc)?;
        self.index -= 1;
        tracing::debug!("Undo {}", self.entries[self.index].name());
        Ok(true)
    }

    pub fn redo(&mut self, doc: &mut Document) -> DesignerResult<bool> {
        self.check_closed()?;
        if self.index == self.entries.len() {
            return Ok(false);
        }
        self.entries[self.index].apply(doc)?;
        self.index += 1;
        tracing::debug!("Redo {}", self.entries[self.index - 1].name());
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.in_macro() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.in_macro() && self.index < self.entries.len()
    }

    pub fn undo_text(&self) -> Option<String> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|c| c.name())
    }

    pub fn redo_text(&self) -> Option<String> {
        self.entries.get(self.index).map(|c| c.name())
    }

    /// The entry the next undo would revert.
    pub fn undo_command(&self) -> Option<&DesignerCommand> {
        self.index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Mark the current cursor as the saved state.
    pub fn set_clean(&mut self) {
        self.clean_index = Some(self.index);
    }

    pub fn is_clean(&self) -> bool {
        !self.in_macro() && self.clean_index == Some(self.index)
    }

    /// Forget every entry. The empty history counts as clean.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.open_macros.clear();
        self.index = 0;
        self.clean_index = Some(0);
    }
}
