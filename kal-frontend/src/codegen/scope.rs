//! Variable scopes for lowering
//!
//! Each function body, `for` loop and `var` expression pushes a frame.
//! Lookup walks frames innermost first, so an inner binding shadows an
//! outer one until its frame is popped.

use kal_common::TempId;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    frames: Vec<HashMap<String, TempId>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Bind `name` to an alloca slot in the innermost frame
    pub fn bind(&mut self, name: &str, slot: TempId) {
        if self.frames.is_empty() {
            self.push_frame();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), slot);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<TempId> {
        self.frames.iter().rev().find_map(|frame| frame.get(name).copied())
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_and_restore() {
        let mut scopes = ScopeStack::new();
        scopes.push_frame();
        scopes.bind("i", 0);

        scopes.push_frame();
        scopes.bind("i", 5);
        scopes.bind("j", 6);
        assert_eq!(scopes.lookup("i"), Some(5));
        assert_eq!(scopes.lookup("j"), Some(6));

        scopes.pop_frame();
        assert_eq!(scopes.lookup("i"), Some(0));
        assert_eq!(scopes.lookup("j"), None);

        scopes.pop_frame();
        assert_eq!(scopes.lookup("i"), None);
    }

    #[test]
    fn test_rebinding_in_same_frame() {
        let mut scopes = ScopeStack::new();
        scopes.bind("a", 1);
        scopes.bind("a", 2);
        assert_eq!(scopes.lookup("a"), Some(2));
        scopes.clear();
        assert_eq!(scopes.lookup("a"), None);
    }
}
