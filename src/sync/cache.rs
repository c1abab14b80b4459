//! Last known good cursor position.

use crate::model::CursorPosition;

/// Holds the position every failed tick falls back to.
#[derive(Debug, Clone)]
pub struct CursorPositionCache {
    position: CursorPosition,
}

impl CursorPositionCache {
    pub fn new(initial: CursorPosition) -> Self {
        Self { position: initial }
    }

    pub fn get(&self) -> CursorPosition {
        self.position
    }

    /// Store a new position. Non-finite positions are refused and the
    /// previous one is kept; returns whether the store happened.
    pub fn set(&mut self, position: CursorPosition) -> bool {
        if !position.is_finite() {
            return false;
        }
        self.position = position;
        true
    }

    pub fn reset(&mut self, initial: CursorPosition) {
        self.position = initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_non_finite() {
        let mut cache = CursorPositionCache::new(CursorPosition::new(0.0, 0.0, 60.0));
        assert!(cache.set(CursorPosition::new(10.0, 20.0, 60.0)));
        assert!(!cache.set(CursorPosition::new(f64::NAN, 20.0, 60.0)));
        assert!(!cache.set(CursorPosition::new(10.0, f64::INFINITY, 60.0)));
        assert_eq!(cache.get(), CursorPosition::new(10.0, 20.0, 60.0));
    }
}
