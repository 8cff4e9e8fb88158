use std::collections::HashSet;

/// Tracks held key codes so operating-system auto-repeat never reaches the engine.
#[derive(Debug, Default)]
pub struct InputLayer {
    held: HashSet<String>,
}

impl InputLayer {
    /// Creates a layer with no keys held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key-down and reports whether it is a fresh press.
    ///
    /// A key-down for a code that is already held is an auto-repeat and
    /// returns `false`.
    pub fn press(&mut self, code: &str) -> bool {
        if self.held.contains(code) {
            return false;
        }
        self.held.insert(code.to_owned())
    }

    /// Records a key-up, returning whether the code was held.
    pub fn release(&mut self, code: &str) -> bool {
        self.held.remove(code)
    }

    /// Reports whether the code is currently held.
    #[must_use]
    pub fn is_held(&self, code: &str) -> bool {
        self.held.contains(code)
    }

    /// Forgets every held key.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_key_downs_are_suppressed_until_release() {
        let mut input = InputLayer::new();

        assert!(input.press("KeyD"));
        assert!(!input.press("KeyD"), "auto-repeat must be dropped");
        assert!(input.press("KeyF"));
        assert!(input.is_held("KeyD"));

        assert!(input.release("KeyD"));
        assert!(!input.release("KeyD"));
        assert!(input.press("KeyD"));
    }
}
