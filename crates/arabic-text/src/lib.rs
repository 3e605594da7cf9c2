//! Arabic Text - Arabic language text processing
//!
//! This crate prepares logical-order Arabic strings for renderers that have
//! no shaping engine of their own:
//! - Letter joining (contextual presentation forms, lam-alef ligatures)
//! - Bidirectional reordering into visual order
//!
//! # Example
//!
//! ```
//! use arabic_text::shape;
//!
//! // Latin text passes through untouched
//! assert_eq!(shape("Hello"), "Hello");
//!
//! // Arabic text comes back joined and in visual order
//! let display = shape("سلام");
//! assert_ne!(display, "سلام");
//! ```

mod shape;

pub use shape::{has_arabic, shape};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_arabic() {
        assert!(has_arabic("سلام"));
        assert!(has_arabic("order سلام mixed"));
        assert!(!has_arabic("Hello, World!"));
        assert!(!has_arabic(""));
    }
}
