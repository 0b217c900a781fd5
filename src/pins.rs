//! GPIO / peripheral assignments for the opener board.
//!
//! Single source of truth: drivers and config reference this module
//! rather than hard-coding numbers.

/// Digital output wired to the opener remote's button (or the light relay).
/// HIGH = actuated.
pub const ACTUATOR_GPIO: i32 = 19;

