//! Test infrastructure for the bootstrap and lifecycle layers.
//!
//! | Module | Covers |
//! |--------|--------|
//! | `loading` | Tiered required/optional loading |
//! | `lifecycle` | Controller state machine and bridge fault containment |
//! | `bootstrap` | Supervisor load → initialize → start → shutdown |

pub mod mocks;
