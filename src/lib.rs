// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Scroll-triggered entrance animations and visibility-gated ambient loops.
//!
//! Each mounted section starts hidden and plays its entrance exactly once,
//! when the first of three triggers fires: the viewport observer, a direct
//! bounding-box poll, or a safety timeout that guarantees content is never
//! left invisible. Decorative loops pause while their section is off screen.
//! Users who prefer reduced motion get the final state immediately.
//!
//! # Key entry points
//!
//! - [`motion::reveal::RevealStage`] - every mounted section of a page
//! - [`motion::reveal::Reveal`] - tracker, entrance and ambient loops for one
//!   section
//! - [`motion::entrance::EntranceController`] - the once-only trigger race
//! - [`motion::sequence::Sequence`] - relative step offsets and stagger
//! - [`options::RevealOptions`] - trigger and entrance settings (TOML presets)
//!
//! # Architecture
//!
//! The core is single-threaded and host-driven. Controllers never touch the
//! DOM: they read geometry through [`motion::target::LayoutProbe`], write
//! property values through [`motion::target::Renderer`], and receive time as
//! explicit [`web_time::Instant`]s, so every trigger interleaving can be
//! replayed deterministically. Browser implementations of both traits live
//! in the `web` module behind the `web` feature.

pub mod content;
pub mod error;
pub mod motion;
pub mod options;
pub mod util;
#[cfg(feature = "web")]
pub mod web;

pub use error::RevealError;
pub use options::RevealOptions;
