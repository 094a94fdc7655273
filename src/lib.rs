//! `gcodeclean`: cleans, splits and merges G-code motion programs into a
//! shorter, more regular, state-explicit form.
//!
//! [`clean`] runs the full cleaning pipeline over a stream of raw lines.
//! [`split`] divides a cleaned program into one file per cutting pass.
//! [`merge`] reassembles a directory of such files in a low-travel order.

pub mod config;
pub mod decimal;
pub mod error;
pub mod geometry;
pub mod lexer;
pub mod line;
pub mod merge;
pub mod modal;
pub mod pipeline;
pub mod split;
pub mod workflow;

pub use config::Config;
pub use error::{GcodeCleanError, Result};
pub use line::Line;
pub use pipeline::annotate::AnnotationDictionary;
pub use workflow::{clean, CleanReport};

pub use split::{split, SplitFile};

pub use merge::merge_dir as merge;
