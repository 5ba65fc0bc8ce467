//! Cauldron form engine
//!
//! Resolves a plugin's declarative input schema into a live form: initial
//! values, option lists sourced from files, show/hide predicates, submit-time
//! validation, example population and multi-select interaction.
//!
//! The engine owns no I/O. File reads, example asset lookup, the file picker,
//! notifications and job submission are collaborators supplied through
//! [`Host`]. One [`FormSession`] holds all mutable state for one
//! plugin-configuration session.

pub mod errors;
pub mod example;
pub mod host;
pub mod normalize;
pub mod options;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod validation;
pub mod visibility;

#[cfg(test)]
mod testing;

pub use errors::{ExampleRefError, ExecutionError, FormError, SourceIoError};
pub use example::{ExampleOutcome, SkippedEntry};
pub use host::{
    ExampleLocator, ExecutionRequest, ExecutionSink, FilePicker, FileSource, Host, JobId, Notifier,
};
pub use normalize::{normalize, NormalizedValues};
pub use options::{OptionCache, OptionSet, OptionSource, ResolutionTicket};
pub use selection::SelectionCursors;
pub use session::{FieldTransition, FormSession};
pub use snapshot::FormSnapshot;
pub use validation::ValidationReport;
