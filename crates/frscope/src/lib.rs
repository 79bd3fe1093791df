//! Frequency-response curve extraction, alignment, export and charting.
//!
//! The pipeline reads a rendered document through [`document::DocumentReader`],
//! collects raw measurement points with the [`source::PointSource`] strategies,
//! normalizes them into a [`model::MeasurementSeries`], computes an
//! [`bias::AlignmentBias`], and bundles everything with derived metadata into a
//! [`session::SessionRecord`]. Records are handed to injected collaborators
//! (store, presenter, export sink) by [`session::deliver`].

pub mod bias;
pub mod chart;
pub mod document;
pub mod error;
pub mod export;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod session;
pub mod source;
pub mod view;

pub use bias::AlignmentBias;
pub use error::{FrError, Result};
pub use metadata::{ExtractionMetadata, MetadataRules, VariantTag};
pub use model::{MeasurementPoint, MeasurementSeries};
pub use pipeline::Extractor;
pub use session::{SessionId, SessionRecord};
