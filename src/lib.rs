#![doc = "Walkability scoring for urban administrative units"]
pub mod admin;
pub mod amenity;
pub mod assign;
pub mod config;
pub mod error;
pub mod geom;
pub mod io;
pub mod metrics;
pub mod network;
pub mod pipeline;
pub mod provider;
pub mod record;
pub mod score;
pub mod summary;

#[doc(inline)]
pub use config::{PipelineConfig, PlanarCrs, ProviderConfig};

#[doc(inline)]
pub use error::{PipelineError, ProviderError};

#[doc(inline)]
pub use pipeline::{run, score_units, RunOutput};

#[doc(inline)]
pub use record::UnitRecord;

#[doc(inline)]
pub use score::{MetricBundle, MetricRange, ScoringPolicy, SubScores, Weights};

#[doc(inline)]
pub use summary::{Filter, Summary};

#[cfg(feature = "download")]
#[doc(inline)]
pub use provider::OsmProvider;
