pub mod error;
pub mod ids;
pub mod options;
pub mod region;
pub mod summary;

pub use error::{ModelError, Result};
pub use ids::PatientId;
pub use options::{LoaderOptions, RegionBase};
pub use region::{
    CombinedSelection, MAX_REGION_COUNT, REGION_COUNT, Region, RegionSet, format_region_labels, parse_region_labels,
    region_label,
};
pub use summary::{
    CohortSummary, Descriptive, ParameterSummary, PatientSummary, SummaryScope, SummaryTable,
};
