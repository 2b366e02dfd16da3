pub mod movie;
pub mod page;
pub mod query_envelope;

pub use movie::{DurationBucket, Genre, RatingThreshold, VotesBucket};
pub use page::{
    BarChart, Block, Chart, HeatmapChart, HistogramChart, NO_RESULTS_MESSAGE, Page, PageKind,
    PieChart, PieSlice, ResultTable, SOURCE_UNAVAILABLE_MESSAGE, ScatterChart, ScatterPoint,
    Section, WarningCode, json_schema,
};
pub use query_envelope::{
    QUERY_ENVELOPE_SCHEMA_VERSION, QueryEnvelope, QueryEnvelopeCommandFailure, QueryEnvelopeError,
    QueryEnvelopeWarning,
};
