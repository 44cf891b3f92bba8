pub mod sink;

pub use sink::{JsonFileSink, SinkError, SpecSink};
