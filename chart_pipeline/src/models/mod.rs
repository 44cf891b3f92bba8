pub mod bar;
pub mod bar_series;
pub mod cadence;
pub mod chart_spec;
pub mod company;
pub mod request_params;
