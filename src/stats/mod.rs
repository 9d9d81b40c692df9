//! Stats module - derived percent-change metrics

mod calculator;

pub use calculator::{CalcError, ChangeCalculator, ChangeSign, SeriesChange};
