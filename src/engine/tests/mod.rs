mod common;

mod baseline;
mod calculator;
mod diagnostic;
