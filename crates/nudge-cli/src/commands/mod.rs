pub mod add;
pub mod calendar;
pub mod delete;
pub mod done;
pub mod list;
pub mod parse;
pub mod recur;
pub mod rollover;
pub mod skip;
pub mod today;
