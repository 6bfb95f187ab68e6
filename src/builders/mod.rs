pub mod aggregate;
pub mod calendar;
pub mod conversion;
pub mod dimensions;
pub mod fx;
pub mod sales;
