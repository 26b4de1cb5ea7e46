mod backup;

pub use backup::*;
