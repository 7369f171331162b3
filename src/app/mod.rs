pub mod batch_use_case;
pub mod ports;

pub use batch_use_case::BatchUseCase;
pub use ports::{Collector, Sink};
