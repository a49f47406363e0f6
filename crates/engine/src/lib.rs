pub mod gateway;
pub mod oracle;
pub mod orchestrator;
pub mod report;
pub mod resolver;

pub use gateway::{LiveGateway, SimulatedGateway};
pub use oracle::PriceOracle;
pub use orchestrator::PositionManager;
pub use report::{PositionRow, ReportFormatter, RunReport, SymbolFailure};
pub use resolver::AssetResolver;
