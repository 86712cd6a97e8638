pub mod dashboard;
pub mod external_revenue;
pub mod goal;
pub mod payment;
pub mod period;
pub mod subscription;
pub mod types;

pub use dashboard::*;
pub use external_revenue::*;
pub use goal::*;
pub use payment::*;
pub use period::*;
pub use subscription::*;
pub use types::*;
