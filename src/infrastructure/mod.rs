//! Infrastructure: concrete stores, the admission engine and ambient
//! services (logging, audit, configuration-driven storage)

pub mod admission;
pub mod audit;
pub mod credential;
pub mod grant;
pub mod logging;
pub mod provisioning;
pub mod storage;
