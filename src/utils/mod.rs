pub mod deadline;
pub mod logging;
