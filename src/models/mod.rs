pub mod alert;
pub mod environmental;
pub mod location;
pub mod weather;

pub use alert::*;
pub use environmental::*;
pub use location::*;
pub use weather::*;
