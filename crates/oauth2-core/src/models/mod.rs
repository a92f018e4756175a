pub mod descriptor;
pub mod error;
pub mod grant;
pub mod params;
pub mod token;

pub use descriptor::*;
pub use error::*;
pub use grant::*;
pub use params::*;
pub use token::*;
