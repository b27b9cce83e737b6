pub mod input_traits;
pub mod transport_traits;

pub use input_traits::InputDevice;
pub use transport_traits::RobotTransport;
