pub mod buttons;
pub mod gamepad;
pub mod normalizer;

pub use buttons::ButtonLatch;
pub use gamepad::GilrsInput;
pub use normalizer::normalize;
