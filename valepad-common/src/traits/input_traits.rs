// File: valepad-common/src/traits/input_traits.rs

use crate::error::Error;
use crate::models::controller::ControllerFrame;

/// A polled game controller.
///
/// `poll` is called once per control tick and must not block; an `Err`
/// means the device is gone and the session should shut down.
pub trait InputDevice {
    fn name(&self) -> String;
    fn poll(&mut self) -> Result<ControllerFrame, Error>;
}

impl<T: InputDevice + ?Sized> InputDevice for Box<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn poll(&mut self) -> Result<ControllerFrame, Error> {
        (**self).poll()
    }
}
