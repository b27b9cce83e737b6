pub mod battery_poll;
