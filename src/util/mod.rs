pub mod subscribe;

pub use subscribe::{Listener, Subscription};
