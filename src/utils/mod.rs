mod partial_success ;
mod panic_message ;

pub use partial_success::PartialSuccess ;
pub(crate) use panic_message::panic_message ;
