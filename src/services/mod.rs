pub mod codegen;
pub mod error;
pub mod events;
pub mod ledger;
pub mod notify;
pub mod tickets;
pub mod window;

pub use codegen::{CodeGenerator, UuidCodes};
pub use error::TicketingError;
pub use events::{Availability, EventService};
pub use ledger::CapacityLedger;
pub use notify::{LogNotifier, Notification, Notifier, NotifierBridge};
pub use tickets::TicketService;
pub use window::{admission_window, WindowCheck};
