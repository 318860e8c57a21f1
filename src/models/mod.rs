pub mod event;
pub mod ticket;

pub use event::{Event, EventDetails, EventStatus, NewEvent};
pub use ticket::{Ticket, TicketStatus};
