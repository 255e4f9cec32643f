pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod slot;

pub use models::{Appointment, AppointmentError, AppointmentStatus};
pub use router::appointment_routes;
pub use services::booking::AppointmentBookingService;
pub use slot::{evaluate_slot, SlotDecision, SlotPolicy};
