pub mod appointment;
pub mod customer;
pub mod status;

pub use appointment::{Appointment, AppointmentPatch, NewAppointment, SlotTime};
pub use customer::{non_blank, Customer, CustomerPatch};
pub use status::{AppointmentStatus, StatusPresentation};
