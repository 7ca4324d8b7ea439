pub mod contact;
pub mod lead;
pub mod prospector_settings;

pub use contact::Entity as Contact;
pub use lead::Entity as Lead;
pub use prospector_settings::Entity as ProspectorSettings;
