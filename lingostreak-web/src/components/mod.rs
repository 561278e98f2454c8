pub mod layout;
pub mod nav_link;
pub mod notice;
