pub mod compare;
pub mod delay;
pub mod forward_pass;
