pub mod event;
pub mod gen;
pub mod step;
pub mod world;
