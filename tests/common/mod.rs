pub mod factory;

pub use factory::Factory;
