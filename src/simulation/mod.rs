pub mod field;
pub mod noise;
pub mod schematic;

pub use field::FieldSimulator;
pub use schematic::SchematicSimulator;
