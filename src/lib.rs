#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod coords;
pub mod device;
pub mod error;
pub mod execution_list;
pub mod execution_list_parser;
pub mod list_protocol;
pub mod path_command;
pub mod settings;
pub mod shape_compiler;
pub mod shapes;
pub mod units;

pub use coords::{CoordinateTransform, Point};
pub use device::{CommandSink, DeviceCall, RecordingSink};
pub use error::{DeviceError, Error, ParseSkipped, Result};
pub use execution_list::ExecutionListConfig;
pub use execution_list_parser::{load_execution_list, parse_execution_list,
                                ExecutionList};
pub use list_protocol::{ListConfig, ListProtocolDriver, ListSession};
pub use path_command::{PathCommand, Shape};
pub use shape_compiler::{compile_shape, ShapeCompiler, ShapeElement};
pub use units::UnitConverter;

#[cfg(test)]
mod tests;
