//! Compiles tagged geometric input into a list of scan-head commands.
//!
//! Every input element says what it is. A point carries a laser-on flag and
//! becomes a jump or a line, an arc carries its sweep angle. The kind is
//! never guessed from the value in the third field.

use log::debug;
use num::ToPrimitive;
use serde::Deserialize;

use crate::coords::{CoordinateTransform, Point};
use crate::error::{Error, Result};
use crate::path_command::{PathCommand, Shape};
use crate::units::UnitConverter;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeElement
{
    Point { x: f64, y: f64, laser_on: bool },
    Arc { x: f64, y: f64, angle_degrees: f64 }
}

impl ShapeElement
{
    pub fn jump(x: f64, y: f64) -> ShapeElement
    {
        ShapeElement::Point {x, y, laser_on: false}
    }

    pub fn line(x: f64, y: f64) -> ShapeElement
    {
        ShapeElement::Point {x, y, laser_on: true}
    }

    pub fn arc(x: f64, y: f64, angle_degrees: f64) -> ShapeElement
    {
        ShapeElement::Arc {x, y, angle_degrees}
    }

    fn xy(&self) -> (f64, f64)
    {
        match *self {
            ShapeElement::Point {x, y, ..} | ShapeElement::Arc {x, y, ..} => (x, y)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeCompiler
{
    transform: CoordinateTransform,
    units: Option<UnitConverter>
}

impl ShapeCompiler
{
    /// Input coordinates are taken as device bits.
    pub fn new(transform: CoordinateTransform) -> ShapeCompiler
    {
        ShapeCompiler {transform, units: None}
    }

    /// Input coordinates are taken as micrometers and converted to bits
    /// before correction.
    pub fn with_units(mut self, units: UnitConverter) -> ShapeCompiler
    {
        self.units = Some(units);
        self
    }

    pub fn transform(&self) -> &CoordinateTransform
    {
        &self.transform
    }

    fn to_device(&self, index: usize, x: f64, y: f64) -> Result<Point>
    {
        if self.units.is_none() && (x.fract() != 0.0 || y.fract() != 0.0) {
            return Err(Error::InvalidShape(
                format!("element {}: ({}, {}) is not a whole number of bits",
                        index, x, y)));
        }
        let convert = |v: f64| -> Option<i32> {
            match self.units {
                Some(u) => u.try_um_to_bits(v),
                None => v.to_i32()
            }
        };
        match (convert(x), convert(y)) {
            (Some(x), Some(y)) => Ok(self.transform.apply(Point {x, y})),
            _ => Err(Error::InvalidShape(
                format!("element {}: coordinate ({}, {}) out of range", index, x, y)))
        }
    }

    /// The first command is always a jump to the first element's position,
    /// whatever that element asks for, since the head position is unknown
    /// before the list starts.
    pub fn compile(&self, elements: &[ShapeElement]) -> Result<Shape>
    {
        if elements.is_empty() {
            return Err(Error::InvalidShape("no elements to compile".to_string()));
        }
        let mut commands = Vec::with_capacity(elements.len());
        for (i, elem) in elements.iter().enumerate() {
            let (x, y) = elem.xy();
            let p = self.to_device(i, x, y)?;
            let cmd = if i == 0 {
                PathCommand::Jump(p)
            } else {
                match *elem {
                    ShapeElement::Point {laser_on: true, ..} => PathCommand::Line(p),
                    ShapeElement::Point {laser_on: false, ..} => PathCommand::Jump(p),
                    ShapeElement::Arc {angle_degrees, ..} => {
                        if !angle_degrees.is_finite() {
                            return Err(Error::InvalidShape(
                                format!("element {}: arc angle {} is not finite",
                                        i, angle_degrees)));
                        }
                        PathCommand::Arc(p, angle_degrees)
                    }
                }
            };
            commands.push(cmd);
        }
        debug!("Compiled {} elements", commands.len());
        Shape::new(commands)
    }
}

/// Compiles with coordinates already in device bits.
pub fn compile_shape(elements: &[ShapeElement], transform: &CoordinateTransform)
                     -> Result<Shape>
{
    ShapeCompiler::new(*transform).compile(elements)
}
