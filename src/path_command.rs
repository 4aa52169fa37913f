use std::fmt;
use std::ops::Deref;

use crate::coords::Point;
use crate::error::{Error, Result};

/// One list instruction for the scan head. Coordinates are device bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand
{
    Jump(Point),  // beam off
    Line(Point),  // beam on
    Arc(Point, f64) // end point, angle in degrees
}

impl PathCommand
{
    pub fn jump(x: i32, y: i32) -> PathCommand
    {
        PathCommand::Jump(Point {x, y})
    }

    pub fn line(x: i32, y: i32) -> PathCommand
    {
        PathCommand::Line(Point {x, y})
    }

    pub fn arc(x: i32, y: i32, angle_degrees: f64) -> PathCommand
    {
        PathCommand::Arc(Point {x, y}, angle_degrees)
    }

    pub fn point(&self) -> Point
    {
        match *self {
            PathCommand::Jump(p) | PathCommand::Line(p) | PathCommand::Arc(p, _) => p
        }
    }

    pub fn angle_degrees(&self) -> Option<f64>
    {
        match *self {
            PathCommand::Arc(_, a) => Some(a),
            _ => None
        }
    }
}

impl fmt::Display for PathCommand
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self {
            PathCommand::Jump(p) => write!(f, "jump {}", p),
            PathCommand::Line(p) => write!(f, "line {}", p),
            PathCommand::Arc(p, a) => write!(f, "arc {} {}°", p, a)
        }
    }
}

/// Non-empty, ordered command list that is loaded into the card as one list.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape
{
    commands: Vec<PathCommand>
}

impl Shape
{
    pub fn new(commands: Vec<PathCommand>) -> Result<Shape>
    {
        if commands.is_empty() {
            return Err(Error::InvalidShape("shape has no commands".to_string()));
        }
        Ok(Shape {commands})
    }

    pub fn commands(&self) -> &[PathCommand]
    {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<PathCommand>
    {
        self.commands
    }
}

impl Deref for Shape
{
    type Target = [PathCommand];
    fn deref(&self) -> &[PathCommand] {
        &self.commands
    }
}

impl<'a> IntoIterator for &'a Shape
{
    type Item = &'a PathCommand;
    type IntoIter = std::slice::Iter<'a, PathCommand>;
    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[test]
fn test_empty_shape_rejected()
{
    assert!(matches!(Shape::new(Vec::new()), Err(Error::InvalidShape(_))));
    let cmds = vec![PathCommand::jump(0, 0), PathCommand::line(5, 5)];
    let shape = Shape::new(cmds.clone()).unwrap();
    assert_eq!(shape.len(), 2);
    assert_eq!(shape.into_commands(), cmds);
}

#[test]
fn test_accessors()
{
    let arc = PathCommand::arc(3, -4, 90.0);
    assert_eq!(arc.point(), Point::new(3, -4));
    assert_eq!(arc.angle_degrees(), Some(90.0));
    assert_eq!(PathCommand::line(1, 2).angle_degrees(), None);
    assert_eq!(PathCommand::jump(1, 2).to_string(), "jump (1, 2)");
}
