//! Multi-field scanner and laser settings.
//!
//! Each setting has a fixed field order. The same order is used for the
//! arguments of the matching execution-list statement and for the
//! comma-joined string form, e.g. `"40,8"` for [`LaserPulses`].

use std::fmt;
use std::str::FromStr;

use num::ToPrimitive;

use crate::error::{Error, Result};
use crate::execution_list_parser::parse_number_list;

/// Conversion of a parsed number into a typed field value.
pub trait Field: Sized + fmt::Display
{
    fn from_f64(v: f64) -> Option<Self>;
}

impl Field for f64
{
    fn from_f64(v: f64) -> Option<f64> {
        if v.is_finite() {Some(v)} else {None}
    }
}

impl Field for i32
{
    fn from_f64(v: f64) -> Option<i32> {
        if v.fract() != 0.0 {None} else {v.to_i32()}
    }
}

impl Field for u32
{
    fn from_f64(v: f64) -> Option<u32> {
        if v.fract() != 0.0 {None} else {v.to_u32()}
    }
}

fn next_field<T: Field>(setting: &str, field: &str,
                        args: &mut std::slice::Iter<f64>) -> Result<T>
{
    let v = match args.next() {
        Some(v) => *v,
        None => return Err(Error::invalid_parameter(setting,
                                                    format!("missing {}", field)))
    };
    match T::from_f64(v) {
        Some(t) => Ok(t),
        None => Err(Error::invalid_parameter(
            setting, format!("{} = {} is not a valid {}", field, v,
                             std::any::type_name::<T>())))
    }
}

macro_rules! setting {
    ($(#[$meta:meta])* $name:ident = $label:expr, { $($field:ident : $ty:ty),+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            $(pub $field: $ty),+
        }

        impl $name {
            pub const NAME: &'static str = $label;
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            /// Builds the setting from positional values in field order.
            pub fn from_args(args: &[f64]) -> Result<$name> {
                if args.len() != Self::FIELDS.len() {
                    return Err(Error::invalid_parameter(
                        $label,
                        format!("expected {} fields ({}), got {}",
                                Self::FIELDS.len(), Self::FIELDS.join(","),
                                args.len())));
                }
                let mut iter = args.iter();
                Ok($name {
                    $($field: next_field::<$ty>($label, stringify!($field),
                                                 &mut iter)?),+
                })
            }
        }

        impl FromStr for $name {
            type Err = Error;
            fn from_str(s: &str) -> Result<$name> {
                match parse_number_list(s) {
                    Some(args) => $name::from_args(&args),
                    None => Err(Error::invalid_parameter(
                        $label, format!("'{}' is not a comma separated list of numbers", s)))
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                let fields: Vec<String> = vec![$(self.$field.to_string()),+];
                write!(f, "{}", fields.join(","))
            }
        }
    };
}

setting!(
    /// Laser pulse timing in 1/64 µs units.
    LaserPulses = "laser_pulses", {
    half_period: u32,
    pulse_length: u32
});

setting!(
    /// Wobble amplitudes in bits, frequency in Hz.
    WobbelMode = "wobbel_mode", {
    transversal: u32,
    longitudinal: u32,
    freq: f64,
    mode: i32
});

setting!(SkyWritingParams = "sky_writing_params", {
    timelag: f64,
    laser_on_shift: i32,
    nprev: u32,
    npost: u32
});

setting!(ScanaheadLaserShifts = "scanahead_laser_shifts", {
    laser_on: i32,
    laser_off: i32
});

setting!(
    /// Scale factors in percent.
    ScanaheadLineParams = "scanahead_line_params", {
    corner_scale: f64,
    end_scale: f64,
    acc_scale: f64
});

setting!(
    /// Scanner delays in 10 µs units.
    ScannerDelays = "scanner_delays", {
    jump: u32,
    mark: u32,
    polygon: u32
});

/// Parses a single-valued setting.
pub fn parse_scalar<T: Field>(setting: &str, s: &str) -> Result<T>
{
    match parse_number_list(s) {
        Some(args) if args.len() == 1 => {
            next_field::<T>(setting, "value", &mut args.iter())
        }
        Some(args) => Err(Error::invalid_parameter(
            setting, format!("expected 1 field, got {}", args.len()))),
        None => Err(Error::invalid_parameter(
            setting, format!("'{}' is not a number", s)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_laser_pulses()
    {
        let p: LaserPulses = "40,8".parse().unwrap();
        assert_eq!(p, LaserPulses {half_period: 40, pulse_length: 8});
        let p: LaserPulses = " 40 , 8 ".parse().unwrap();
        assert_eq!(p.pulse_length, 8);
        assert_eq!(p.to_string(), "40,8");
    }

    #[test]
    fn test_parse_wobbel_mode()
    {
        let w: WobbelMode = "250,125,150.5,-1".parse().unwrap();
        assert_eq!(w.transversal, 250);
        assert_eq!(w.longitudinal, 125);
        assert_relative_eq!(w.freq, 150.5);
        assert_eq!(w.mode, -1);
    }

    #[test]
    fn test_wrong_field_count()
    {
        match "1,2,3".parse::<LaserPulses>() {
            Err(Error::InvalidParameter {setting, ..}) =>
                assert_eq!(setting, "laser_pulses"),
            other => panic!("unexpected {:?}", other)
        }
        assert!("1,2,3".parse::<WobbelMode>().is_err());
        assert!("".parse::<ScannerDelays>().is_err());
    }

    #[test]
    fn test_non_numeric()
    {
        assert!("40,eight".parse::<LaserPulses>().is_err());
        assert!("40;8".parse::<LaserPulses>().is_err());
        // Negative or fractional values do not fit unsigned integer fields
        assert!("-40,8".parse::<LaserPulses>().is_err());
        assert!("40.5,8".parse::<LaserPulses>().is_err());
    }

    #[test]
    fn test_scalar()
    {
        assert_relative_eq!(parse_scalar::<f64>("mark_speed", "271.68").unwrap(),
                            271.68);
        assert_eq!(parse_scalar::<u32>("first_pulse_killer", "12").unwrap(), 12);
        assert!(parse_scalar::<u32>("first_pulse_killer", "1,2").is_err());
        assert!(parse_scalar::<f64>("mark_speed", "fast").is_err());
    }
}
