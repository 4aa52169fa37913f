use crate::error::{Error, Result};
use crate::settings::{parse_scalar, LaserPulses, ScanaheadLaserShifts,
                      ScanaheadLineParams, ScannerDelays, SkyWritingParams,
                      WobbelMode};

/// Calibration factor used when a file carries no marker, bits per mm.
pub const DEFAULT_CALIBRATION_FACTOR: f64 = 27168.0;

/// Scanner and laser settings of a canned cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionListConfig
{
    pub calibration_factor: f64,
    pub beam_angle: f64, // degrees
    pub mark_speed: f64, // bits/ms
    pub jump_speed: f64, // bits/ms
    pub scanahead_autodelays: bool,
    pub scanahead_laser_shifts: ScanaheadLaserShifts,
    pub scanahead_line_params: ScanaheadLineParams,
    pub first_pulse_killer: u32,
    pub laser_pulses: LaserPulses,
    pub wobbel_mode: WobbelMode,
    pub sky_writing_params: SkyWritingParams,
    pub sky_writing_mode: u32,
    pub scanner_delays: ScannerDelays
}

impl Default for ExecutionListConfig
{
    fn default() -> ExecutionListConfig {
        ExecutionListConfig {
            calibration_factor: DEFAULT_CALIBRATION_FACTOR,
            beam_angle: 0.0,
            mark_speed: 250.0,
            jump_speed: 1000.0,
            scanahead_autodelays: true,
            scanahead_laser_shifts: ScanaheadLaserShifts {
                laser_on: 0,
                laser_off: 0
            },
            scanahead_line_params: ScanaheadLineParams {
                corner_scale: 100.0,
                end_scale: 100.0,
                acc_scale: 100.0
            },
            first_pulse_killer: 0,
            laser_pulses: LaserPulses {half_period: 40, pulse_length: 8},
            wobbel_mode: WobbelMode {
                transversal: 0,
                longitudinal: 0,
                freq: 0.0,
                mode: 0
            },
            sky_writing_params: SkyWritingParams {
                timelag: 0.0,
                laser_on_shift: 0,
                nprev: 0,
                npost: 0
            },
            sky_writing_mode: 0,
            scanner_delays: ScannerDelays {jump: 25, mark: 10, polygon: 5}
        }
    }
}

impl ExecutionListConfig
{
    /// Names accepted by [`set`](ExecutionListConfig::set).
    pub const SETTINGS: &'static [&'static str] = &[
        "calibration_factor", "beam_angle", "mark_speed", "jump_speed",
        "scanahead_autodelays", "first_pulse_killer", "sky_writing_mode",
        LaserPulses::NAME, WobbelMode::NAME, SkyWritingParams::NAME,
        ScanaheadLaserShifts::NAME, ScanaheadLineParams::NAME,
        ScannerDelays::NAME
    ];

    /// Applies a setting given in its string form. Multi-field settings are
    /// comma-joined in field order. Nothing is changed on error.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()>
    {
        match name {
            "calibration_factor" => self.calibration_factor = parse_scalar(name, value)?,
            "beam_angle" => self.beam_angle = parse_scalar(name, value)?,
            "mark_speed" => self.mark_speed = parse_scalar(name, value)?,
            "jump_speed" => self.jump_speed = parse_scalar(name, value)?,
            "scanahead_autodelays" => {
                self.scanahead_autodelays = parse_scalar::<u32>(name, value)? != 0
            },
            "first_pulse_killer" => self.first_pulse_killer = parse_scalar(name, value)?,
            "sky_writing_mode" => self.sky_writing_mode = parse_scalar(name, value)?,
            LaserPulses::NAME => self.laser_pulses = value.parse()?,
            WobbelMode::NAME => self.wobbel_mode = value.parse()?,
            SkyWritingParams::NAME => self.sky_writing_params = value.parse()?,
            ScanaheadLaserShifts::NAME => self.scanahead_laser_shifts = value.parse()?,
            ScanaheadLineParams::NAME => self.scanahead_line_params = value.parse()?,
            ScannerDelays::NAME => self.scanner_delays = value.parse()?,
            _ => return Err(Error::invalid_parameter(name, "unknown setting"))
        }
        Ok(())
    }
}

#[test]
fn test_set_by_name()
{
    let mut config = ExecutionListConfig::default();
    config.set("mark_speed", "300").unwrap();
    assert_relative_eq!(config.mark_speed, 300.0);
    config.set("wobbel_mode", "250,125,150,1").unwrap();
    assert_eq!(config.wobbel_mode.longitudinal, 125);
    config.set("scanahead_autodelays", "0").unwrap();
    assert!(!config.scanahead_autodelays);
    config.set("scanner_delays", "30,12,6").unwrap();
    assert_eq!(config.scanner_delays, ScannerDelays {jump: 30, mark: 12, polygon: 6});
}

#[test]
fn test_set_failure_leaves_config()
{
    let mut config = ExecutionListConfig::default();
    assert!(config.set("laser_pulses", "1,2,3").is_err());
    assert!(config.set("laser_pulses", "1,x").is_err());
    assert!(config.set("mark_speed", "").is_err());
    assert!(config.set("laser_power", "50").is_err());
    assert_eq!(config, ExecutionListConfig::default());
}

#[test]
fn test_every_listed_setting_is_known()
{
    let mut config = ExecutionListConfig::default();
    for name in ExecutionListConfig::SETTINGS {
        match config.set(name, "") {
            Err(Error::InvalidParameter {setting, reason}) => {
                assert_eq!(setting, *name);
                assert_ne!(reason, "unknown setting");
            },
            other => panic!("{}: unexpected {:?}", name, other)
        }
    }
    assert_eq!(config, ExecutionListConfig::default());
}
